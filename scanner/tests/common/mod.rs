#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use scanner::{ApiError, Camera, CameraError, JemaatSummary, KehadiranApi, ScanRequest};

#[derive(Default)]
pub struct CameraCounts {
    pub starts: AtomicU32,
    pub clears: AtomicU32,
}

impl CameraCounts {
    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> u32 {
        self.clears.load(Ordering::SeqCst)
    }
}

pub struct FakeCamera {
    pub counts: Arc<CameraCounts>,
    pub fail_clear: bool,
}

impl FakeCamera {
    pub fn new() -> (Self, Arc<CameraCounts>) {
        let counts = Arc::new(CameraCounts::default());
        (
            Self {
                counts: counts.clone(),
                fail_clear: false,
            },
            counts,
        )
    }
}

impl Camera for FakeCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        self.counts.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CameraError> {
        self.counts.clears.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear {
            return Err(CameraError::Release("device busy".into()));
        }
        Ok(())
    }
}

/// Records every call and answers from canned results.
#[derive(Default)]
pub struct FakeApi {
    pub searches: Mutex<Vec<String>>,
    pub scans: Mutex<Vec<ScanRequest>>,
    pub directory: Vec<JemaatSummary>,
    /// `None` means success with the standard confirmation.
    pub scan_failure: Option<(u16, Option<String>)>,
}

impl FakeApi {
    pub fn with_directory(directory: Vec<JemaatSummary>) -> Self {
        Self {
            directory,
            ..Default::default()
        }
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn scan_calls(&self) -> Vec<ScanRequest> {
        self.scans.lock().unwrap().clone()
    }
}

#[async_trait]
impl KehadiranApi for FakeApi {
    async fn search_jemaat(&self, query: &str) -> Result<Vec<JemaatSummary>, ApiError> {
        self.searches.lock().unwrap().push(query.to_string());
        let needle = query.to_lowercase();
        Ok(self
            .directory
            .iter()
            .filter(|j| j.nama.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn submit_scan(&self, request: &ScanRequest) -> Result<String, ApiError> {
        self.scans.lock().unwrap().push(request.clone());
        match &self.scan_failure {
            None => Ok("Kehadiran berhasil dicatat".to_string()),
            Some((status, message)) => Err(ApiError::Rejected {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

pub fn andi() -> JemaatSummary {
    JemaatSummary {
        id: "p1".into(),
        nama: "Andi Pratama".into(),
        nomor_induk: "GM-001".into(),
        foto_url: None,
    }
}
