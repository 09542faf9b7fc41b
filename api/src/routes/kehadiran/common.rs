use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use db::models::attendance_record::{RecordWithJemaat, ScanError};
use db::models::attendance_session::Model as Session;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub nama_kegiatan: String,
    pub jenis_kegiatan: String,
    pub tanggal: String,
    pub waktu_mulai: String,
    pub waktu_selesai: String,
    pub status_aktif: bool,
    /// Payload to render as the QR image.
    pub kode_qr: String,
    /// Whether a scan submitted right now would pass the window check.
    pub sedang_berlangsung: bool,
    pub jumlah_hadir: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Session> for SessionResponse {
    fn from(m: Session) -> Self {
        Self {
            sedang_berlangsung: m.is_open_at(Utc::now()),
            id: m.id,
            nama_kegiatan: m.nama_kegiatan,
            jenis_kegiatan: m.jenis_kegiatan,
            tanggal: m.tanggal.to_string(),
            waktu_mulai: iso(m.waktu_mulai),
            waktu_selesai: iso(m.waktu_selesai),
            status_aktif: m.status_aktif,
            kode_qr: m.kode_qr,
            jumlah_hadir: 0,
            created_at: iso(m.created_at),
            updated_at: iso(m.updated_at),
        }
    }
}

impl SessionResponse {
    pub fn with_count(m: Session, jumlah_hadir: i64) -> Self {
        let mut base = Self::from(m);
        base.jumlah_hadir = jumlah_hadir;
        base
    }
}

pub(crate) fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Matches `nama_kegiatan` or `jenis_kegiatan`.
    pub q: Option<String>,
    pub aktif: Option<bool>,
    /// `waktu_mulai` | `nama_kegiatan` | `created_at`, `-` prefix for descending.
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct ListResponse {
    pub sessions: Vec<SessionResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

fn window_in_order(req: &CreateSessionReq) -> Result<(), ValidationError> {
    if req.waktu_selesai <= req.waktu_mulai {
        let mut err = ValidationError::new("window");
        err.message = Some("Waktu selesai harus setelah waktu mulai".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "window_in_order", skip_on_field_errors = true))]
pub struct CreateSessionReq {
    #[validate(length(min = 1, max = 255, message = "Nama kegiatan wajib diisi"))]
    pub nama_kegiatan: String,
    #[validate(length(min = 1, max = 100, message = "Jenis kegiatan wajib diisi"))]
    pub jenis_kegiatan: String,
    /// Defaults to the date of `waktuMulai`.
    pub tanggal: Option<NaiveDate>,
    pub waktu_mulai: DateTime<Utc>,
    pub waktu_selesai: DateTime<Utc>,
    pub status_aktif: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditSessionReq {
    #[validate(length(min = 1, max = 255, message = "Nama kegiatan tidak boleh kosong"))]
    pub nama_kegiatan: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Jenis kegiatan tidak boleh kosong"))]
    pub jenis_kegiatan: Option<String>,
    pub tanggal: Option<NaiveDate>,
    pub waktu_mulai: Option<DateTime<Utc>>,
    pub waktu_selesai: Option<DateTime<Utc>>,
    pub status_aktif: Option<bool>,
}

/// Body posted by the scan client.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[validate(length(min = 1, message = "QR Code wajib diisi"))]
    pub kode_qr: String,
    #[validate(length(min = 1, message = "Jemaat wajib dipilih"))]
    pub jemaat_id: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub session_id: String,
    pub nama_kegiatan: String,
    pub jemaat_id: String,
    pub waktu_hadir: String,
}

/// Status code for a refused scan. Validation-type refusals stay in the 4xx
/// range so the client shows the server's message.
pub fn scan_error_status(err: &ScanError) -> StatusCode {
    match err {
        ScanError::UnknownCode | ScanError::UnknownJemaat => StatusCode::NOT_FOUND,
        ScanError::Inactive | ScanError::NotStarted | ScanError::Ended => StatusCode::BAD_REQUEST,
        ScanError::AlreadyRecorded => StatusCode::CONFLICT,
        ScanError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDto {
    pub jemaat_id: String,
    pub nama: Option<String>,
    pub nomor_induk: Option<String>,
    pub waktu_hadir: String,
    pub ip_address: Option<String>,
}

impl From<RecordWithJemaat> for RecordDto {
    fn from(r: RecordWithJemaat) -> Self {
        let (nama, nomor_induk) = match r.jemaat {
            Some(j) => (Some(j.nama), Some(j.nomor_induk)),
            None => (None, None),
        };
        Self {
            jemaat_id: r.record.jemaat_id,
            nama,
            nomor_induk,
            waktu_hadir: iso(r.record.waktu_hadir),
            ip_address: r.record.ip_address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordsListQuery {
    pub q: Option<String>,
    /// `waktu_hadir` | `nama`, `-` prefix for descending. Default `-waktu_hadir`.
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, Default)]
pub struct RecordsListResponse {
    pub records: Vec<RecordDto>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}
