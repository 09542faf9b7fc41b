mod common;

use std::time::Duration;

use async_trait::async_trait;
use common::{FakeApi, FakeCamera, andi};
use scanner::flow::NO_IDENTITY_MESSAGE;
use scanner::{
    ApiError, FALLBACK_ERROR_MESSAGE, IdentitySelector, JemaatSummary, KehadiranApi, ScanFlow,
    ScanRequest, ScanState, SearchOutcome,
};

/// Never answers a scan.
struct HangingApi;

#[async_trait]
impl KehadiranApi for HangingApi {
    async fn search_jemaat(&self, _query: &str) -> Result<Vec<JemaatSummary>, ApiError> {
        Ok(Vec::new())
    }

    async fn submit_scan(&self, _request: &ScanRequest) -> Result<String, ApiError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn decode_without_identity_never_submits() {
    let api = FakeApi::default();
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, None).unwrap();

    assert!(!flow.handle_decode(&api, "SESSION-42-ABC").await);

    assert!(api.scan_calls().is_empty());
    assert_eq!(
        flow.state(),
        &ScanState::Error {
            message: NO_IDENTITY_MESSAGE.into()
        }
    );
    assert_eq!(counts.clears(), 1);
}

#[tokio::test]
async fn one_decode_makes_one_submission() {
    let api = FakeApi::default();
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    assert!(flow.handle_decode(&api, "SESSION-42-ABC").await);

    assert_eq!(
        api.scan_calls(),
        vec![ScanRequest {
            kode_qr: "SESSION-42-ABC".into(),
            jemaat_id: "p1".into(),
        }]
    );
    assert_eq!(
        flow.state(),
        &ScanState::Success {
            message: "Kehadiran berhasil dicatat".into()
        }
    );
    assert_eq!(counts.clears(), 1);
    assert!(!flow.camera_held());
}

#[test]
fn decodes_while_submitting_are_ignored() {
    let (camera, _counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    let ticket = flow.on_decode("SESSION-42-ABC").unwrap();
    assert_eq!(flow.state(), &ScanState::Submitting);

    assert!(flow.on_decode("SESSION-42-ABC").is_none());
    assert!(flow.on_decode("SESSION-99-XYZ").is_none());
    assert_eq!(flow.state(), &ScanState::Submitting);

    assert!(flow.complete(ticket, Ok("Kehadiran berhasil dicatat".into())));
    assert!(flow.state().is_terminal());
}

#[test]
fn decode_noise_is_swallowed() {
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    assert!(flow.on_decode("").is_none());
    assert!(flow.on_decode("   ").is_none());
    assert_eq!(flow.state(), &ScanState::Scanning);
    assert_eq!(counts.clears(), 0);
}

#[tokio::test]
async fn decoded_payload_is_posted_verbatim() {
    let api = FakeApi::default();
    let (camera, _counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    assert!(flow.handle_decode(&api, " SESSION-42-ABC\n").await);

    assert_eq!(api.scan_calls()[0].kode_qr, " SESSION-42-ABC\n");
}

#[tokio::test]
async fn cancelled_submission_ends_in_error_and_can_rearm() {
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        flow.handle_decode(&HangingApi, "SESSION-42-ABC"),
    )
    .await;
    assert!(outcome.is_err());

    assert_eq!(
        flow.state(),
        &ScanState::Error {
            message: FALLBACK_ERROR_MESSAGE.into()
        }
    );
    assert!(!flow.camera_held());
    assert_eq!(counts.clears(), 1);

    assert!(flow.scan_again().unwrap());
    assert_eq!(flow.state(), &ScanState::Scanning);
    assert_eq!(counts.starts(), 2);

    let api = FakeApi::default();
    assert!(flow.handle_decode(&api, "SESSION-42-ABC").await);
    assert!(matches!(flow.state(), ScanState::Success { .. }));
}

#[test]
fn abandoned_ticket_releases_camera_once() {
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    let ticket = flow.on_decode("SESSION-42-ABC").unwrap();
    assert!(flow.abandon(ticket));
    assert!(flow.state().is_terminal());
    assert_eq!(counts.clears(), 1);

    assert!(flow.scan_again().unwrap());
    let ticket = flow.on_decode("SESSION-42-ABC").unwrap();
    assert!(flow.complete(ticket, Ok("Kehadiran berhasil dicatat".into())));
    assert_eq!(counts.clears(), 2);
}

#[tokio::test]
async fn server_rejection_shows_server_message() {
    let api = FakeApi {
        scan_failure: Some((409, Some("Kehadiran sudah tercatat untuk sesi ini".into()))),
        ..Default::default()
    };
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    flow.handle_decode(&api, "SESSION-42-ABC").await;

    assert_eq!(
        flow.state(),
        &ScanState::Error {
            message: "Kehadiran sudah tercatat untuk sesi ini".into()
        }
    );
    assert_eq!(counts.clears(), 1);
}

#[tokio::test]
async fn failure_without_message_uses_fallback() {
    let api = FakeApi {
        scan_failure: Some((502, None)),
        ..Default::default()
    };
    let (camera, _counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();

    flow.handle_decode(&api, "SESSION-42-ABC").await;

    assert_eq!(
        flow.state(),
        &ScanState::Error {
            message: scanner::api::FALLBACK_ERROR_MESSAGE.into()
        }
    );
}

#[test]
fn scan_again_reacquires_camera_once() {
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();
    assert_eq!(counts.starts(), 1);

    // not terminal yet
    assert!(!flow.scan_again().unwrap());
    assert_eq!(counts.starts(), 1);

    let ticket = flow.on_decode("SESSION-42-ABC").unwrap();
    flow.complete(
        ticket,
        Err(ApiError::Rejected {
            status: 400,
            message: Some("Sesi kehadiran sudah berakhir".into()),
        }),
    );

    assert!(flow.scan_again().unwrap());
    assert_eq!(flow.state(), &ScanState::Scanning);
    assert_eq!(counts.starts(), 2);
    assert!(flow.camera_held());

    assert!(!flow.scan_again().unwrap());
    assert_eq!(counts.starts(), 2);
}

#[test]
fn late_result_after_settling_is_discarded() {
    let (cam_a, _) = FakeCamera::new();
    let (cam_b, _) = FakeCamera::new();
    let mut a = ScanFlow::mount(cam_a, Some(andi())).unwrap();
    let mut b = ScanFlow::mount(cam_b, Some(andi())).unwrap();

    let late = a.on_decode("SESSION-42-ABC").unwrap();
    let ticket = b.on_decode("SESSION-42-ABC").unwrap();
    assert!(b.complete(ticket, Ok("Kehadiran berhasil dicatat".into())));

    assert!(!b.complete(
        late,
        Err(ApiError::Rejected {
            status: 409,
            message: None
        })
    ));
    assert_eq!(
        b.state(),
        &ScanState::Success {
            message: "Kehadiran berhasil dicatat".into()
        }
    );
}

#[test]
fn dropping_releases_at_most_once_from_any_state() {
    // still scanning
    let (camera, counts) = FakeCamera::new();
    let flow = ScanFlow::mount(camera, Some(andi())).unwrap();
    drop(flow);
    assert_eq!(counts.clears(), 1);

    // mid-submission
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();
    let _ticket = flow.on_decode("SESSION-42-ABC").unwrap();
    drop(flow);
    assert_eq!(counts.clears(), 1);

    // already terminal, camera released before drop
    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, Some(andi())).unwrap();
    let ticket = flow.on_decode("SESSION-42-ABC").unwrap();
    flow.complete(ticket, Ok("ok".into()));
    drop(flow);
    assert_eq!(counts.clears(), 1);

    // release failure does not panic
    let (mut camera, counts) = FakeCamera::new();
    camera.fail_clear = true;
    let flow = ScanFlow::mount(camera, Some(andi())).unwrap();
    drop(flow);
    assert_eq!(counts.clears(), 1);
}

#[tokio::test]
async fn search_select_scan_and_scan_again() {
    let api = FakeApi::with_directory(vec![andi()]);
    let mut selector = IdentitySelector::new();

    let SearchOutcome::Results(found) = selector.search(&api, "and").await.unwrap() else {
        panic!("expected results");
    };
    selector.select(found[0].clone());

    let (camera, counts) = FakeCamera::new();
    let mut flow = ScanFlow::mount(camera, selector.selected().cloned()).unwrap();
    flow.handle_decode(&api, "SESSION-42-ABC").await;

    assert_eq!(
        flow.state(),
        &ScanState::Success {
            message: "Kehadiran berhasil dicatat".into()
        }
    );
    assert_eq!(api.scan_calls()[0].jemaat_id, "p1");

    flow.scan_again().unwrap();
    assert_eq!(flow.state(), &ScanState::Scanning);
    assert_eq!(counts.starts(), 2);
    assert_eq!(counts.clears(), 1);
}
