use std::sync::{Arc, Mutex};

use mockall::predicate::eq;

use super::{SessionHandle, spawn};
use crate::application::ApplicationError;
use crate::application::ports::{
    BarcodeScanner, Camera, ClaimedScanner, MockBarcodeScanner, MockCamera, MockCameraProvider,
    MockClaimedScanner, MockDisplayRequest, MockScannerProvider, Platform,
};
use crate::domain::{
    Device, DeviceId, EnclosureLocation, ExclusiveAccessStatus, FocusCapabilities, FocusMode,
    FocusRange, FocusState, Orientation, Point, ROTATION_PROPERTY_KEY, ScanReport, SessionConfig,
    SessionPhase, Size, StabilizationMode, TapEvent,
};

fn device_id(s: &str) -> DeviceId {
    s.parse().unwrap()
}

// ── fixtures ────────────────────────────────────────────────────────────────

fn claimed_ok() -> MockClaimedScanner {
    let mut claimed = MockClaimedScanner::new();
    claimed.expect_enable().returning(|| Ok(()));
    claimed.expect_start_software_trigger().times(1).returning(|| Ok(()));
    claimed.expect_stop_software_trigger().times(1).returning(|| Ok(()));
    claimed.expect_release().times(1).return_const(());
    claimed
}

fn scanner_with(video: Option<&'static str>, claimed: MockClaimedScanner) -> MockBarcodeScanner {
    let mut scanner = MockBarcodeScanner::new();
    scanner
        .expect_video_device_id()
        .returning(move || video.map(String::from));
    scanner
        .expect_claim()
        .times(1)
        .return_once(move || Some(Box::new(claimed) as Box<dyn ClaimedScanner>));
    scanner
}

fn headless_scanner() -> MockBarcodeScanner {
    scanner_with(None, claimed_ok())
}

fn provider_once(scanner: MockBarcodeScanner) -> MockScannerProvider {
    let mut provider = MockScannerProvider::new();
    provider
        .expect_from_id()
        .times(1)
        .return_once(move |_| Some(Box::new(scanner) as Box<dyn BarcodeScanner>));
    provider
}

/// Hands out a fresh headless scanner per call and records requested ids.
fn recording_provider(log: Arc<Mutex<Vec<DeviceId>>>) -> MockScannerProvider {
    let mut provider = MockScannerProvider::new();
    provider.expect_from_id().returning(move |id| {
        log.lock().unwrap().push(id.clone());
        Some(Box::new(headless_scanner()) as Box<dyn BarcodeScanner>)
    });
    provider
}

fn display(active: usize) -> MockDisplayRequest {
    let mut display = MockDisplayRequest::new();
    display.expect_request_active().times(active).return_const(());
    display.expect_request_release().times(active).return_const(());
    display
}

fn cameras_with(location: EnclosureLocation, camera: MockCamera) -> MockCameraProvider {
    let mut cameras = MockCameraProvider::new();
    cameras
        .expect_camera_location()
        .returning(move |_| Some(location));
    cameras
        .expect_open()
        .times(1)
        .return_once(move |_| Ok(Box::new(camera) as Box<dyn Camera>));
    cameras
}

fn focus_caps() -> FocusCapabilities {
    FocusCapabilities {
        supported: true,
        ranges: vec![FocusRange::Normal, FocusRange::FullRange],
        modes: vec![FocusMode::Continuous, FocusMode::Single],
    }
}

/// Camera accepting every call except `start_preview`, which tests set up.
fn camera_base(state: FocusState, stabilization: Vec<StabilizationMode>) -> MockCamera {
    let mut camera = MockCamera::new();
    camera.expect_stop_preview().returning(|| Ok(()));
    camera.expect_close().times(1).return_const(());
    camera
        .expect_preview_resolution()
        .returning(|| Some(Size::new(640.0, 480.0)));
    camera.expect_set_stream_property().returning(|_, _| Ok(()));
    camera.expect_focus_capabilities().returning(focus_caps);
    camera.expect_focus_state().return_const(state);
    camera.expect_lock_focus().returning(|| Ok(()));
    camera.expect_unlock_focus().returning(|| Ok(()));
    camera.expect_configure_focus().returning(|_| Ok(()));
    camera.expect_focus().returning(|| Ok(()));
    camera.expect_white_balance_supported().return_const(false);
    camera
        .expect_stabilization_modes()
        .returning(move || stabilization.clone());
    camera
}

/// Camera that previews fine and accepts every focus call.
fn working_camera() -> MockCamera {
    let mut camera = camera_base(FocusState::Focused, Vec::new());
    camera.expect_start_preview().times(1).returning(|| Ok(()));
    camera.expect_set_region_of_interest().returning(|_| Ok(()));
    camera.expect_clear_regions().returning(|| Ok(()));
    camera
}

fn platform(
    scanners: MockScannerProvider,
    cameras: MockCameraProvider,
    display: MockDisplayRequest,
) -> Platform {
    Platform::new(Arc::new(scanners), Arc::new(cameras), Arc::new(display))
}

fn device(id: &str) -> Device {
    Device::new(device_id(id), format!("Scanner {id}"), EnclosureLocation::Back)
}

async fn shut_down(handle: SessionHandle, task: tokio::task::JoinHandle<()>) {
    handle.shutdown().unwrap();
    task.await.expect("session task panicked");
}

// ── selection ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_device_is_claimed_automatically() {
    let platform = platform(
        provider_once(headless_scanner()),
        MockCameraProvider::new(),
        display(0),
    );
    let (handle, task) = spawn(platform, SessionConfig::default());

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.phase, SessionPhase::Active);
    assert_eq!(snap.active_device, Some(device_id("a")));
    assert!(snap.scanner_claimed);
    assert!(snap.software_trigger_started);
    assert!(!snap.scanner_supports_preview);
    assert!(!snap.previewing);
    assert_eq!(snap.device_count, 1);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn unavailable_scanner_leaves_session_idle() {
    let mut provider = MockScannerProvider::new();
    provider.expect_from_id().times(1).returning(|_| None);
    let (handle, task) = spawn(
        platform(provider, MockCameraProvider::new(), display(0)),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.phase, SessionPhase::Idle);
    assert_eq!(snap.selected_device, Some(device_id("a")));
    assert!(snap.is_fully_closed());

    shut_down(handle, task).await;
}

#[tokio::test]
async fn claim_refused_is_not_retried() {
    let mut scanner = MockBarcodeScanner::new();
    scanner.expect_claim().times(1).returning(|| None);
    let (handle, task) = spawn(
        platform(provider_once(scanner), MockCameraProvider::new(), display(0)),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();

    assert!(!handle.snapshot().scanner_claimed);
    shut_down(handle, task).await;
}

#[tokio::test]
async fn enable_failure_releases_the_claim() {
    let mut claimed = MockClaimedScanner::new();
    claimed
        .expect_enable()
        .returning(|| Err(ApplicationError::port("enable", "device busy")));
    claimed.expect_start_software_trigger().never();
    claimed.expect_release().times(1).return_const(());
    let (handle, task) = spawn(
        platform(
            provider_once(scanner_with(None, claimed)),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert!(!snap.scanner_claimed);
    assert_eq!(snap.phase, SessionPhase::Idle);
    shut_down(handle, task).await;
}

#[tokio::test]
async fn cycling_moves_to_the_next_device() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (handle, task) = spawn(
        platform(
            recording_provider(Arc::clone(&log)),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.device_added(device("b")).unwrap();
    handle.flush().await.unwrap();
    handle.cycle_device().unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.active_device, Some(device_id("b")));
    assert_eq!(snap.device_count, 2);
    assert_eq!(*log.lock().unwrap(), vec![device_id("a"), device_id("b")]);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn selection_requests_during_selection_keep_only_the_newest() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (handle, task) = spawn(
        platform(
            recording_provider(Arc::clone(&log)),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    // Queued before the actor runs: all of these arrive while "a" is acquired.
    handle.device_added(device("a")).unwrap();
    handle.device_added(device("b")).unwrap();
    handle.device_added(device("c")).unwrap();
    handle.cycle_device().unwrap(); // a -> b
    handle.cycle_device().unwrap(); // b -> c
    handle.flush().await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec![device_id("a"), device_id("c")]);
    assert_eq!(handle.snapshot().active_device, Some(device_id("c")));

    shut_down(handle, task).await;
}

#[tokio::test]
async fn stop_during_selection_closes_once_selection_finishes() {
    let (handle, task) = spawn(
        platform(
            provider_once(headless_scanner()),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.stop().unwrap();
    handle.cycle_device().unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.phase, SessionPhase::Idle);
    assert!(snap.is_fully_closed());
    // The selection survives a stop so that resume can find it.
    assert_eq!(snap.selected_device, Some(device_id("a")));

    shut_down(handle, task).await;
}

#[tokio::test]
async fn removing_the_selected_device_switches_to_its_successor() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (handle, task) = spawn(
        platform(
            recording_provider(Arc::clone(&log)),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.device_added(device("b")).unwrap();
    handle.flush().await.unwrap();
    handle.device_removed(&device_id("a")).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.active_device, Some(device_id("b")));
    assert_eq!(snap.device_count, 1);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn resume_reclaims_the_selected_device() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (handle, task) = spawn(
        platform(
            recording_provider(Arc::clone(&log)),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();
    handle.suspending().unwrap();
    handle.flush().await.unwrap();
    assert!(handle.snapshot().is_fully_closed());

    handle.resuming().unwrap();
    handle.flush().await.unwrap();
    assert!(handle.snapshot().scanner_claimed);
    assert_eq!(log.lock().unwrap().len(), 2);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn select_current_after_stop_claims_the_same_device() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (handle, task) = spawn(
        platform(
            recording_provider(Arc::clone(&log)),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.device_added(device("b")).unwrap();
    handle.stop().unwrap();
    handle.flush().await.unwrap();
    assert!(handle.snapshot().is_fully_closed());

    handle.select_current().unwrap();
    handle.flush().await.unwrap();
    assert_eq!(handle.snapshot().active_device, Some(device_id("a")));
    assert_eq!(
        *log.lock().unwrap(),
        [device_id("a"), device_id("a")]
    );

    shut_down(handle, task).await;
}

#[tokio::test]
async fn scanner_closed_only_matters_for_the_claimed_device() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (handle, task) = spawn(
        platform(
            recording_provider(Arc::clone(&log)),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.device_added(device("b")).unwrap();
    handle.flush().await.unwrap();
    let claimed = handle.snapshot();
    assert!(claimed.scanner_claimed);

    handle.scanner_closed(&device_id("b")).unwrap();
    handle.device_updated(&device_id("a")).unwrap();
    handle.capture_failed("sensor unplugged").unwrap();
    handle.flush().await.unwrap();
    assert_eq!(handle.snapshot(), claimed);

    handle.scanner_closed(&device_id("a")).unwrap();
    handle.flush().await.unwrap();
    let snap = handle.snapshot();
    assert_eq!(snap.phase, SessionPhase::Idle);
    assert!(snap.is_fully_closed());
    assert_eq!(snap.active_device, None);
    assert_eq!(snap.selected_device, Some(device_id("a")));
    assert_eq!(log.lock().unwrap().len(), 1);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn scans_only_count_for_the_claimed_device() {
    let (handle, task) = spawn(
        platform(
            provider_once(headless_scanner()),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );
    handle.device_added(device("a")).unwrap();

    let report = ScanReport {
        symbology: "ean13".into(),
        label: "4006381333931".into(),
    };
    handle.scan_received(&device_id("a"), report.clone()).unwrap();
    handle.scan_received(&device_id("zz"), report.clone()).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.scan_count, 1);
    assert_eq!(snap.last_scan, Some(report));

    shut_down(handle, task).await;
}

// ── preview ─────────────────────────────────────────────────────────────────

fn previewing_session(
    camera: MockCamera,
    config: SessionConfig,
) -> (SessionHandle, tokio::task::JoinHandle<()>) {
    spawn(
        platform(
            provider_once(scanner_with(Some("cam0"), claimed_ok())),
            cameras_with(EnclosureLocation::Back, camera),
            display(1),
        ),
        config,
    )
}

#[tokio::test]
async fn preview_starts_with_rotation_and_image_controls() {
    let mut camera = MockCamera::new();
    camera.expect_start_preview().times(1).returning(|| Ok(()));
    camera.expect_stop_preview().times(1).returning(|| Ok(()));
    camera.expect_close().times(1).return_const(());
    camera
        .expect_set_stream_property()
        .with(eq(ROTATION_PROPERTY_KEY), eq(90))
        .times(1)
        .returning(|_, _| Ok(()));
    camera.expect_focus_capabilities().returning(focus_caps);
    camera.expect_unlock_focus().times(1).returning(|| Ok(()));
    camera.expect_configure_focus().times(1).returning(|_| Ok(()));
    camera.expect_focus().times(1).returning(|| Ok(()));
    camera
        .expect_stabilization_modes()
        .returning(|| vec![StabilizationMode::Off, StabilizationMode::Auto]);
    camera
        .expect_set_stabilization()
        .with(eq(StabilizationMode::Auto))
        .times(1)
        .returning(|_| Ok(()));
    camera.expect_white_balance_supported().return_const(true);
    camera
        .expect_set_white_balance_auto()
        .times(1)
        .returning(|| Ok(()));

    let config = SessionConfig {
        initial_orientation: Orientation::Portrait,
        ..SessionConfig::default()
    };
    let (handle, task) = previewing_session(camera, config);

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert!(snap.scanner_supports_preview);
    assert!(snap.previewing);
    assert!(snap.auto_focus);
    assert!(snap.software_trigger_started);
    assert_eq!(
        snap.camera.map(|c| (c.external, c.mirrored)),
        Some((false, false))
    );

    let mut updates = handle.subscribe();
    shut_down(handle, task).await;
    let closed = updates.borrow_and_update().clone();
    assert!(closed.is_fully_closed());
    assert_eq!(closed.camera, None);
}

#[tokio::test]
async fn image_controls_respect_configuration() {
    let mut camera = camera_base(FocusState::Focused, vec![StabilizationMode::Auto]);
    camera.expect_start_preview().times(1).returning(|| Ok(()));
    camera.expect_set_stabilization().never();

    let config = SessionConfig {
        apply_stabilization: false,
        ..SessionConfig::default()
    };
    let (handle, task) = previewing_session(camera, config);
    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();
    assert!(handle.snapshot().previewing);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn permission_denied_keeps_the_scanner_without_preview() {
    let mut cameras = MockCameraProvider::new();
    cameras
        .expect_camera_location()
        .returning(|_| Some(EnclosureLocation::Front));
    cameras.expect_open().times(1).returning(|_| {
        Err(ApplicationError::PermissionDenied {
            device: device_id("cam0").to_string(),
        })
    });
    let (handle, task) = spawn(
        platform(
            provider_once(scanner_with(Some("cam0"), claimed_ok())),
            cameras,
            display(0),
        ),
        SessionConfig::default(),
    );

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert!(snap.scanner_claimed);
    assert!(snap.scanner_supports_preview);
    assert!(!snap.previewing);
    assert!(snap.software_trigger_started);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn exclusive_access_conflict_retries_when_control_returns() {
    let mut camera = camera_base(FocusState::Focused, Vec::new());
    let mut attempts = 0;
    camera.expect_start_preview().times(2).returning(move || {
        attempts += 1;
        if attempts == 1 {
            Err(ApplicationError::ExclusiveAccessConflict {
                device: device_id("cam0").to_string(),
            })
        } else {
            Ok(())
        }
    });
    let (handle, task) = previewing_session(camera, SessionConfig::default());

    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();
    let snap = handle.snapshot();
    assert!(snap.awaiting_exclusive_access);
    assert!(!snap.previewing);
    assert!(snap.scanner_claimed);

    // Shared access does not trigger a retry.
    handle
        .exclusive_access_changed(ExclusiveAccessStatus::SharedReadOnlyAvailable)
        .unwrap();
    handle.flush().await.unwrap();
    assert!(!handle.snapshot().previewing);

    handle
        .exclusive_access_changed(ExclusiveAccessStatus::ExclusiveControlAvailable)
        .unwrap();
    handle.flush().await.unwrap();
    let snap = handle.snapshot();
    assert!(snap.previewing);
    assert!(!snap.awaiting_exclusive_access);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn orientation_change_rewrites_rotation() {
    let degrees = Arc::new(Mutex::new(Vec::new()));
    let mut camera = MockCamera::new();
    camera.expect_start_preview().times(1).returning(|| Ok(()));
    camera.expect_stop_preview().returning(|| Ok(()));
    camera.expect_close().return_const(());
    let seen = Arc::clone(&degrees);
    camera
        .expect_set_stream_property()
        .returning(move |_, value| {
            seen.lock().unwrap().push(value);
            Ok(())
        });
    camera.expect_focus_capabilities().returning(FocusCapabilities::default);
    camera.expect_white_balance_supported().return_const(false);
    camera.expect_stabilization_modes().returning(Vec::new);

    let (handle, task) = spawn(
        platform(
            provider_once(scanner_with(Some("cam0"), claimed_ok())),
            cameras_with(EnclosureLocation::Front, camera),
            display(1),
        ),
        SessionConfig::default(),
    );
    handle.device_added(device("a")).unwrap();
    handle.orientation_changed(Orientation::Portrait).unwrap();
    handle.flush().await.unwrap();

    // Front cameras rotate the other way.
    assert_eq!(*degrees.lock().unwrap(), vec![0, 270]);
    assert_eq!(handle.snapshot().orientation, Orientation::Portrait);

    shut_down(handle, task).await;
}

// ── tap to focus ────────────────────────────────────────────────────────────

fn tap_at(x: f64, y: f64) -> TapEvent {
    TapEvent {
        position: Point::new(x, y),
        control: Size::new(400.0, 300.0),
        pointer: Default::default(),
    }
}

#[tokio::test]
async fn tap_focuses_then_second_tap_restores_continuous_focus() {
    let (handle, task) = previewing_session(working_camera(), SessionConfig::default());
    handle.device_added(device("a")).unwrap();
    handle.flush().await.unwrap();
    assert!(handle.snapshot().auto_focus);

    handle.tap(tap_at(200.0, 150.0)).unwrap();
    handle.flush().await.unwrap();
    let snap = handle.snapshot();
    assert!(snap.focus.active);
    assert!(!snap.auto_focus);
    let bounds = snap.focus.bounds;
    // 75px square over a 400x300 preview, centered on the tap.
    assert!((bounds.width - 0.1875).abs() < 1e-9);
    assert!((bounds.height - 0.25).abs() < 1e-9);
    assert!((bounds.x + bounds.width / 2.0 - 0.5).abs() < 1e-9);
    assert!((bounds.y + bounds.height / 2.0 - 0.5).abs() < 1e-9);

    handle.tap(tap_at(10.0, 10.0)).unwrap();
    handle.flush().await.unwrap();
    let snap = handle.snapshot();
    assert!(!snap.focus.active);
    assert!(snap.auto_focus);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn tap_while_searching_clears_instead_of_focusing() {
    let mut camera = camera_base(FocusState::Searching, Vec::new());
    camera.expect_start_preview().times(1).returning(|| Ok(()));
    camera.expect_set_region_of_interest().never();
    camera.expect_clear_regions().times(1).returning(|| Ok(()));

    let (handle, task) = previewing_session(camera, SessionConfig::default());
    handle.device_added(device("a")).unwrap();
    handle.tap(tap_at(200.0, 150.0)).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert!(!snap.focus.active);
    assert!(snap.auto_focus);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn tap_without_preview_is_ignored() {
    let (handle, task) = spawn(
        platform(
            provider_once(headless_scanner()),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );
    handle.device_added(device("a")).unwrap();
    handle.tap(tap_at(200.0, 150.0)).unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert!(!snap.focus.active);
    assert!(!snap.auto_focus);

    shut_down(handle, task).await;
}

#[tokio::test]
async fn handle_reports_closed_session() {
    let (handle, task) = spawn(
        platform(
            MockScannerProvider::new(),
            MockCameraProvider::new(),
            display(0),
        ),
        SessionConfig::default(),
    );
    handle.shutdown().unwrap();
    task.await.unwrap();

    assert!(handle.cycle_device().is_err());
    assert!(handle.flush().await.is_err());
}
