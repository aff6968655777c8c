//! Session behavior against the simulated platform.

use std::fs;

use tapscan_adapters::{Activity, DeviceSpec, Scenario, SimulatedPlatform, replay};
use tapscan_core::application::spawn;
use tapscan_core::domain::{
    DeviceId, EnclosureLocation, ExclusiveAccessStatus, FocusState, Orientation, Point,
    SessionConfig, SessionPhase, Size, TapEvent,
};

fn device_id(s: &str) -> DeviceId {
    s.parse().unwrap()
}

fn handhelds() -> SimulatedPlatform {
    SimulatedPlatform::with_devices([
        DeviceSpec::scanner(device_id("a"), "Scanner A"),
        DeviceSpec::scanner(device_id("b"), "Scanner B"),
        DeviceSpec::scanner(device_id("c"), "Scanner C"),
    ])
}

fn claimed_devices(activity: &[Activity]) -> Vec<DeviceId> {
    activity
        .iter()
        .filter_map(|a| match a {
            Activity::Claimed { device } => Some(device.clone()),
            _ => None,
        })
        .collect()
}

fn add_all(handle: &tapscan_core::application::SessionHandle, platform: &SimulatedPlatform, ids: &[&str]) {
    for id in ids {
        let spec = platform.spec(&device_id(id)).unwrap();
        handle.device_added(spec.device).unwrap();
    }
}

#[tokio::test]
async fn selection_requests_during_a_slow_claim_coalesce() {
    let platform = handhelds();
    let gate = platform.hold(device_id("a"));
    let (handle, task) = spawn(platform.platform(), SessionConfig::default());

    add_all(&handle, &platform, &["a"]);
    gate.entered().await;

    add_all(&handle, &platform, &["b", "c"]);
    handle.cycle_device().unwrap(); // a -> b
    handle.cycle_device().unwrap(); // b -> c
    gate.release();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.phase, SessionPhase::Active);
    assert_eq!(snap.active_device, Some(device_id("c")));
    assert_eq!(platform.claimed(), vec![device_id("c")]);
    assert_eq!(platform.max_concurrent_claims(), 1);
    // "b" was overwritten in the pending slot and never acquired.
    assert_eq!(
        claimed_devices(&platform.activity()),
        vec![device_id("a"), device_id("c")]
    );

    handle.shutdown().unwrap();
    task.await.unwrap();
    assert!(platform.claimed().is_empty());
}

#[tokio::test]
async fn stop_during_a_slow_claim_wins() {
    let platform = handhelds();
    let gate = platform.hold(device_id("a"));
    let (handle, task) = spawn(platform.platform(), SessionConfig::default());

    add_all(&handle, &platform, &["a", "b"]);
    gate.entered().await;
    handle.stop().unwrap();
    handle.cycle_device().unwrap();
    gate.release();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert_eq!(snap.phase, SessionPhase::Idle);
    assert!(snap.is_fully_closed());
    assert!(platform.claimed().is_empty());

    let activity = platform.activity();
    assert_eq!(claimed_devices(&activity), vec![device_id("a")]);
    assert_eq!(activity.last(), Some(&Activity::Released { device: device_id("a") }));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn shutdown_during_a_slow_claim_ends_the_session() {
    let platform = handhelds();
    let gate = platform.hold(device_id("a"));
    let (handle, task) = spawn(platform.platform(), SessionConfig::default());

    add_all(&handle, &platform, &["a"]);
    gate.entered().await;
    handle.shutdown().unwrap();
    gate.release();

    task.await.unwrap();
    assert!(platform.claimed().is_empty());
    assert!(handle.flush().await.is_err());
}

#[tokio::test]
async fn close_releases_in_order() {
    let platform = SimulatedPlatform::with_devices([DeviceSpec::camera(
        device_id("cam-1"),
        "Rear camera",
        EnclosureLocation::Back,
        "video0",
    )]);
    let (handle, task) = spawn(platform.platform(), SessionConfig::default());
    add_all(&handle, &platform, &["cam-1"]);
    handle.flush().await.unwrap();
    assert!(handle.snapshot().previewing);
    assert_eq!(platform.display_requests(), 1);

    handle.entered_background().unwrap();
    handle.flush().await.unwrap();

    let activity = platform.activity();
    let tail: Vec<_> = activity[activity.len() - 5..].to_vec();
    assert_eq!(
        tail,
        vec![
            Activity::TriggerStopped { device: device_id("cam-1") },
            Activity::PreviewStopped { video: "video0".into() },
            Activity::CameraClosed { video: "video0".into() },
            Activity::Released { device: device_id("cam-1") },
            Activity::DisplayReleased,
        ]
    );
    assert_eq!(platform.display_requests(), 0);

    // Coming back re-acquires the same device.
    handle.leaving_background().unwrap();
    handle.flush().await.unwrap();
    assert_eq!(handle.snapshot().active_device, Some(device_id("cam-1")));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn preview_waits_for_exclusive_access() {
    let platform = SimulatedPlatform::with_devices([DeviceSpec::camera(
        device_id("cam-1"),
        "Front camera",
        EnclosureLocation::Front,
        "video0",
    )]);
    platform.set_exclusive_holder(true);
    let (handle, task) = spawn(platform.platform(), SessionConfig::default());
    add_all(&handle, &platform, &["cam-1"]);
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert!(snap.awaiting_exclusive_access);
    assert!(!snap.previewing);
    assert!(snap.software_trigger_started);

    platform.set_exclusive_holder(false);
    handle
        .exclusive_access_changed(ExclusiveAccessStatus::ExclusiveControlAvailable)
        .unwrap();
    handle.flush().await.unwrap();
    assert!(handle.snapshot().previewing);
    assert!(platform.activity().contains(&Activity::Rotation { degrees: 0 }));

    handle.orientation_changed(Orientation::Portrait).unwrap();
    handle.flush().await.unwrap();
    assert!(platform.activity().contains(&Activity::Rotation { degrees: 270 }));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn tap_focus_uses_the_letterboxed_preview() {
    let platform = SimulatedPlatform::with_devices([DeviceSpec::camera(
        device_id("cam-1"),
        "Rear camera",
        EnclosureLocation::Back,
        "video0",
    )]);
    let (handle, task) = spawn(platform.platform(), SessionConfig::default());
    add_all(&handle, &platform, &["cam-1"]);

    // Square control over a 4:3 stream: 50px bars top and bottom.
    handle
        .tap(TapEvent {
            position: Point::new(200.0, 200.0),
            control: Size::new(400.0, 400.0),
            pointer: Default::default(),
        })
        .unwrap();
    handle.flush().await.unwrap();

    let snap = handle.snapshot();
    assert!(snap.focus.active);
    let b = snap.focus.bounds;
    assert!((b.width - 0.25).abs() < 1e-9);
    assert!((b.height - 1.0 / 3.0).abs() < 1e-9);
    assert!(platform.activity().contains(&Activity::FocusLocked));

    // Searching camera: the next tap clears instead of refocusing.
    platform.set_focus_state(FocusState::Searching);
    handle
        .tap(TapEvent {
            position: Point::new(10.0, 10.0),
            control: Size::new(400.0, 400.0),
            pointer: Default::default(),
        })
        .unwrap();
    handle.flush().await.unwrap();
    assert!(!handle.snapshot().focus.active);
    assert!(platform.activity().contains(&Activity::RegionsCleared));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn scenario_files_replay_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coalesce.toml");
    fs::write(
        &path,
        r#"
        [[device]]
        id = "a"
        [[device]]
        id = "b"
        [[device]]
        id = "c"

        [[step]]
        event = "hold"
        device = "a"
        [[step]]
        event = "add-device"
        device = "a"
        [[step]]
        event = "add-device"
        device = "b"
        [[step]]
        event = "add-device"
        device = "c"
        [[step]]
        event = "cycle"
        [[step]]
        event = "cycle"
        [[step]]
        event = "release"
        "#,
    )
    .unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let report = replay(&scenario, SessionConfig::default()).await.unwrap();

    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.settled.active_device, Some(device_id("c")));
    assert_eq!(report.max_concurrent_claims, 1);
    assert!(report.closed.is_fully_closed());
}

#[test]
fn missing_scenario_file_is_an_io_error() {
    let err = Scenario::load("/definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("not/here.toml"));
}
