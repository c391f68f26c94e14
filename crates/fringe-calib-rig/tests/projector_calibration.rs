mod support;

use fringe_calib_core::{BoardGeometry, ImageSize};
use fringe_calib_phase::{InvalidInputError, UnwrapError, UnwrapParams};
use fringe_calib_rig::{
    AcquisitionMode, AcquisitionParams, CalibrationConfig, CalibrationError,
    CalibrationOrchestrator, CaptureState, CorrespondenceAcquirer, Rig,
};
use support::*;

fn board() -> BoardGeometry {
    BoardGeometry::new(4, 11, 0.5).unwrap()
}

#[test]
fn markers_map_through_fringes_into_projector_pixels() {
    let board = board();
    let markers = synthetic_markers(&board, 5.0, (6.25, 7.5));
    let (mut sink, mut camera) = mirror_pair(ImageSize::new(160, 120));
    let mut trigger = ScriptedTrigger::always();
    let mut display = RecordingDisplay::default();
    let mut detector = ScriptedDetector::new([], Some(markers.clone()));

    let params = AcquisitionParams::default();
    let mut acquirer =
        CorrespondenceAcquirer::projector(&board, &params, &UnwrapParams::default()).unwrap();
    assert_eq!(acquirer.mode(), AcquisitionMode::Projector);

    let mut rig = Rig {
        camera: &mut camera,
        projector: Some(&mut sink),
        trigger: &mut trigger,
        display: &mut display,
        detector: &mut detector,
    };
    let sets = acquirer.acquire(&mut rig, 1).unwrap();

    assert_eq!(sets.len(), 1);
    let mapped = &sets[0];
    assert_eq!(mapped.len(), markers.len());
    for (m, p) in markers.iter().zip(mapped) {
        assert!(
            (p.x - 2.0 * m.x).abs() < 0.3 && (p.y - 2.0 * m.y).abs() < 0.3,
            "camera {m:?} mapped to {p:?}"
        );
    }

    // white for detection, then 2 orientations x 2 pitches x 5 shifts
    assert_eq!(sink.projected.len(), 21);
    assert!(sink.projected[0].data.iter().all(|&v| v == u8::MAX));
    assert!(sink.projected.iter().all(|p| p.size() == sink.size));
    let seen = detector.last_image.as_ref().unwrap();
    assert_eq!(seen.size(), camera.size);
    assert!(seen.data.iter().all(|&v| v == u8::MAX));
}

#[test]
fn projector_intrinsics_use_projector_resolution() {
    let board = board();
    let markers = synthetic_markers(&board, 5.0, (6.0, 8.0));
    let (mut sink, mut camera) = mirror_pair(ImageSize::new(160, 120));
    let mut trigger = ScriptedTrigger::always();
    let mut display = RecordingDisplay::default();
    let mut detector = ScriptedDetector::new([], Some(markers));

    let config = CalibrationConfig {
        board,
        requested_samples: 3,
        ..CalibrationConfig::default()
    };
    let orchestrator = CalibrationOrchestrator::new(config, RecordingSolver::default());
    let mut rig = Rig {
        camera: &mut camera,
        projector: Some(&mut sink),
        trigger: &mut trigger,
        display: &mut display,
        detector: &mut detector,
    };
    let report = orchestrator
        .calibrate(&mut rig, AcquisitionMode::Projector)
        .unwrap();

    assert_eq!(report.mode, AcquisitionMode::Projector);
    assert_eq!(report.samples, 3);
    assert_eq!(report.result.intrinsics(), RecordingSolver::intrinsics());

    let calls = orchestrator.solver().intrinsic_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].image_size, ImageSize::new(160, 120));
    assert_eq!(calls[0].views, 3);
    for view in &calls[0].image_points {
        // projector coordinates span twice the camera range
        assert!(view.iter().all(|p| p.x > 10.0 && p.x < 160.0));
    }
    assert_eq!(orchestrator.solver().pose_calls.borrow().len(), 1);
    assert_eq!(sink.projected.len(), 4 * 21);
}

#[test]
fn missing_projector_is_reported() {
    let board = board();
    let mut camera = StaticCamera::new(80, 60);
    let mut trigger = ScriptedTrigger::always();
    let mut display = RecordingDisplay::default();
    let mut detector = ScriptedDetector::new([], None);
    let orchestrator =
        CalibrationOrchestrator::new(CalibrationConfig::default(), RecordingSolver::default());
    let mut rig = Rig {
        camera: &mut camera,
        projector: None,
        trigger: &mut trigger,
        display: &mut display,
        detector: &mut detector,
    };

    assert!(matches!(
        orchestrator.calibrate_projector(&mut rig),
        Err(CalibrationError::MissingProjector)
    ));

    let params = AcquisitionParams::default();
    let mut acquirer =
        CorrespondenceAcquirer::projector(&board, &params, &UnwrapParams::default()).unwrap();
    assert!(matches!(
        acquirer.acquire(&mut rig, 1),
        Err(CalibrationError::MissingProjector)
    ));
    assert_eq!(detector.calls, 0);
    assert_eq!(display.opened, 0);
}

#[test]
fn reversed_pitches_are_rejected_up_front() {
    let board = board();
    let params = AcquisitionParams {
        pitches: [75.0, 70.0],
        ..AcquisitionParams::default()
    };
    let err = CorrespondenceAcquirer::projector(&board, &params, &UnwrapParams::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CalibrationError::Unwrap(UnwrapError::InvalidPitches { .. })
    ));
}

#[test]
fn projector_wider_than_the_beat_is_rejected_before_projecting() {
    let board = board();
    let (mut sink, mut camera) = mirror_pair(ImageSize::new(1100, 40));
    let mut trigger = ScriptedTrigger::always();
    let mut display = RecordingDisplay::default();
    let markers = synthetic_markers(&board, 5.0, (8.0, 4.0));
    let mut detector = ScriptedDetector::new([], Some(markers));

    let params = AcquisitionParams::default();
    let mut acquirer =
        CorrespondenceAcquirer::projector(&board, &params, &UnwrapParams::default()).unwrap();
    let mut rig = Rig {
        camera: &mut camera,
        projector: Some(&mut sink),
        trigger: &mut trigger,
        display: &mut display,
        detector: &mut detector,
    };
    let err = acquirer.acquire(&mut rig, 1).unwrap_err();

    match err {
        CalibrationError::Unwrap(UnwrapError::BeatTooShort { beat, extent }) => {
            assert!((beat - 1050.0).abs() < 1e-3, "beat {beat}");
            assert_eq!(extent, 1100.0);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.projected.is_empty());
    assert_eq!(detector.calls, 0);
    assert_eq!(display.opened, 0);
}

#[test]
fn closer_pitches_unwrap_a_wide_projector() {
    let board = board();
    // projector columns 960..1065 alias with pitches 70/75
    let markers = synthetic_markers(&board, 5.0, (480.0, 4.0));
    let (mut sink, mut camera) = mirror_pair(ImageSize::new(1100, 40));
    let mut trigger = ScriptedTrigger::always();
    let mut display = RecordingDisplay::default();
    let mut detector = ScriptedDetector::new([], Some(markers.clone()));

    let params = AcquisitionParams {
        pitches: [70.0, 72.0],
        ..AcquisitionParams::default()
    };
    let mut acquirer =
        CorrespondenceAcquirer::projector(&board, &params, &UnwrapParams::default()).unwrap();
    let mut rig = Rig {
        camera: &mut camera,
        projector: Some(&mut sink),
        trigger: &mut trigger,
        display: &mut display,
        detector: &mut detector,
    };
    let sets = acquirer.acquire(&mut rig, 1).unwrap();

    for (m, p) in markers.iter().zip(&sets[0]) {
        assert!(
            (p.x - 2.0 * m.x).abs() < 0.3 && (p.y - 2.0 * m.y).abs() < 0.3,
            "camera {m:?} mapped to {p:?}"
        );
    }
    assert_eq!(sink.projected.len(), 21);
}

#[test]
fn markers_on_unlit_pixels_are_rejected_and_retried() {
    let board = board();
    let lit = synthetic_markers(&board, 5.0, (6.25, 7.5));
    let dark = synthetic_markers(&board, 2.0, (72.0, 10.0));
    let (mut sink, mut camera) = mirror_pair(ImageSize::new(200, 120));
    camera.shadow_from = 70;
    let mut trigger = ScriptedTrigger::always();
    let mut display = RecordingDisplay::default();
    let mut detector = ScriptedDetector::new([Some(dark)], Some(lit.clone()));

    let params = AcquisitionParams::default();
    let mut acquirer =
        CorrespondenceAcquirer::projector(&board, &params, &UnwrapParams::default()).unwrap();
    let mut rig = Rig {
        camera: &mut camera,
        projector: Some(&mut sink),
        trigger: &mut trigger,
        display: &mut display,
        detector: &mut detector,
    };
    let sets = acquirer.acquire(&mut rig, 1).unwrap();

    assert_eq!(acquirer.attempts(), 2);
    assert_eq!(sets.len(), 1);
    for (m, p) in lit.iter().zip(&sets[0]) {
        assert!((p.x - 2.0 * m.x).abs() < 0.3 && (p.y - 2.0 * m.y).abs() < 0.3);
    }
    // both attempts ran the full fringe sequence
    assert_eq!(sink.projected.len(), 2 * 21);
    assert_eq!(
        display.shown[1],
        Shown {
            accepted: 0,
            requested: 1,
            state: CaptureState::Rejected,
            markers: Some(board.marker_count()),
        }
    );
}

#[test]
fn frame_size_change_during_fringes_aborts_acquisition() {
    let board = board();
    let markers = synthetic_markers(&board, 5.0, (6.25, 7.5));
    let (mut sink, camera) = mirror_pair(ImageSize::new(160, 120));
    // first pose: feedback, white, 20 fringes; the second pose breaks on
    // its third horizontal short-pitch capture
    let mut camera = ShrinkingCamera {
        inner: camera,
        frames: 0,
        shrink_after: 26,
    };
    let mut trigger = ScriptedTrigger::always();
    let mut display = RecordingDisplay::default();
    let mut detector = ScriptedDetector::new([], Some(markers));

    let params = AcquisitionParams::default();
    let mut acquirer =
        CorrespondenceAcquirer::projector(&board, &params, &UnwrapParams::default()).unwrap();
    let mut rig = Rig {
        camera: &mut camera,
        projector: Some(&mut sink),
        trigger: &mut trigger,
        display: &mut display,
        detector: &mut detector,
    };
    let err = acquirer.acquire(&mut rig, 2).unwrap_err();

    assert!(
        matches!(
            err,
            CalibrationError::InvalidInput(InvalidInputError::SizeMismatch {
                index: 2,
                expected,
                got,
            }) if expected == ImageSize::new(80, 60) && got == ImageSize::new(79, 60)
        ),
        "unexpected error: {err}"
    );
    assert_eq!(acquirer.attempts(), 2);
    assert_eq!(detector.calls, 2);
    assert_eq!((display.opened, display.closed), (1, 1));
}
