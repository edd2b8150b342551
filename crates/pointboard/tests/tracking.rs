use approx::assert_abs_diff_eq;
use pointboard::calib::{MapperParams, MappingModel};
use pointboard::core::{Frame, PixelLayout};
use pointboard::{
    CalibrationError, CaptureOutcome, Corner, FrameSequence, Located, SessionState, TrackerConfig,
    TrackingError, TrackingLoop,
};

const BACKGROUND: [u8; 3] = [70, 75, 80];
const LASER: [u8; 3] = [255, 40, 35];

fn frame(side: usize, patch: Option<(usize, usize)>) -> Frame {
    let mut frame = Frame::filled(side, side, PixelLayout::Rgba, BACKGROUND);
    if let Some((x, y)) = patch {
        frame.fill_square(x, y, 7, LASER);
    }
    frame
}

fn board_corners() -> Vec<Frame> {
    [(10, 10), (990, 10), (10, 990), (990, 990)]
        .into_iter()
        .map(|p| frame(1000, Some(p)))
        .collect()
}

fn calibrate(tracker: &mut TrackingLoop<FrameSequence>) {
    let states = [
        SessionState::Collecting(1),
        SessionState::Collecting(2),
        SessionState::Collecting(3),
        SessionState::Ready,
    ];
    for (corner, state) in Corner::ALL.into_iter().zip(states) {
        let tick = tracker.tick().expect("tick");
        assert!(tick.point.is_some(), "no light for {corner}");
        assert_eq!(
            tracker.capture_corner(),
            Ok(CaptureOutcome::Captured { corner, state })
        );
    }
}

#[test]
fn end_to_end_centre_maps_to_board_centre() {
    let mut frames = board_corners();
    frames.push(frame(1000, Some((500, 500))));
    let mut tracker = TrackingLoop::new(&TrackerConfig::default());
    tracker.start(FrameSequence::new(frames));
    calibrate(&mut tracker);

    let tick = tracker.tick().expect("tick");
    assert_eq!(tick.state, SessionState::Ready);
    let Some(Located::OnBoard(loc)) = tick.location else {
        panic!("expected on-board location, got {:?}", tick.location);
    };
    assert_abs_diff_eq!(loc.u, 0.5, epsilon = 0.01);
    assert_abs_diff_eq!(loc.v, 0.5, epsilon = 0.01);
}

#[test]
fn projective_model_agrees_on_a_square_board() {
    let config = TrackerConfig {
        mapper: MapperParams {
            model: MappingModel::Projective,
            ..MapperParams::default()
        },
        ..TrackerConfig::default()
    };
    let mut frames = board_corners();
    frames.push(frame(1000, Some((255, 745))));
    let mut tracker = TrackingLoop::new(&config);
    tracker.start(FrameSequence::new(frames));
    calibrate(&mut tracker);

    let loc = tracker
        .tick()
        .expect("tick")
        .location
        .and_then(|l| l.on_board().copied())
        .expect("on board");
    assert_abs_diff_eq!(loc.u, 0.25, epsilon = 0.01);
    assert_abs_diff_eq!(loc.v, 0.75, epsilon = 0.01);
}

#[test]
fn collinear_corner_is_rejected_then_recaptured() {
    let frames = vec![
        frame(1000, Some((10, 10))),
        frame(1000, Some((990, 10))),
        // on the top edge line: collinear with TL and TR
        frame(1000, Some((500, 10))),
        frame(1000, Some((10, 990))),
        frame(1000, Some((990, 990))),
    ];
    let mut tracker = TrackingLoop::new(&TrackerConfig::default());
    tracker.start(FrameSequence::new(frames));

    for _ in 0..2 {
        tracker.tick().expect("tick");
        tracker.capture_corner().expect("capture");
    }
    tracker.tick().expect("tick");
    assert!(matches!(
        tracker.capture_corner(),
        Err(CalibrationError::Degenerate(_))
    ));
    assert_eq!(tracker.session().state(), SessionState::Collecting(2));

    for _ in 0..2 {
        tracker.tick().expect("tick");
        tracker.capture_corner().expect("capture");
    }
    assert!(tracker.session().is_ready());
}

#[test]
fn light_off_the_board_is_reported_outside() {
    let corners = [(300, 300), (700, 300), (300, 700), (700, 700)];
    let mut frames: Vec<Frame> = corners.iter().map(|&p| frame(1000, Some(p))).collect();
    frames.push(frame(1000, Some((900, 500))));
    let mut tracker = TrackingLoop::new(&TrackerConfig::default());
    tracker.start(FrameSequence::new(frames));
    calibrate(&mut tracker);

    match tracker.tick().expect("tick").location {
        Some(Located::OutsideBoard(Some(loc))) => {
            assert_abs_diff_eq!(loc.u, 1.5, epsilon = 0.01);
            assert_abs_diff_eq!(loc.v, 0.5, epsilon = 0.01);
        }
        other => panic!("expected outside board, got {other:?}"),
    }
}

#[test]
fn exhausted_source_stops_the_loop_and_keeps_calibration() {
    let mut tracker = TrackingLoop::new(&TrackerConfig::default());
    tracker.start(FrameSequence::new(board_corners()));
    calibrate(&mut tracker);

    let err = tracker.tick().unwrap_err();
    assert!(matches!(err, TrackingError::VideoSourceUnavailable(_)));
    assert!(!tracker.is_active());

    // idle ticks are not faults
    let idle = tracker.tick().expect("idle");
    assert_eq!(idle.point, None);
    assert_eq!(idle.state, SessionState::Ready);

    tracker.start(FrameSequence::new(vec![frame(1000, Some((500, 500)))]));
    assert!(tracker
        .tick()
        .expect("tick")
        .location
        .is_some_and(|l| l.is_on_board()));
}
