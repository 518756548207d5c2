//! Integration tests for a whole game
//!
//! Tests the full path: trace → session → funnel → selected word

use mindread::core::{parse_trace, replay, GameSession, RandomCandidate};
use mindread::types::{
    Direction, EngineConfig, QuadrantCount, ReasonCode, Sample, SessionEvent, TimerPhase,
};
use mindread::{Error, STABLE_DURATION_MS};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn words(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("w{:02}", i)).collect()
}

fn commits(events: &[SessionEvent]) -> Vec<(usize, Direction, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::RoundCommitted { round_index, direction, manual } => Some((*round_index, *direction, *manual)),
            _ => None,
        })
        .collect()
}

fn selected(events: &[SessionEvent]) -> Option<(String, bool)> {
    events.iter().find_map(|e| match e {
        SessionEvent::WordSelected { word, forced, .. } => Some((word.clone(), *forced)),
        _ => None,
    })
}

/// Hold `value` from `start` for slightly more than the stable duration
fn hold(session: &mut GameSession, start: u64, value: f64) -> (Vec<SessionEvent>, u64) {
    let mut events = Vec::new();
    let mut t = start;
    while t <= start + STABLE_DURATION_MS + 100 {
        events.extend(session.on_sample(Some(Sample::offset(t, value))));
        t += 50;
    }
    (events, t)
}

#[test]
fn test_dwell_game_left_right_left_right() {
    let mut session = GameSession::new(EngineConfig::default(), words(16)).unwrap();
    let mut all = session.announce();
    let mut t = 0;
    for value in [-0.2, 0.2, -0.2, 0.2] {
        let (events, next) = hold(&mut session, t, value);
        all.extend(events);
        t = next;
    }

    assert_eq!(
        commits(&all),
        vec![
            (0, Direction::Left, false),
            (1, Direction::Right, false),
            (2, Direction::Left, false),
            (3, Direction::Right, false),
        ]
    );
    assert_eq!(selected(&all), Some(("w10".to_string(), false)));
    assert_eq!(session.winning_word(), Some("w10"));
    assert!(session.is_finished());
}

#[test]
fn test_stalled_source_is_not_hold_time() {
    let mut session = GameSession::new(EngineConfig::default(), words(16)).unwrap();
    let mut all = Vec::new();
    all.extend(session.on_sample(Some(Sample::offset(0, -0.3))));
    all.extend(session.on_sample(Some(Sample::offset(100, -0.3))));

    // ten seconds of silence, then the same direction again
    let events = session.on_sample(Some(Sample::offset(10_100, -0.3)));
    match events.as_slice() {
        [SessionEvent::Readout(r)] => {
            assert_eq!(r.phase, TimerPhase::Idle);
            assert_eq!(r.held_ms, 0);
            assert_eq!(r.reason, ReasonCode::R002_HOLD_RESET_STALE);
        }
        other => panic!("expected a cleared readout, got {:?}", other),
    }
    all.extend(events);

    // only post-gap hold counts toward the commit
    let mut t = 10_150;
    while t < 10_150 + STABLE_DURATION_MS {
        all.extend(session.on_sample(Some(Sample::offset(t, -0.3))));
        t += 50;
    }
    assert!(commits(&all).is_empty());
    assert!(session.readout().held_ms < STABLE_DURATION_MS);

    let events = session.on_sample(Some(Sample::offset(10_150 + STABLE_DURATION_MS, -0.3)));
    assert_eq!(commits(&events), vec![(0, Direction::Left, false)]);
}

#[test]
fn test_override_before_any_sample() {
    let mut session = GameSession::new(EngineConfig::default(), words(16)).unwrap();
    let events = session.choose_direction(Direction::Right, 0);

    match &events[0] {
        SessionEvent::Readout(r) => {
            assert_eq!(r.phase, TimerPhase::Committed);
            assert_eq!(r.highlighted, Some(Direction::Right));
            assert_eq!(r.held_ms, STABLE_DURATION_MS);
            assert_eq!(r.reason, ReasonCode::R003_COMMIT_MANUAL);
        }
        other => panic!("expected readout, got {:?}", other),
    }
    assert_eq!(commits(&events), vec![(0, Direction::Right, true)]);
    assert_eq!(session.round().map(|r| r.round_index), Some(1));
}

#[test]
fn test_oscillating_burst_never_commits() {
    let mut session = GameSession::new(EngineConfig::default(), words(16)).unwrap();
    let mut max_held = 0;
    for i in 0..500u64 {
        let value = if i % 2 == 0 { 0.3 } else { -0.3 };
        for event in session.on_sample(Some(Sample::offset(i * 20, value))) {
            match event {
                SessionEvent::Readout(r) => max_held = max_held.max(r.held_ms),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
    assert!(max_held <= 20);
    assert_eq!(session.round().map(|r| r.round_index), Some(0));
}

#[test]
fn test_one_commit_per_round() {
    let mut session = GameSession::new(EngineConfig::default(), words(16)).unwrap();
    let (events, _) = hold(&mut session, 0, 0.5);
    // the hold carries on past the commit into the next round, which starts fresh
    assert_eq!(commits(&events).len(), 1);
    assert_eq!(session.round().map(|r| r.round_index), Some(1));
    assert!(session.readout().held_ms < STABLE_DURATION_MS);
}

#[test]
fn test_round_cap_flags_forced_selection() {
    let config = EngineConfig { quadrant_schedule: vec![QuadrantCount::Four], ..EngineConfig::default() };
    let mut session = GameSession::with_tie_break(
        config,
        words(16),
        Box::new(RandomCandidate::new(StdRng::seed_from_u64(5))),
    )
    .unwrap();
    let events = session.choose_direction(Direction::Left, 10);
    let (word, forced) = selected(&events).unwrap();
    assert!(forced);
    assert!(["w00", "w01", "w02", "w03", "w08", "w09", "w10", "w11"].contains(&word.as_str()));
}

#[test]
fn test_replayed_trace_selects_word() {
    let trace = "\
# round 1: look left
0    offset -0.3
500  offset -0.3
1000 offset -0.3
1500 offset -0.3
1750 none
2000 offset -0.3
2500 offset -0.3
3000 offset -0.3
# round 2: button press
3100 choose right
# round 3: head pose, nose left of the eye midpoint
3200 head 0.47 0.40 0.60
3700 head 0.47 0.40 0.60
4200 head 0.47 0.40 0.60
4700 head 0.47 0.40 0.60
5200 head 0.47 0.40 0.60
5700 head 0.47 0.40 0.60
6200 head 0.47 0.40 0.60
# round 4
6300 choose r
";
    let events = parse_trace(trace).unwrap();
    let mut session = GameSession::new(EngineConfig::default(), words(16)).unwrap();
    let out = replay(&mut session, &events);

    assert_eq!(
        commits(&out),
        vec![
            (0, Direction::Left, false),
            (1, Direction::Right, true),
            (2, Direction::Left, false),
            (3, Direction::Right, true),
        ]
    );
    assert_eq!(session.winning_word(), Some("w10"));
}

#[test]
fn test_gaze_session_tracks_sweep() {
    let mut session = GameSession::new(EngineConfig::gaze(), words(16)).unwrap();
    // steady look at the centre, then a jump to the right
    for i in 0..10u64 {
        session.on_sample(Some(Sample::gaze(i * 100, 400.0)));
    }
    let events = session.on_sample(Some(Sample::gaze(1000, 700.0)));
    match events.as_slice() {
        [SessionEvent::Readout(r)] => assert_eq!(r.highlighted, Some(Direction::Right)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_bad_trace_line_is_reported() {
    match parse_trace("0 offset 0.1\n10 head 1 2\n") {
        Err(Error::Replay { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected replay error, got {:?}", other),
    }
}

#[test]
fn test_demo_trace_plays_through() {
    let events = parse_trace(include_str!("../demos/left_right.trace")).unwrap();
    let mut session = GameSession::new(EngineConfig::default(), words(16)).unwrap();
    let out = replay(&mut session, &events);
    assert_eq!(commits(&out).len(), 4);
    assert_eq!(selected(&out), Some(("w10".to_string(), false)));
}
