//! Trace replay: a recorded sample stream as plain text
//!
//! One event per line, `#` starts a comment:
//!
//! ```text
//! 0    head 0.52 0.40 0.60
//! 33   gaze 412.5
//! 66   offset -0.12
//! 99   none
//! 120  choose left
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::core::session::GameSession;
use crate::types::{Direction, Sample, SessionEvent};
use crate::Error;

lazy_static! {
    static ref RE_HEAD: Regex = Regex::new(
        r"(?i)^(\d+)\s+head\s+(\S+)\s+(\S+)\s+(\S+)$"
    ).unwrap();

    static ref RE_GAZE: Regex = Regex::new(r"(?i)^(\d+)\s+gaze\s+(\S+)$").unwrap();

    static ref RE_OFFSET: Regex = Regex::new(r"(?i)^(\d+)\s+offset\s+(\S+)$").unwrap();

    static ref RE_CHOOSE: Regex = Regex::new(r"(?i)^(\d+)\s+choose\s+(\S+)$").unwrap();

    static ref RE_NONE: Regex = Regex::new(r"(?i)^(\d+)\s+none$").unwrap();
}

/// One line of a trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Payload delivered by the signal source
    Sample(Sample),
    /// Source fired with nothing to report
    Absent { timestamp_ms: u64 },
    /// Manual override
    Choose { timestamp_ms: u64, direction: Direction },
}

impl TraceEvent {
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            TraceEvent::Sample(s) => s.timestamp_ms,
            TraceEvent::Absent { timestamp_ms } | TraceEvent::Choose { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}

fn number(raw: &str, what: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("{} is not a number: {:?}", what, raw))
}

fn timestamp(raw: &str) -> Result<u64, String> {
    raw.parse::<u64>()
        .map_err(|_| format!("timestamp out of range: {}", raw))
}

/// Parse one line. Blank lines and comments give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<TraceEvent>, String> {
    let line = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
    .trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(c) = RE_HEAD.captures(line) {
        let t = timestamp(&c[1])?;
        let nose = number(&c[2], "nose_x")?;
        let left = number(&c[3], "left_eye_x")?;
        let right = number(&c[4], "right_eye_x")?;
        return Ok(Some(TraceEvent::Sample(Sample::head_pose(t, nose, left, right))));
    }
    if let Some(c) = RE_GAZE.captures(line) {
        let t = timestamp(&c[1])?;
        return Ok(Some(TraceEvent::Sample(Sample::gaze(t, number(&c[2], "x")?))));
    }
    if let Some(c) = RE_OFFSET.captures(line) {
        let t = timestamp(&c[1])?;
        return Ok(Some(TraceEvent::Sample(Sample::offset(t, number(&c[2], "offset")?))));
    }
    if let Some(c) = RE_CHOOSE.captures(line) {
        let timestamp_ms = timestamp(&c[1])?;
        let direction = Direction::parse(&c[2])
            .ok_or_else(|| format!("unknown direction: {:?}", &c[2]))?;
        return Ok(Some(TraceEvent::Choose { timestamp_ms, direction }));
    }
    if let Some(c) = RE_NONE.captures(line) {
        return Ok(Some(TraceEvent::Absent { timestamp_ms: timestamp(&c[1])? }));
    }

    Err(format!("unrecognized event: {:?}", line))
}

/// Parse a whole trace, reporting the first bad line (1-based)
pub fn parse_trace(text: &str) -> crate::Result<Vec<TraceEvent>> {
    let mut events = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(reason) => return Err(Error::Replay { line: i + 1, reason }),
        }
    }
    Ok(events)
}

/// Feed one trace event into `session`
pub fn apply(session: &mut GameSession, event: &TraceEvent) -> Vec<SessionEvent> {
    match *event {
        TraceEvent::Sample(sample) => session.on_sample(Some(sample)),
        TraceEvent::Absent { .. } => session.on_sample(None),
        TraceEvent::Choose { timestamp_ms, direction } => session.choose_direction(direction, timestamp_ms),
    }
}

/// Run a parsed trace through `session`, collecting everything it emits
pub fn replay(session: &mut GameSession, events: &[TraceEvent]) -> Vec<SessionEvent> {
    events.iter().flat_map(|e| apply(session, e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head() {
        let e = parse_line("120 head 0.55 0.40 0.60").unwrap().unwrap();
        assert_eq!(e, TraceEvent::Sample(Sample::head_pose(120, 0.55, 0.40, 0.60)));
    }

    #[test]
    fn test_parse_choose_case_insensitive() {
        let e = parse_line("  7 CHOOSE Right  ").unwrap().unwrap();
        assert_eq!(e, TraceEvent::Choose { timestamp_ms: 7, direction: Direction::Right });
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   # just a note").unwrap(), None);
        let e = parse_line("5 offset -0.2 # leaning left").unwrap().unwrap();
        assert_eq!(e, TraceEvent::Sample(Sample::offset(5, -0.2)));
    }

    #[test]
    fn test_bad_number_rejected() {
        assert!(parse_line("5 gaze abc").is_err());
        assert!(parse_line("5 choose up").is_err());
        assert!(parse_line("-5 none").is_err());
        assert!(parse_line("hello").is_err());
    }

    #[test]
    fn test_parse_trace_reports_line() {
        let text = "0 none\n# comment\n10 offset 0.1\n20 wobble\n";
        match parse_trace(text) {
            Err(Error::Replay { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected replay error, got {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_accessor() {
        let events = parse_trace("1 none\n2 gaze 3.5\n3 choose l").unwrap();
        let ts: Vec<u64> = events.iter().map(|e| e.timestamp_ms()).collect();
        assert_eq!(ts, vec![1, 2, 3]);
    }
}
