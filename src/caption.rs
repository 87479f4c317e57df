use std::time::{Duration, Instant};

const TYPE_DELAY: Duration = Duration::from_millis(100);
const DELETE_DELAY: Duration = Duration::from_millis(50);
const HOLD_DELAY: Duration = Duration::from_millis(2000);
const NEXT_LINE_DELAY: Duration = Duration::from_millis(500);
pub(crate) const START_DELAY: Duration = Duration::from_millis(1000);

/// Types a line out, holds it, deletes it, moves on to the next one.
#[derive(Clone, Debug)]
pub(crate) struct Typewriter {
    lines: Vec<Vec<char>>,
    line: usize,
    shown: usize,
    deleting: bool,
    next_at: Instant,
}

impl Typewriter {
    /// `None` when there is nothing to type.
    pub(crate) fn new<S: AsRef<str>>(lines: &[S], now: Instant) -> Option<Self> {
        let lines: Vec<Vec<char>> = lines
            .iter()
            .map(|l| l.as_ref().chars().collect::<Vec<_>>())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return None;
        }
        Some(Self {
            lines,
            line: 0,
            shown: 0,
            deleting: false,
            next_at: now + START_DELAY,
        })
    }

    /// One keystroke; returns the pause before the next one.
    pub(crate) fn step(&mut self) -> Duration {
        let len = self.lines[self.line].len();
        let mut delay;

        if self.deleting {
            self.shown = self.shown.saturating_sub(1);
            delay = DELETE_DELAY;
        } else {
            self.shown = (self.shown + 1).min(len);
            delay = TYPE_DELAY;
        }

        if !self.deleting && self.shown == len {
            delay = HOLD_DELAY;
            self.deleting = true;
        } else if self.deleting && self.shown == 0 {
            self.deleting = false;
            self.line = (self.line + 1) % self.lines.len();
            delay = NEXT_LINE_DELAY;
        }

        delay
    }

    /// Runs every step that is due by `now`.
    pub(crate) fn advance(&mut self, now: Instant) {
        while now >= self.next_at {
            let delay = self.step();
            self.next_at += delay;
        }
    }

    pub(crate) fn text(&self) -> String {
        self.lines[self.line][..self.shown].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lines_no_caption() {
        let empty: [&str; 0] = [];
        assert!(Typewriter::new(&empty, Instant::now()).is_none());
        assert!(Typewriter::new(&["", ""], Instant::now()).is_none());
    }

    #[test]
    fn test_types_holds_deletes_and_moves_on() {
        let mut tw = Typewriter::new(&["ab", "", "xyz"], Instant::now()).unwrap();

        assert_eq!(tw.step(), TYPE_DELAY);
        assert_eq!(tw.text(), "a");
        assert_eq!(tw.step(), HOLD_DELAY);
        assert_eq!(tw.text(), "ab");

        assert_eq!(tw.step(), DELETE_DELAY);
        assert_eq!(tw.text(), "a");
        assert_eq!(tw.step(), NEXT_LINE_DELAY);
        assert_eq!(tw.text(), "");

        assert_eq!(tw.step(), TYPE_DELAY);
        assert_eq!(tw.text(), "x");
    }

    #[test]
    fn test_wraps_to_first_line() {
        let mut tw = Typewriter::new(&["q"], Instant::now()).unwrap();
        assert_eq!(tw.step(), HOLD_DELAY);
        assert_eq!(tw.step(), NEXT_LINE_DELAY);
        assert_eq!(tw.step(), HOLD_DELAY);
        assert_eq!(tw.text(), "q");
    }

    #[test]
    fn test_advance_waits_for_start_delay() {
        let t0 = Instant::now();
        let mut tw = Typewriter::new(&["hello"], t0).unwrap();

        tw.advance(t0 + Duration::from_millis(999));
        assert_eq!(tw.text(), "");

        tw.advance(t0 + START_DELAY);
        assert_eq!(tw.text(), "h");

        tw.advance(t0 + START_DELAY + Duration::from_millis(250));
        assert_eq!(tw.text(), "hel");
    }

    #[test]
    fn test_multibyte_lines() {
        let mut tw = Typewriter::new(&["héllo"], Instant::now()).unwrap();
        tw.step();
        tw.step();
        assert_eq!(tw.text(), "hé");
    }
}
