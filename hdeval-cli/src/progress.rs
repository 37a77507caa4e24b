//! Terminal progress with elapsed and remaining time.

use hdeval::Progress;
use std::time::{Duration, Instant};

const REFRESH: Duration = Duration::from_secs(1);

/// Prints progress to stderr at most once per second.
#[derive(Debug)]
pub struct TimedProgress {
    started: Instant,
    last_print: Option<Instant>,
    total: u64,
}

impl TimedProgress {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_print: None,
            total: 0,
        }
    }
}

impl Default for TimedProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimated time left after `done` of `total` units took `elapsed`.
fn remaining(elapsed: Duration, done: u64, total: u64) -> Option<Duration> {
    if done == 0 || done > total {
        return None;
    }
    let per_unit = elapsed.as_secs_f64() / done as f64;
    Some(Duration::from_secs_f64(per_unit * (total - done) as f64))
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

impl Progress for TimedProgress {
    fn start(&mut self, total: u64) {
        self.started = Instant::now();
        self.last_print = None;
        self.total = total;
    }

    fn advance(&mut self, done: u64) {
        let now = Instant::now();
        if self.last_print.is_some_and(|last| now - last < REFRESH) {
            return;
        }
        self.last_print = Some(now);
        let elapsed = now - self.started;
        let percent = if self.total == 0 {
            100.0
        } else {
            100.0 * done as f64 / self.total as f64
        };
        let left = remaining(elapsed, done, self.total)
            .map(format_duration)
            .unwrap_or_else(|| "--:--:--".to_string());
        eprint!(
            "\r{percent:5.1}% done, {} elapsed, {left} remaining",
            format_duration(elapsed)
        );
    }

    fn finish(&mut self) {
        if self.last_print.is_some() {
            eprintln!(
                "\r100.0% done, {} elapsed                    ",
                format_duration(self.started.elapsed())
            );
        }
    }
}
