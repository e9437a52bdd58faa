//! Console reporter: narration through `log`, progress as a single
//! redrawn stderr line.

use std::io::Write;

use sheetmerge_merge::events::{LogEvent, Phase, ProgressEvent};
use sheetmerge_merge::{LogReporter, Reporter};

/// Redraw at most this many times per phase.
const STEPS: usize = 100;

pub struct ConsoleReporter {
    draw: bool,
    logs: LogReporter,
    line_open: bool,
}

impl ConsoleReporter {
    /// Progress is drawn only when stderr is a terminal and `quiet` is off.
    pub fn new(quiet: bool) -> Self {
        Self::with_progress(!quiet && atty::is(atty::Stream::Stderr))
    }

    pub fn with_progress(draw: bool) -> Self {
        Self { draw, logs: LogReporter, line_open: false }
    }

    /// Terminate a progress line left open by an aborted phase.
    pub fn finish(&mut self) {
        if self.line_open {
            eprintln!();
            self.line_open = false;
        }
    }
}

/// Whether `current` is on a redraw boundary: every 1% of `total`, and the
/// last row.
pub fn should_draw(current: usize, total: usize) -> bool {
    let step = (total / STEPS).max(1);
    current == total || current % step == 0
}

fn render(event: &ProgressEvent) -> String {
    let label = match event.phase {
        Phase::Match => "Matching",
        Phase::Merge => "Merging",
    };
    let pct = if event.total == 0 { 100 } else { event.current * 100 / event.total };
    match event.matched {
        Some(matched) => format!(
            "{label}: {}/{} rows ({pct}%) | matched: {matched}",
            event.current, event.total
        ),
        None => format!("{label}: {}/{} rows ({pct}%)", event.current, event.total),
    }
}

impl Reporter for ConsoleReporter {
    fn progress(&mut self, event: ProgressEvent) {
        if !self.draw || !should_draw(event.current, event.total) {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}", render(&event));
        if event.current == event.total {
            let _ = writeln!(err);
            self.line_open = false;
        } else {
            self.line_open = true;
        }
        let _ = err.flush();
    }

    fn log(&mut self, event: LogEvent) {
        self.finish();
        self.logs.log(event);
    }
}
