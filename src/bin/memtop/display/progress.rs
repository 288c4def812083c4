use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

/// Numbered pipeline stages reported on stderr.
///
/// In interactive mode each stage shows a spinner that is replaced by a
/// timed check line; otherwise stages only go to the log.
pub struct Progress {
    spinner: Option<ProgressBar>,
    interactive: bool,
    current: u8,
    total: u8,
    started: Instant,
    stage_started: Instant,
}

impl Progress {
    pub fn new(interactive: bool, total: u8) -> Self {
        let now = Instant::now();
        Self {
            spinner: None,
            interactive,
            current: 0,
            total,
            started: now,
            stage_started: now,
        }
    }

    pub fn step(&mut self, stage: &str) {
        self.clear_spinner();
        self.current += 1;
        self.stage_started = Instant::now();
        log::info!("[{}/{}] {stage}", self.current, self.total);

        if self.interactive {
            self.spinner = Some(spinner(format!("[{}/{}] {stage}...", self.current, self.total)));
        }
    }

    pub fn complete_step(&mut self, stage: &str, details: &[&str]) {
        self.clear_spinner();
        for detail in details {
            log::debug!("{stage}: {detail}");
        }
        if !self.interactive {
            return;
        }

        let mut stderr = io::stderr().lock();
        let seconds = self.stage_started.elapsed().as_secs_f64();
        let _ = writeln!(stderr, "  \x1b[32m✓\x1b[0m {stage:<44} {seconds:>5.1}s");
        for detail in details {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {detail}");
        }
    }

    pub fn finish(mut self) {
        self.clear_spinner();
        if self.interactive {
            print_summary(self.started.elapsed());
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.magenta} {msg} {elapsed:.dim}") {
        bar.set_style(style.tick_chars(TICKS));
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn print_summary(elapsed: Duration) {
    let total = format!("{:.2}s", elapsed.as_secs_f64());
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "\n  \x1b[2m{}\x1b[0m\n", "─".repeat(56));
    let _ = writeln!(stderr, "  \x1b[32m✓\x1b[0m Done {total:>50}\n");
}
