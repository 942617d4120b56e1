use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::{Duration, Instant};

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg} ({elapsed})";
const FINISH_TEMPLATE: &str = "{msg}";
const STEADY_TICK_MS: u64 = 100;

/// Elapsed-time spinner for a single running query. A disabled spinner
/// draws nothing.
pub struct Spinner {
    bar: Option<ProgressBar>,
    started: Instant,
}

impl Spinner {
    /// Only draws when `enabled` and stderr, where indicatif draws, is a terminal
    pub fn start(enabled: bool, message: &str) -> Self {
        let bar = (enabled && std::io::stderr().is_terminal()).then(ProgressBar::new_spinner);
        Self::with_bar(bar, message)
    }

    fn with_bar(bar: Option<ProgressBar>, message: &str) -> Self {
        if let Some(bar) = &bar {
            let style = ProgressStyle::default_spinner()
                .template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["|", "/", "-", "\\", " "]);
            bar.set_style(style);
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(STEADY_TICK_MS));
        }

        Self {
            bar,
            started: Instant::now(),
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.bar.is_some()
    }

    /// Replaces the spinner line with `Complete (x.xs)`
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            if let Ok(style) = ProgressStyle::default_spinner().template(FINISH_TEMPLATE) {
                bar.set_style(style);
            }
            bar.finish_with_message(finish_message(self.started.elapsed()));
        }
    }
}

fn finish_message(elapsed: Duration) -> String {
    format!("Complete ({:.1}s)", elapsed.as_secs_f64())
}
