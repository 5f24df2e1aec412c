//! Progress indicators for profiling runs
//!
//! A run shows a spinner while the manifest is fetched, then a bar advancing
//! once per finished component. Outcome lines are printed through the bar so
//! they do not tear its redraws.
//!
//! # Environment Variables
//!
//! - `RENDER_PROFILE_NO_PROGRESS`: Set to any value to disable all progress indicators
//!
//! # Examples
//!
//! ```rust
//! use render_profiler::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new(3, true);
//! progress.set_message("Profiling components");
//! for _ in 0..3 {
//!     progress.inc(1);
//! }
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Checks if progress bars are disabled through the environment.
fn is_progress_disabled() -> bool {
    std::env::var("RENDER_PROFILE_NO_PROGRESS").is_ok()
}

/// A progress bar with consistent styling that may be hidden.
#[derive(Clone, Debug)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// A bar over `len` steps, hidden when `enabled` is false or progress is
    /// disabled through the environment.
    pub fn new(len: u64, enabled: bool) -> Self {
        let bar = if !enabled || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// A spinner for work of unknown length.
    pub fn new_spinner(enabled: bool) -> Self {
        let bar = if !enabled || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Sets the message displayed alongside the bar.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Advances the bar by `delta` steps.
    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Runs `f` with the bar temporarily cleared, for printing output.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.inner.suspend(f)
    }

    /// Removes the bar from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Whether the bar draws anything.
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

fn default_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
