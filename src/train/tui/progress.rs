//! Progress bar with Kalman-filtered ETA
//!
//! Reference: Welch, G., & Bishop, G. (1995). "An Introduction to the Kalman Filter."

use std::time::Instant;

/// Scalar Kalman filter over the per-step duration
#[derive(Debug, Clone)]
pub struct KalmanEta {
    /// Estimated seconds per step
    estimate: f64,
    error_cov: f64,
    process_noise: f64,
    measurement_noise: f64,
}

impl Default for KalmanEta {
    fn default() -> Self {
        Self {
            estimate: 1.0,
            error_cov: 1.0,
            process_noise: 0.01,
            measurement_noise: 0.1,
        }
    }
}

impl KalmanEta {
    /// Create a filter with a one-second prior
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one measured step duration
    pub fn update(&mut self, seconds_per_step: f64) {
        let predicted_error = self.error_cov + self.process_noise;
        let gain = predicted_error / (predicted_error + self.measurement_noise);
        self.estimate += gain * (seconds_per_step - self.estimate);
        self.error_cov = (1.0 - gain) * predicted_error;
    }

    /// Estimated seconds for `remaining` steps
    pub fn eta_seconds(&self, remaining: usize) -> f64 {
        self.estimate * remaining as f64
    }
}

/// Format a duration in seconds as `42s`, `3m 07s` or `2h 05m`
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{secs:.0}s")
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let s = (secs % 60.0).floor();
        format!("{mins}m {s:02.0}s")
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs % 3600.0) / 60.0).floor();
        format!("{hours}h {mins:02.0}m")
    }
}

/// Text progress bar over the batches of one pass
#[derive(Debug, Clone)]
pub struct ProgressBar {
    total: usize,
    position: usize,
    width: usize,
    comment: String,
    eta: KalmanEta,
    last_update: Option<Instant>,
}

impl ProgressBar {
    /// Create a bar for `total` steps, `width` characters wide
    pub fn new(total: usize, width: usize) -> Self {
        Self {
            total,
            position: 0,
            width,
            comment: String::new(),
            eta: KalmanEta::new(),
            last_update: None,
        }
    }

    /// Move to `position` completed steps
    pub fn update(&mut self, position: usize) {
        let now = Instant::now();
        if let Some(last) = self.last_update {
            let steps = position.saturating_sub(self.position);
            if steps > 0 {
                self.eta.update(now.duration_since(last).as_secs_f64() / steps as f64);
            }
        }
        self.position = position;
        self.last_update = Some(now);
    }

    /// Text shown after the ETA
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Completed steps
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total steps
    pub fn total(&self) -> usize {
        self.total
    }

    /// Completion in percent
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.position.min(self.total) as f32 / self.total as f32) * 100.0
    }

    /// Render as `[███░░] 60.0% │ 3/5 │ ETA: 2s │ comment`
    pub fn render(&self) -> String {
        let percent = self.percent();
        let filled = ((percent / 100.0) * self.width as f32).round() as usize;
        let bar: String = std::iter::repeat_n('█', filled)
            .chain(std::iter::repeat_n('░', self.width.saturating_sub(filled)))
            .collect();
        let eta = format_duration(self.eta.eta_seconds(self.total.saturating_sub(self.position)));

        let mut line = format!(
            "[{bar}] {percent:>5.1}% │ {}/{} │ ETA: {eta}",
            self.position, self.total
        );
        if !self.comment.is_empty() {
            line.push_str(" │ ");
            line.push_str(&self.comment);
        }
        line
    }
}
