// file: src/lifecycle/poll.rs
// version: 1.0.0
// guid: 8d2f6a13-e4c7-4b09-a15d-3c7e0b9f28a6

//! Bounded fixed-interval reachability poll

use crate::config::NetworkWaitConfig;
use crate::error::ProvisionError;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info};

/// A single reachability check
#[async_trait::async_trait]
pub trait Probe: Send {
    async fn probe(&mut self) -> Result<bool>;
}

/// Probes at a fixed interval for a fixed number of attempts.
///
/// The first probe runs immediately, and nothing sleeps after the last one,
/// so the worst case waits `(attempts - 1) * interval` plus probe time.
#[derive(Debug, Clone)]
pub struct ReachabilityPoll {
    attempts: u32,
    interval: Duration,
    show_progress: bool,
}

impl ReachabilityPoll {
    pub const DEFAULT_ATTEMPTS: u32 = 30;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts,
            interval,
            show_progress: false,
        }
    }

    pub fn from_config(config: &NetworkWaitConfig) -> Self {
        Self::new(config.attempts, Duration::from_secs(config.interval_secs))
    }

    /// Show a spinner while waiting
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Nominal wait window, `attempts * interval`
    pub fn window(&self) -> Duration {
        self.interval * self.attempts
    }

    /// Probe until the first success.
    ///
    /// Returns the 1-based attempt that succeeded, or a network error once
    /// `attempts` probes have failed. Probe transport errors abort the wait.
    pub async fn wait<P: Probe + ?Sized>(&self, probe: &mut P) -> Result<u32> {
        let bar = self.progress_bar();

        for attempt in 1..=self.attempts {
            bar.set_message(format!(
                "Waiting for network (attempt {}/{})",
                attempt, self.attempts
            ));
            bar.tick();

            let reachable = match probe.probe().await {
                Ok(reachable) => reachable,
                Err(e) => {
                    bar.finish_and_clear();
                    return Err(e);
                }
            };

            if reachable {
                bar.finish_and_clear();
                info!("Network reachable after {} attempt(s)", attempt);
                return Ok(attempt);
            }

            debug!("Reachability probe {}/{} failed", attempt, self.attempts);
            if attempt < self.attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        bar.finish_and_clear();
        Err(ProvisionError::network(format!(
            "Container did not become reachable after {} attempts ({}s window)",
            self.attempts,
            self.window().as_secs()
        )))
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

impl Default for ReachabilityPoll {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}
