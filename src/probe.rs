use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};

use crate::browser::{BrowserError, BrowserSession};
use crate::models::Locator;

/// What a single probe call concluded about the target control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The control was found and clicked.
    Activated { attempts: u32 },
    /// The control never showed up within the attempt budget.
    Absent { attempts: u32 },
    /// The page misbehaved in some other way; availability is unknown.
    Faulted { attempts: u32, error: BrowserError },
}

impl ProbeOutcome {
    pub fn is_activated(&self) -> bool {
        matches!(self, ProbeOutcome::Activated { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ProbeOutcome::Activated { attempts }
            | ProbeOutcome::Absent { attempts }
            | ProbeOutcome::Faulted { attempts, .. } => *attempts,
        }
    }
}

/// Clicks a page control with bounded retry.
///
/// Only [`BrowserError::ElementNotFound`] is retried, after a fixed delay. Any
/// other browser fault ends the call as [`ProbeOutcome::Faulted`]. No outcome is
/// ever returned as an error, so one flaky page cannot abort a whole pass.
#[derive(Debug, Clone)]
pub struct AvailabilityProbe {
    retry_delay: Duration,
}

impl AvailabilityProbe {
    pub fn new(retry_delay: Duration) -> Self {
        Self { retry_delay }
    }

    pub async fn attempt(
        &self,
        session: &dyn BrowserSession,
        locator: &Locator,
        max_attempts: u32,
    ) -> ProbeOutcome {
        if max_attempts == 0 {
            return ProbeOutcome::Absent { attempts: 0 };
        }

        let mut attempts = 0u32;
        let strategy = FixedInterval::new(self.retry_delay).take(max_attempts as usize - 1);
        let result = RetryIf::spawn(
            strategy,
            || {
                attempts += 1;
                debug!("Clicking {} (attempt {}/{})", locator, attempts, max_attempts);
                session.click(locator)
            },
            |e: &BrowserError| e.is_not_found(),
        )
        .await;

        match result {
            Ok(()) => ProbeOutcome::Activated { attempts },
            Err(e) if e.is_not_found() => {
                debug!("{} not found after {} attempts", locator, attempts);
                ProbeOutcome::Absent { attempts }
            }
            Err(e) => {
                warn!("Giving up on {} after unexpected browser error: {}", locator, e);
                ProbeOutcome::Faulted { attempts, error: e }
            }
        }
    }
}
