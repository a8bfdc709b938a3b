use std::time::Duration;

/// Polling cadence for blocking on backend-reported terminal status.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between status probes.
    pub interval: Duration,

    /// Wait ceiling per stack operation. Exceeding it is reported as a
    /// timeout, distinct from a backend-reported failure.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(60 * 60),
        }
    }
}
