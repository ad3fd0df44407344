use std::time::Duration;

use crate::error::ProbeError;

/// Outcome of a single TCP connect probe.
#[derive(Debug)]
pub enum ProbeResult {
    Success(Duration),
    Failure(ProbeError),
}

/// Running totals for a tcping session.
///
/// `min`, `max` and `sum` only ever see successful probes. `min` and `max`
/// stay unset until the first success arrives.
#[derive(Debug, Clone, Default)]
pub struct PingStatistics {
    sequence: u64,
    received: u64,
    sum: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
}

/// Round-trip figures over the successful probes of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RttSummary {
    pub min: Duration,
    pub avg: Duration,
    pub max: Duration,
}

/// Final report computed from [`PingStatistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub transmitted: u64,
    pub received: u64,
    pub loss_percent: u64,
    /// `None` when no probe succeeded.
    pub rtt: Option<RttSummary>,
}

impl PingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a probe attempt and returns its sequence number (starting at 1).
    pub fn record_attempt(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn record_success(&mut self, rtt: Duration) {
        self.received += 1;
        self.sum = self.sum.saturating_add(rtt);
        self.min = Some(self.min.map_or(rtt, |current| current.min(rtt)));
        self.max = Some(self.max.map_or(rtt, |current| current.max(rtt)));
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// Truncated to a whole percentage. Zero when nothing was sent.
    pub fn loss_percent(&self) -> u64 {
        if self.sequence == 0 {
            return 0;
        }
        (self.sequence - self.received) * 100 / self.sequence
    }

    pub fn mean_rtt(&self) -> Option<Duration> {
        if self.received == 0 {
            return None;
        }
        let nanos = self.sum.as_nanos() / u128::from(self.received);
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }

    pub fn summary(&self) -> Summary {
        let rtt = match (self.min, self.mean_rtt(), self.max) {
            (Some(min), Some(avg), Some(max)) => Some(RttSummary { min, avg, max }),
            _ => None,
        };

        Summary {
            transmitted: self.sequence,
            received: self.received,
            loss_percent: self.loss_percent(),
            rtt,
        }
    }
}
