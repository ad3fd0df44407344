use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::cancel::CancelToken;
use crate::config::AppConfig;
use crate::error::TcpingError;
use crate::ping::{PingStatistics, ProbeResult, Summary};
use crate::prober::{PROBE_TIMEOUT, Prober, TcpProber};
use crate::reporter::Reporter;
use crate::resolve::{Target, resolve_target};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopping,
    Terminated,
}

/// Probes one target at a fixed cadence until cancelled, then reports the
/// session summary.
///
/// Probes are issued serially. Cancellation is checked when a tick fires and
/// while waiting for the next one, but an in-flight probe is never
/// interrupted, so stopping takes at most one probe timeout.
pub struct ProbeLoop<P, R> {
    target: Target,
    prober: P,
    reporter: R,
    interval: Duration,
    timeout: Duration,
    stats: PingStatistics,
    state: LoopState,
}

impl<P: Prober, R: Reporter> ProbeLoop<P, R> {
    pub fn new(target: Target, prober: P, reporter: R) -> Self {
        Self {
            target,
            prober,
            reporter,
            interval: TICK_INTERVAL,
            timeout: PROBE_TIMEOUT,
            stats: PingStatistics::new(),
            state: LoopState::Running,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> &PingStatistics {
        &self.stats
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Runs until `cancel` fires. The first probe goes out one interval
    /// after start.
    pub async fn run(&mut self, mut cancel: CancelToken) -> Result<Summary, TcpingError> {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.state == LoopState::Running {
            tokio::select! {
                biased;
                () = cancel.cancelled() => self.stop("between ticks"),
                _ = ticker.tick() => {
                    if cancel.is_cancelled() {
                        self.stop("at tick");
                    } else {
                        self.tick().await?;
                    }
                }
            }
        }

        let summary = self.stats.summary();
        self.state = LoopState::Terminated;
        self.reporter.on_summary(&self.target.domain, &summary)?;
        Ok(summary)
    }

    fn stop(&mut self, checkpoint: &str) {
        log::debug!(
            "cancellation observed {checkpoint} after {} probes",
            self.stats.sequence()
        );
        self.state = LoopState::Stopping;
    }

    async fn tick(&mut self) -> Result<(), TcpingError> {
        let seq = self.stats.record_attempt();
        let domain = self.target.domain.as_str();
        let ip = self.target.ip();

        match self.prober.probe(self.target.addr, self.timeout).await {
            ProbeResult::Success(rtt) => {
                self.stats.record_success(rtt);
                self.reporter.on_success(domain, ip, seq, rtt)?;
            }
            ProbeResult::Failure(error) => {
                self.reporter.on_failure(domain, ip, &error)?;
            }
        }
        Ok(())
    }
}

impl<R: Reporter> ProbeLoop<TcpProber, R> {
    /// Resolves `domain` and sets up a TCP session with the configured port,
    /// interval and timeout. A failed lookup is fatal: there is nothing to
    /// probe.
    pub async fn resolve(
        domain: &str,
        config: &AppConfig,
        reporter: R,
    ) -> Result<Self, TcpingError> {
        let target = resolve_target(domain, config.default_port).await?;
        log::info!(
            "probing {target} port {} every {:?}",
            target.addr.port(),
            config.interval()
        );

        Ok(Self::new(target, TcpProber::new(), reporter)
            .with_interval(config.interval())
            .with_timeout(config.timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::Cancellation;
    use crate::error::{ProbeError, ResolveError};
    use std::collections::VecDeque;
    use std::io;
    use std::net::{IpAddr, SocketAddr};

    #[derive(Debug, PartialEq)]
    enum Event {
        Success(u64, Duration),
        Failure(String),
        Summary(Summary),
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<Event>,
    }

    impl Reporter for RecordingReporter {
        fn on_success(&mut self, _: &str, _: IpAddr, seq: u64, rtt: Duration) -> io::Result<()> {
            self.events.push(Event::Success(seq, rtt));
            Ok(())
        }

        fn on_failure(&mut self, _: &str, _: IpAddr, error: &ProbeError) -> io::Result<()> {
            self.events.push(Event::Failure(error.to_string()));
            Ok(())
        }

        fn on_summary(&mut self, _: &str, summary: &Summary) -> io::Result<()> {
            self.events.push(Event::Summary(*summary));
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Reporter for BrokenPipe {
        fn on_success(&mut self, _: &str, _: IpAddr, _: u64, _: Duration) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn on_failure(&mut self, _: &str, _: IpAddr, _: &ProbeError) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn on_summary(&mut self, _: &str, _: &Summary) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    /// Replays canned outcomes and cancels the session after the last one.
    struct ScriptedProber {
        outcomes: VecDeque<Option<Duration>>,
        cancellation: Cancellation,
    }

    impl ScriptedProber {
        fn new(outcomes: &[Option<u64>], cancellation: Cancellation) -> Self {
            Self {
                outcomes: outcomes
                    .iter()
                    .map(|o| o.map(Duration::from_millis))
                    .collect(),
                cancellation,
            }
        }
    }

    impl Prober for ScriptedProber {
        async fn probe(&mut self, target: SocketAddr, limit: Duration) -> ProbeResult {
            let outcome = self.outcomes.pop_front().flatten();
            if self.outcomes.is_empty() {
                self.cancellation.cancel();
            }
            match outcome {
                Some(rtt) => ProbeResult::Success(rtt),
                None => ProbeResult::Failure(ProbeError::Timeout {
                    addr: target,
                    timeout: limit,
                }),
            }
        }
    }

    fn target() -> Target {
        Target::new("example.com", "192.0.2.1:443".parse().unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn mixed_outcomes_are_folded_into_summary() {
        let (cancellation, token) = Cancellation::new();
        let prober = ScriptedProber::new(
            &[Some(10), Some(20), None, Some(5), Some(15)],
            cancellation,
        );
        let mut probe_loop = ProbeLoop::new(target(), prober, RecordingReporter::default());

        let summary = probe_loop.run(token).await.unwrap();
        assert_eq!(summary.transmitted, 5);
        assert_eq!(summary.received, 4);
        assert_eq!(summary.loss_percent, 20);
        let rtt = summary.rtt.unwrap();
        assert_eq!(rtt.min, Duration::from_millis(5));
        assert_eq!(rtt.max, Duration::from_millis(20));
        assert_eq!(rtt.avg, Duration::from_micros(12_500));

        let events = &probe_loop.reporter().events;
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], Event::Success(1, Duration::from_millis(10)));
        assert_eq!(events[1], Event::Success(2, Duration::from_millis(20)));
        assert!(matches!(events[2], Event::Failure(_)));
        assert_eq!(events[3], Event::Success(4, Duration::from_millis(5)));
        assert_eq!(events[5], Event::Summary(summary));
        assert_eq!(probe_loop.state(), LoopState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_target_reports_full_loss() {
        let (cancellation, token) = Cancellation::new();
        let prober = ScriptedProber::new(&[None, None, None], cancellation);
        let mut probe_loop = ProbeLoop::new(target(), prober, RecordingReporter::default());

        let summary = probe_loop.run(token).await.unwrap();
        assert_eq!(summary.transmitted, 3);
        assert_eq!(summary.received, 0);
        assert_eq!(summary.loss_percent, 100);
        assert_eq!(summary.rtt, None);

        let failures = probe_loop
            .reporter()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Failure(_)))
            .count();
        assert_eq!(failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_tick_sends_nothing() {
        let (cancellation, token) = Cancellation::new();
        let prober = ScriptedProber::new(&[Some(1)], cancellation.clone());
        let mut probe_loop = ProbeLoop::new(target(), prober, RecordingReporter::default());
        cancellation.cancel();

        let summary = probe_loop.run(token).await.unwrap();
        assert_eq!(summary.transmitted, 0);
        assert_eq!(summary.loss_percent, 0);
        assert_eq!(summary.rtt, None);
        assert_eq!(probe_loop.stats().sequence(), 0);
        assert_eq!(probe_loop.reporter().events, vec![Event::Summary(summary)]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_between_ticks_stops_without_waiting() {
        let (cancellation, token) = Cancellation::new();
        // Long script so the prober never cancels on its own.
        let prober = ScriptedProber::new(&[Some(3); 16], Cancellation::new().0);
        let mut probe_loop = ProbeLoop::new(target(), prober, RecordingReporter::default())
            .with_interval(Duration::from_secs(10));

        let start = Instant::now();
        let canceller = async {
            tokio::time::sleep(Duration::from_secs(15)).await;
            cancellation.cancel();
        };
        let (summary, ()) = tokio::join!(probe_loop.run(token), canceller);

        let summary = summary.unwrap();
        assert_eq!(summary.transmitted, 1);
        assert!(start.elapsed() < Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_the_interval() {
        let (cancellation, token) = Cancellation::new();
        let prober = ScriptedProber::new(&[Some(1), Some(1), Some(1)], cancellation);
        let mut probe_loop = ProbeLoop::new(target(), prober, RecordingReporter::default());

        let start = Instant::now();
        probe_loop.run(token).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= TICK_INTERVAL * 3);
        assert!(elapsed < TICK_INTERVAL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_ends_the_run() {
        let (cancellation, token) = Cancellation::new();
        let prober = ScriptedProber::new(&[Some(1), Some(1)], cancellation);
        let mut probe_loop = ProbeLoop::new(target(), prober, BrokenPipe);

        let result = probe_loop.run(token).await;
        assert!(matches!(result, Err(TcpingError::Output(_))));
    }

    #[tokio::test]
    async fn setup_applies_config() {
        let config = AppConfig {
            default_port: 8443,
            interval_ms: 250,
            timeout_ms: 400,
        };
        let probe_loop = ProbeLoop::resolve("127.0.0.1", &config, RecordingReporter::default())
            .await
            .unwrap();

        assert_eq!(probe_loop.target.addr, "127.0.0.1:8443".parse().unwrap());
        assert_eq!(probe_loop.interval, Duration::from_millis(250));
        assert_eq!(probe_loop.timeout, Duration::from_millis(400));
        assert_eq!(probe_loop.state(), LoopState::Running);
    }

    #[tokio::test]
    async fn setup_fails_on_bad_host() {
        let result =
            ProbeLoop::resolve("a/b", &AppConfig::default(), RecordingReporter::default()).await;

        let Err(err) = result else {
            panic!("expected resolution to fail");
        };
        assert!(matches!(err, TcpingError::Resolve(ResolveError::InvalidHost(_))));
    }
}
