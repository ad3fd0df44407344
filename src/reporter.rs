use std::io::{self, Write};
use std::net::IpAddr;
use std::time::Duration;

use crate::error::ProbeError;
use crate::ping::Summary;

/// Receives the events of a tcping session and renders them.
pub trait Reporter {
    fn on_success(&mut self, domain: &str, ip: IpAddr, seq: u64, rtt: Duration) -> io::Result<()>;

    fn on_failure(&mut self, domain: &str, ip: IpAddr, error: &ProbeError) -> io::Result<()>;

    fn on_summary(&mut self, domain: &str, summary: &Summary) -> io::Result<()>;
}

/// Whole milliseconds, truncated.
pub fn format_duration(duration: Duration) -> String {
    format!("{} ms", duration.as_millis())
}

/// Ping-style plain text output, one line per probe.
pub struct ConsoleReporter<W> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_success(&mut self, domain: &str, ip: IpAddr, seq: u64, rtt: Duration) -> io::Result<()> {
        writeln!(
            self.out,
            "from {domain}({ip}): seq={seq} time={}",
            format_duration(rtt)
        )?;
        self.out.flush()
    }

    fn on_failure(&mut self, domain: &str, ip: IpAddr, error: &ProbeError) -> io::Result<()> {
        writeln!(self.out, "from {domain}({ip}): {error}")?;
        self.out.flush()
    }

    fn on_summary(&mut self, domain: &str, summary: &Summary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "--- {domain} tcping statistics ---")?;
        writeln!(
            self.out,
            "{} packets transmitted, {} received, {}% packet loss",
            summary.transmitted, summary.received, summary.loss_percent
        )?;
        match summary.rtt {
            Some(rtt) => writeln!(
                self.out,
                "rtt min/avg/max = {}/{}/{}",
                format_duration(rtt.min),
                format_duration(rtt.avg),
                format_duration(rtt.max)
            )?,
            None => writeln!(self.out, "rtt min/avg/max = n/a")?,
        }
        self.out.flush()
    }
}
