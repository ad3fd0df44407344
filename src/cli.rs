use clap::Parser;

use crate::config::AppConfig;

/// Ping a host by timing TCP handshakes. Stop with Ctrl-C.
#[derive(Parser, Debug, Clone)]
#[command(name = "tcping", version, arg_required_else_help = true)]
pub struct CliOpt {
    /// Domain name or IP address to probe
    pub domain: String,

    /// TCP port to connect to (defaults to 443 or the configured port)
    pub port: Option<u16>,

    /// Milliseconds between probes
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,

    /// Milliseconds to wait for each connection. The first Ctrl-C lets the
    /// current connection finish; a second one exits immediately
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Store the port, interval and timeout of this run as the new defaults
    #[arg(long)]
    pub save_defaults: bool,
}

impl CliOpt {
    /// Applies the flags given on the command line over the stored defaults.
    pub fn merge(&self, mut config: AppConfig) -> AppConfig {
        if let Some(port) = self.port {
            config.default_port = port;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        config
    }
}
