pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod ping;
pub mod probe_loop;
pub mod prober;
pub mod reporter;
pub mod resolve;

pub use cancel::{CancelToken, Cancellation};
pub use config::AppConfig;
pub use error::{ProbeError, ResolveError, TcpingError};
pub use ping::{PingStatistics, ProbeResult, RttSummary, Summary};
pub use probe_loop::{LoopState, ProbeLoop};
pub use prober::{Prober, TcpProber};
pub use reporter::{ConsoleReporter, Reporter};
pub use resolve::{Target, resolve_target};
