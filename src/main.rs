use anyhow::{Context, anyhow};
use clap::Parser;
use tcping::cli::CliOpt;
use tcping::{AppConfig, Cancellation, ConsoleReporter, ProbeLoop};

/// Exit status after a second Ctrl-C, as a shell reports SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opt = CliOpt::parse();
    let config = opt.merge(AppConfig::load());
    if opt.save_defaults {
        config
            .save()
            .map_err(|e| anyhow!("failed to save defaults: {e}"))?;
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio")?;

    rt.block_on(run(opt, config))
}

async fn run(opt: CliOpt, config: AppConfig) -> anyhow::Result<()> {
    let (cancellation, token) = Cancellation::new();
    tokio::spawn(async move {
        match cancellation.cancel_on_interrupt(tokio::signal::ctrl_c).await {
            Ok(()) => {
                log::warn!("interrupted again, aborting in-flight probe");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            Err(e) => log::error!("failed to listen for Ctrl-C: {e}"),
        }
    });

    let mut probe_loop = ProbeLoop::resolve(&opt.domain, &config, ConsoleReporter::stdout())
        .await
        .with_context(|| format!("cannot resolve {}", opt.domain))?;
    probe_loop.run(token).await?;

    Ok(())
}
