use alerting_console::{Args, config, console::Console, metrics};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Setup metrics
    let metrics = metrics::register_metrics()?;

    // Parse config
    let args = Args::parse();
    let config = config::Config::from_file(&args.config)?;

    let console = Console::new(config)?;
    let result = console.run(args.command).await;

    if args.metrics {
        eprint!("{}", metrics.render());
    }

    result
}
