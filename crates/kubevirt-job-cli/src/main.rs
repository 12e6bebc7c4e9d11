use clap::{Parser, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "kubevirt-job",
    about = "Clear stale machine type pins on KubeVirt virtual machines",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<commands::Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    match cli.command {
        // The job image runs without arguments.
        None => commands::run::execute(commands::run::RunArgs::default()).await,
        Some(commands::Commands::Run(args)) => commands::run::execute(args).await,
        Some(commands::Commands::Validate) => commands::validate::execute(),
    }
}
