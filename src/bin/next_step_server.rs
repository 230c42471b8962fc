use anyhow::Result;
use clap::Parser;

use next_best_step::{logging, Config, Variant};

/// MCP server for the `next_best_step` coaching tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env(Variant::NextStep);
    if let Some(port) = args.port {
        config.port = port;
    }
    config.log_json |= args.log_json;

    logging::init_logging(args.verbose, config.log_json);

    next_best_step::run(config).await
}
