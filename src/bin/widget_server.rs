use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use next_best_step::{logging, Config, Variant};

/// MCP server for the next-best-step ChatGPT widget
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding next-best-step.html (overrides ASSETS_DIR)
    #[arg(short, long)]
    assets_dir: Option<PathBuf>,

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

    let mut config = Config::from_env(Variant::Widget);
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.assets_dir {
        config.assets_dir = dir;
    }
    config.log_json |= args.log_json;

    logging::init_logging(args.verbose, config.log_json);

    next_best_step::run(config).await
}
