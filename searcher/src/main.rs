use anyhow::Result;
use clap::Parser;
use engine::persist::load_index;
use searcher::run_loop;
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index file path
    #[arg(long, default_value = "./documents.index")]
    index: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let index = load_index(&args.index)?;
    tracing::info!(index = %args.index, "index ready");

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_loop(&index, stdin.lock(), stdout.lock())
}
