use std::env;
use std::error::Error;

use clap::Parser;

use hidtouch::cli::{main_cli, Args};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    let log_level = if args.verbose {
        "debug".to_string()
    } else {
        log_level
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting hidtouch v{}", VERSION);

    if let Err(e) = main_cli(args).await {
        log::error!("Replay failed: {e}");
        return Err(e);
    }

    Ok(())
}
