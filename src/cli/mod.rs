use std::{error::Error, path::PathBuf};

use clap::Parser;

use crate::{
    config::{self, InterpreterConfig, PositionMapping},
    interpreter::{delegate::ChannelDelegate, event::TouchEvent},
    replay::Trace,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a recorded touchscreen trace", long_about = None)]
pub struct Args {
    /// Path to the YAML trace to replay
    pub trace: PathBuf,

    /// Interpreter configuration file (defaults to the user or system config)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Forward width, height and azimuth of each contact
    #[arg(long)]
    pub touch_size: bool,

    /// Map positions without adding back the logical minimum
    #[arg(long)]
    pub normalized: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Load the interpreter configuration and apply command line overrides
fn load_config(args: &Args) -> Result<InterpreterConfig, Box<dyn Error>> {
    let path = args.config.clone().or_else(config::path::get_config_path);
    let mut config = match path {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            InterpreterConfig::from_yaml_file(&path)?
        }
        None => InterpreterConfig::default(),
    };

    if args.touch_size {
        config.report_touch_size = true;
    }
    if args.normalized {
        config.position_mapping = PositionMapping::Normalized;
    }

    Ok(config)
}

pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args)?;
    let trace = Trace::from_yaml_file(&args.trace)?;
    log::info!(
        "Replaying {} events from {}",
        trace.events.len(),
        args.trace.display()
    );

    // Run the interpreter on a blocking task and print events as they arrive
    let (delegate, mut rx) = ChannelDelegate::channel();
    let task = tokio::task::spawn_blocking(move || trace.run(config, delegate).map(|_| ()));

    let mut frames = 0;
    while let Some(event) = rx.recv().await {
        if event == TouchEvent::FrameProcessed {
            frames += 1;
        }
        println!("{event}");
    }

    task.await??;
    log::info!("Replay finished after {frames} frames");

    Ok(())
}
