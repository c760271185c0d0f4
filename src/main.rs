use clap::Parser;
use simplelog::*;
use std::process::ExitCode;

#[macro_use]
extern crate log;

mod byte_range;
mod clapargs;
mod config;
mod error;
mod fetcher;
mod metadata;
mod s3agent;
mod tls;

use config::RunConfig;
use error::Result;
use s3agent::S3Agent;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command line args
    let args = clapargs::Args::parse();
    // Set up logging, stdout is reserved for the metadata and summary
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let bin_name = env!("CARGO_PKG_NAME");
    debug!("{} started, pid: {}", bin_name, std::process::id());

    match run(&args).await {
        Ok(bytes_read) => {
            debug!("{} finished, read {} bytes", bin_name, bytes_read);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &clapargs::Args) -> Result<usize> {
    // Everything is validated before the client is built
    let config = RunConfig::from_args(args)?;

    // Create an object to interact with s3
    let s3agent = S3Agent::new(&config).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    fetcher::fetch(&s3agent, &config, &mut out).await
}
