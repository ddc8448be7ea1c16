use std::process::ExitCode;

use anyhow::Context;
use bridge_engine::{Bridge, BridgeConfig, manifest::HostManifest};
use clap::Parser;
use tracing::{debug, error, info};
use utils::logging::{self, Component};

#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
    ignore_errors = true
)]
pub struct Cli {
    /// Print the native messaging host manifest and exit
    #[arg(long = "manifest")]
    manifest: bool,

    /// Print usage and exit
    #[arg(long = "help")]
    help: bool,

    /// Arguments the browser appends when launching the host (caller origin,
    /// manifest path, extension id). Ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    browser_args: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Manifest,
    Usage,
    Serve,
}

impl Cli {
    /// `--manifest` and `--help` only count as the sole argument. Anything
    /// else, including browser launch arguments, falls back to serving.
    fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let args: Vec<T> = args.into_iter().collect();
        if args.len() != 2 {
            return Cli::default();
        }
        Cli::try_parse_from(args).unwrap_or_default()
    }

    fn mode(&self) -> Mode {
        if self.manifest {
            Mode::Manifest
        } else if self.help {
            Mode::Usage
        } else {
            Mode::Serve
        }
    }
}

fn usage(program: &str) -> String {
    format!("usage: {} [--manifest]", program)
}

fn print_manifest() -> anyhow::Result<()> {
    let executable = std::env::current_exe().context("Failed to get executable")?;
    let manifest = HostManifest::new(executable)
        .to_json_pretty()
        .context("Failed to marshal manifest")?;
    println!("{}", manifest);
    Ok(())
}

async fn serve() -> anyhow::Result<u64> {
    let mut bridge = Bridge::new(tokio::io::stdin(), tokio::io::stdout(), BridgeConfig::default())
        .context("Failed to build HTTP client")?;
    let answered = bridge.run().await?;
    Ok(answered)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| Component::Bridge.as_str().to_string());

    match Cli::from_args(&args).mode() {
        Mode::Usage => {
            println!("{}", usage(&program));
            return ExitCode::SUCCESS;
        }
        Mode::Manifest => {
            return match print_manifest() {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{:#}", e);
                    ExitCode::FAILURE
                }
            };
        }
        Mode::Serve => {}
    }

    let log_config = logging::get_bridge_config(None, std::env::var("RUST_LOG").ok());
    match logging::init_logging(log_config) {
        Ok(_) => {
            debug!("Logger initialized for {}", Component::Bridge.as_str());
        }
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
        }
    }

    match serve().await {
        Ok(answered) => {
            info!("Exiting after {} messages", answered);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Bridge stopped: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
