//! privlaunch binary entry point
//!
//! Joins the command-line arguments into the target command and runs the
//! escalation pipeline once. The process exit code is the HRESULT of the
//! first failing stage, or zero on success.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use privlaunch::config::{load_config, validate_config};
use privlaunch::core::types::LaunchError;
use privlaunch::core::VERSION;
use privlaunch::pipeline::Pipeline;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The launched process inherits the binary's directory as its working
/// directory unless the caller is in a better position to decide.
fn default_directory() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
}

fn invalid_argument_exit() -> ExitCode {
    exit_with(LaunchError::EmptyCommandLine.code().0)
}

fn exit_with(hresult: i32) -> ExitCode {
    // ExitCode only carries u8 portably; on Windows the full status goes
    // through std::process::exit.
    std::process::exit(hresult)
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("privlaunch: configuration error: {err}");
            return invalid_argument_exit();
        }
    };
    if let Err(err) = validate_config(&config) {
        eprintln!("privlaunch: {err}");
        return invalid_argument_exit();
    }

    init_logging(&config.logging.level);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command_line = args.join(" ");
    if command_line.trim().is_empty() {
        eprintln!("privlaunch {VERSION}");
        eprintln!("Usage: privlaunch <command line>");
        eprintln!("Runs the given command under the TrustedInstaller service identity.");
        return invalid_argument_exit();
    }

    let directory = default_directory();
    let pipeline = Pipeline::new(config.launch);
    match pipeline.run(&command_line, directory.as_deref()) {
        Ok(()) => {
            info!("process launched");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(stage = err.stage_name(), "{err}");
            exit_with(err.code().0)
        }
    }
}
