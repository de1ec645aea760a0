// CLI module for iab-imf
//
// Shared by the iab-wrap and iab-unwrap binaries: clap configuration,
// command implementations, output formatting and process setup.

pub mod commands;
pub mod config;
pub mod output;

pub use commands::{run_unwrap, run_wrap};
pub use config::{FrameOrderArg, OutputFormat, UnwrapConfig, WrapConfig};
pub use output::{OutputFormatter, TrackInfo};

use clap::error::ErrorKind as ClapErrorKind;
use clap::{CommandFactory, Parser};
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit status of every failed run, usage errors included
pub const EXIT_FAILURE: i32 = 1;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug and
/// `--quiet` error, with warn in between.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::builder().from_env_lossy()
    } else {
        EnvFilter::builder().parse_lossy(format!("iab_imf={level}"))
    };

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parse the command line, or print usage on stdout and exit
///
/// `--help` and usage errors both exit with [`EXIT_FAILURE`]; only
/// `--version` exits successfully.
pub fn parse_or_exit<C: Parser>() -> C {
    match C::try_parse() {
        Ok(config) => config,
        Err(e) => match e.kind() {
            ClapErrorKind::DisplayVersion => {
                print!("{e}");
                process::exit(0);
            }
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print!("{e}");
                process::exit(EXIT_FAILURE);
            }
            _ => {
                println!("{}", e.render());
                println!("{}", C::command().render_help());
                process::exit(EXIT_FAILURE);
            }
        },
    }
}
