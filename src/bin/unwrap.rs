// iab-unwrap: extracts the IA frames of an IAB track file

use iab_imf::cli::{self, UnwrapConfig, EXIT_FAILURE};
use std::process;

fn main() {
    let config: UnwrapConfig = cli::parse_or_exit();
    cli::init_logging(config.verbose, config.quiet);

    if let Err(e) = cli::run_unwrap(&config) {
        println!("{e:#}");
        process::exit(EXIT_FAILURE);
    }
}
