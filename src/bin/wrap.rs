// iab-wrap: wraps a directory of IA frames into an IAB track file

use iab_imf::cli::{self, WrapConfig, EXIT_FAILURE};
use std::process;

fn main() {
    let config: WrapConfig = cli::parse_or_exit();
    cli::init_logging(config.verbose, config.quiet);

    if let Err(e) = cli::run_wrap(&config) {
        println!("{e:#}");
        process::exit(EXIT_FAILURE);
    }
}
