//! # VBAP
//!
//! A command-line tool for inspecting loudspeaker triangulations and VBAP
//! gain tables.

use log::error;

mod cli;
mod logging;
mod runner;

fn main() {
    let args = cli::args::build_cli().get_matches();
    logging::init(args.get_flag("quiet"));

    let code = match runner::run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err.to_string().to_lowercase());
            1
        }
    };

    std::process::exit(code)
}
