// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! famforge CLI entry point

use clap::Parser;
use famforge_cli::Args;
use log::{debug, error, info, LevelFilter};
use std::process;
use std::str::FromStr;

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!("Starting famforge {}", env!("CARGO_PKG_VERSION"));
    debug!("Parsed arguments: {:?}", args);

    let report = match famforge_cli::run(&args) {
        Ok(report) => report,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    for line in famforge_cli::summary(&report) {
        println!("{}", line);
    }
    process::exit(famforge_cli::exit_code(&report, args.strict));
}
