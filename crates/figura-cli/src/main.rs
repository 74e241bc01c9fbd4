//! Figura CLI entry point.
//!
//! Renders one diagram per invocation and prints the written files, one path
//! per line, so the output can be piped into other tools.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use figura_cli::{Args, error_adapter::to_reportable};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    // Logs go to stderr; stdout only carries the written paths.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .target(env_logger::Target::Stderr)
        .init();

    info!(log_level:? = log_level, kind = args.kind; "Starting Figura");
    debug!(args:? = args; "Parsed arguments");

    match figura_cli::run(&args) {
        Ok(written) => {
            for path in &written {
                println!("{}", path.display());
            }
            info!(files = written.len(); "Completed successfully");
        }
        Err(err) => {
            let mut writer = String::new();
            miette::GraphicalReportHandler::new()
                .render_report(&mut writer, &to_reportable(&err))
                .expect("Writing to String buffer is infallible");
            error!("{writer}");

            process::exit(1);
        }
    }
}
