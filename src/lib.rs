//! smbgw-console: headless client core for an SMB gateway management console.
//!
//! This crate carries the console's state logic without any rendering
//! surface: the share-creation form dependency engine, theme and widget
//! layout persistence, the gateway API client, the realtime data feed, and
//! the settings/dashboard models. Frontends attach through the seams each
//! module exposes (presentation targets, key/value stores, the event bus)
//! and stay free of business rules themselves.

pub mod api;
pub mod bus;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod layout;
pub mod realtime;
pub mod settings;
pub mod store;
pub mod theme;

pub use error::ConsoleError;

use std::io::{self, Write};

use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Common logger initialization for the binary entrypoints.
///
/// `SMBGW_LOG_FILE` redirects output to a file; debug builds default to a
/// timestamped file in the working directory so interactive sessions keep
/// their scrollback clean.
pub fn init_logging() {
    let log_file = std::env::var("SMBGW_LOG_FILE").ok().or_else(|| {
        #[cfg(debug_assertions)]
        {
            Some(format!("./log_{}.log", Local::now().format("%Y%m%d%H%M%S")))
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    });

    if let Some(path) = log_file {
        if let Err(err) = init_file_logger(&path) {
            eprintln!("Failed to initialize file logger at '{path}': {err}");
            env_logger::init();
        }
    } else {
        env_logger::init();
    }
}

fn init_file_logger(path: &str) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    Ok(())
}
