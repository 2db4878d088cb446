//! Logger setup.
//!
//! The interactive board owns the terminal, so its records go to a file in
//! the cache directory. One-shot commands log to stderr. `RUST_LOG` wins
//! over the configured level. Setup runs at most once and never panics.

use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;

static INITIALIZED: OnceLock<Destination> = OnceLock::new();

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Stderr,
    File(PathBuf),
}

pub fn log_file_path() -> Option<PathBuf> {
    Some(dirs::cache_dir()?.join("termclock").join("termclock.log"))
}

/// Install the global logger. Later calls are no-ops and report where the
/// first call sent output.
pub fn init(level: &str, to_file: bool) -> Destination {
    INITIALIZED.get_or_init(|| install(level, to_file)).clone()
}

fn install(level: &str, to_file: bool) -> Destination {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_millis();

    let mut destination = Destination::Stderr;
    if to_file {
        match open_log_file() {
            Ok((path, file)) => {
                builder.target(Target::Pipe(Box::new(file)));
                destination = Destination::File(path);
            }
            // Nowhere safe to write while the alternate screen is up
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    if builder.try_init().is_err() {
        // Someone else's logger is already in place; leave it
        return destination;
    }
    log::debug!("logging to {destination:?}");
    destination
}

fn open_log_file() -> std::io::Result<(PathBuf, fs::File)> {
    let path = log_file_path().ok_or_else(|| std::io::Error::other("no cache directory"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}
