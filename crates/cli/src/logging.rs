// Logger setup
//
// Headless commands log to stderr. The interactive grid owns the terminal, so
// it logs to <state dir>/livegrid/livegrid.log instead.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use log::LevelFilter;

pub enum LogTarget {
    Stderr,
    File,
}

/// Log file location. `state_dir` is Linux-only; other platforms use the cache dir.
pub fn log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("livegrid")
        .join("livegrid.log")
}

/// Install the global logger. `RUST_LOG` wins over the default level.
pub fn init(verbose: bool, target: LogTarget) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if let LogTarget::File = target {
        let path = log_path();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Nowhere safe to write while the grid is on screen
            Err(_) => {
                builder.filter_level(LevelFilter::Off);
            }
        }
    }

    let _ = builder.try_init();
}
