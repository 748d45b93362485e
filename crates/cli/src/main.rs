// LiveGrid CLI - terminal client for a live multi-user spreadsheet
// Without a subcommand it opens the interactive grid.

mod exit_codes;
mod headless;
mod logging;
mod tui;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use livegrid_client::{CellCoord, CellEdit, Session, WsConnector};
use livegrid_config::Settings;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "livegrid")]
#[command(about = "Live multi-user spreadsheet client")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Server websocket URL (overrides server.url)
    #[arg(long, global = true, env = "LIVEGRID_URL")]
    url: Option<String>,

    /// Handshake timeout in milliseconds, 0 = wait forever (overrides server.connectTimeoutMs)
    #[arg(long, global = true, value_name = "MS")]
    connect_timeout_ms: Option<u64>,

    /// Do not connect when the grid opens (overrides server.autoConnect)
    #[arg(long, global = true)]
    no_auto_connect: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, env = "LIVEGRID_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (grid: to the log file, other commands: to stderr)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive grid (default)
    Grid,

    /// Connect and print every result the server pushes
    #[command(after_help = "\
Exit codes: 20 = could not connect, 21 = connection lost, 22 = connect timed out.

Examples:
  livegrid watch
  livegrid watch --json | jq .
  livegrid watch --url ws://10.0.0.5:9123")]
    Watch {
        /// One JSON object per result
        #[arg(long)]
        json: bool,
    },

    /// Set one cell's expression and print the results it causes
    #[command(after_help = "\
Examples:
  livegrid set A1 42
  livegrid set B2 '=A1*2'
  livegrid set B2            # clear B2")]
    Set {
        /// Cell reference, A1 style
        cell: String,

        /// New expression; omit or leave blank to clear the cell
        expression: Option<String>,

        /// How long to print pushed results after sending
        #[arg(long, default_value_t = 1000, value_name = "MS")]
        wait_ms: u64,

        /// One JSON object per result
        #[arg(long)]
        json: bool,
    },

    /// Settings file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file path
    Path,
    /// Print the effective settings, flags applied
    Show,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nprotocol: livegrid-protocol ", env!("CARGO_PKG_VERSION"),
        "\ntarget:   ", env!("TARGET"),
    )
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Grid));
    let target = if interactive { logging::LogTarget::File } else { logging::LogTarget::Stderr };
    logging::init(cli.verbose, target);

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { command, url, connect_timeout_ms, no_auto_connect, config, verbose: _ } = cli;

    let mut settings = load_settings(config.as_deref())?;
    apply_overrides(&mut settings, url, connect_timeout_ms, no_auto_connect);

    match command.unwrap_or(Commands::Grid) {
        Commands::Grid => {
            let (_runtime, session) = open_session(&settings)?;
            let viewport = tui::viewport::Viewport::new(settings.rows, settings.cols, settings.column_width);
            tui::run(session, viewport, settings.auto_connect).map_err(CliError::io)
        }
        Commands::Watch { json } => {
            let (runtime, session) = open_session(&settings)?;
            headless::cmd_watch(&runtime, session, json)
        }
        Commands::Set { cell, expression, wait_ms, json } => {
            let coord = parse_cell(&cell, &settings)?;
            let edit = CellEdit::new(coord.x, coord.y, headless::parse_expression(expression));
            let (runtime, session) = open_session(&settings)?;
            headless::cmd_set(&runtime, session, edit, Duration::from_millis(wait_ms), json)
        }
        Commands::Config { command } => cmd_config(command, &settings, config.as_deref()),
    }
}

// ============================================================================
// settings
// ============================================================================

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(path).map_err(|e| {
            CliError::args(format!("{}: {}", path.display(), e))
                .with_hint("check the file, or drop --config to use the default settings")
        }),
        None => Ok(Settings::load()),
    }
}

/// Command-line flags win over the settings file for this run only.
fn apply_overrides(
    settings: &mut Settings,
    url: Option<String>,
    connect_timeout_ms: Option<u64>,
    no_auto_connect: bool,
) {
    if let Some(url) = url {
        settings.server_url = url;
    }
    if let Some(ms) = connect_timeout_ms {
        settings.connect_timeout_ms = if ms == 0 { None } else { Some(ms) };
    }
    if no_auto_connect {
        settings.auto_connect = false;
    }
}

fn parse_cell(reference: &str, settings: &Settings) -> Result<CellCoord, CliError> {
    let coord = CellCoord::parse_a1(reference).ok_or_else(|| {
        CliError::args(format!("invalid cell reference: {}", reference)).with_hint("use A1 style, e.g. B3")
    })?;
    if coord.x >= settings.cols || coord.y >= settings.rows {
        log::debug!("{} is outside the configured {}x{} grid", coord, settings.cols, settings.rows);
    }
    Ok(coord)
}

fn open_session(settings: &Settings) -> Result<(Runtime, Session<WsConnector>), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(|e| CliError::io(format!("failed to start runtime: {}", e)))?;
    let connector = WsConnector::new(runtime.handle().clone(), settings.connect_timeout());
    let session = Session::new(settings.server_url.clone(), connector);
    Ok((runtime, session))
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(command: ConfigCommands, settings: &Settings, path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            let path = path.map(Path::to_path_buf).unwrap_or_else(Settings::config_path);
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(settings).map_err(|e| CliError::io(e.to_string()))?;
            println!("{}", json);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut s = Settings::default();
        apply_overrides(&mut s, Some("ws://other:1".into()), Some(250), true);
        assert_eq!(s.server_url, "ws://other:1");
        assert_eq!(s.connect_timeout(), Some(Duration::from_millis(250)));
        assert!(!s.auto_connect);
    }

    #[test]
    fn test_zero_timeout_waits_forever() {
        let mut s = Settings::default();
        apply_overrides(&mut s, None, Some(0), false);
        assert_eq!(s.connect_timeout(), None);
        assert_eq!(s.server_url, "ws://127.0.0.1:9123");
        assert!(s.auto_connect);
    }

    #[test]
    fn test_parse_cell() {
        let s = Settings::default();
        assert_eq!(parse_cell("B3", &s).unwrap(), CellCoord::new(1, 2));
        let err = parse_cell("3B", &s).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["livegrid", "set", "A1", "=1+1", "--wait-ms", "50", "--url", "ws://x:1"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("ws://x:1"));
        match cli.command {
            Some(Commands::Set { cell, expression, wait_ms, json }) => {
                assert_eq!(cell, "A1");
                assert_eq!(expression.as_deref(), Some("=1+1"));
                assert_eq!(wait_ms, 50);
                assert!(!json);
            }
            _ => panic!("expected set"),
        }

        let cli = Cli::try_parse_from(["livegrid"]).unwrap();
        assert!(cli.command.is_none());
    }
}
