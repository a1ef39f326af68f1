pub mod chat;
pub mod config;
pub mod run;

use clap::{Parser, Subcommand};

use dc_domain::config::Config;

/// deskchat — customer-support chat assistant server.
#[derive(Debug, Parser)]
#[command(name = "deskchat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Send a single message and print the assistant's reply.
    Run {
        /// The message to send.
        message: String,
        /// Session id (defaults to `sessions.default_session_id`).
        #[arg(long)]
        session: Option<String>,
        /// Print the reply and usage as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat in the terminal.
    Chat {
        /// Session id to start in.
        #[arg(long)]
        session: Option<String>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any issues.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `DESKCHAT_CONFIG` (or
/// `config.toml` by default), then apply environment overrides.  A missing
/// file yields the built-in defaults.  Returns the config and the path that
/// was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path =
        std::env::var("DESKCHAT_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let mut config = load_config_from(std::path::Path::new(&config_path))?;
    config.apply_env_overrides();
    Ok((config, config_path))
}

fn load_config_from(path: &std::path::Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}
