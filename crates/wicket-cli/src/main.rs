use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wicket_core::WicketConfig;

mod commands;

const DEFAULT_CONFIG: &str = "wicket.yaml";

#[derive(Parser, Debug)]
#[command(name = "wicket", version, about = "Schema-driven admin for a MySQL database")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "WICKET_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

/// Database account used by the schema tools.
#[derive(Args, Debug)]
pub struct Credentials {
    #[arg(long, env = "WICKET_USER")]
    pub user: String,

    #[arg(long, env = "WICKET_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the admin dashboard.
    Serve {
        /// Bind host, overriding dashboard.host
        #[arg(long, env = "WICKET_HOST")]
        host: Option<String>,

        /// Bind port, overriding dashboard.port
        #[arg(long, env = "WICKET_PORT")]
        port: Option<u16>,
    },

    /// Validate the configuration and print the engine settings.
    Check,

    /// Print a table's columns as the engine sees them.
    Describe {
        table: String,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Write a JSON snapshot of every table's columns.
    Snapshot {
        #[command(flatten)]
        credentials: Credentials,

        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the curated read views.
    Views {
        /// Also print each view's SQL
        #[arg(long, default_value_t = false)]
        sql: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_tracing(&config.observability.log_level);

    match cli.cmd {
        Command::Serve { host, port } => commands::serve::run(config, host, port).await,
        Command::Check => commands::check::run(&config, &cli.config),
        Command::Describe { table, credentials } => {
            commands::describe::run(&config, &credentials, &table).await
        }
        Command::Snapshot {
            credentials,
            output,
        } => commands::snapshot::run(&config, &credentials, output.as_deref()).await,
        Command::Views { sql } => {
            commands::views::run(sql);
            Ok(())
        }
    }
}

/// Load the config file. A missing `wicket.yaml` in the working directory
/// means built-in defaults; any other missing path is an error.
fn load_config(path: &Path) -> Result<WicketConfig> {
    if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        return Ok(WicketConfig::default());
    }
    WicketConfig::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "engine:\n  auto_increment_exception:\n    table: MATCHES\n    column: match_id"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        let exception = config.engine.auto_increment_exception.unwrap();
        assert!(exception.matches("MATCHES", "match_id"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(load_config(&missing).is_err());
    }

    #[test]
    fn test_cli_parses_describe() {
        let cli = Cli::try_parse_from([
            "wicket", "describe", "TEAMS", "--user", "manager1", "--password", "pw",
        ])
        .unwrap();
        match cli.cmd {
            Command::Describe { table, credentials } => {
                assert_eq!(table, "TEAMS");
                assert_eq!(credentials.user, "manager1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
