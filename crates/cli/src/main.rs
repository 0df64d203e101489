//! Mercato CLI - session store migrations and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! mercato-cli migrate sessions
//!
//! # Delete expired sessions
//! mercato-cli sessions purge
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mercato-cli")]
#[command(author, version, about = "Mercato CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Maintain the session store
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the session store schema and table
    Sessions,
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Delete sessions past their expiry
    Purge,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Sessions { action } => match action {
            SessionsAction::Purge => commands::sessions::purge().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_migrate_sessions() {
        let cli = Cli::try_parse_from(["mercato-cli", "migrate", "sessions"]);
        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Migrate {
                target: MigrateTarget::Sessions
            })
        ));
    }

    #[test]
    fn test_rejects_unknown_target() {
        assert!(Cli::try_parse_from(["mercato-cli", "migrate", "admin"]).is_err());
    }
}
