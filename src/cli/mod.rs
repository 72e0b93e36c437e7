//! CLI module - Command-line interface for Ballotbox
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Ballotbox - Online Voting System
/// Voter signup with email verification, one vote per account, and an admin panel
#[derive(Parser)]
#[command(name = "ballotbox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the web server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an admin account
    CreateAdmin {
        /// Admin username
        username: String,
        /// Admin password
        password: String,
    },
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["ballotbox"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_create_admin() {
        let cli = Cli::try_parse_from(["ballotbox", "create-admin", "root", "s3cret"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::CreateAdmin {
                username: "root".to_string(),
                password: "s3cret".to_string(),
            })
        );
    }

    #[test]
    fn create_admin_requires_password() {
        assert!(Cli::try_parse_from(["ballotbox", "create-admin", "root"]).is_err());
    }
}
