//! CLI module - Command-line interface for linkr account management
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// linkr account manager
/// Create accounts, rotate API keys and check credentials
#[derive(Debug, Parser)]
#[command(name = "linkr-accounts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (overrides the default search paths)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create default config file
    Init,

    /// Manage user accounts
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Create a new account (password is read from stdin)
    Create {
        /// Account username
        username: String,
        /// Grant admin privileges
        #[arg(long)]
        admin: bool,
        /// Address recorded as the signup IP
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,
    },
    /// List all accounts
    #[command(alias = "ls")]
    List,
    /// Show one account
    Show {
        /// User ID
        id: i32,
    },
    /// Set a new password (read from stdin)
    Passwd {
        /// User ID
        id: i32,
    },
    /// Issue a fresh API key
    RotateKey {
        /// User ID
        id: i32,
    },
    /// Check a username/password pair (password read from stdin)
    Verify {
        /// Account username
        username: String,
    },
    /// Delete an account
    #[command(alias = "rm")]
    Delete {
        /// User ID
        id: i32,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_create() {
        let cli =
            Cli::try_parse_from(["linkr-accounts", "user", "create", "alice", "--admin"]).unwrap();

        match cli.command {
            Some(Commands::User {
                command:
                    UserCommands::Create {
                        username,
                        admin,
                        ip,
                    },
            }) => {
                assert_eq!(username, "alice");
                assert!(admin);
                assert_eq!(ip, "127.0.0.1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_config_flag() {
        let cli = Cli::try_parse_from([
            "linkr-accounts",
            "u",
            "rotate-key",
            "3",
            "--config",
            "/etc/linkr.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/linkr.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::User {
                command: UserCommands::RotateKey { id: 3 }
            })
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["linkr-accounts", "user", "show", "abc"]).is_err());
    }
}
