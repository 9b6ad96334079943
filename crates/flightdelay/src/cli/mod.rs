//! Command-line interface for flightdelay.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, PredictCommand, ServeCommand, StatusCommand, UserCommand};

use crate::logging::Verbosity;

/// flightdelay - Sign in and predict flight delays
///
/// Serves the prediction web application and provides shell access to the
/// user store and the delay model.
#[derive(Debug, Parser)]
#[command(name = "flightdelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web application
    Serve(ServeCommand),

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Predict the delay for one flight
    Predict(PredictCommand),

    /// Show user and session counts
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "flightdelay");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["flightdelay", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Command::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:8080")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_user_add() {
        let args = ["flightdelay", "user", "add", "alice", "--password", "pw"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::User(UserCommand::Add { ref username, .. }) if username == "alice"
        ));
    }

    #[test]
    fn test_parse_user_add_requires_password() {
        assert!(Cli::try_parse_from(["flightdelay", "user", "add", "alice"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let args = ["flightdelay", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_validate() {
        let args = ["flightdelay", "config", "validate", "/tmp/x.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
