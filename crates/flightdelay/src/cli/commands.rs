//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind_address`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// User management commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a new user
    Add {
        /// Username to register
        username: String,

        /// Password for the new user
        #[arg(short, long)]
        password: String,
    },

    /// Check a username and password
    Check {
        /// Username to check
        username: String,

        /// Password to check
        #[arg(short, long)]
        password: String,
    },
}

/// Predict command arguments.
#[derive(Debug, Args)]
pub struct PredictCommand {
    /// Origin airport code (e.g. DEL)
    #[arg(long)]
    pub origin: String,

    /// Destination airport code (e.g. JFK)
    #[arg(long)]
    pub dest: String,

    /// Carrier code (e.g. AI)
    #[arg(long)]
    pub carrier: String,

    /// Temperature at departure
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: f64,

    /// Wind speed at departure
    #[arg(long)]
    pub wind_speed: f64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file to validate (default: current config)
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestPredict {
        #[command(flatten)]
        cmd: PredictCommand,
    }

    #[test]
    fn test_predict_accepts_negative_temperature() {
        let parsed = TestPredict::try_parse_from([
            "test",
            "--origin",
            "ORD",
            "--dest",
            "LHR",
            "--carrier",
            "UA",
            "--temperature",
            "-12.5",
            "--wind-speed",
            "30",
        ])
        .unwrap();

        assert!((parsed.cmd.temperature + 12.5).abs() < f64::EPSILON);
        assert!(!parsed.cmd.json);
    }
}
