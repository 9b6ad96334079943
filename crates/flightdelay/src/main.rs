//! `flightdelay` - CLI and server entry point.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use flightdelay::cli::{Cli, Command, ConfigCommand, PredictCommand, UserCommand};
use flightdelay::{
    init_logging, web, AppState, AuthService, Config, DelayPredictor, FeatureVector, Storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(cmd) => {
            let bind = cmd.bind.unwrap_or_else(|| config.server.bind_address.clone());
            let state = AppState::from_config(&config)?;
            web::serve(&bind, state).await?;
        }
        Command::User(cmd) => handle_user(&config, cmd)?,
        Command::Predict(cmd) => handle_predict(&config, &cmd)?,
        Command::Status(cmd) => handle_status(&config, cmd.json)?,
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }
    Ok(())
}

fn open_auth(config: &Config) -> anyhow::Result<AuthService> {
    let storage = Storage::open(config.database_path())?;
    Ok(AuthService::new(storage, config.session_ttl()))
}

fn handle_user(config: &Config, cmd: UserCommand) -> anyhow::Result<()> {
    let auth = open_auth(config)?;
    match cmd {
        UserCommand::Add { username, password } => {
            if auth.add_user(&username, &password)? {
                println!("Created user {username}");
            } else {
                bail!("Username already exists");
            }
        }
        UserCommand::Check { username, password } => {
            if auth.verify_user(&username, &password)? {
                println!("Credentials valid for {username}");
            } else {
                bail!("Invalid username or password");
            }
        }
    }
    Ok(())
}

fn handle_predict(config: &Config, cmd: &PredictCommand) -> anyhow::Result<()> {
    let predictor = DelayPredictor::load(config.model_path())?;
    let features = FeatureVector::encode(
        &cmd.origin,
        &cmd.dest,
        &cmd.carrier,
        cmd.temperature,
        cmd.wind_speed,
    );
    let estimate = predictor.estimate(&features);

    if cmd.json {
        let output = serde_json::json!({
            "features": features,
            "estimate": estimate,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", estimate.message);
        println!("{}", estimate.text);
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let stats = open_auth(config)?.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": stats.database_path,
            "model_path": config.model_path(),
            "users": stats.total_users,
            "active_sessions": stats.active_sessions,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("flightdelay status");
        println!("------------------");
        println!("Database:        {}", stats.database_path.display());
        println!("Model:           {}", config.model_path().display());
        println!("Users:           {}", stats.total_users);
        println!("Active sessions: {}", stats.active_sessions);
        println!("Database size:   {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:   {}", config.server.bind_address);
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Session]");
                println!("  Cookie name:    {}", config.session.cookie_name);
                println!("  TTL (hours):    {}", config.session.ttl_hours);
                println!("  Secure cookie:  {}", config.session.secure_cookie);
                println!();
                println!("[Model]");
                println!("  Artifact path:  {}", config.model_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
