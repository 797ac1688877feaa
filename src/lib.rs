pub mod cli;
pub mod config;
pub mod crypto;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use anyhow::Context;
use cli::{Cli, Commands, UserCommands};
pub use config::Config;
use db::Store;
use services::SeaOrmCredentialService;
use tracing_subscriber::EnvFilter;

/// Load the configuration named on the command line, or search the default paths.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    Ok(())
}

pub async fn connect_service(config: &Config) -> anyhow::Result<SeaOrmCredentialService> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    SeaOrmCredentialService::from_config(store, &config.security)
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    match command {
        Commands::Init => cli::cmd_init(),
        Commands::User { command } => run_user_command(&config, command).await,
    }
}

async fn run_user_command(config: &Config, command: UserCommands) -> anyhow::Result<()> {
    let service = connect_service(config).await?;

    match command {
        UserCommands::Create {
            username,
            admin,
            ip,
        } => {
            let password = cli::read_password("Password")?;
            if password.is_empty() {
                println!("Password cannot be empty.");
                return Ok(());
            }
            cli::cmd_user_create(&service, &username, &password, &ip, admin).await
        }
        UserCommands::List => cli::cmd_user_list(&service).await,
        UserCommands::Show { id } => cli::cmd_user_show(&service, id).await,
        UserCommands::Passwd { id } => {
            let password = cli::read_password("New password")?;
            if password.is_empty() {
                println!("Password cannot be empty.");
                return Ok(());
            }
            cli::cmd_user_passwd(&service, id, &password).await
        }
        UserCommands::RotateKey { id } => cli::cmd_user_rotate_key(&service, id).await,
        UserCommands::Verify { username } => {
            let password = cli::read_password("Password")?;
            cli::cmd_user_verify(&service, &username, &password).await
        }
        UserCommands::Delete { id, yes } => cli::cmd_user_delete(&service, id, yes).await,
    }
}

fn print_help() {
    println!("linkr-accounts - account credential manager for linkr");
    println!();
    println!("Usage: linkr-accounts <command>");
    println!();
    println!("Commands:");
    println!("  init                      Create default config.toml");
    println!("  user create <username>    Create an account (--admin, --ip <addr>)");
    println!("  user list                 List accounts");
    println!("  user show <id>            Show an account");
    println!("  user passwd <id>          Change an account password");
    println!("  user rotate-key <id>      Issue a new API key");
    println!("  user verify <username>    Check a password");
    println!("  user delete <id>          Delete an account");
    println!();
    println!("Run 'linkr-accounts --help' for all options.");
}
