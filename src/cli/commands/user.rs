use anyhow::Context;
use std::io::{BufRead, Write};

use crate::models::user::PublicUser;
use crate::services::{CredentialError, CredentialService};

/// Read a password from the first line of stdin.
pub fn read_password(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read password from stdin")?;

    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn print_user(user: &PublicUser) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}

pub async fn cmd_user_create(
    service: &dyn CredentialService,
    username: &str,
    password: &str,
    signup_ip: &str,
    is_admin: bool,
) -> anyhow::Result<()> {
    match service.signup(username, password, signup_ip, is_admin).await {
        Ok(user) => {
            println!("✓ Created user '{}'", user.username());
            print_user(&user.as_public())
        }
        Err(err @ (CredentialError::UniquenessViolation { .. } | CredentialError::Validation(_))) => {
            println!("Cannot create user: {err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn cmd_user_list(service: &dyn CredentialService) -> anyhow::Result<()> {
    let users = service.list_users().await?;

    if users.is_empty() {
        println!("No users yet. Create one with 'linkr-accounts user create <username>'.");
        return Ok(());
    }

    println!("{:<6} {:<24} {:<6} {:<20} {}", "ID", "USERNAME", "ADMIN", "SIGNED UP", "IP");
    for user in &users {
        let signed_up = chrono::DateTime::from_timestamp(user.signup_time, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| user.signup_time.to_string());

        println!(
            "{:<6} {:<24} {:<6} {:<20} {}",
            user.user_id.unwrap_or_default(),
            user.username,
            if user.is_admin { "yes" } else { "no" },
            signed_up,
            user.signup_ip
        );
    }

    Ok(())
}

pub async fn cmd_user_show(service: &dyn CredentialService, id: i32) -> anyhow::Result<()> {
    match service.get_user(id).await {
        Ok(user) => print_user(&user.as_public()),
        Err(CredentialError::UserNotFound) => {
            println!("User with ID {id} not found.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn cmd_user_passwd(
    service: &dyn CredentialService,
    id: i32,
    new_password: &str,
) -> anyhow::Result<()> {
    match service.change_password(id, new_password).await {
        Ok(()) => {
            println!("✓ Password updated for user {id}");
            Ok(())
        }
        Err(CredentialError::UserNotFound) => {
            println!("User with ID {id} not found.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn cmd_user_rotate_key(service: &dyn CredentialService, id: i32) -> anyhow::Result<()> {
    match service.regenerate_api_key(id).await {
        Ok(api_key) => {
            println!("✓ New API key for user {id}: {api_key}");
            Ok(())
        }
        Err(CredentialError::UserNotFound) => {
            println!("User with ID {id} not found.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn cmd_user_verify(
    service: &dyn CredentialService,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    if let Some(user) = service.login(username, password).await? {
        println!(
            "✓ Credentials valid for '{}' (ID: {})",
            user.username(),
            user.get_id().unwrap_or_default()
        );
    } else {
        println!("✗ Invalid username or password.");
    }

    Ok(())
}

pub async fn cmd_user_delete(
    service: &dyn CredentialService,
    id: i32,
    skip_confirm: bool,
) -> anyhow::Result<()> {
    let user = match service.get_user(id).await {
        Ok(user) => user,
        Err(CredentialError::UserNotFound) => {
            println!("User with ID {id} not found.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if !skip_confirm {
        println!("Delete user '{}' (ID: {id})?", user.username());
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    service.delete_user(id).await?;
    println!("✓ Deleted: {}", user.username());

    Ok(())
}
