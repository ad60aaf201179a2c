use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Deserialize;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::session::{Session, UserProfile};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with email and password")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and clear the local session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Fetch and show the current user profile")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => login(email, password, output_format).await,
        AuthCommands::Logout => logout(output_format).await,
        AuthCommands::Status => status(output_format).await,
        AuthCommands::Whoami => whoami(output_format).await,
    }
}

async fn login(email: String, password: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let store = crate::cli::session_store()?;
    let client = crate::cli::api_client(store.clone())?;

    let body = json!({ "email": email, "password": password });
    let response = match client.post("auth/login/", &body).await {
        Ok(response) => response,
        Err(err) => {
            output_error(&output_format, err.message())?;
            anyhow::bail!("login failed");
        }
    };

    let access = response
        .get("access")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("login response carried no access token"))?
        .to_string();
    let user: UserProfile = serde_json::from_value(
        response
            .get("user")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("login response carried no user"))?,
    )?;

    // Ordinary users are pinned to their own company; it becomes the active
    // tenant immediately. Superusers pick one with `company use`.
    let company = user.company.as_ref().map(|c| c.slug.clone());

    let session = Session {
        user: Some(user.clone()),
        access_token: Some(access),
        company,
        logged_in_at: Some(Utc::now()),
    };
    store.save(&session)?;

    output_success(
        &output_format,
        &format!("Logged in as {}", user.email),
        Some(json!({
            "user": user.email,
            "company": session.company,
        })),
    )
}

async fn logout(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = crate::cli::session_store()?;
    let client = crate::cli::api_client(store.clone())?;

    let session = store.load()?;
    if session.is_authenticated() {
        // Best effort: the local session is cleared even when the backend
        // call fails (expired token, backend down).
        if let Err(err) = client.post("auth/logout/", &json!({})).await {
            tracing::debug!("logout request failed: {}", err);
        }
    }
    store.clear()?;

    output_success(&output_format, "Logged out", None)
}

async fn status(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = crate::cli::session_store()?;
    let session = store.load()?;

    if !session.is_authenticated() {
        return output_success(
            &output_format,
            "Not logged in",
            Some(json!({ "authenticated": false })),
        );
    }

    let expires_at = session.access_token.as_deref().and_then(token_expiry);
    let user = session.user.as_ref().map(|u| u.email.clone());

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "authenticated": true,
                    "user": user,
                    "company": session.company,
                    "superuser": session.is_superuser(),
                    "token_expires_at": expires_at,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Logged in as: {}", user.as_deref().unwrap_or("unknown"));
            println!("Company: {}", session.company.as_deref().unwrap_or("none"));
            if let Some(expires_at) = expires_at {
                let state = if expires_at < Utc::now() { " (expired)" } else { "" };
                println!("Token expires: {}{}", expires_at.to_rfc3339(), state);
            }
        }
    }
    Ok(())
}

async fn whoami(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = crate::cli::session_store()?;
    let client = crate::cli::api_client(store.clone())?;

    let profile = match client.get("auth/profile/", &[]).await {
        Ok(profile) => profile,
        Err(err) => {
            output_error(&output_format, err.message())?;
            anyhow::bail!("profile fetch failed");
        }
    };

    // Keep the stored profile in sync with the backend's view.
    let user: UserProfile = serde_json::from_value(profile.clone())?;
    let mut session = store.load()?;
    session.user = Some(user.clone());
    store.save(&session)?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Text => {
            println!("{} <{}>", user.display_name(), user.email);
            if let Some(company) = &user.company {
                println!("Company: {} ({})", company.name, company.slug);
            }
        }
    }
    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    use std::io::BufRead;

    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\n', '\r']).to_string();
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    Ok(password)
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

/// Peek at the token's expiry claim for display. The signature is not
/// checked; the backend remains the only verifier.
fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<TokenClaims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(&[]),
        &validation,
    )
    .ok()?;
    data.claims.exp.and_then(|ts| DateTime::from_timestamp(ts, 0))
}
