//! Sign-in, registration and profile commands.

use petalbox_client::api::{ProfileUpdate, RegisterRequest};
use petalbox_core::{Email, Identity, Role, navigation_for, validate_name, validate_password};
use secrecy::{ExposeSecret, SecretString};

use super::{CommandError, Context};
use crate::output::emit;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn parse_email(raw: &str) -> Result<Email, CommandError> {
    Email::parse(raw).map_err(|e| CommandError::InvalidArgument(e.to_string()))
}

/// Display name, email and highest role on one line.
fn describe(identity: &Identity) -> String {
    let name = identity.name().unwrap_or_else(|| "(unnamed)".to_string());
    let role = identity
        .highest_role()
        .map_or("no role", |role| role.as_str());
    match identity.email() {
        Some(email) => format!("{name} <{email}> [{role}]"),
        None => format!("{name} [{role}]"),
    }
}

pub async fn login(ctx: &Context, email: &str, password: &SecretString) -> CommandResult {
    let email = parse_email(email)?;
    let identity = ctx.client.login(&email, password.expose_secret()).await?;
    tracing::info!(email = %email, "Signed in");
    emit(format!("Signed in as {}", describe(&identity)))?;
    Ok(())
}

pub async fn google_login(ctx: &Context, credential: &str) -> CommandResult {
    let identity = ctx.client.google_login(credential).await?;
    emit(format!("Signed in with Google as {}", describe(&identity)))?;
    Ok(())
}

pub async fn register(
    ctx: &Context,
    name: String,
    email: &str,
    password: &SecretString,
    phone: Option<String>,
) -> CommandResult {
    let email = parse_email(email)?;
    validate_name(&name).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    validate_password(password.expose_secret())
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    let request = RegisterRequest {
        name,
        email,
        password: password.expose_secret().to_string(),
        phone,
        role: Role::Customer,
    };

    match ctx.client.register(&request).await? {
        Some(identity) => emit(format!("Registered and signed in as {}", describe(&identity)))?,
        None => emit("Registered. Sign in with `petal login` to continue.")?,
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> CommandResult {
    ctx.client.logout()?;
    emit("Signed out")?;
    Ok(())
}

pub async fn whoami(ctx: &Context, verify: bool) -> CommandResult {
    if verify && ctx.client.session().has_token() {
        ctx.client.verify_token().await?;
    }

    let identity = ctx.client.session().identity();
    match &identity {
        Some(identity) => emit(describe(identity))?,
        None => emit("Not signed in")?,
    }

    for item in navigation_for(identity.as_ref()) {
        emit(format!("  {:<16} {}", item.label, item.path))?;
    }
    Ok(())
}

pub async fn show_profile(ctx: &Context) -> CommandResult {
    let profile = ctx.client.get_profile().await?;
    emit(serde_json::to_string_pretty(&profile)?)?;
    Ok(())
}

pub async fn update_profile(
    ctx: &Context,
    name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
) -> CommandResult {
    if name.is_none() && phone.is_none() && address.is_none() {
        return Err(CommandError::InvalidArgument("nothing to update".to_string()).into());
    }
    if let Some(name) = &name {
        validate_name(name).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    }

    let update = ProfileUpdate {
        name,
        phone,
        address,
    };
    ctx.client.update_profile(&update).await?;
    emit("Profile updated")?;
    Ok(())
}

pub async fn change_password(
    ctx: &Context,
    current: &SecretString,
    new: &SecretString,
) -> CommandResult {
    validate_password(new.expose_secret())
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    ctx.client
        .change_password(current.expose_secret(), new.expose_secret())
        .await?;
    emit("Password changed")?;
    Ok(())
}

pub async fn forgot_password(ctx: &Context, email: &str) -> CommandResult {
    let email = parse_email(email)?;
    ctx.client.request_password_reset(&email).await?;
    emit(format!("If {email} has an account, a reset link is on its way"))?;
    Ok(())
}

pub async fn reset_password(ctx: &Context, token: &str, new: &SecretString) -> CommandResult {
    validate_password(new.expose_secret())
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    ctx.client.reset_password(token, new.expose_secret()).await?;
    emit("Password reset. Sign in with the new password.")?;
    Ok(())
}
