//! Local cart, checkout and subscriptions.
//!
//! The cart lives as JSON beside the session file so it survives between
//! invocations.

use std::io;
use std::path::Path;

use clap::Subcommand;
use petalbox_core::{Cart, Payload, RequiredRole};
use serde_json::Value;
use thiserror::Error;

use super::{CommandError, Context, settle};
use crate::output::{emit, money, table};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart lines and subtotal
    Show,

    /// Add a package
    Add {
        package_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Change a line's quantity (0 removes it)
    Set { package_id: String, quantity: u32 },

    /// Remove a line
    Remove { package_id: String },

    /// Empty the cart
    Clear,

    /// Place one subscription per line and start the payment
    Checkout {
        /// Delivery address for every subscription
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum CartFileError {
    #[error("Cart file error: {0}")]
    Io(#[from] io::Error),

    #[error("Cart file is not valid: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Read the cart; a missing file is an empty cart.
fn load_cart(path: &Path) -> Result<Cart, CartFileError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Cart::new()),
        Err(e) => Err(e.into()),
    }
}

fn save_cart(path: &Path, cart: &Cart) -> Result<(), CartFileError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(cart)?)?;
    Ok(())
}

fn cart_text(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }
    let rows: Vec<Vec<String>> = cart
        .lines()
        .iter()
        .map(|l| {
            vec![
                l.package_id.clone(),
                l.name.clone(),
                l.quantity.to_string(),
                money(l.unit_price),
                money(l.line_total()),
            ]
        })
        .collect();
    format!(
        "{}\n{} item(s), subtotal {}",
        table(&["ID", "PACKAGE", "QTY", "UNIT", "TOTAL"], &rows),
        cart.item_count(),
        money(cart.subtotal())
    )
}

pub async fn run(ctx: &Context, action: CartAction) -> CommandResult {
    let path = ctx.config.cart_file();
    let mut cart = load_cart(&path)?;

    match action {
        CartAction::Show => {}
        CartAction::Add {
            package_id,
            quantity,
        } => {
            let package = ctx.client.get_package(&package_id).await?;
            cart.add(&package, quantity)?;
            tracing::info!(package_id = %package.id, quantity, "Added to cart");
        }
        CartAction::Set {
            package_id,
            quantity,
        } => cart.set_quantity(&package_id, quantity)?,
        CartAction::Remove { package_id } => cart.remove(&package_id)?,
        CartAction::Clear => cart.clear(),
        CartAction::Checkout { address } => {
            return checkout(ctx, &path, &mut cart, address.as_deref()).await;
        }
    }

    save_cart(&path, &cart)?;
    emit(cart_text(&cart))?;
    Ok(())
}

async fn checkout(
    ctx: &Context,
    path: &Path,
    cart: &mut Cart,
    address: Option<&str>,
) -> CommandResult {
    let refresh = ctx.enter(RequiredRole::Customer, "/checkout")?;
    let outcome = ctx.client.checkout(cart, address).await;
    settle(refresh).await;
    let outcome = outcome?;

    cart.clear();
    save_cart(path, cart)?;

    emit(format!(
        "Placed {} subscription(s): {}",
        outcome.subscriptions.len(),
        outcome.subscription_ids().join(", ")
    ))?;
    match &outcome.payment.payment_url {
        Some(url) => emit(format!("Complete the payment at {url}"))?,
        None => emit("The backend did not return a payment link")?,
    }
    Ok(())
}

fn subscription_row(raw: &Value) -> Vec<String> {
    let p = Payload::new(raw);
    vec![
        p.text_or_placeholder(&["id", "_id", "subscriptionId"]),
        p.text_or_placeholder(&["package.name", "packageName", "package_name"]),
        p.count(&["quantity"]).unwrap_or(1).to_string(),
        p.date(&["startDate", "start_date", "createdAt"])
            .unwrap_or_else(|| petalbox_core::PLACEHOLDER.to_string()),
        p.text_or_placeholder(&["status", "state"]),
    ]
}

pub async fn subscriptions(ctx: &Context) -> CommandResult {
    let refresh = ctx.enter(RequiredRole::Customer, "/account/subscriptions")?;
    let subscriptions = ctx.client.list_subscriptions().await;
    settle(refresh).await;

    let rows: Vec<Vec<String>> = subscriptions?.iter().map(subscription_row).collect();
    emit(table(&["ID", "PACKAGE", "QTY", "STARTS", "STATUS"], &rows))?;
    Ok(())
}

fn parse_params(params: &[String]) -> Result<Vec<(String, String)>, CommandError> {
    params
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| CommandError::InvalidArgument(format!("expected key=value, got {pair:?}")))
        })
        .collect()
}

pub async fn verify_payment(ctx: &Context, params: &[String]) -> CommandResult {
    let params = parse_params(params)?;
    let verification = ctx.client.verify_payment(&params).await?;
    let message = verification.message.unwrap_or_default();
    if verification.success {
        emit(format!("Payment confirmed. {message}").trim_end())?;
        Ok(())
    } else {
        Err(CommandError::Page(format!("Payment was not confirmed. {message}").trim_end().to_string()).into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petalbox_core::normalize_package;
    use serde_json::json;

    use super::*;

    fn temp_cart_path() -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("petalbox-cli-{}", uuid::Uuid::new_v4()))
            .join("cart.json")
    }

    #[test]
    fn test_cart_file_round_trip() {
        let path = temp_cart_path();
        assert!(load_cart(&path).unwrap().is_empty());

        let mut cart = Cart::new();
        cart.add(
            &normalize_package(&json!({"id": "p1", "name": "Weekly Bloom", "price": "350000"})),
            2,
        )
        .unwrap();
        save_cart(&path, &cart).unwrap();
        assert_eq!(load_cart(&path).unwrap(), cart);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_empty_cart_text() {
        assert_eq!(cart_text(&Cart::new()), "Your cart is empty.");
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params(&["vnp_ResponseCode=00".into(), "note=a=b".into()]).unwrap();
        assert_eq!(
            params,
            vec![
                ("vnp_ResponseCode".to_string(), "00".to_string()),
                ("note".to_string(), "a=b".to_string())
            ]
        );
        assert!(parse_params(&["broken".into()]).is_err());
    }

    #[test]
    fn test_subscription_row_placeholders() {
        let row = subscription_row(&json!({"id": 5, "package": {"name": "Rose Box"}}));
        assert_eq!(row.first().map(String::as_str), Some("5"));
        assert_eq!(row.get(1).map(String::as_str), Some("Rose Box"));
        assert_eq!(row.get(2).map(String::as_str), Some("1"));
    }
}
