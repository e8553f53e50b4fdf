//! CLI command implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod manage;
pub mod reports;

use clap::{Args, ValueEnum};
use petalbox_client::{
    ApiClient, ClientConfig, FileSessionStore, GateState, RouteGate, SessionContext,
};
use petalbox_core::{NormalizedStatus, RequiredRole};
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors raised by the CLI itself rather than the client.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The gate redirected; `target` is where a browser would be sent.
    #[error("Sign in with an account that can open {origin} (run `petal login`); redirect target {target}")]
    SignInRequired { origin: String, target: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A page recorded an inline error message.
    #[error("{0}")]
    Page(String),
}

/// Which back-office area a command talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Surface {
    Admin,
    Staff,
}

impl Surface {
    pub const fn required_role(self) -> RequiredRole {
        match self {
            Self::Admin => RequiredRole::Admin,
            Self::Staff => RequiredRole::Staff,
        }
    }

    /// Route prefix of the surface, used as the gate origin.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Staff => "/staff",
        }
    }
}

/// Search, filter and surface options shared by the list commands.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Free-text search
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Status to show, or "all"
    #[arg(short, long, default_value = "all")]
    pub status: String,

    #[arg(long, value_enum, default_value_t = Surface::Staff)]
    pub surface: Surface,
}

/// Configuration plus the client bound to the persisted session.
pub struct Context {
    pub config: ClientConfig,
    pub client: ApiClient,
}

impl Context {
    /// Build from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = ClientConfig::from_env()?;
        let session = SessionContext::new(FileSessionStore::new(&config.session_file));
        let client = ApiClient::new(&config, session)?;
        Ok(Self { config, client })
    }

    /// Pass the route gate for `origin`, starting the background profile
    /// refresh. Await the returned handle before exiting so the refreshed
    /// identity is stored.
    ///
    /// # Errors
    ///
    /// Returns `SignInRequired` when the gate redirects.
    pub fn enter(
        &self,
        required: RequiredRole,
        origin: &str,
    ) -> Result<Option<JoinHandle<bool>>, CommandError> {
        let mut gate = RouteGate::new(self.client.clone(), required, origin);
        let refresh = gate.mount();
        match gate.state() {
            GateState::Redirect { target } => Err(CommandError::SignInRequired {
                origin: origin.to_string(),
                target: target.clone(),
            }),
            _ => Ok(refresh),
        }
    }
}

/// Wait for a background profile refresh started by [`Context::enter`].
pub async fn settle(refresh: Option<JoinHandle<bool>>) {
    if let Some(handle) = refresh
        && let Err(e) = handle.await
    {
        tracing::warn!(error = %e, "Profile refresh task did not finish");
    }
}

/// Parse a status argument strictly: it must name a variant by its wire
/// value or label.
///
/// # Errors
///
/// Returns `InvalidArgument` listing the accepted values.
pub fn parse_status<S: NormalizedStatus>(raw: &str) -> Result<S, CommandError> {
    let wanted = raw.trim().replace(['-', ' '], "_").to_ascii_lowercase();
    S::ALL
        .iter()
        .copied()
        .find(|s| s.as_str() == wanted || s.label().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| {
            let accepted: Vec<&str> = S::ALL.iter().map(|s| s.as_str()).collect();
            CommandError::InvalidArgument(format!(
                "unknown status {raw:?}; expected one of {}",
                accepted.join(", ")
            ))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petalbox_core::{CustomerStatus, DeliveryStatus, OrderStatus};

    use super::*;

    #[test]
    fn test_parse_status_accepts_wire_and_label() {
        assert_eq!(
            parse_status::<DeliveryStatus>("in-progress").unwrap(),
            DeliveryStatus::InProgress
        );
        assert_eq!(
            parse_status::<OrderStatus>("Delivered").unwrap(),
            OrderStatus::Delivered
        );
        assert_eq!(
            parse_status::<CustomerStatus>("inactive").unwrap(),
            CustomerStatus::Inactive
        );
    }

    #[test]
    fn test_parse_status_rejects_unknown() {
        let err = parse_status::<DeliveryStatus>("teleported").unwrap_err();
        assert!(err.to_string().contains("pending"));
    }

    #[test]
    fn test_surface_roles() {
        assert_eq!(Surface::Admin.required_role(), RequiredRole::Admin);
        assert_eq!(Surface::Staff.prefix(), "/staff");
    }
}
