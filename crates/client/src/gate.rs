//! Route gate for staff and admin surfaces.
//!
//! The decision is made synchronously from the cached session (no network),
//! once per mount. An authorized mount then refreshes the profile in the
//! background; that refresh can update the cached identity but never revokes
//! access, and its failures are only logged.

use petalbox_core::{GateDecision, RequiredRole, decide};
use tokio::task::JoinHandle;

use crate::http::ApiClient;

/// Where a gated surface stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Not decided yet; render a spinner.
    Checking,
    Authorized,
    /// Navigate to `target` (the sign-in page with the origin preserved).
    Redirect { target: String },
}

/// One mount of a gated surface.
#[derive(Debug)]
pub struct RouteGate {
    client: ApiClient,
    required: RequiredRole,
    origin: String,
    state: GateState,
}

impl RouteGate {
    #[must_use]
    pub fn new(client: ApiClient, required: RequiredRole, origin: impl Into<String>) -> Self {
        Self {
            client,
            required,
            origin: origin.into(),
            state: GateState::Checking,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GateState {
        &self.state
    }

    /// Decide from the cached session. Only the first call decides; later
    /// calls return the settled state.
    pub fn check(&mut self) -> &GateState {
        if self.state == GateState::Checking {
            let session = self.client.session();
            let identity = session.identity();
            let decision = decide(
                identity.as_ref(),
                session.has_token(),
                self.required,
                &self.origin,
                self.client.login_path(),
            );

            self.state = match decision {
                GateDecision::Authorized => {
                    tracing::debug!(origin = %self.origin, required = ?self.required, "Gate passed");
                    GateState::Authorized
                }
                GateDecision::Redirect { target } => {
                    tracing::info!(origin = %self.origin, required = ?self.required, "Gate redirecting to sign-in");
                    GateState::Redirect { target }
                }
            };
        }
        &self.state
    }

    /// Decide, and when authorized start the background profile refresh.
    pub fn mount(&mut self) -> Option<JoinHandle<bool>> {
        if *self.check() == GateState::Authorized {
            let client = self.client.clone();
            Some(tokio::spawn(async move { refresh_profile(&client).await }))
        } else {
            None
        }
    }
}

/// Fetch the live profile and merge it into the cached identity.
///
/// Returns whether the identity was updated. Every failure, including 403
/// and 404, is logged and otherwise ignored.
pub async fn refresh_profile(client: &ApiClient) -> bool {
    let profile = match client.get_profile().await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Profile refresh failed; keeping cached identity");
            return false;
        }
    };

    let session = client.session();
    let Some(mut identity) = session.identity() else {
        return false;
    };
    identity.merge_profile(&profile);

    match session.update_identity(identity) {
        Ok(()) => {
            tracing::debug!("Profile refreshed");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to store refreshed profile");
            false
        }
    }
}
