//! Petalbox Client - REST client, session context and page state.
//!
//! Everything that talks to the backend or holds state between calls:
//!
//! - [`config`] - Environment configuration
//! - [`http`] - Shared [`ApiClient`] with bearer injection and the 401 policy
//! - [`session`] - Cached token and identity, storage, change notifications
//! - [`api`] - One `impl ApiClient` block per backend area
//! - [`gate`] - Route gate with background profile refresh
//! - [`pages`] - List, dashboard and report page state
//! - [`checkout`] - Cart to subscriptions and payment
//!
//! # Example
//!
//! ```no_run
//! use petalbox_client::{ApiClient, ClientConfig, FileSessionStore, SessionContext};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let session = SessionContext::new(FileSessionStore::new(&config.session_file));
//! let client = ApiClient::new(&config, session)?;
//!
//! for package in client.list_packages().await? {
//!     tracing::info!(name = %package.name, price = %package.price, "Package");
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod pages;
pub mod session;

pub use checkout::{CheckoutError, CheckoutOutcome};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind, SessionError};
pub use gate::{GateState, RouteGate, refresh_profile};
pub use http::{ApiClient, RequestOptions};
pub use pages::{AggregatePage, DashboardPage, ListPage, PageError, ReportPage};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionContext, SessionEvent, SessionStore,
    StoredSession,
};
