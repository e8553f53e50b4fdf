//! Value types shared by every view-model.

pub mod credentials;
pub mod price;
pub mod status;

pub use credentials::{CredentialError, Email, validate_name, validate_password};
pub use price::{CurrencyCode, Price};
pub use status::*;
