//! Petalbox Core - view-models and pure logic for the storefront client.
//!
//! This crate holds everything that does not need I/O:
//! - `client` - REST client, session context, page state
//! - `cli` - operator command line
//!
//! both build on it.
//!
//! # Architecture
//!
//! The backend's payloads are loosely typed and change shape between
//! endpoints. Everything here turns those payloads into stable display shapes
//! and derives what pages show from them. Nothing in this crate fails on a
//! malformed payload; missing values become placeholders or zero.
//!
//! # Modules
//!
//! - [`types`] - Status enums, prices, email and password checks
//! - [`payload`] - Coalescing reads and list envelopes
//! - [`views`] - Customer, order, delivery, package and dashboard view-models
//! - [`filter`] / [`stats`] - Search box, status filter and page headers
//! - [`report`] - Report aggregate and export artifact
//! - [`session`] - Cached identity, roles, gate decision and navigation
//! - [`cart`] - Local shopping cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod filter;
pub mod payload;
pub mod report;
pub mod session;
pub mod stats;
pub mod types;
pub mod views;

pub use cart::{Cart, CartError, CartLine};
pub use filter::{Searchable, filter_by_query, filter_by_status, parse_status_filter};
pub use payload::{Envelope, PLACEHOLDER, Payload, extract_list, extract_object};
pub use report::{ExportError, Report, ReportExport, ReportPeriod, Trend};
pub use session::{GateDecision, Identity, NavItem, RequiredRole, Role, decide, navigation_for};
pub use stats::{CustomerSummary, StatusSummary};
pub use types::*;
pub use views::*;
