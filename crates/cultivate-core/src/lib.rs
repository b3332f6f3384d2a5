//! # cultivate-core: Foundational Types for CultivateCo
//!
//! Shared vocabulary between the API client, the stub backend, and the CLI.
//! It depends on nothing internal.
//!
//! ## Contents
//!
//! - **Identifiers**: `FacilityId`, `UserId`, `AlertId`, `ItemId` newtypes.
//!   No bare strings for identifiers that cross the wire.
//! - **Auth wire types**: login, refresh, and token-pair bodies for the
//!   `/auth/*` endpoints.
//! - **Error taxonomy**: `ErrorCategory` and the status-code classification
//!   every failed call goes through.
//! - **Header names**: the per-request context headers.
//! - **Dashboard models**: facilities, compliance status and alerts,
//!   inventory.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cultivate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod auth;
pub mod compliance;
pub mod error;
pub mod facility;
pub mod headers;
pub mod identity;
pub mod inventory;

pub use auth::{AuthResponse, LoginRequest, RefreshRequest, TokenPair, User, UserRole};
pub use compliance::{AlertSeverity, ComplianceAlert, ComplianceLevel, ComplianceStatus};
pub use error::{extract_message, ErrorCategory};
pub use facility::{Facility, LicenseType};
pub use identity::{AlertId, FacilityId, ItemId, UserId};
pub use inventory::{CreateInventoryItem, InventoryItem, ProductCategory};
