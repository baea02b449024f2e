//! API handlers
//!
//! This module contains all the API endpoint handlers organized by resource.
//! Each handler follows a consistent pattern:
//! - Extract state and parameters using Axum extractors
//! - Call the appropriate service methods
//! - Map service errors through `ApiError`

pub mod account;
pub mod transfer;
