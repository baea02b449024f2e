// This is a metapackage for end-to-end tests
// Re-export crates as modules

pub use api_gateway;
pub use banking_service;
pub use common;
