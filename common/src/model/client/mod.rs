//! Client models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Bank client. Accounts reference their owner through `Account::client_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Internal client ID
    pub id: Uuid,
    /// First name
    pub name: String,
    /// Last name
    pub surname: Option<String>,
    /// Unique personal code, used for lookups
    pub personal_code: String,
}

impl Client {
    /// Create a new client with a fresh ID
    pub fn new(name: impl Into<String>, surname: Option<String>, personal_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            surname,
            personal_code: personal_code.into(),
        }
    }
}
