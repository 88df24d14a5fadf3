//! Data contracts for the hosted backend.
//!
//! Wire format is PostgREST JSON with snake_case columns; ids are UUIDs and
//! timestamps are RFC 3339. Enumerated columns carry a catch-all variant so
//! an unrecognized backend value degrades a single row instead of failing
//! the whole response decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client configuration for the hosted backend.
///
/// Both credentials are opaque pass-through values supplied by the auth
/// layer; the client never inspects or validates them.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project base URL (e.g. "https://xyz.supabase.co")
    pub base_url: String,
    /// Value for the `apikey` header
    pub api_key: String,
    /// Bearer token for the `Authorization` header; falls back to `api_key`
    pub bearer_token: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            bearer_token: None,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// REST root for table and RPC endpoints.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url.trim_end_matches('/'))
    }

    /// Effective bearer token for the `Authorization` header.
    pub fn bearer(&self) -> &str {
        self.bearer_token.as_deref().unwrap_or(&self.api_key)
    }
}

/// A registered user account. Read-only from this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Category tag on a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    Basic,
    /// Backend value this client version does not know
    #[serde(other)]
    Unknown,
}

/// A habit record, owned exclusively by the account in `owner_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a partnership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Pending,
    Active,
    Ended,
    #[serde(other)]
    Unknown,
}

/// Raw ledger row. The persisted record is directional (two id columns) but
/// the partnership it represents is undirected; consumers must apply
/// symmetric matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub partner_id: Uuid,
    pub status: RelationshipStatus,
    pub created_at: DateTime<Utc>,
}

/// One row from the `get_partners` RPC.
///
/// The remote function already normalizes direction, but rows can arrive
/// with a missing `partner_id` or `partner_username` (dangling account
/// reference); the resolver drops those rather than surfacing them as
/// usable partners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerRow {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub partner_id: Option<Uuid>,
    #[serde(default)]
    pub partner_username: Option<String>,
    pub status: RelationshipStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A resolved partner as surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerView {
    pub account_id: Uuid,
    pub username: String,
    pub relationship_id: Uuid,
    pub relationship_status: RelationshipStatus,
}
