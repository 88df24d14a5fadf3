//! Backend abstraction for the hosted habit store.
//!
//! The resolver and gateway talk to the backend only through this trait, so
//! the partner-visibility rules can be exercised against an in-memory
//! backend without a network.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{Account, Habit, PartnerRow, Relationship};

/// Read-only view of the hosted backend.
///
/// Every method is an independent network-style read; callers must tolerate
/// any single call failing without poisoning the others.
#[async_trait]
pub trait HabitBackend: Send + Sync {
    /// All registered accounts.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// A single account by id, `None` when absent.
    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>>;

    /// Habits owned by `owner_id`, ascending by creation time.
    async fn habits_of(&self, owner_id: Uuid) -> Result<Vec<Habit>>;

    /// Rows from the `get_partners` stored procedure for `user_id`.
    ///
    /// This is the authoritative resolution path; raw ledger reads are for
    /// diagnostics only.
    async fn partner_rows(&self, user_id: Uuid) -> Result<Vec<PartnerRow>>;

    /// Raw relationship ledger rows. Diagnostics/introspection only.
    async fn list_relationships(&self) -> Result<Vec<Relationship>>;
}
