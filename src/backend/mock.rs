//! In-memory backend for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::ledger;
use crate::types::{Account, Habit, PartnerRow, Relationship};

use super::traits::HabitBackend;

/// Configurable in-memory backend.
///
/// By default `partner_rows` is derived from the stored relationships the
/// same way the remote `get_partners` procedure derives it, so tests
/// exercise the real normalization. Individual users can be given canned
/// RPC rows instead (e.g. rows with a missing `partner_id`), and habit
/// queries for chosen owners can be made to fail, to simulate a partially
/// unhealthy backend.
#[derive(Default)]
pub struct MockBackend {
    accounts: Vec<Account>,
    habits: Vec<Habit>,
    relationships: Vec<Relationship>,
    canned_partner_rows: HashMap<Uuid, Vec<PartnerRow>>,
    failing_habit_owners: HashSet<Uuid>,
    habit_query_count: AtomicU32,
    partner_query_count: AtomicU32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_habit(mut self, habit: Habit) -> Self {
        self.habits.push(habit);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Replace the derived RPC response for one user with canned rows.
    pub fn with_partner_rows(mut self, user_id: Uuid, rows: Vec<PartnerRow>) -> Self {
        self.canned_partner_rows.insert(user_id, rows);
        self
    }

    /// Make habit queries for this owner fail with a server error.
    pub fn with_failing_habits(mut self, owner_id: Uuid) -> Self {
        self.failing_habit_owners.insert(owner_id);
        self
    }

    /// Number of habit queries issued so far.
    pub fn habit_query_count(&self) -> u32 {
        self.habit_query_count.load(Ordering::SeqCst)
    }

    /// Number of `get_partners` queries issued so far.
    pub fn partner_query_count(&self) -> u32 {
        self.partner_query_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HabitBackend for MockBackend {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.clone())
    }

    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.iter().find(|a| a.id == account_id).cloned())
    }

    async fn habits_of(&self, owner_id: Uuid) -> Result<Vec<Habit>> {
        self.habit_query_count.fetch_add(1, Ordering::SeqCst);

        if self.failing_habit_owners.contains(&owner_id) {
            return Err(ClientError::Server {
                status: 503,
                message: "habit store unavailable".to_string(),
            });
        }

        let mut habits: Vec<Habit> = self
            .habits
            .iter()
            .filter(|h| h.owner_id == owner_id)
            .cloned()
            .collect();
        habits.sort_by_key(|h| h.created_at);
        Ok(habits)
    }

    async fn partner_rows(&self, user_id: Uuid) -> Result<Vec<PartnerRow>> {
        self.partner_query_count.fetch_add(1, Ordering::SeqCst);

        if let Some(rows) = self.canned_partner_rows.get(&user_id) {
            return Ok(rows.clone());
        }
        Ok(ledger::derive_partner_rows(
            &self.relationships,
            &self.accounts,
            user_id,
        ))
    }

    async fn list_relationships(&self) -> Result<Vec<Relationship>> {
        Ok(self.relationships.clone())
    }
}
