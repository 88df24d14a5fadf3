//! Partner Habit Gateway.
//!
//! Read-only access to a partner's habits, guarded by a mandatory
//! authorization check: the gateway re-derives the requesting user's partner
//! set from the authoritative backend and refuses any partner id that is not
//! in it. A client-supplied id is never trusted on its own.

use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::backend::HabitBackend;
use crate::error::{ClientError, Result};
use crate::resolver::{parse_account_id, IntegrityWarning, PartnerResolver};
use crate::types::{Habit, PartnerView};

/// Habit fetch outcome for one partner. A failed or timed-out fetch is
/// recorded here without affecting sibling partners.
#[derive(Debug)]
pub struct PartnerHabits {
    pub partner: PartnerView,
    pub habits: Result<Vec<Habit>>,
}

/// Aggregate of the concurrent fan-out across all partners, in resolver
/// order, together with the resolver's integrity warnings.
#[derive(Debug)]
pub struct PartnerHabitsReport {
    pub partners: Vec<PartnerHabits>,
    pub warnings: Vec<IntegrityWarning>,
}

/// Fetches partner habits under the read-only partner grant.
pub struct PartnerHabitGateway<B> {
    resolver: PartnerResolver<B>,
}

impl<B: HabitBackend> PartnerHabitGateway<B> {
    pub fn new(backend: B) -> Self {
        Self {
            resolver: PartnerResolver::new(backend),
        }
    }

    /// The resolver backing this gateway.
    pub fn resolver(&self) -> &PartnerResolver<B> {
        &self.resolver
    }

    /// Fetch the habits of a single partner on behalf of a user.
    ///
    /// Fails with `AuthorizationDenied` when the account exists but is not
    /// an active partner of the requesting user, and with `NotFound` when
    /// the account does not exist at all. An authorized partner with zero
    /// habits returns an empty list; callers must keep those three states
    /// apart.
    pub async fn fetch_partner_habits(
        &self,
        requesting_user_id: &str,
        partner_account_id: &str,
    ) -> Result<Vec<Habit>> {
        let user_id = parse_account_id(requesting_user_id)?;
        let partner_id = parse_account_id(partner_account_id)?;

        let resolution = self.resolver.resolve_partners_by_id(user_id).await?;
        if !resolution.contains(partner_id) {
            return match self.resolver.backend().find_account(partner_id).await? {
                None => Err(ClientError::NotFound(format!("account {partner_id}"))),
                Some(_) => {
                    warn!(%user_id, %partner_id, "habit access denied: not an active partner");
                    Err(ClientError::AuthorizationDenied {
                        user_id,
                        partner_id,
                    })
                }
            };
        }

        debug!(%user_id, %partner_id, "fetching partner habits");
        self.resolver.backend().habits_of(partner_id).await
    }

    /// Resolve the user's partners once, then fetch every partner's habits
    /// concurrently.
    ///
    /// One partner's transport failure or elapsed deadline is recorded in
    /// that partner's slot of the report; completed sibling results are
    /// always returned.
    pub async fn fetch_all_partner_habits(
        &self,
        requesting_user_id: &str,
        per_partner_deadline: Option<Duration>,
    ) -> Result<PartnerHabitsReport> {
        let user_id = parse_account_id(requesting_user_id)?;
        let resolution = self.resolver.resolve_partners_by_id(user_id).await?;

        let backend = self.resolver.backend();
        let fetches = resolution.partners.iter().map(|partner| async move {
            let fetch = backend.habits_of(partner.account_id);
            let habits = match per_partner_deadline {
                Some(deadline) => match timeout(deadline, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(ClientError::Timeout(deadline)),
                },
                None => fetch.await,
            };
            if let Err(ref err) = habits {
                warn!(partner_id = %partner.account_id, %err, "partner habit fetch failed");
            }
            PartnerHabits {
                partner: partner.clone(),
                habits,
            }
        });

        Ok(PartnerHabitsReport {
            partners: join_all(fetches).await,
            warnings: resolution.warnings,
        })
    }
}
