//! Partner Resolver.
//!
//! Given an account id, returns the accounts currently partnered with it by
//! querying the backend's `get_partners` RPC and normalizing the rows.
//! Inconsistent rows (missing partner id or username, self-references) are
//! dropped and reported as integrity warnings; they never fail the call.

use tracing::warn;
use uuid::Uuid;

use crate::backend::HabitBackend;
use crate::error::{ClientError, Result};
use crate::types::{PartnerRow, PartnerView, RelationshipStatus};

/// A ledger row that was resolvable but inconsistent. Recovered locally:
/// the row is excluded from the result and the call still succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityWarning {
    pub relationship_id: Uuid,
    pub detail: String,
}

/// Outcome of partner resolution: the usable partners plus any rows that
/// were dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub partners: Vec<PartnerView>,
    pub warnings: Vec<IntegrityWarning>,
}

impl Resolution {
    /// Whether `account_id` is among the resolved partners.
    pub fn contains(&self, account_id: Uuid) -> bool {
        self.partners.iter().any(|p| p.account_id == account_id)
    }
}

/// Parse a caller-supplied account id, rejecting empty or malformed values.
pub fn parse_account_id(raw: &str) -> Result<Uuid> {
    if raw.trim().is_empty() {
        return Err(ClientError::InvalidArgument("empty account id".to_string()));
    }
    Uuid::parse_str(raw.trim())
        .map_err(|_| ClientError::InvalidArgument(format!("malformed account id: {raw:?}")))
}

/// Resolves the current partner set of an account.
pub struct PartnerResolver<B> {
    backend: B,
}

impl<B: HabitBackend> PartnerResolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend, for callers that need adjacent reads.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve the active partners of `user_id`.
    ///
    /// A user with no active relationships resolves to an empty partner
    /// list, which is a success, not an error.
    pub async fn resolve_partners(&self, user_id: &str) -> Result<Resolution> {
        let user_id = parse_account_id(user_id)?;
        self.resolve_partners_by_id(user_id).await
    }

    /// Same as [`resolve_partners`](Self::resolve_partners) for an already
    /// validated id.
    pub async fn resolve_partners_by_id(&self, user_id: Uuid) -> Result<Resolution> {
        let rows = self.backend.partner_rows(user_id).await?;
        Ok(normalize_rows(user_id, rows))
    }
}

/// Turn raw RPC rows into the partner view.
///
/// This is the single enforcement point of the active-status predicate on
/// the production path. Rows are ordered by `created_at` ascending for
/// determinism; the sort is stable, so equal timestamps keep the order the
/// backend returned them in, and rows without a timestamp sort first.
fn normalize_rows(user_id: Uuid, mut rows: Vec<PartnerRow>) -> Resolution {
    rows.sort_by_key(|r| r.created_at);

    let mut resolution = Resolution::default();
    for row in rows {
        if row.status != RelationshipStatus::Active {
            continue;
        }

        let Some(partner_id) = row.partner_id else {
            drop_row(&mut resolution, row.id, "row has no partner_id");
            continue;
        };
        if partner_id == user_id {
            drop_row(&mut resolution, row.id, "row is self-referential");
            continue;
        }
        let Some(username) = row.partner_username else {
            drop_row(
                &mut resolution,
                row.id,
                "partner account has no resolvable username",
            );
            continue;
        };

        resolution.partners.push(PartnerView {
            account_id: partner_id,
            username,
            relationship_id: row.id,
            relationship_status: row.status,
        });
    }
    resolution
}

fn drop_row(resolution: &mut Resolution, relationship_id: Uuid, detail: &str) {
    warn!(%relationship_id, detail, "dropping inconsistent partner row");
    resolution.warnings.push(IntegrityWarning {
        relationship_id,
        detail: detail.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::types::{Account, Relationship};
    use chrono::{TimeZone, Utc};

    const USER2: &str = "3cd85802-29a0-4153-b685-1d9beb2a86be";
    const USER3: &str = "e7e719dc-e0a2-488c-a3e0-8c4086366721";

    fn account(id: Uuid, username: &str) -> Account {
        Account {
            id,
            username: username.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    fn active(id: u128, user: Uuid, partner: Uuid, minute: u32) -> Relationship {
        Relationship {
            id: Uuid::from_u128(id),
            user_id: user,
            partner_id: partner,
            status: RelationshipStatus::Active,
            created_at: Utc.with_ymd_and_hms(2025, 6, 12, 10, minute, 0).unwrap(),
        }
    }

    fn paired_backend() -> (Uuid, Uuid, MockBackend) {
        let u2 = Uuid::parse_str(USER2).unwrap();
        let u3 = Uuid::parse_str(USER3).unwrap();
        let backend = MockBackend::new()
            .with_account(account(u2, "user2"))
            .with_account(account(u3, "user3"))
            .with_relationship(active(10, u2, u3, 0));
        (u2, u3, backend)
    }

    #[tokio::test]
    async fn resolves_partner_for_user2() {
        let (_, u3, backend) = paired_backend();
        let resolver = PartnerResolver::new(backend);

        let resolution = resolver.resolve_partners(USER2).await.unwrap();
        assert_eq!(resolution.partners.len(), 1);
        assert_eq!(resolution.partners[0].account_id, u3);
        assert_eq!(resolution.partners[0].username, "user3");
        assert_eq!(
            resolution.partners[0].relationship_status,
            RelationshipStatus::Active
        );
        assert!(resolution.warnings.is_empty());
    }

    #[tokio::test]
    async fn resolution_is_symmetric() {
        let (u2, u3, backend) = paired_backend();
        let resolver = PartnerResolver::new(backend);

        let from_u2 = resolver.resolve_partners_by_id(u2).await.unwrap();
        let from_u3 = resolver.resolve_partners_by_id(u3).await.unwrap();
        assert!(from_u2.contains(u3));
        assert!(from_u3.contains(u2));
    }

    #[tokio::test]
    async fn no_relationships_is_empty_not_error() {
        let u2 = Uuid::parse_str(USER2).unwrap();
        let backend = MockBackend::new().with_account(account(u2, "user2"));
        let resolver = PartnerResolver::new(backend);

        let resolution = resolver.resolve_partners(USER2).await.unwrap();
        assert!(resolution.partners.is_empty());
        assert!(resolution.warnings.is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_and_malformed_ids() {
        let resolver = PartnerResolver::new(MockBackend::new());

        assert!(matches!(
            resolver.resolve_partners("").await,
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolver.resolve_partners("not-a-uuid").await,
            Err(ClientError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn idempotent_for_unchanged_ledger() {
        let (u2, _, backend) = paired_backend();
        let resolver = PartnerResolver::new(backend);

        let first = resolver.resolve_partners_by_id(u2).await.unwrap();
        let second = resolver.resolve_partners_by_id(u2).await.unwrap();
        assert_eq!(first.partners, second.partners);
    }

    #[tokio::test]
    async fn row_without_partner_id_becomes_warning() {
        let u2 = Uuid::parse_str(USER2).unwrap();
        let u3 = Uuid::parse_str(USER3).unwrap();
        let rows = vec![
            PartnerRow {
                id: Uuid::from_u128(10),
                user_id: Some(u2),
                username: Some("user2".into()),
                partner_id: Some(u3),
                partner_username: Some("user3".into()),
                status: RelationshipStatus::Active,
                created_at: Some(Utc.with_ymd_and_hms(2025, 6, 12, 10, 0, 0).unwrap()),
            },
            PartnerRow {
                id: Uuid::from_u128(11),
                user_id: Some(u2),
                username: Some("user2".into()),
                partner_id: None,
                partner_username: None,
                status: RelationshipStatus::Active,
                created_at: Some(Utc.with_ymd_and_hms(2025, 6, 12, 10, 1, 0).unwrap()),
            },
        ];
        let backend = MockBackend::new().with_partner_rows(u2, rows);
        let resolver = PartnerResolver::new(backend);

        let resolution = resolver.resolve_partners_by_id(u2).await.unwrap();
        assert_eq!(resolution.partners.len(), 1);
        assert_eq!(resolution.partners[0].account_id, u3);
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].relationship_id, Uuid::from_u128(11));
    }

    #[tokio::test]
    async fn multiple_partners_ordered_by_created_at() {
        let u2 = Uuid::parse_str(USER2).unwrap();
        let u3 = Uuid::parse_str(USER3).unwrap();
        let u4 = Uuid::from_u128(4);
        let backend = MockBackend::new()
            .with_account(account(u2, "user2"))
            .with_account(account(u3, "user3"))
            .with_account(account(u4, "user4"))
            .with_relationship(active(11, u4, u2, 5))
            .with_relationship(active(10, u2, u3, 1));
        let resolver = PartnerResolver::new(backend);

        let resolution = resolver.resolve_partners_by_id(u2).await.unwrap();
        let ids: Vec<Uuid> = resolution.partners.iter().map(|p| p.account_id).collect();
        assert_eq!(ids, vec![u3, u4]);
    }

    #[tokio::test]
    async fn pending_rows_not_surfaced_as_partners() {
        let u2 = Uuid::parse_str(USER2).unwrap();
        let u3 = Uuid::parse_str(USER3).unwrap();
        let rows = vec![PartnerRow {
            id: Uuid::from_u128(10),
            user_id: Some(u2),
            username: Some("user2".into()),
            partner_id: Some(u3),
            partner_username: Some("user3".into()),
            status: RelationshipStatus::Pending,
            created_at: None,
        }];
        let backend = MockBackend::new().with_partner_rows(u2, rows);
        let resolver = PartnerResolver::new(backend);

        let resolution = resolver.resolve_partners_by_id(u2).await.unwrap();
        assert!(resolution.partners.is_empty());
    }
}
