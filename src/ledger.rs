//! Pure partner derivation over raw relationship ledger rows.
//!
//! The remote `get_partners` stored procedure is a join-and-normalize step
//! that collapses the directional two-column relationship record into a
//! symmetric partner view. This module reimplements that step as plain
//! functions so the symmetry and filtering rules are testable in isolation,
//! and so diagnostics can cross-check the RPC against the raw ledger.

use uuid::Uuid;

use crate::types::{Account, PartnerRow, Relationship, RelationshipStatus};

/// One side of an active relationship, normalized from the perspective of a
/// given account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerLink {
    pub relationship_id: Uuid,
    pub partner_id: Uuid,
    pub status: RelationshipStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Active partners of `account_id`, regardless of which column the account
/// was stored in. Self-referential rows violate the ledger invariant and are
/// skipped. Result is ordered by `created_at` ascending; the sort is stable,
/// so rows with equal timestamps keep their ledger order.
pub fn active_partner_links(rows: &[Relationship], account_id: Uuid) -> Vec<PartnerLink> {
    let mut links: Vec<PartnerLink> = rows
        .iter()
        .filter(|r| r.status == RelationshipStatus::Active)
        .filter(|r| r.user_id != r.partner_id)
        .filter_map(|r| {
            let partner_id = if r.user_id == account_id {
                r.partner_id
            } else if r.partner_id == account_id {
                r.user_id
            } else {
                return None;
            };
            Some(PartnerLink {
                relationship_id: r.id,
                partner_id,
                status: r.status,
                created_at: r.created_at,
            })
        })
        .collect();
    links.sort_by_key(|l| l.created_at);
    links
}

/// Rebuild the rows the `get_partners` procedure would return, joining each
/// link against the account directory for usernames. A partner whose account
/// record is missing yields a row without `partner_id`/`partner_username`,
/// which the resolver reports as an integrity warning rather than a partner.
pub fn derive_partner_rows(
    relationships: &[Relationship],
    accounts: &[Account],
    user_id: Uuid,
) -> Vec<PartnerRow> {
    let username_of = |id: Uuid| {
        accounts
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.username.clone())
    };

    active_partner_links(relationships, user_id)
        .into_iter()
        .map(|link| {
            let partner_username = username_of(link.partner_id);
            let partner_resolvable = partner_username.is_some();
            PartnerRow {
                id: link.relationship_id,
                user_id: Some(user_id),
                username: username_of(user_id),
                partner_id: partner_resolvable.then_some(link.partner_id),
                partner_username,
                status: link.status,
                created_at: Some(link.created_at),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rel(
        id: u128,
        user: Uuid,
        partner: Uuid,
        status: RelationshipStatus,
        minute: u32,
    ) -> Relationship {
        Relationship {
            id: Uuid::from_u128(id),
            user_id: user,
            partner_id: partner,
            status,
            created_at: Utc.with_ymd_and_hms(2025, 6, 12, 10, minute, 0).unwrap(),
        }
    }

    #[test]
    fn symmetric_over_both_columns() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let rows = vec![rel(10, a, b, RelationshipStatus::Active, 0)];

        let from_a = active_partner_links(&rows, a);
        let from_b = active_partner_links(&rows, b);
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].partner_id, b);
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_b[0].partner_id, a);
    }

    #[test]
    fn non_active_rows_excluded() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);
        let rows = vec![
            rel(10, a, b, RelationshipStatus::Pending, 0),
            rel(11, c, a, RelationshipStatus::Ended, 1),
        ];
        assert!(active_partner_links(&rows, a).is_empty());
    }

    #[test]
    fn self_link_skipped() {
        let a = Uuid::from_u128(1);
        let rows = vec![rel(10, a, a, RelationshipStatus::Active, 0)];
        assert!(active_partner_links(&rows, a).is_empty());
    }

    #[test]
    fn ordered_by_created_at_ascending() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);
        let rows = vec![
            rel(11, c, a, RelationshipStatus::Active, 5),
            rel(10, a, b, RelationshipStatus::Active, 1),
        ];
        let links = active_partner_links(&rows, a);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].partner_id, b);
        assert_eq!(links[1].partner_id, c);
    }

    #[test]
    fn unrelated_account_sees_nothing() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let rows = vec![rel(10, a, b, RelationshipStatus::Active, 0)];
        assert!(active_partner_links(&rows, Uuid::from_u128(99)).is_empty());
    }

    #[test]
    fn derived_row_marks_dangling_partner() {
        let a = Uuid::from_u128(1);
        let ghost = Uuid::from_u128(2);
        let accounts = vec![Account {
            id: a,
            username: "user2".into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        }];
        let rows = vec![rel(10, a, ghost, RelationshipStatus::Active, 0)];

        let derived = derive_partner_rows(&rows, &accounts, a);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].partner_id, None);
        assert_eq!(derived[0].partner_username, None);
        assert_eq!(derived[0].username.as_deref(), Some("user2"));
    }
}
