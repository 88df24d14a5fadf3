//! Partner resolution and cross-account habit visibility for the Habit
//! Level Up backend.
//!
//! The hosted backend (Supabase/PostgREST) owns accounts, habits, and the
//! relationship ledger. This crate implements the client-side rules that,
//! given a user, determine their current partner(s) and which habit records
//! the user may read on a partner's behalf:
//!
//! - [`PartnerResolver`] — normalizes the `get_partners` RPC into a
//!   symmetric partner view, dropping inconsistent rows as warnings.
//! - [`PartnerHabitGateway`] — fetches a partner's habits under the
//!   read-only partner grant, re-deriving the partner set for every call
//!   instead of trusting a caller-supplied id.
//! - [`ledger`] — pure, testable rendition of the remote join-and-normalize
//!   step, used by diagnostics to cross-check the RPC.
//!
//! # Example
//!
//! ```rust,no_run
//! use habitlevelup_client::{BackendConfig, PartnerHabitGateway, RestBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RestBackend::new(BackendConfig {
//!     base_url: "https://project.supabase.co".into(),
//!     api_key: "anon-key".into(),
//!     ..Default::default()
//! });
//!
//! let gateway = PartnerHabitGateway::new(backend);
//! let report = gateway
//!     .fetch_all_partner_habits("3cd85802-29a0-4153-b685-1d9beb2a86be", None)
//!     .await?;
//!
//! for entry in &report.partners {
//!     match &entry.habits {
//!         Ok(habits) => println!("{}: {} habits", entry.partner.username, habits.len()),
//!         Err(err) => println!("{}: fetch failed: {err}", entry.partner.username),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod resolver;
pub mod types;

// Re-export main types
pub use backend::{HabitBackend, MockBackend, RestBackend};
pub use error::{ClientError, Result};
pub use gateway::{PartnerHabitGateway, PartnerHabits, PartnerHabitsReport};
pub use resolver::{IntegrityWarning, PartnerResolver, Resolution};
pub use types::*;
