//! Backend access layer.
//!
//! Trait-based seam over the hosted backend:
//! - `rest` — production PostgREST/RPC client
//! - `mock` — in-memory backend for tests

pub mod mock;
pub mod rest;
pub mod traits;

pub use mock::MockBackend;
pub use rest::RestBackend;
pub use traits::HabitBackend;
