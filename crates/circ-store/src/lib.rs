//! Record store contract for the circulation ledger.
//!
//! Persistence is an external collaborator: this crate defines the trait
//! boundaries the ledger talks to, one per entity, plus an in-memory backend.
//!
//! # Boundaries
//!
//! - [`TitleStore`] — catalog CRUD, ISBN/name filter queries, and the
//!   conditional copy-count updates (`reserve_copy` / `release_copy`)
//! - [`ReaderStore`] — borrower registry
//! - [`LoanStore`] — loan records and active-loan queries
//! - [`AnnouncementStore`] — the library notice board
//!
//! # Design Rules
//!
//! 1. Availability is only ever changed through the conditional updates, so
//!    the decrement-if-positive check happens inside the store. A client
//!    that reads `available_copies > 0` and then writes is racing; a client
//!    that calls `reserve_copy` is not.
//! 2. Reads return clones; callers never hold references into the store.
//! 3. All collaborator failures are propagated, never silently ignored.
//!
//! # Backends
//!
//! - [`InMemoryLibrary`] — `RwLock`-guarded maps for tests and embedding

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryLibrary;
pub use traits::{AnnouncementStore, LoanStore, ReaderStore, TitleStore};
