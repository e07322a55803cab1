//! Core data model shared by the storage layer and the HTTP API.
//!
//! Everything in this crate is pure: no I/O, no clock reads. Callers pass
//! `now` explicitly so the expiration rules can be exercised deterministically.

pub mod access;
pub mod api;
pub mod error;
pub mod flags;
pub mod models;
pub mod transfer;

pub use error::{Denial, Error};
pub use flags::AccountFlags;
pub use models::Account;
pub use transfer::{Transfer, TransferKind};
