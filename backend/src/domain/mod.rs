//! # Domain Module
//!
//! Business rules of the family rewards ledger.
//!
//! ## Core Components
//!
//! - **Ledger** ([`ledger`]): pure balance arithmetic and the task / redemption
//!   state machines
//! - **Commands** ([`commands`]): one enum variant per mutation, each naming
//!   the persisted collections it touches
//! - **State** ([`state`]): the reducer that validates and applies commands
//! - **Store** ([`family_store`]): named operations over the reducer, with
//!   write-back to storage
//! - **Catalog** ([`catalog`]): first-run family profile and starter rewards
//!
//! Points move in exactly two places: approving a task credits the child's
//! settled total, approving a redemption debits it. Everything else only
//! changes what is pending.

pub mod catalog;
pub mod commands;
pub mod errors;
pub mod family_store;
pub mod ledger;
pub mod state;

pub use catalog::FamilySeed;
pub use commands::{Collection, FamilyCommand};
pub use errors::{FamilyError, FamilyResult, ValidationError};
pub use family_store::FamilyStore;
pub use ledger::{PointBalance, Transition};
pub use state::FamilyState;
