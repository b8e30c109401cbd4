//! # Storage Module
//!
//! Handles persistence of the family store's collections.
//!
//! The domain layer sees storage only through [`KeyValueStorage`]: four keys
//! (family profile, tasks, rewards, redemptions), each holding the JSON
//! snapshot of one collection. Every mutation rewrites the affected keys in
//! full; there is no partial update or migration path.
//!
//! ## Implementations
//!
//! - **SQLite** ([`DbConnection`]): a single `key_values` table accessed with SQLx
//! - **Memory** ([`MemoryStorage`]): HashMap-backed, with a switch to simulate
//!   write failures

pub mod db;
pub mod keys;
pub mod memory;
pub mod traits;

pub use db::DbConnection;
pub use memory::MemoryStorage;
pub use traits::KeyValueStorage;
