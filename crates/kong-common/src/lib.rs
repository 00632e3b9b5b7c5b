//! Shared entity keys and the compiled-in schema table.
//!
//! The table in [`generated`] is produced from the ShotGrid-style CSV field
//! exports and versioned with the application. It is read-only for the life
//! of the process and safe to share across threads.

pub mod entity;
pub mod generated;
pub mod schema;

pub use entity::{EntityKey, ParseEntityError};
pub use schema::{EntitySchema, FieldDescriptor, schema};
