//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence gateway contracts the services depend on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Multi-row mutations (family cascade, guarded inserts) run in one
//!   `IMMEDIATE` transaction.

pub mod family_repo;
pub mod request_repo;
mod schema;
