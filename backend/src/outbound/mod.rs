//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories and the balance ledger,
//!   using Diesel ORM.
//! - **security**: Argon2id password hashing and HS256 session tokens.
//! - **memory**: in-memory storage for tests (feature `test-support`).
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business rules.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod persistence;
pub mod security;
