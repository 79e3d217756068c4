//! Database module
//!
//! The membership store abstraction and its PostgreSQL and in-memory implementations

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, health_check, pool_options, run_migrations};
pub use memory::MemoryStore;
pub use service::PgMembershipStore;
pub use store::{ActivityMark, MembershipStore, RegisterOutcome};
