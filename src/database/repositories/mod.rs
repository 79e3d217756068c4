//! Database repositories module
//!
//! Query functions over a single connection. They take `&mut PgConnection` so
//! the service layer can compose several of them inside one transaction.

pub mod chat;
pub mod membership;
pub mod user;
