//! Data models for the database manager.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::{Database, DatabaseType};
pub use query::{AttributeValue, DriverAttribute, FetchStyle, QueryParam};
