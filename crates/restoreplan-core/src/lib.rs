//! Restoreplan Core
//!
//! Core domain model for the backup/restore dependency resolver:
//! - Table identifiers and foreign-key edges
//! - The dependency graph (forward and reverse adjacency)
//! - Resolver configuration (restoreplan.toml)

pub mod config;
pub mod error;
pub mod types;

pub use config::{CatalogConfig, ResolverConfig};
pub use error::CoreError;
pub use types::{DependencyGraph, ForeignKeyEdge, TableId};
