//! Database catalog adapters for foreign-key discovery
//!
//! This crate supplies the raw foreign-key edge list the dependency resolver
//! is built from, by querying a database's information_schema views.
//!
//! ## Features
//!
//! Enable catalog support via Cargo features:
//! - `postgres` - PostgreSQL/Redshift-compatible catalogs
//!
//! ## Example
//!
//! ```rust,ignore
//! use restoreplan_catalog::{CatalogAdapter, PostgresCatalog};
//!
//! let catalog = PostgresCatalog::from_connection_string(
//!     "host=localhost port=5432 dbname=app user=backup password=secret"
//! ).await?;
//! let edges = catalog.fetch_foreign_keys(&["app".to_string()]).await?;
//! ```

pub mod adapter;
pub mod mock;
pub mod postgres;

pub use adapter::{CatalogAdapter, CatalogError};
pub use mock::{MockCatalog, MockCatalogBuilder};
pub use postgres::PostgresCatalog;
