//! Restoreplan engine - dependency resolution for tenant backup/restore
//!
//! This crate implements the graph engine behind backup extraction and
//! restore planning:
//! - Graph construction from catalog foreign-key edges
//! - Topological ordering (Kahn's algorithm) for restore and extraction
//! - Elementary cycle detection
//! - Transitive dependency closure
//! - Parallel group (level) assignment
//! - TTL-cached graph builds behind the [`DependencyResolver`] facade

pub mod builder;
pub mod cache;
pub mod closure;
pub mod cycles;
pub mod groups;
pub mod resolver;
pub mod sort;

pub use builder::build_graph;
pub use cache::{schema_set_key, GraphCache};
pub use closure::all_dependencies;
pub use cycles::detect_cycles;
pub use groups::assign_groups;
pub use resolver::{DependencyResolver, ResolveError};
pub use sort::{sort_for_extraction, sort_for_restore};
