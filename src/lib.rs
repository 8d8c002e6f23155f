//! bindery - Multi-repository build-dependency manager
//!
//! bindery scans a workspace of source repositories, binds their
//! projects, external binaries, and versioned packages into a unified
//! dependency graph (the *anthology*), keeps the packages that graph
//! needs available in a local content cache, and rewrites the graph to
//! remove redundant references.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates down)
//! - [`core`] - Domain types, the anthology graph, persistence, config
//! - [`feed`] - Remote package feed clients and multi-feed search
//! - [`cache`] - Archive cache, installation, corruption recovery
//! - [`install`] - Per-package acquisition engine (bounded concurrency)
//! - [`optimize`] - Graph-rewriting passes
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! bindery maintains the following invariants:
//!
//! 1. Graph values are immutable; every mutator returns a new graph
//! 2. A graph with dangling or self-referential edges is never persisted
//! 3. A package's pinned version only moves forward
//! 4. A corrupt cache entry is purged the moment it is detected

pub mod cache;
pub mod cli;
pub mod core;
pub mod feed;
pub mod install;
pub mod optimize;
pub mod ui;
