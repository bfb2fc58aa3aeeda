//! core
//!
//! Core domain types, configuration and path routing for revise.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RefName, Signature
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for revise storage
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod paths;
pub mod types;
