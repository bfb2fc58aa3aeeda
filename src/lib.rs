//! revise - non-destructive history rewriting for Git
//!
//! revise rewrites a range of commits through an editable todo list:
//! commits can be reordered, reworded, folded into each other, split in
//! two, or left staged. The working tree is never touched, and nothing
//! is written to HEAD until the whole list has been applied.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Plan -> Autosquash -> Edit -> Validate -> Apply
//! - [`core`] - Domain types, configuration and path routing
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Output and interactive editing
//!
//! # Correctness Invariants
//!
//! 1. Commits are never mutated; rewriting always writes new objects
//! 2. Edited todo lists are validated before anything is applied
//! 3. Dropping a commit is only allowed when it loses no content
//! 4. Ref updates use compare-and-swap

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
