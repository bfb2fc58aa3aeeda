//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//! - [`editor`] - Interactive editing collaborators
//! - [`scripted`] - Scripted editor for tests
//!
//! # Design
//!
//! All output and all interactive editing go through this module, so the
//! engine can run unchanged against a terminal or against a script.

pub mod editor;
pub mod output;
pub mod scripted;
