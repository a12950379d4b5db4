//! Integration test suite for templite
//!
//! End-to-end tests of the public library API and of the `templite` binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **rendering**: Compile-and-render behavior of the template language
//! - **errors**: Syntax and render failures as seen by callers
//! - **concurrency**: Sharing one compiled template across threads
//! - **cli**: The `render` and `check` subcommands

mod cli;
mod concurrency;
mod errors;
mod rendering;
