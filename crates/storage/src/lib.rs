//! Storage abstraction and implementations for Planwise.
//!
//! This crate provides the trait through which the performance engine reads
//! projects and tasks and writes task changes and analysis history, plus a
//! JSON file reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
