//! Clementine Core - Shared types library.
//!
//! This crate provides common types used across all Clementine components:
//! - `commerce` - Order lifecycle and inventory consistency subsystem
//! - `integration-tests` - Cross-module test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
