//! Clementine Commerce library.
//!
//! The order lifecycle and inventory consistency subsystem: everything
//! between "a checkout request arrived" and "the order exists, stock is
//! decremented, and the audit trail matches".
//!
//! # Modules
//!
//! - [`pricing`] - Pure price breakdown computation (items/tax/shipping/discount/total)
//! - [`stock`] - All-or-nothing stock validation over requested line items
//! - [`inventory`] - Inventory ledger: per-product quantity plus append-only history
//! - [`orders`] - Order creation, status transitions, and payment recording
//! - [`payment`] - Payment gateway signature verification
//! - [`db`] - Store traits and the in-memory document store
//! - [`notify`] - Fire-and-continue notification seam
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Unified error taxonomy with stable machine-readable codes
//!
//! HTTP routing, authentication, uploads, and the payment gateway's
//! order/capture flow live outside this crate and talk to it through the
//! seams in [`db`] and [`notify`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod models;
pub mod notify;
pub mod orders;
pub mod payment;
pub mod pricing;
pub mod stock;

pub use error::{CommerceError, Result};
