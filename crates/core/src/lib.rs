//! Hello Laundry Core - Shared domain types.
//!
//! This crate provides common types used across all Hello Laundry components:
//! - `api` - Customer-facing marketplace API
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Everything with a side effect lives in the `api`
//! crate; everything that can be unit-tested without a database lives here.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, contacts, prices, and
//!   the order/payment status state machines
//! - [`otp`] - One-time-passcode generation and expiry policy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod otp;
pub mod types;

pub use otp::{OTP_VALIDITY, OtpCode, OtpCodeError};
pub use types::*;
