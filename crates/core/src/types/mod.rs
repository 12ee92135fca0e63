//! Core types for Hello Laundry.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod mobile;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use mobile::{Mobile, MobileError};
pub use price::Price;
pub use status::*;
