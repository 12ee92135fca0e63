//! Business logic services.
//!
//! Services sit between the HTTP routes and the repositories: routes parse
//! and validate input, services own the domain rules (OTP lifecycle,
//! identity resolution, cart merging, order transitions), repositories own
//! the SQL.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod otp;
pub mod sms;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use orders::{OrderError, OrderService};
pub use otp::{OtpError, OtpService};
pub use sms::{SmsClient, SmsError};
