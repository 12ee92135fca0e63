//! Domain types for the API.
//!
//! These types represent validated domain objects separate from database row
//! types; repositories map rows into them and handlers serialize them out.

pub mod cart;
pub mod order;
pub mod user;

pub use cart::{CartLine, CartSnapshot};
pub use order::{Order, OrderLine};
pub use user::{AuthToken, CurrentUser, OtpRecord, User};
