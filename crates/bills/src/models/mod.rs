//! Domain models for the bill tracker.
//!
//! These types represent validated domain objects separate from database row types.

pub mod bill;
pub mod session;
pub mod user;

pub use bill::{BILL_CATEGORIES, Bill, BillDraft, BillDraftError, BillFilter, BillScope};
pub use session::{CurrentUser, keys};
pub use user::{User, UserStats};
