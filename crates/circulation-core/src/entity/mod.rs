//! Entities built on the record store: items and locations.

pub mod item;
pub mod location;
pub mod policy;

pub use self::item::{BorrowRequest, Item};
pub use self::location::Location;
pub use self::policy::{ReturnPolicy, SameBorrower, Unchecked, policy_for};
