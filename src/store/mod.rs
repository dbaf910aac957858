//! In-memory entity store for user records.

pub mod memory;
pub mod user;

pub use memory::UserStore;
pub use user::{User, UserInput};
