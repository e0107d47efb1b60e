pub mod manager;
pub mod models;
pub mod notes;
pub mod tokens;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{Note, User};
