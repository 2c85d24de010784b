pub mod ingredients;
pub mod manager;
pub mod models;
pub mod recipes;
pub mod tags;
pub mod tokens;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
