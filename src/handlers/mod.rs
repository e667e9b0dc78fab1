pub mod ai;
pub mod auth;
pub mod goals;
pub mod health;
pub mod journals;
pub mod moods;
pub mod reports;
