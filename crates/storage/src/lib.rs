//! Expert search storage
//!
//! SQLite corpus source, CSV import and literal search

mod database;
mod import;
mod literal;

pub use database::{NewProfile, ProfileDatabase, PROFILE_TABLE};
pub use import::read_profiles_csv;
