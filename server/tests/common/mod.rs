#![allow(dead_code)]

pub mod test_database;
pub mod test_environment;

pub use test_database::{ConflictingDatabase, FailingDatabase};
pub use test_environment::TestEnvironment;
