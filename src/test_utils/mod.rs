//! Helpers for exercising contexts without a real database.

pub mod mock;
pub mod test_helpers;

pub use mock::{ExecutedCommand, MockCommand, MockConnection, MockResponse, MockTransaction};
pub use test_helpers::{create_test_row, result_set};
