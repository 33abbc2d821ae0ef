//! In-memory fixtures for exercising collectors without a live `/proc`.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::{ACCESS_LOG, AUTH_LOG};
