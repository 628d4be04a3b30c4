//! Token state models read by the refresh scheduler.

pub mod token;

pub use token::{secret::*, state::*};
