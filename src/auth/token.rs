//! Token secrets and the externally owned authorization state.

pub mod secret;
pub mod state;
