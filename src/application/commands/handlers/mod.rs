//! Command Handlers 实现

mod synthesize_handlers;

pub use synthesize_handlers::*;
