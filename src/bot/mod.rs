//! Bot module - Core bot functionality.

pub mod dispatcher;
mod runtime;
mod webhook;

pub use dispatcher::{AppState, ThrottledBot, build_dispatcher};
pub use runtime::run;
