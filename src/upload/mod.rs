//! Upload pipeline for approved media messages.

mod orchestrator;
mod platform;

pub use orchestrator::{UploadOutcome, Uploader};
pub use platform::{ChatPlatform, TelegramPlatform};
#[cfg_attr(not(test), allow(unused_imports))]
pub use platform::{FetchedFile, PlatformError};
