//! Album selection for incoming media.
//!
//! - `resolver` - caption directive parsing and the fallback chain
//! - `group_cache` - album names shared across a media group burst
//! - `wait` - bounded polling used while a burst is still arriving

mod group_cache;
mod resolver;
mod wait;

pub use group_cache::GroupCache;
pub use resolver::AlbumResolver;
pub use wait::PollPolicy;
