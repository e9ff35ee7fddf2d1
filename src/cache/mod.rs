//! Cache module - Typed caches using Moka.
//!
//! Used for remote lookups that are expensive to repeat, such as resolving
//! an Immich album name to its id.
//!
//! ## Usage
//!
//! ```rust
//! let album_ids = TypedCache::<String, String>::new("immich_album_ids", CacheConfig::remote_ids());
//!
//! album_ids.insert(name.clone(), id);
//! let id = album_ids.get(&name);
//! ```

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;
