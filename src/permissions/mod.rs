//! Permission system deciding which chats may forward media.
//!
//! ## Policy
//!
//! - Private chats: only configured admins.
//! - Groups: allowed while any configured admin is a member. A positive
//!   answer is cached per chat for an hour.
//!
//! ## Usage
//!
//! ```rust
//! let perms = Permissions::new(admins, AuthorizationCache::new(), probe, timeout);
//!
//! if perms.decide(&chat, sender_id).await {
//!     // ...
//! }
//! ```

mod admins;
mod auth_cache;
mod checker;
mod probe;

pub use admins::AdminSet;
pub use auth_cache::AuthorizationCache;
pub use checker::Permissions;
pub use probe::{MembershipProbe, TelegramProbe};
#[cfg_attr(not(test), allow(unused_imports))]
pub use probe::{MemberStatus, ProbeError};
