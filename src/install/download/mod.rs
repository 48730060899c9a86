//! Release artifact download
//!
//! - `platform` - Host architecture detection and artifact naming
//! - `core` - HTTP transfer to disk with timeouts and progress

mod core;
mod platform;

pub use self::core::{Fetcher, HttpFetcher};
pub use platform::Arch;
