//! Raw byte retrieval for log and distributor resources.
//!
//! A [`ByteFetcher`] is built once per configured root location and then asked
//! for paths relative to that root. Supported roots:
//!
//! - `http://` / `https://`: HTTP GET via `reqwest`.
//! - `file://` or a plain filesystem path: read from local disk.
//! - [`MemoryFetcher`]: an in-process map, for tests and local fixtures.
//!
//! There is no caching and no retry. Every fetch is fallible and callers are
//! expected to keep their previous state when one fails.

mod error;
mod fetcher;

pub use error::FetchError;
pub use fetcher::{ByteFetcher, MemoryFetcher};
