//! Item source abstraction layer.
//!
//! This module defines the [`ItemSource`] trait and the common
//! [`CatalogItem`] type.  The only concrete source is [`RandomItemFetcher`],
//! which draws a random id and fetches it from PokeAPI.
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory (e.g. `local_dump.rs`).
//! 2. Define a struct and implement [`ItemSource`] for it.
//! 3. Add `mod local_dump;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of the PokeAPI fetcher.
//!
//! The refresh controller, the event loop and the UI are source-agnostic.

mod catalog_item;
mod error;
mod poke_api;
mod sampler;

pub use catalog_item::CatalogItem;
pub use error::{FetchError, FetchErrorKind};
pub use poke_api::{RandomItemFetcher, DEFAULT_BASE_URL};
pub use sampler::IdSampler;

use std::future::Future;
use std::pin::Pin;

/// The pending network half of a fetch, runnable on any tokio worker.
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<CatalogItem, FetchError>> + Send>>;

/// Trait that every item source must implement.
///
/// [`fetch()`](ItemSource::fetch) is called on the task that owns the
/// application state.  Any bookkeeping (such as choosing which id to request)
/// happens synchronously inside the call; the returned future only performs
/// I/O and decoding, so the event loop can `tokio::spawn` it and keep
/// drawing frames.
///
/// ```ignore
/// struct Fixed(CatalogItem);
///
/// impl ItemSource for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     fn fetch(&mut self) -> FetchFuture {
///         let item = self.0.clone();
///         Box::pin(async move { Ok(item) })
///     }
/// }
/// ```
pub trait ItemSource: Send {
    /// Human-readable label used in logs and the status bar.
    fn name(&self) -> &str;

    /// Start one fetch.  The future resolves to exactly one item or exactly
    /// one error.
    fn fetch(&mut self) -> FetchFuture;
}
