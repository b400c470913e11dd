//! PokeAPI item source.
//!
//! Each fetch draws a fresh id from the [`IdSampler`], builds
//! `{base_url}pokemon/{id}`, issues one GET and decodes the body.  The
//! decoded id must equal the drawn one.  There is no retry: a failure is
//! reported once and the id stays consumed.

use tracing::debug;
use url::Url;

use super::{CatalogItem, FetchError, FetchFuture, IdSampler, ItemSource};

/// Default PokeAPI root.  Must end with `/` so the path can be appended.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Fetches one random, not-yet-requested catalog item per call.
pub struct RandomItemFetcher {
    client: reqwest::Client,
    base_url: String,
    sampler: IdSampler,
}

impl RandomItemFetcher {
    /// Create a fetcher with a default HTTP client.
    ///
    /// # Arguments
    ///
    /// * `base_url`: API root including the trailing slash (e.g.
    ///   [`DEFAULT_BASE_URL`]).
    /// * `sampler`: owns the valid id range and the requested-id set.
    pub fn new(base_url: impl Into<String>, sampler: IdSampler) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, sampler)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, sampler: IdSampler) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            sampler,
        }
    }

    pub fn sampler(&self) -> &IdSampler {
        &self.sampler
    }

    /// Build the item endpoint for `id`.
    pub fn endpoint_url(base_url: &str, id: u32) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!("{base_url}pokemon/{id}"))?)
    }

    async fn get_item(client: reqwest::Client, id: u32, url: Url) -> Result<CatalogItem, FetchError> {
        let response = client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        let item = CatalogItem::from_json(&body)?;
        if item.id != id {
            return Err(FetchError::IdMismatch {
                requested: id,
                received: item.id,
            });
        }
        Ok(item)
    }
}

impl ItemSource for RandomItemFetcher {
    fn name(&self) -> &str {
        "PokeAPI"
    }

    fn fetch(&mut self) -> FetchFuture {
        // Sampling happens here, on the caller's task; only I/O is deferred.
        let request = self.sampler.draw().and_then(|id| {
            debug!(id, remaining = self.sampler.remaining(), "drew catalog id");
            Ok((id, Self::endpoint_url(&self.base_url, id)?))
        });
        let client = self.client.clone();

        Box::pin(async move {
            let (id, url) = request?;
            Self::get_item(client, id, url).await
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
