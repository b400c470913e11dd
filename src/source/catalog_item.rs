//! The catalog record shown on each card, and its wire format.
//!
//! PokeAPI returns a large document per creature; only the id, the name and
//! the official-artwork URL are read.  Everything else is ignored by serde.

use serde::Deserialize;
use url::Url;

use super::FetchError;

/// A single decoded catalog entry.
///
/// Immutable once decoded.  `id` is the key the sampler excludes on, so no
/// two items in one session share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: u32,
    pub name: String,
    /// Absolute URL of the representative image.  Rendering only displays
    /// it; fetching the image is left to whatever viewer the user opens.
    pub image_url: Url,
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WireItem {
    id: u32,
    name: String,
    sprites: WireSprites,
}

#[derive(Deserialize)]
struct WireSprites {
    other: WireOther,
}

#[derive(Deserialize)]
struct WireOther {
    #[serde(rename = "official-artwork")]
    official_artwork: WireArtwork,
}

#[derive(Deserialize)]
struct WireArtwork {
    front_default: Url,
}

impl From<WireItem> for CatalogItem {
    fn from(wire: WireItem) -> Self {
        CatalogItem {
            id: wire.id,
            name: wire.name,
            image_url: wire.sprites.other.official_artwork.front_default,
        }
    }
}

impl CatalogItem {
    /// Decode one response body.
    ///
    /// Pure (no I/O) so the decoding rules can be tested without a server.
    /// An empty body is [`FetchError::NoData`]; anything that is not the
    /// expected shape is [`FetchError::Decoding`].
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        if body.is_empty() {
            return Err(FetchError::NoData);
        }
        let wire: WireItem = serde_json::from_slice(body)?;
        Ok(wire.into())
    }

    /// Name with the first letter of every word upper-cased
    /// (`"mr-mime"` becomes `"Mr-Mime"`).
    pub fn display_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut at_word_start = true;
        for c in self.name.chars() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = !c.is_alphanumeric();
        }
        out
    }
}
