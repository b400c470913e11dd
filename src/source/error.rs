//! Failure modes of a single catalog fetch.
//!
//! Every variant is terminal for the attempt that produced it: nothing in
//! the application retries automatically.  The next auto-refresh tick (or a
//! manual refresh) simply draws a new id.

use thiserror::Error;

/// Why a fetch produced no [`CatalogItem`](super::CatalogItem).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request URL built from the base URL and the drawn id did not parse.
    #[error("the URL provided was invalid: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered successfully but with an empty body.
    #[error("no data was received from the server")]
    NoData,

    /// Transport-level failure, including non-success HTTP statuses.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body did not match the expected item shape.
    #[error("failed to decode the data into a catalog item: {0}")]
    Decoding(#[from] serde_json::Error),

    /// The decoded item carries a different id than the one requested.
    #[error("requested id {requested} but the server returned id {received}")]
    IdMismatch { requested: u32, received: u32 },

    /// Every id in the valid range has already been requested this session.
    #[error("every id in {min}..={max} has already been requested")]
    ExhaustedRange { min: u32, max: u32 },
}

/// Copyable discriminant of [`FetchError`], for observers that only need to
/// know what kind of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    InvalidUrl,
    NoData,
    Network,
    Decoding,
    IdMismatch,
    ExhaustedRange,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::InvalidUrl(_) => FetchErrorKind::InvalidUrl,
            FetchError::NoData => FetchErrorKind::NoData,
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Decoding(_) => FetchErrorKind::Decoding,
            FetchError::IdMismatch { .. } => FetchErrorKind::IdMismatch,
            FetchError::ExhaustedRange { .. } => FetchErrorKind::ExhaustedRange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(FetchError::NoData.kind(), FetchErrorKind::NoData);
        assert_eq!(
            FetchError::ExhaustedRange { min: 1, max: 3 }.kind(),
            FetchErrorKind::ExhaustedRange
        );
        assert_eq!(
            FetchError::IdMismatch { requested: 1, received: 999 }.kind(),
            FetchErrorKind::IdMismatch
        );

        let parse = url::Url::parse("not a url").unwrap_err();
        assert_eq!(FetchError::from(parse).kind(), FetchErrorKind::InvalidUrl);

        let json = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        assert_eq!(FetchError::from(json).kind(), FetchErrorKind::Decoding);
    }

    #[test]
    fn exhausted_range_message_names_the_range() {
        let err = FetchError::ExhaustedRange { min: 1, max: 800 };
        assert_eq!(err.to_string(), "every id in 1..=800 has already been requested");
    }

    #[test]
    fn id_mismatch_message_names_both_ids() {
        let err = FetchError::IdMismatch { requested: 1, received: 999 };
        assert_eq!(err.to_string(), "requested id 1 but the server returned id 999");
    }
}
