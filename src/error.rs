//! Error types for the simulated data source and the aggregation strategies.

use thiserror::Error;

/// A failed fetch from a [`DataSource`](crate::api::DataSource).
///
/// The `Display` text is what ends up in a report's `errors` list and in
/// `EnrichedPost::comment_error`, so it stays short and user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The profile leg failed
    #[error("Failed to fetch user profile")]
    Profile,

    /// The posts leg failed
    #[error("Failed to fetch posts")]
    Posts,

    /// A per-post comment fetch failed
    #[error("Failed to fetch comments")]
    Comments,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_error_message() {
        assert_eq!(FetchError::Comments.to_string(), "Failed to fetch comments");
    }

    #[test]
    fn test_leg_error_messages() {
        assert_eq!(FetchError::Profile.to_string(), "Failed to fetch user profile");
        assert_eq!(FetchError::Posts.to_string(), "Failed to fetch posts");
    }
}
