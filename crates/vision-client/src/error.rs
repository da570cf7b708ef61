// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

/// Comprehensive error type for image annotation client operations.
///
/// Pre-flight errors ([`Error::InvalidFeatureKind`], [`Error::EmptyImageSet`],
/// [`Error::InvalidImage`]) are raised before any request leaves the client.
/// Once a batch has been sent only transport failures and structural
/// response problems are reported; an image for which the service found
/// nothing is not an error.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred while reading an image.
    IoError(std::io::Error),
    /// Configuration parsing or loading error.
    ConfigError(config::ConfigError),
    /// JSON serialization or deserialization error.
    JsonError(serde_json::Error),
    /// HTTP request error from the reqwest client.
    HttpError(reqwest::Error),
    /// URL parsing error.
    UrlParseError(url::ParseError),
    /// The service answered with a non-success status code and message.
    ServiceError(u16, String),
    /// The requested feature is not one of the known detection types.
    InvalidFeatureKind(String),
    /// The annotate call was given no images.
    EmptyImageSet,
    /// The response held a different number of entries than the request.
    /// Fields are `(expected, actual)`.
    ResponseCountMismatch(usize, usize),
    /// The image reference could not be turned into a payload.
    InvalidImage(String),
    /// Invalid parameters provided to an operation.
    InvalidParameters(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::ConfigError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::HttpError(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::UrlParseError(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "I/O error: {}", e),
            Error::ConfigError(e) => write!(f, "Configuration error: {}", e),
            Error::JsonError(e) => write!(f, "JSON error: {}", e),
            Error::HttpError(e) => write!(f, "HTTP error: {}", e),
            Error::UrlParseError(e) => write!(f, "URL parse error: {}", e),
            Error::ServiceError(code, msg) => write!(f, "Service error {}: {}", code, msg),
            Error::InvalidFeatureKind(s) => write!(f, "Invalid feature kind: {}", s),
            Error::EmptyImageSet => write!(f, "No images were provided"),
            Error::ResponseCountMismatch(expected, actual) => write!(
                f,
                "Response count mismatch: expected {} responses, received {}",
                expected, actual
            ),
            Error::InvalidImage(s) => write!(f, "Invalid image: {}", s),
            Error::InvalidParameters(s) => write!(f, "Invalid parameters: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::ConfigError(e) => Some(e),
            Error::JsonError(e) => Some(e),
            Error::HttpError(e) => Some(e),
            Error::UrlParseError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidFeatureKind("colors".to_string());
        assert_eq!(err.to_string(), "Invalid feature kind: colors");

        let err = Error::ResponseCountMismatch(2, 1);
        assert!(err.to_string().contains("expected 2"));
        assert!(err.to_string().contains("received 1"));

        let err = Error::ServiceError(403, "API key not valid".to_string());
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(err.source().is_some());
        assert!(Error::EmptyImageSet.source().is_none());
    }
}
