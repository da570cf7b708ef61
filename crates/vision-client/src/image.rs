// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Image references and the payloads they resolve to.
//!
//! An [`ImageSource`] names an image the way a caller has it at hand: a local
//! path, bytes already in memory, a public URL, or a storage-service object
//! (`gs://bucket/object`). [`ImageSource::resolve`] turns it into the
//! [`ImagePayload`] embedded in the annotate request. Local files and bytes
//! are sent inline as base64 content, remote references are passed through
//! for the service to fetch.

use crate::Error;
use base64::Engine as _;
use log::debug;
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::path::{Path, PathBuf};
use url::Url;

const STORAGE_SCHEME: &str = "gs://";

/// A caller-supplied reference to an image.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// Encoded image bytes (JPEG, PNG, ...).
    Bytes(Vec<u8>),
    /// A publicly reachable HTTP(S) URL.
    Url(Url),
    /// A storage-service object locator such as `gs://bucket/image.jpg`.
    Storage(String),
}

impl From<&str> for ImageSource {
    /// Classifies a string reference: `gs://` locators become
    /// [`ImageSource::Storage`], HTTP(S) URLs become [`ImageSource::Url`],
    /// everything else is treated as a local path.
    fn from(s: &str) -> Self {
        if s.starts_with(STORAGE_SCHEME) {
            return ImageSource::Storage(s.to_string());
        }

        match Url::parse(s) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => ImageSource::Url(url),
            _ => ImageSource::Path(PathBuf::from(s)),
        }
    }
}

impl From<String> for ImageSource {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<&String> for ImageSource {
    fn from(s: &String) -> Self {
        s.as_str().into()
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl From<&[u8]> for ImageSource {
    fn from(bytes: &[u8]) -> Self {
        ImageSource::Bytes(bytes.to_vec())
    }
}

impl From<Url> for ImageSource {
    fn from(url: Url) -> Self {
        ImageSource::Url(url)
    }
}

impl ImageSource {
    /// Resolves the reference into a request payload.
    ///
    /// Local files are read in full. Empty files or byte buffers and
    /// malformed storage locators fail with [`Error::InvalidImage`].
    pub async fn resolve(self) -> Result<ImagePayload, Error> {
        match self {
            ImageSource::Path(path) => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    Error::InvalidImage(format!("cannot read {}: {}", path.display(), e))
                })?;
                if bytes.is_empty() {
                    return Err(Error::InvalidImage(format!(
                        "{} is empty",
                        path.display()
                    )));
                }
                debug!(
                    "Loaded image {} ({} bytes, {})",
                    path.display(),
                    bytes.len(),
                    mime_type(&bytes)
                );
                Ok(ImagePayload::Content(bytes))
            }
            ImageSource::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(Error::InvalidImage("image bytes are empty".to_string()));
                }
                debug!(
                    "Using in-memory image ({} bytes, {})",
                    bytes.len(),
                    mime_type(&bytes)
                );
                Ok(ImagePayload::Content(bytes))
            }
            ImageSource::Url(url) => Ok(ImagePayload::ImageUri(url.to_string())),
            ImageSource::Storage(locator) => {
                let object = locator.strip_prefix(STORAGE_SCHEME).unwrap_or_default();
                match object.split_once('/') {
                    Some((bucket, name)) if !bucket.is_empty() && !name.is_empty() => {
                        Ok(ImagePayload::GcsImageUri(locator))
                    }
                    _ => Err(Error::InvalidImage(format!(
                        "storage locator {} must name a bucket and an object",
                        locator
                    ))),
                }
            }
        }
    }
}

fn mime_type(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("unknown type")
}

/// Normalized image embedded in an annotate request.
///
/// Serializes as `{"content": "<base64>"}` for inline bytes and as
/// `{"source": {"imageUri": ...}}` or `{"source": {"gcsImageUri": ...}}` for
/// remote references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImagePayload {
    /// Raw encoded image bytes, sent inline.
    Content(Vec<u8>),
    /// A public URL the service downloads.
    ImageUri(String),
    /// A storage-service object the service reads.
    GcsImageUri(String),
}

impl ImagePayload {
    /// Returns the inline bytes, if this payload carries any.
    pub fn content(&self) -> Option<&[u8]> {
        match self {
            ImagePayload::Content(bytes) => Some(bytes),
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageSourceField<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    image_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gcs_image_uri: Option<&'a str>,
}

impl Serialize for ImagePayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            ImagePayload::Content(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                map.serialize_entry("content", &encoded)?;
            }
            ImagePayload::ImageUri(uri) => map.serialize_entry(
                "source",
                &ImageSourceField {
                    image_uri: Some(uri),
                    gcs_image_uri: None,
                },
            )?,
            ImagePayload::GcsImageUri(uri) => map.serialize_entry(
                "source",
                &ImageSourceField {
                    image_uri: None,
                    gcs_image_uri: Some(uri),
                },
            )?,
        }
        map.end()
    }
}
