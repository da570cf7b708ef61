// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! # Batch Image Annotation Client
//!
//! A Rust client for a batched image annotation service. Callers submit one
//! or more images together with the detection features they want, the
//! client sends them in a single batch request, and the per-image results
//! come back as typed [`Annotation`] objects.
//!
//! ## Features
//!
//! - **Flexible feature options**: request a feature with an explicit count
//!   (`labels(5)`), its default count (`labels(true)`), or turn it off
//! - **Shared defaults**: per-feature default counts in a process-wide
//!   [`Defaults`] store, or an isolated store per client
//! - **Mixed image sources**: local paths, in-memory bytes, URLs and
//!   `gs://` storage objects in the same call
//! - **Positional correlation**: one annotation per image, in input order,
//!   with per-image service errors attached rather than failing the call
//! - **Pluggable transport**: HTTPS via `reqwest` by default, or any
//!   [`Transport`] implementation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vision_client::{Client, Error, FeatureOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = Client::new()?;
//!
//!     let annotated = client
//!         .annotate(["landmark.jpg"], &FeatureOptions::new().labels(1))
//!         .await?;
//!
//!     for annotation in annotated.as_slice() {
//!         for label in annotation.labels() {
//!             println!("{} ({:.2})", label.description(), label.score());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `profiling`: emits `tracing` spans around annotate calls

mod annotation;
mod client;
mod defaults;
mod error;
mod feature;
mod image;
mod request;
mod response;
mod settings;
mod transport;

pub use crate::{
    annotation::{
        Annotation, BoundingPoly, Color, ColorInfo, Entity, Face, FaceLandmark, LatLng,
        Likelihood, Position, Properties, Property, SafeSearch, Status, Text, Vertex,
    },
    client::{ANNOTATE_PATH, Client},
    defaults::{DEFAULT_MAX_RESULTS, DEFAULT_SINGLE_RESULT, Defaults},
    error::Error,
    feature::{
        FeatureCount, FeatureKind, FeatureOptions, FeatureRequestBuilder, FeatureSpec,
        FeatureValue,
    },
    image::{ImagePayload, ImageSource},
    request::{AnnotateRequest, BatchRequest, assemble},
    response::{Annotated, BatchResponse, BatchResponseEntry, correlate},
    settings::{DEFAULT_ENDPOINT, VisionConfig},
    transport::{Credentials, HttpTransport, Transport, TransportResponse},
};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[ctor::ctor]
    fn init() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    /// Records every posted body and answers with a fixed response.
    struct MockTransport {
        status: u16,
        body: serde_json::Value,
        posts: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl MockTransport {
        fn new(status: u16, body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                posts: Mutex::new(Vec::new()),
            })
        }

        fn posts(&self) -> Vec<(String, serde_json::Value)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post(&self, path: &str, body: Vec<u8>) -> Result<TransportResponse, Error> {
            let body: serde_json::Value = serde_json::from_slice(&body)?;
            self.posts.lock().unwrap().push((path.to_string(), body));
            Ok(TransportResponse::new(
                self.status,
                serde_json::to_vec(&self.body)?,
            ))
        }
    }

    fn client(transport: &Arc<MockTransport>) -> Client {
        Client::with_transport(transport.clone()).with_defaults(Arc::new(Defaults::new()))
    }

    fn image() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46]
    }

    #[tokio::test]
    async fn test_empty_image_set_is_not_sent() {
        let transport = MockTransport::new(200, json!({"responses": []}));
        let result = client(&transport)
            .annotate(Vec::<ImageSource>::new(), &FeatureOptions::new().labels(1))
            .await;

        assert!(matches!(result, Err(Error::EmptyImageSet)));
        assert!(transport.posts().is_empty());
    }

    #[tokio::test]
    async fn test_no_features_is_not_sent() {
        let transport = MockTransport::new(200, json!({"responses": [{}]}));
        let result = client(&transport)
            .annotate([image()], &FeatureOptions::new().labels(false))
            .await;

        assert!(matches!(result, Err(Error::InvalidParameters(_))));
        assert!(transport.posts().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_image_is_not_sent() {
        let transport = MockTransport::new(200, json!({"responses": [{}, {}]}));
        let result = client(&transport)
            .annotate(
                [ImageSource::Bytes(image()), ImageSource::from("/nonexistent.jpg")],
                &FeatureOptions::new().labels(1),
            )
            .await;

        assert!(matches!(result, Err(Error::InvalidImage(_))));
        assert!(transport.posts().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_is_surfaced() {
        let transport = MockTransport::new(
            403,
            json!({"error": {"code": 403, "message": "The request is missing a valid API key."}}),
        );
        let result = client(&transport)
            .annotate([image()], &FeatureOptions::new().labels(1))
            .await;

        assert!(matches!(
            result,
            Err(Error::ServiceError(403, msg)) if msg.contains("API key")
        ));
        assert_eq!(transport.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_mixed_sources_in_one_request() -> Result<(), Error> {
        let transport = MockTransport::new(200, json!({"responses": [{}, {}, {}]}));
        let annotated = client(&transport)
            .annotate(
                [
                    ImageSource::Bytes(image()),
                    ImageSource::from("https://example.com/landmark.jpg"),
                    ImageSource::from("gs://bucket/landmark.jpg"),
                ],
                &FeatureOptions::new().landmarks(3),
            )
            .await?;

        assert_eq!(annotated.len(), 3);
        assert!(annotated.as_slice().iter().all(Annotation::is_empty));

        let posts = transport.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, ANNOTATE_PATH);

        let requests = posts[0].1["requests"].as_array().unwrap();
        assert!(requests[0]["image"]["content"].is_string());
        assert_eq!(
            requests[1]["image"]["source"]["imageUri"],
            "https://example.com/landmark.jpg"
        );
        assert_eq!(
            requests[2]["image"]["source"]["gcsImageUri"],
            "gs://bucket/landmark.jpg"
        );
        for request in requests {
            assert_eq!(
                request["features"],
                json!([{"type": "LANDMARK_DETECTION", "maxResults": 3}])
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let transport = MockTransport::new(200, json!("not a batch response"));
        let result = client(&transport)
            .annotate([image()], &FeatureOptions::new().labels(1))
            .await;

        assert!(matches!(result, Err(Error::JsonError(_))));
    }
}
