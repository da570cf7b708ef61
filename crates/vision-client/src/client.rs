// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    Annotated, BatchRequest, Defaults, Error, FeatureOptions, FeatureRequestBuilder,
    HttpTransport, ImageSource, Transport, VisionConfig,
    request::assemble,
    response::{BatchResponse, correlate, service_error},
};
use futures::future::try_join_all;
use log::{Level, debug, error, log_enabled, trace};
use std::sync::Arc;

/// Path of the batch annotate method, relative to the service endpoint.
pub const ANNOTATE_PATH: &str = "/v1/images:annotate";

/// Client for the batch image annotation service.
///
/// A client pairs a [`Transport`] with a [`Defaults`] store. Every
/// [`annotate`][Self::annotate] call resolves its images, builds the feature
/// list from the current defaults, and sends all images in a single request.
///
/// # Examples
///
/// ```no_run
/// use vision_client::{Client, FeatureOptions};
///
/// # async fn example() -> Result<(), vision_client::Error> {
/// let client = Client::new()?;
///
/// // One image: a single annotation comes back.
/// let annotated = client
///     .annotate(["landmark.jpg"], &FeatureOptions::new().labels(1))
///     .await?;
/// if let Some(label) = annotated.single().and_then(|a| a.label()) {
///     println!("{}", label.description());
/// }
///
/// // Several images: one annotation per image, in order.
/// let annotated = client
///     .detect(
///         ["landmark.jpg", "gs://bucket/face.jpg"],
///         &FeatureOptions::new().faces(true).labels(5),
///     )
///     .await?;
/// for annotation in annotated.as_slice() {
///     println!("{} faces", annotation.faces().len());
/// }
/// # Ok(())
/// # }
/// ```
// Client is Clone but cannot derive Debug due to dyn Transport
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    defaults: Arc<Defaults>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client from the configuration file and environment (see
    /// [`VisionConfig::load`]) using the HTTP transport.
    pub fn new() -> Result<Self, Error> {
        Self::from_config(&VisionConfig::load()?)
    }

    /// Creates a client for `config` using the HTTP transport.
    ///
    /// When the configuration lists per-feature defaults the client gets its
    /// own [`Defaults`] store seeded with them, otherwise it shares
    /// [`Defaults::global`].
    pub fn from_config(config: &VisionConfig) -> Result<Self, Error> {
        let defaults = if config.defaults.is_empty() {
            Arc::clone(Defaults::global())
        } else {
            Arc::new(Defaults::with_overrides(&config.defaults)?)
        };

        Ok(Client {
            transport: Arc::new(HttpTransport::new(config)?),
            defaults,
        })
    }

    /// Creates a client around an existing transport, sharing the
    /// process-wide defaults.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Client {
            transport,
            defaults: Arc::clone(Defaults::global()),
        }
    }

    /// Returns a new client reading feature defaults from `defaults`.
    pub fn with_defaults(self, defaults: Arc<Defaults>) -> Self {
        Client { defaults, ..self }
    }

    /// The defaults store consulted when a feature asks for its default
    /// count.
    pub fn defaults(&self) -> &Arc<Defaults> {
        &self.defaults
    }

    /// Annotates one or more images with the requested features.
    ///
    /// All images are sent in one request and receive the same feature
    /// list. A single image yields [`Annotated::Single`]; several images
    /// yield [`Annotated::Batch`] in input order.
    ///
    /// Fails before contacting the service when no images are given
    /// ([`Error::EmptyImageSet`]), no feature is enabled, or an image cannot
    /// be read. A non-success status from the service is reported as
    /// [`Error::ServiceError`] and is not retried.
    #[cfg_attr(feature = "profiling", tracing::instrument(skip_all))]
    pub async fn annotate<I>(&self, images: I, options: &FeatureOptions) -> Result<Annotated, Error>
    where
        I: IntoIterator,
        I::Item: Into<ImageSource>,
    {
        let images: Vec<ImageSource> = images.into_iter().map(Into::into).collect();
        if images.is_empty() {
            return Err(Error::EmptyImageSet);
        }

        let features = FeatureRequestBuilder::new(&self.defaults).build(options);
        if features.is_empty() {
            return Err(Error::InvalidParameters(
                "no features requested".to_string(),
            ));
        }

        let payloads = try_join_all(images.into_iter().map(ImageSource::resolve)).await?;
        let request = assemble(payloads, &features)?;

        debug!(
            "Annotating {} images with {} features",
            request.len(),
            features.len()
        );

        self.execute(&request).await
    }

    /// Alias of [`annotate`][Self::annotate].
    pub async fn mark<I>(&self, images: I, options: &FeatureOptions) -> Result<Annotated, Error>
    where
        I: IntoIterator,
        I::Item: Into<ImageSource>,
    {
        self.annotate(images, options).await
    }

    /// Alias of [`annotate`][Self::annotate].
    pub async fn detect<I>(&self, images: I, options: &FeatureOptions) -> Result<Annotated, Error>
    where
        I: IntoIterator,
        I::Item: Into<ImageSource>,
    {
        self.annotate(images, options).await
    }

    /// Sends an assembled request and correlates the response with it.
    ///
    /// NOTE: This API would generally not be called directly and instead
    /// users should use [`annotate`][Self::annotate].
    pub async fn execute(&self, request: &BatchRequest) -> Result<Annotated, Error> {
        let body = request.to_json()?;
        let resp = self.transport.post(ANNOTATE_PATH, body).await?;

        if !resp.is_success() {
            let err = service_error(resp.status, &resp.body);
            error!("Annotate request failed: {}", err);
            return Err(err);
        }

        if log_enabled!(Level::Trace) {
            trace!("Annotate Response: {}", String::from_utf8_lossy(&resp.body));
        }

        let response = match BatchResponse::from_json(&resp.body) {
            Ok(response) => response,
            Err(err) => {
                error!(
                    "Invalid JSON Response: {}",
                    String::from_utf8_lossy(&resp.body)
                );
                return Err(err);
            }
        };

        correlate(request, response)
    }
}
