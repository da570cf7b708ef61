// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Client configuration.
//!
//! Settings are merged from, in increasing priority:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `$VISION_CONFIG`, or `vision.toml` in the platform config
//!    directory (e.g. `~/.config/vision/vision.toml` on Linux)
//! 3. `VISION_*` environment variables (`VISION_ENDPOINT`, `VISION_KEY`,
//!    `VISION_TOKEN`, `VISION_TIMEOUT`, `VISION_CONNECT_TIMEOUT`)
//!
//! ```toml
//! endpoint = "https://vision.googleapis.com"
//! key = "..."
//! timeout = 60
//!
//! [defaults]
//! labels = 25
//! faces = 10
//! ```

use crate::Error;
use directories::ProjectDirs;
use log::debug;
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use url::Url;

/// Public endpoint of the annotation service.
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com";

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct VisionConfig {
    /// Base URL of the service.
    pub endpoint: String,
    /// API key, sent as the `key` query parameter.
    pub key: Option<String>,
    /// OAuth access token, used when no API key is configured.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Connection timeout in seconds.
    pub connect_timeout: u64,
    /// Per-feature default result counts, keyed by feature name. When empty
    /// clients share the process-wide defaults.
    pub defaults: HashMap<String, u32>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            key: None,
            token: None,
            timeout: 30,
            connect_timeout: 10,
            defaults: HashMap::new(),
        }
    }
}

impl VisionConfig {
    /// Loads the configuration from the default file location and the
    /// environment.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Loads the configuration from `path` (if given and present) and the
    /// environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self, Error> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Reading configuration from {:?}", path);
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("VISION").try_parsing(true))
            .build()?;

        let config: VisionConfig = settings.try_deserialize()?;
        config.endpoint_url()?;
        Ok(config)
    }

    /// Returns `$VISION_CONFIG` when set, otherwise `vision.toml` in the
    /// platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        match std::env::var_os("VISION_CONFIG") {
            Some(path) => Some(PathBuf::from(path)),
            None => ProjectDirs::from("com", "vision-client", "vision")
                .map(|dirs| dirs.config_dir().join("vision.toml")),
        }
    }

    /// Parses and validates the endpoint URL.
    pub fn endpoint_url(&self) -> Result<Url, Error> {
        let url = Url::parse(&self.endpoint)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::InvalidParameters(format!(
                "endpoint scheme must be http or https, got {}",
                scheme
            ))),
        }
    }
}
