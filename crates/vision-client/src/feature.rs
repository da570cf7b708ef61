// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Detection feature selection.
//!
//! Callers describe the features they want with a loosely typed value per
//! feature (`labels: 1`, `labels: true`, `labels: "9999"`). Those values are
//! normalized into a [`FeatureCount`] as soon as they enter the crate, and the
//! [`FeatureRequestBuilder`] resolves them against the current [`Defaults`]
//! into the ordered [`FeatureSpec`] list sent with every image.
//!
//! # Examples
//!
//! ```rust
//! use vision_client::{Defaults, FeatureKind, FeatureOptions, FeatureRequestBuilder};
//!
//! let defaults = Defaults::new();
//! defaults.set(FeatureKind::Labels, 25).unwrap();
//!
//! let options = FeatureOptions::new().labels(true).faces(3).logos(false);
//! let specs = FeatureRequestBuilder::new(&defaults).build(&options);
//!
//! assert_eq!(specs.len(), 2);
//! assert_eq!(specs[0].kind(), FeatureKind::Labels);
//! assert_eq!(specs[0].max_results(), 25);
//! assert_eq!(specs[1].max_results(), 3);
//! ```

use crate::{Defaults, Error};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Detection features supported by the annotate endpoint.
///
/// The serialized form is the service's upper snake case type name, the
/// [`Display`] form is the caller-facing option key.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Face detection with facial landmarks and likelihood ratings.
    #[serde(rename = "FACE_DETECTION")]
    Faces,
    /// Well known natural and man-made landmarks.
    #[serde(rename = "LANDMARK_DETECTION")]
    Landmarks,
    /// Product and brand logos.
    #[serde(rename = "LOGO_DETECTION")]
    Logos,
    /// General image labels.
    #[serde(rename = "LABEL_DETECTION")]
    Labels,
    /// Optical character recognition.
    #[serde(rename = "TEXT_DETECTION")]
    Text,
    /// Explicit content likelihoods.
    #[serde(rename = "SAFE_SEARCH_DETECTION")]
    SafeSearch,
    /// Dominant colors and other image properties.
    #[serde(rename = "IMAGE_PROPERTIES")]
    Properties,
}

impl FeatureKind {
    /// Every feature kind, in the order the service documents them.
    pub const ALL: [FeatureKind; 7] = [
        FeatureKind::Faces,
        FeatureKind::Landmarks,
        FeatureKind::Logos,
        FeatureKind::Labels,
        FeatureKind::Text,
        FeatureKind::SafeSearch,
        FeatureKind::Properties,
    ];

    /// Returns the service API type name for this feature.
    pub fn as_api_type(&self) -> &'static str {
        match self {
            FeatureKind::Faces => "FACE_DETECTION",
            FeatureKind::Landmarks => "LANDMARK_DETECTION",
            FeatureKind::Logos => "LOGO_DETECTION",
            FeatureKind::Labels => "LABEL_DETECTION",
            FeatureKind::Text => "TEXT_DETECTION",
            FeatureKind::SafeSearch => "SAFE_SEARCH_DETECTION",
            FeatureKind::Properties => "IMAGE_PROPERTIES",
        }
    }

    /// Returns the caller-facing option key for this feature.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Faces => "faces",
            FeatureKind::Landmarks => "landmarks",
            FeatureKind::Logos => "logos",
            FeatureKind::Labels => "labels",
            FeatureKind::Text => "text",
            FeatureKind::SafeSearch => "safe_search",
            FeatureKind::Properties => "properties",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            FeatureKind::Faces => 0,
            FeatureKind::Landmarks => 1,
            FeatureKind::Logos => 2,
            FeatureKind::Labels => 3,
            FeatureKind::Text => 4,
            FeatureKind::SafeSearch => 5,
            FeatureKind::Properties => 6,
        }
    }
}

impl Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for FeatureKind {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "faces" | "face" | "FACE_DETECTION" => Ok(FeatureKind::Faces),
            "landmarks" | "landmark" | "LANDMARK_DETECTION" => Ok(FeatureKind::Landmarks),
            "logos" | "logo" | "LOGO_DETECTION" => Ok(FeatureKind::Logos),
            "labels" | "label" | "LABEL_DETECTION" => Ok(FeatureKind::Labels),
            "text" | "TEXT_DETECTION" => Ok(FeatureKind::Text),
            "safe_search" | "safe-search" | "safe" | "SAFE_SEARCH_DETECTION" => {
                Ok(FeatureKind::SafeSearch)
            }
            "properties" | "props" | "IMAGE_PROPERTIES" => Ok(FeatureKind::Properties),
            _ => Err(Error::InvalidFeatureKind(s.to_string())),
        }
    }
}

impl std::str::FromStr for FeatureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.try_into()
    }
}

/// Loosely typed per-feature value as supplied by a caller.
///
/// Mirrors the shapes a JSON options object can carry. Use
/// [`FeatureCount::from`] to normalize it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum FeatureValue {
    /// `true` requests the default count, `false` disables the feature.
    Boolean(bool),
    /// A positive integer is an explicit count. Zero and negative integers
    /// disable the feature rather than falling back to the default.
    Integer(i64),
    /// Any string requests the default count, including numeric strings.
    String(String),
    /// Explicit null, the feature is not requested.
    Null,
    /// Any other JSON value (floats, arrays, objects) requests the default
    /// count.
    Other(serde_json::Value),
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Boolean(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Integer(value)
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        FeatureValue::Integer(value.into())
    }
}

impl From<u32> for FeatureValue {
    fn from(value: u32) -> Self {
        FeatureValue::Integer(value.into())
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::String(value.to_owned())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::String(value)
    }
}

impl<T: Into<FeatureValue>> From<Option<T>> for FeatureValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FeatureValue::Null)
    }
}

/// Normalized request for a single feature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FeatureCount {
    /// Request exactly this many results.
    ExplicitCount(u32),
    /// Request the current default count for the feature.
    UseDefault,
    /// Do not request the feature.
    Disabled,
}

impl From<FeatureValue> for FeatureCount {
    fn from(value: FeatureValue) -> Self {
        match value {
            FeatureValue::Integer(n) if n > 0 => {
                FeatureCount::ExplicitCount(u32::try_from(n).unwrap_or(u32::MAX))
            }
            FeatureValue::Integer(_) => FeatureCount::Disabled,
            FeatureValue::Boolean(true) => FeatureCount::UseDefault,
            FeatureValue::Boolean(false) | FeatureValue::Null => FeatureCount::Disabled,
            // Strings are placeholders only, "9999" is not parsed as a count.
            FeatureValue::String(_) => FeatureCount::UseDefault,
            FeatureValue::Other(_) => FeatureCount::UseDefault,
        }
    }
}

/// Ordered set of requested features for one annotate call.
///
/// Declaration order is preserved and determines the order of the resulting
/// [`FeatureSpec`] list. Declaring the same feature twice replaces the first
/// value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureOptions {
    entries: Vec<(FeatureKind, FeatureCount)>,
}

impl FeatureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the options with `kind` set to the normalized `value`.
    pub fn with(mut self, kind: FeatureKind, value: impl Into<FeatureValue>) -> Self {
        self.set(kind, value);
        self
    }

    /// Sets `kind` to the normalized `value`.
    pub fn set(&mut self, kind: FeatureKind, value: impl Into<FeatureValue>) {
        let count = FeatureCount::from(value.into());
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((kind, count)),
        }
    }

    /// Returns the options with the feature named `name` set to `value`.
    ///
    /// Fails with [`Error::InvalidFeatureKind`] for unknown names.
    pub fn with_name(self, name: &str, value: impl Into<FeatureValue>) -> Result<Self, Error> {
        let kind = FeatureKind::try_from(name)?;
        Ok(self.with(kind, value))
    }

    /// Builds options from `(name, value)` pairs, failing on the first
    /// unknown feature name.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FeatureValue>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |options, (name, value)| {
                options.with_name(name.as_ref(), value)
            })
    }

    /// Builds options from a JSON object such as `{"labels": 1, "faces": true}`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, Error> {
        let object = value.as_object().ok_or_else(|| {
            Error::InvalidParameters("feature options must be a JSON object".to_string())
        })?;

        let mut options = Self::new();
        for (name, value) in object {
            let value = FeatureValue::deserialize(value)?;
            options = options.with_name(name, value)?;
        }
        Ok(options)
    }

    pub fn faces(self, value: impl Into<FeatureValue>) -> Self {
        self.with(FeatureKind::Faces, value)
    }

    pub fn landmarks(self, value: impl Into<FeatureValue>) -> Self {
        self.with(FeatureKind::Landmarks, value)
    }

    pub fn logos(self, value: impl Into<FeatureValue>) -> Self {
        self.with(FeatureKind::Logos, value)
    }

    pub fn labels(self, value: impl Into<FeatureValue>) -> Self {
        self.with(FeatureKind::Labels, value)
    }

    pub fn text(self, value: impl Into<FeatureValue>) -> Self {
        self.with(FeatureKind::Text, value)
    }

    pub fn safe_search(self, value: impl Into<FeatureValue>) -> Self {
        self.with(FeatureKind::SafeSearch, value)
    }

    pub fn properties(self, value: impl Into<FeatureValue>) -> Self {
        self.with(FeatureKind::Properties, value)
    }

    /// Returns the normalized count for `kind`, if it was declared.
    pub fn get(&self, kind: FeatureKind) -> Option<FeatureCount> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKind, FeatureCount)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single feature as sent to the service.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSpec {
    #[serde(rename = "type")]
    kind: FeatureKind,
    max_results: u32,
}

impl FeatureSpec {
    /// Creates a feature specification, rejecting a zero result count.
    pub fn new(kind: FeatureKind, max_results: u32) -> Result<Self, Error> {
        if max_results == 0 {
            return Err(Error::InvalidParameters(format!(
                "max results for {} must be positive",
                kind
            )));
        }
        Ok(Self { kind, max_results })
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }
}

/// Resolves [`FeatureOptions`] into the feature list of a request.
///
/// Defaults are read from the store on every [`build`][Self::build], so a
/// change to the store is visible to the very next call.
pub struct FeatureRequestBuilder<'a> {
    defaults: &'a Defaults,
}

impl<'a> FeatureRequestBuilder<'a> {
    pub fn new(defaults: &'a Defaults) -> Self {
        Self { defaults }
    }

    /// Produces one [`FeatureSpec`] per enabled feature, in declaration
    /// order. Disabled features are omitted.
    pub fn build(&self, options: &FeatureOptions) -> Vec<FeatureSpec> {
        let specs: Vec<FeatureSpec> = options
            .iter()
            .filter_map(|(kind, count)| {
                let max_results = match count {
                    FeatureCount::ExplicitCount(n) => n,
                    FeatureCount::UseDefault => self.defaults.get(kind),
                    FeatureCount::Disabled => return None,
                };
                Some(FeatureSpec { kind, max_results })
            })
            .collect();

        trace!("Resolved features: {:?}", specs);
        specs
    }
}
