// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Typed annotation results.
//!
//! An [`Annotation`] holds everything the service detected for one image.
//! Only the features requested for that image are populated; a feature with
//! no detections is simply empty (`None` or an empty slice).

use serde::{Deserialize, Serialize};

/// A pixel position within the image. The service omits zero coordinates.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

/// Polygon enclosing a detection.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct BoundingPoly {
    pub vertices: Vec<Vertex>,
}

/// Geographic coordinates of a landmark.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
struct Location {
    lat_lng: LatLng,
}

/// Free-form name/value property attached to an entity.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// A detected entity: a label, landmark, logo, or piece of text.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Entity {
    mid: String,
    locale: String,
    description: String,
    score: f32,
    confidence: f32,
    topicality: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounding_poly: Option<BoundingPoly>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<Property>,
}

impl Entity {
    /// Opaque knowledge-graph entity identifier.
    pub fn mid(&self) -> &str {
        &self.mid
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn topicality(&self) -> f32 {
        self.topicality
    }

    pub fn bounds(&self) -> &[Vertex] {
        self.bounding_poly
            .as_ref()
            .map(|poly| poly.vertices.as_slice())
            .unwrap_or_default()
    }

    pub fn locations(&self) -> impl Iterator<Item = LatLng> + '_ {
        self.locations.iter().map(|location| location.lat_lng)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// Likelihood rating used by face and safe search results.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    /// True for `Likely` and `VeryLikely`.
    pub fn is_likely(&self) -> bool {
        *self >= Likelihood::Likely
    }
}

/// Position of a facial landmark in three dimensions.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A facial feature such as `LEFT_EYE` or `NOSE_TIP`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FaceLandmark {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
}

/// A detected face.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Face {
    bounding_poly: BoundingPoly,
    fd_bounding_poly: BoundingPoly,
    landmarks: Vec<FaceLandmark>,
    roll_angle: f32,
    pan_angle: f32,
    tilt_angle: f32,
    detection_confidence: f32,
    landmarking_confidence: f32,
    joy_likelihood: Likelihood,
    sorrow_likelihood: Likelihood,
    anger_likelihood: Likelihood,
    surprise_likelihood: Likelihood,
    under_exposed_likelihood: Likelihood,
    blurred_likelihood: Likelihood,
    headwear_likelihood: Likelihood,
}

impl Face {
    /// Polygon around the whole head.
    pub fn head_bounds(&self) -> &[Vertex] {
        &self.bounding_poly.vertices
    }

    /// Tighter polygon around the skin of the face only.
    pub fn face_bounds(&self) -> &[Vertex] {
        &self.fd_bounding_poly.vertices
    }

    pub fn landmarks(&self) -> &[FaceLandmark] {
        &self.landmarks
    }

    /// Returns the landmark of the given type, e.g. `"NOSE_TIP"`.
    pub fn landmark(&self, kind: &str) -> Option<&FaceLandmark> {
        self.landmarks.iter().find(|landmark| landmark.kind == kind)
    }

    /// Roll, pan and tilt angles in degrees.
    pub fn angles(&self) -> (f32, f32, f32) {
        (self.roll_angle, self.pan_angle, self.tilt_angle)
    }

    pub fn confidence(&self) -> f32 {
        self.detection_confidence
    }

    pub fn landmarking_confidence(&self) -> f32 {
        self.landmarking_confidence
    }

    pub fn joy(&self) -> Likelihood {
        self.joy_likelihood
    }

    pub fn sorrow(&self) -> Likelihood {
        self.sorrow_likelihood
    }

    pub fn anger(&self) -> Likelihood {
        self.anger_likelihood
    }

    pub fn surprise(&self) -> Likelihood {
        self.surprise_likelihood
    }

    pub fn under_exposed(&self) -> Likelihood {
        self.under_exposed_likelihood
    }

    pub fn blurred(&self) -> Likelihood {
        self.blurred_likelihood
    }

    pub fn headwear(&self) -> Likelihood {
        self.headwear_likelihood
    }
}

/// Explicit content ratings for an image.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SafeSearch {
    pub adult: Likelihood,
    pub spoof: Likelihood,
    pub medical: Likelihood,
    pub violence: Likelihood,
}

/// An RGB color, channels in the range `0..=255`.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
}

impl Color {
    /// Hex notation such as `#ff8000`.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.red),
            channel(self.green),
            channel(self.blue)
        )
    }
}

/// A dominant color with its share of the image.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorInfo {
    pub color: Color,
    pub score: f32,
    pub pixel_fraction: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub(crate) struct DominantColors {
    pub(crate) colors: Vec<ColorInfo>,
}

/// Image-wide properties such as dominant colors.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Properties {
    dominant_colors: DominantColors,
}

impl Properties {
    pub fn colors(&self) -> &[ColorInfo] {
        &self.dominant_colors.colors
    }
}

/// Text found in an image.
///
/// The service reports the whole text block first, followed by one entry
/// per word.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Text {
    text: String,
    locale: String,
    bounds: Vec<Vertex>,
    words: Vec<Entity>,
}

impl Text {
    pub(crate) fn from_entities(mut entities: Vec<Entity>) -> Option<Self> {
        if entities.is_empty() {
            return None;
        }

        let words = entities.split_off(1);
        let block = entities.pop()?;
        Some(Self {
            bounds: block.bounds().to_vec(),
            text: block.description,
            locale: block.locale,
            words,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn bounds(&self) -> &[Vertex] {
        &self.bounds
    }

    pub fn words(&self) -> &[Entity] {
        &self.words
    }
}

/// An error the service reported for a single image of a batch.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Status {
    pub code: i32,
    pub message: String,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Everything the service detected for one image.
///
/// Created by the response correlator; a caller receives one per image.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) faces: Vec<Face>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) landmarks: Vec<Entity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) logos: Vec<Entity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) labels: Vec<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) safe_search: Option<SafeSearch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) properties: Option<Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<Status>,
}

impl Annotation {
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// The first detected face, if any.
    pub fn face(&self) -> Option<&Face> {
        self.faces.first()
    }

    pub fn landmarks(&self) -> &[Entity] {
        &self.landmarks
    }

    pub fn landmark(&self) -> Option<&Entity> {
        self.landmarks.first()
    }

    pub fn logos(&self) -> &[Entity] {
        &self.logos
    }

    pub fn logo(&self) -> Option<&Entity> {
        self.logos.first()
    }

    pub fn labels(&self) -> &[Entity] {
        &self.labels
    }

    /// The highest ranked label, if any.
    pub fn label(&self) -> Option<&Entity> {
        self.labels.first()
    }

    pub fn text(&self) -> Option<&Text> {
        self.text.as_ref()
    }

    pub fn safe_search(&self) -> Option<&SafeSearch> {
        self.safe_search.as_ref()
    }

    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }

    /// The error reported for this image, when the service could not
    /// process it.
    pub fn error(&self) -> Option<&Status> {
        self.error.as_ref()
    }

    /// True when nothing was detected and no error was reported.
    pub fn is_empty(&self) -> bool {
        self == &Annotation::default()
    }
}
