// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    Annotation, BatchRequest, Error, FeatureKind,
    annotation::{Entity, Face, Properties, SafeSearch, Status, Text},
    request::AnnotateRequest,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Raw result for one image of a batch, as returned by the service.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchResponseEntry {
    face_annotations: Vec<Face>,
    landmark_annotations: Vec<Entity>,
    logo_annotations: Vec<Entity>,
    label_annotations: Vec<Entity>,
    text_annotations: Vec<Entity>,
    safe_search_annotation: Option<SafeSearch>,
    image_properties_annotation: Option<Properties>,
    error: Option<Status>,
}

/// Raw batch response; entry `i` answers request entry `i`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct BatchResponse {
    responses: Vec<BatchResponseEntry>,
}

impl BatchResponse {
    /// Parses a response body. An empty object is a valid response with no
    /// entries.
    pub fn from_json(body: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    error: Status,
}

/// Extracts the service's error message from a failed response body,
/// falling back to the raw body text.
pub(crate) fn service_error(status: u16, body: &[u8]) -> Error {
    let message = match serde_json::from_slice::<ServiceErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    };
    Error::ServiceError(status, message)
}

/// Annotation results shaped after the call that produced them.
///
/// A call with a single image yields [`Annotated::Single`], a call with
/// several images yields [`Annotated::Batch`] in input order.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Annotated {
    Single(Annotation),
    Batch(Vec<Annotation>),
}

impl Annotated {
    pub fn len(&self) -> usize {
        match self {
            Annotated::Single(_) => 1,
            Annotated::Batch(annotations) => annotations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Annotated::Single(_))
    }

    /// Returns the annotation of a single-image call.
    pub fn single(&self) -> Option<&Annotation> {
        match self {
            Annotated::Single(annotation) => Some(annotation),
            Annotated::Batch(_) => None,
        }
    }

    /// Returns the annotations in image order regardless of shape.
    pub fn as_slice(&self) -> &[Annotation] {
        match self {
            Annotated::Single(annotation) => std::slice::from_ref(annotation),
            Annotated::Batch(annotations) => annotations,
        }
    }

    pub fn into_single(self) -> Option<Annotation> {
        match self {
            Annotated::Single(annotation) => Some(annotation),
            Annotated::Batch(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<Annotation> {
        match self {
            Annotated::Single(annotation) => vec![annotation],
            Annotated::Batch(annotations) => annotations,
        }
    }
}

fn build_annotation(request: &AnnotateRequest, entry: BatchResponseEntry) -> Annotation {
    fn keep<T>(requested: bool, values: Vec<T>) -> Vec<T> {
        if requested { values } else { Vec::new() }
    }

    let wants = |kind| request.requested(kind);

    Annotation {
        faces: keep(wants(FeatureKind::Faces), entry.face_annotations),
        landmarks: keep(wants(FeatureKind::Landmarks), entry.landmark_annotations),
        logos: keep(wants(FeatureKind::Logos), entry.logo_annotations),
        labels: keep(wants(FeatureKind::Labels), entry.label_annotations),
        text: wants(FeatureKind::Text)
            .then(|| Text::from_entities(entry.text_annotations))
            .flatten(),
        safe_search: entry
            .safe_search_annotation
            .filter(|_| wants(FeatureKind::SafeSearch)),
        properties: entry
            .image_properties_annotation
            .filter(|_| wants(FeatureKind::Properties)),
        error: entry.error,
    }
}

/// Matches a batch response back to the request that produced it.
///
/// Builds one [`Annotation`] per request entry, by position. A length
/// mismatch between request and response is a contract violation and fails
/// with [`Error::ResponseCountMismatch`]. Errors reported for individual
/// images are attached to their annotation and do not fail the call.
pub fn correlate(request: &BatchRequest, response: BatchResponse) -> Result<Annotated, Error> {
    if response.len() != request.len() {
        return Err(Error::ResponseCountMismatch(request.len(), response.len()));
    }

    let mut annotations: Vec<Annotation> = request
        .requests()
        .iter()
        .zip(response.responses)
        .map(|(request, entry)| build_annotation(request, entry))
        .collect();

    for (index, annotation) in annotations.iter().enumerate() {
        if let Some(error) = annotation.error() {
            warn!("Image {} could not be annotated: {}", index, error);
        }
    }

    debug!("Correlated {} annotations", annotations.len());

    if annotations.len() == 1 {
        // Single-image calls hand back the annotation itself.
        Ok(Annotated::Single(annotations.remove(0)))
    } else {
        Ok(Annotated::Batch(annotations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureSpec, ImagePayload, request::assemble};
    use serde_json::json;

    fn batch(images: usize, features: &[(FeatureKind, u32)]) -> BatchRequest {
        let images = (0..images)
            .map(|_| ImagePayload::Content(vec![0xFF, 0xD8, 0xFF]))
            .collect();
        let features: Vec<FeatureSpec> = features
            .iter()
            .map(|(kind, n)| FeatureSpec::new(*kind, *n).unwrap())
            .collect();
        assemble(images, &features).unwrap()
    }

    fn label() -> serde_json::Value {
        json!({"mid": "/m/02wtjj", "description": "stone carving", "score": 0.95})
    }

    fn response(value: serde_json::Value) -> BatchResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_image_returns_single_annotation() {
        let request = batch(1, &[(FeatureKind::Labels, 1)]);
        let annotated = correlate(
            &request,
            response(json!({"responses": [{"labelAnnotations": [label()]}]})),
        )
        .unwrap();

        assert!(annotated.is_single());
        let annotation = annotated.into_single().unwrap();
        assert_eq!(annotation.label().unwrap().description(), "stone carving");
    }

    #[test]
    fn test_multiple_images_keep_order() {
        let request = batch(3, &[(FeatureKind::Labels, 1)]);
        let annotated = correlate(
            &request,
            response(json!({"responses": [
                {"labelAnnotations": [{"description": "first"}]},
                {},
                {"labelAnnotations": [{"description": "third"}]}
            ]})),
        )
        .unwrap();

        assert!(!annotated.is_single());
        let annotations = annotated.into_vec();
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[0].label().unwrap().description(), "first");
        assert!(annotations[1].label().is_none());
        assert_eq!(annotations[2].label().unwrap().description(), "third");
    }

    #[test]
    fn test_count_mismatch() {
        let request = batch(2, &[(FeatureKind::Labels, 1)]);
        let result = correlate(
            &request,
            response(json!({"responses": [{"labelAnnotations": [label()]}]})),
        );
        assert!(matches!(result, Err(Error::ResponseCountMismatch(2, 1))));

        let request = batch(1, &[(FeatureKind::Labels, 1)]);
        let result = correlate(&request, response(json!({})));
        assert!(matches!(result, Err(Error::ResponseCountMismatch(1, 0))));
    }

    #[test]
    fn test_unrequested_features_are_dropped() {
        let request = batch(1, &[(FeatureKind::Labels, 1)]);
        let annotated = correlate(
            &request,
            response(json!({"responses": [{
                "labelAnnotations": [label()],
                "logoAnnotations": [{"description": "Google"}],
                "safeSearchAnnotation": {"adult": "VERY_UNLIKELY"}
            }]})),
        )
        .unwrap();

        let annotation = annotated.single().unwrap();
        assert!(annotation.label().is_some());
        assert!(annotation.logos().is_empty());
        assert!(annotation.safe_search().is_none());
    }

    #[test]
    fn test_all_features() {
        let request = batch(
            1,
            &[
                (FeatureKind::Faces, 10),
                (FeatureKind::Text, 1),
                (FeatureKind::SafeSearch, 1),
                (FeatureKind::Properties, 1),
            ],
        );
        let annotated = correlate(
            &request,
            response(json!({"responses": [{
                "faceAnnotations": [{"detectionConfidence": 0.9}],
                "textAnnotations": [{"description": "Hi"}, {"description": "Hi"}],
                "safeSearchAnnotation": {"violence": "LIKELY"},
                "imagePropertiesAnnotation": {"dominantColors": {"colors": [
                    {"color": {"red": 145, "green": 193, "blue": 254}, "score": 0.65, "pixelFraction": 0.0}
                ]}}
            }]})),
        )
        .unwrap();

        let annotation = annotated.single().unwrap();
        assert_eq!(annotation.faces().len(), 1);
        assert_eq!(annotation.text().unwrap().words().len(), 1);
        assert!(annotation.safe_search().unwrap().violence.is_likely());
        assert_eq!(
            annotation.properties().unwrap().colors()[0].color.to_hex(),
            "#91c1fe"
        );
    }

    #[test]
    fn test_per_image_error_is_not_fatal() {
        let request = batch(2, &[(FeatureKind::Labels, 1)]);
        let annotated = correlate(
            &request,
            response(json!({"responses": [
                {"error": {"code": 3, "message": "Bad image data."}},
                {"labelAnnotations": [label()]}
            ]})),
        )
        .unwrap();

        let annotations = annotated.as_slice();
        assert_eq!(annotations[0].error().unwrap().code, 3);
        assert!(annotations[0].label().is_none());
        assert!(annotations[1].error().is_none());
        assert!(annotations[1].label().is_some());
    }

    #[test]
    fn test_per_image_error_on_single_image() {
        let request = batch(1, &[(FeatureKind::Labels, 1)]);
        let annotated = correlate(
            &request,
            response(json!({"responses": [
                {"error": {"code": 3, "message": "Bad image data."}}
            ]})),
        )
        .unwrap();

        let annotation = annotated.into_single().unwrap();
        assert_eq!(annotation.error().unwrap().message, "Bad image data.");
        assert!(annotation.labels().is_empty());
    }

    #[test]
    fn test_service_error_message() {
        let body = br#"{"error": {"code": 400, "message": "Request must specify image and features.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            service_error(400, body),
            Error::ServiceError(400, msg) if msg == "Request must specify image and features."
        ));

        assert!(matches!(
            service_error(502, b"Bad Gateway\n"),
            Error::ServiceError(502, msg) if msg == "Bad Gateway"
        ));
    }
}
