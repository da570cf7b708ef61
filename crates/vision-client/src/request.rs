// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{Error, FeatureKind, FeatureSpec, ImagePayload};
use serde::Serialize;

/// One image together with the features requested for it.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AnnotateRequest {
    image: ImagePayload,
    features: Vec<FeatureSpec>,
}

impl AnnotateRequest {
    pub fn image(&self) -> &ImagePayload {
        &self.image
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    /// Returns true when `kind` is among the requested features.
    pub fn requested(&self, kind: FeatureKind) -> bool {
        self.features.iter().any(|f| f.kind() == kind)
    }
}

/// The body of a batch annotate call.
///
/// Entry `i` always corresponds to image `i` of the call that produced it,
/// which is what lets responses be matched back by position.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BatchRequest {
    requests: Vec<AnnotateRequest>,
}

impl BatchRequest {
    pub fn requests(&self) -> &[AnnotateRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Serializes the request into the JSON body expected by the service.
    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Combines images and features into a batch request.
///
/// Every image receives the same feature list, and image order is preserved.
/// Fails with [`Error::EmptyImageSet`] when `images` is empty.
pub fn assemble(images: Vec<ImagePayload>, features: &[FeatureSpec]) -> Result<BatchRequest, Error> {
    if images.is_empty() {
        return Err(Error::EmptyImageSet);
    }

    let requests = images
        .into_iter()
        .map(|image| AnnotateRequest {
            image,
            features: features.to_vec(),
        })
        .collect();

    Ok(BatchRequest { requests })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn label_features(max_results: u32) -> Vec<FeatureSpec> {
        vec![FeatureSpec::new(FeatureKind::Labels, max_results).unwrap()]
    }

    #[test]
    fn test_assemble_empty() {
        assert!(matches!(
            assemble(Vec::new(), &label_features(1)),
            Err(Error::EmptyImageSet)
        ));
    }

    #[test]
    fn test_assemble_preserves_order_and_features() {
        let images: Vec<ImagePayload> = (0u8..4)
            .map(|i| ImagePayload::Content(vec![i + 1; 3]))
            .collect();
        let features = vec![
            FeatureSpec::new(FeatureKind::Faces, 2).unwrap(),
            FeatureSpec::new(FeatureKind::Labels, 5).unwrap(),
        ];

        let batch = assemble(images.clone(), &features).unwrap();
        assert_eq!(batch.len(), 4);
        for (request, image) in batch.requests().iter().zip(&images) {
            assert_eq!(request.image(), image);
            assert_eq!(request.features(), &features[..]);
            assert!(request.requested(FeatureKind::Labels));
            assert!(!request.requested(FeatureKind::Logos));
        }
    }

    #[test]
    fn test_wire_format() {
        let batch = assemble(vec![ImagePayload::Content(b"abc".to_vec())], &label_features(1))
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&batch.to_json().unwrap()).unwrap();

        assert_eq!(
            body,
            json!({
                "requests": [{
                    "image": {"content": "YWJj"},
                    "features": [{"type": "LABEL_DETECTION", "maxResults": 1}]
                }]
            })
        );
    }
}
