// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Default result counts per detection feature.
//!
//! A feature requested with `true` or a string placeholder resolves to the
//! default held here at the moment the request is built. A single
//! process-wide store is available through [`Defaults::global`]; clients use
//! it unless given an isolated store with `Client::with_defaults`.
//!
//! # Examples
//!
//! ```rust
//! use vision_client::{Defaults, FeatureKind};
//!
//! let defaults = Defaults::new();
//! assert_eq!(defaults.max_labels(), 100);
//!
//! defaults.set_max_labels(25).unwrap();
//! assert_eq!(defaults.get(FeatureKind::Labels), 25);
//! ```

use crate::{Error, FeatureKind};
use log::debug;
use std::{
    collections::HashMap,
    sync::{
        Arc, LazyLock,
        atomic::{AtomicU32, Ordering},
    },
};

static GLOBAL: LazyLock<Arc<Defaults>> = LazyLock::new(|| Arc::new(Defaults::new()));

/// Default count for features that return a list of results.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Default count for features that return a single result per image.
pub const DEFAULT_SINGLE_RESULT: u32 = 1;

fn factory_default(kind: FeatureKind) -> u32 {
    match kind {
        FeatureKind::Faces | FeatureKind::Landmarks | FeatureKind::Logos | FeatureKind::Labels => {
            DEFAULT_MAX_RESULTS
        }
        FeatureKind::Text | FeatureKind::SafeSearch | FeatureKind::Properties => {
            DEFAULT_SINGLE_RESULT
        }
    }
}

/// Per-feature default result counts.
///
/// Each feature has its own atomic slot so a read always observes the most
/// recently completed write for that feature, without any lock.
#[derive(Debug)]
pub struct Defaults {
    slots: [AtomicU32; 7],
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            slots: FeatureKind::ALL.map(|kind| AtomicU32::new(factory_default(kind))),
        }
    }
}

impl Defaults {
    /// Creates an isolated store holding the factory defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an isolated store with the factory defaults replaced by
    /// `overrides`, keyed by feature name (`labels`, `faces`, ...).
    pub fn with_overrides(overrides: &HashMap<String, u32>) -> Result<Self, Error> {
        let defaults = Self::new();
        for (name, value) in overrides {
            defaults.set(FeatureKind::try_from(name.as_str())?, *value)?;
        }
        Ok(defaults)
    }

    /// Returns the process-wide store.
    pub fn global() -> &'static Arc<Defaults> {
        &GLOBAL
    }

    /// Returns the current default for `kind`.
    pub fn get(&self, kind: FeatureKind) -> u32 {
        self.slots[kind.index()].load(Ordering::Acquire)
    }

    /// Replaces the default for `kind`. Zero is rejected since the service
    /// requires a positive result count.
    pub fn set(&self, kind: FeatureKind, value: u32) -> Result<(), Error> {
        if value == 0 {
            return Err(Error::InvalidParameters(format!(
                "default count for {} must be positive",
                kind
            )));
        }

        debug!("Default count for {} set to {}", kind, value);
        self.slots[kind.index()].store(value, Ordering::Release);
        Ok(())
    }

    /// Restores the factory default for every feature.
    pub fn reset(&self) {
        for kind in FeatureKind::ALL {
            self.slots[kind.index()].store(factory_default(kind), Ordering::Release);
        }
    }

    pub fn max_faces(&self) -> u32 {
        self.get(FeatureKind::Faces)
    }

    pub fn set_max_faces(&self, value: u32) -> Result<(), Error> {
        self.set(FeatureKind::Faces, value)
    }

    pub fn max_landmarks(&self) -> u32 {
        self.get(FeatureKind::Landmarks)
    }

    pub fn set_max_landmarks(&self, value: u32) -> Result<(), Error> {
        self.set(FeatureKind::Landmarks, value)
    }

    pub fn max_logos(&self) -> u32 {
        self.get(FeatureKind::Logos)
    }

    pub fn set_max_logos(&self, value: u32) -> Result<(), Error> {
        self.set(FeatureKind::Logos, value)
    }

    pub fn max_labels(&self) -> u32 {
        self.get(FeatureKind::Labels)
    }

    pub fn set_max_labels(&self, value: u32) -> Result<(), Error> {
        self.set(FeatureKind::Labels, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_factory_defaults() {
        let defaults = Defaults::new();
        assert_eq!(defaults.max_faces(), 100);
        assert_eq!(defaults.max_landmarks(), 100);
        assert_eq!(defaults.max_logos(), 100);
        assert_eq!(defaults.max_labels(), 100);
        assert_eq!(defaults.get(FeatureKind::Text), 1);
        assert_eq!(defaults.get(FeatureKind::SafeSearch), 1);
        assert_eq!(defaults.get(FeatureKind::Properties), 1);
    }

    #[test]
    fn test_set_and_reset() {
        let defaults = Defaults::new();
        defaults.set_max_labels(25).unwrap();
        defaults.set(FeatureKind::Faces, 3).unwrap();
        assert_eq!(defaults.max_labels(), 25);
        assert_eq!(defaults.max_faces(), 3);
        assert_eq!(defaults.max_logos(), 100);

        defaults.reset();
        assert_eq!(defaults.max_labels(), 100);
        assert_eq!(defaults.max_faces(), 100);
    }

    #[test]
    fn test_set_rejects_zero() {
        let defaults = Defaults::new();
        assert!(matches!(
            defaults.set_max_labels(0),
            Err(Error::InvalidParameters(_))
        ));
        assert_eq!(defaults.max_labels(), 100);
    }

    #[test]
    fn test_with_overrides() {
        let overrides = HashMap::from([("labels".to_string(), 9), ("logos".to_string(), 4)]);
        let defaults = Defaults::with_overrides(&overrides).unwrap();
        assert_eq!(defaults.max_labels(), 9);
        assert_eq!(defaults.max_logos(), 4);

        let overrides = HashMap::from([("colors".to_string(), 9)]);
        assert!(matches!(
            Defaults::with_overrides(&overrides),
            Err(Error::InvalidFeatureKind(_))
        ));
    }

    #[test]
    fn test_concurrent_writes_are_visible() {
        let defaults = Arc::new(Defaults::new());
        let writer = Arc::clone(&defaults);

        std::thread::spawn(move || writer.set_max_landmarks(42).unwrap())
            .join()
            .unwrap();

        assert_eq!(defaults.max_landmarks(), 42);
    }

    #[test]
    #[serial]
    fn test_global_is_shared() {
        let first = Defaults::global();
        let second = Defaults::global();
        assert!(Arc::ptr_eq(first, second));

        first.set_max_logos(7).unwrap();
        assert_eq!(second.max_logos(), 7);
        first.reset();
    }
}
