// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict detection and strategy selection

use super::classify::{
    ConflictClassifier, ConflictSignal, MessagePatternClassifier, VersionConflictClassifier,
};
use super::info::{ConflictInfo, ConflictScope};
use super::strategy::RetryStrategy;
use crate::config::StrategySettings;
use std::error::Error;

/// Decides whether an error is a version conflict and how to retry it
///
/// Classifiers are consulted in registration order, each against the whole
/// `source()` chain, so a typed match deep in the chain wins over a message
/// match on an outer wrapper.
pub struct ConflictDetector {
    classifiers: Vec<Box<dyn ConflictClassifier>>,
    settings: StrategySettings,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::from_settings(StrategySettings::default())
    }
}

impl std::fmt::Debug for ConflictDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictDetector")
            .field("classifiers", &self.classifiers.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl ConflictDetector {
    /// Detector with no classifiers; add them with [`with_classifier`](Self::with_classifier)
    pub fn empty(settings: StrategySettings) -> Self {
        Self {
            classifiers: Vec::new(),
            settings,
        }
    }

    /// Typed [`VersionConflict`](super::VersionConflict) matching plus the
    /// configured message patterns
    pub fn from_settings(settings: StrategySettings) -> Self {
        let patterns = MessagePatternClassifier::new(&settings.conflict_patterns);
        let mut detector = Self::empty(settings).with_classifier(VersionConflictClassifier);
        if !patterns.patterns().is_empty() {
            detector = detector.with_classifier(patterns);
        }
        detector
    }

    pub fn with_classifier(mut self, classifier: impl ConflictClassifier + 'static) -> Self {
        self.classifiers.push(Box::new(classifier));
        self
    }

    pub fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    pub fn is_conflict(&self, err: &(dyn Error + 'static)) -> bool {
        self.find_conflict(err).is_some()
    }

    /// First classifier match anywhere in the cause chain
    pub fn find_conflict(&self, err: &(dyn Error + 'static)) -> Option<ConflictSignal> {
        self.classifiers.iter().find_map(|classifier| {
            chain(err).find_map(|link| classifier.classify(link))
        })
    }

    /// Package a conflict with the caller's context
    ///
    /// Versions missing from the error fall back to the scope's expected
    /// version (or 0), with `actual = expected + 1`.
    pub fn detect_conflict(
        &self,
        err: &(dyn Error + 'static),
        scope: &ConflictScope,
    ) -> Option<ConflictInfo> {
        let signal = self.find_conflict(err)?;
        let expected = signal
            .expected
            .or(scope.expected_version)
            .unwrap_or(0);
        let actual = signal
            .actual
            .filter(|actual| *actual > expected)
            .unwrap_or_else(|| expected.saturating_add(1));
        Some(ConflictInfo::new(scope, expected, actual))
    }

    pub fn suggest_retry_strategy(&self, info: &ConflictInfo) -> RetryStrategy {
        let thresholds = self.settings.thresholds_for(&info.entity_type);
        let gap = info.version_gap();
        if gap <= thresholds.immediate_max_gap {
            RetryStrategy::Immediate
        } else if gap <= thresholds.linear_max_gap {
            RetryStrategy::LinearBackoff
        } else {
            RetryStrategy::ExponentialBackoff
        }
    }
}

fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
