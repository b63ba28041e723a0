// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error classifiers

use super::info::VersionConflict;
use std::error::Error;

/// What a classifier learned from a single error in a cause chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictSignal {
    pub expected: Option<u64>,
    pub actual: Option<u64>,
}

impl ConflictSignal {
    /// A conflict with no version information
    pub fn opaque() -> Self {
        Self::default()
    }

    pub fn versions(expected: u64, actual: u64) -> Self {
        Self {
            expected: Some(expected),
            actual: Some(actual),
        }
    }
}

/// Recognises conflicts raised by a particular persistence layer
pub trait ConflictClassifier: Send + Sync {
    /// Inspect one error (not its sources) and report whether it is a conflict
    fn classify(&self, err: &(dyn Error + 'static)) -> Option<ConflictSignal>;
}

/// Matches [`VersionConflict`] by type
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionConflictClassifier;

impl ConflictClassifier for VersionConflictClassifier {
    fn classify(&self, err: &(dyn Error + 'static)) -> Option<ConflictSignal> {
        err.downcast_ref::<VersionConflict>()
            .map(|c| ConflictSignal::versions(c.expected, c.actual))
    }
}

/// Matches drivers that only expose a message, by case-insensitive substring
#[derive(Debug, Clone, Default)]
pub struct MessagePatternClassifier {
    patterns: Vec<String>,
}

impl MessagePatternClassifier {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl ConflictClassifier for MessagePatternClassifier {
    fn classify(&self, err: &(dyn Error + 'static)) -> Option<ConflictSignal> {
        if self.patterns.is_empty() {
            return None;
        }
        let message = err.to_string().to_lowercase();
        self.patterns
            .iter()
            .any(|p| message.contains(p.as_str()))
            .then(ConflictSignal::opaque)
    }
}
