//! Metric Extraction
//!
//! Each `MetricSpec` is a named regex whose first capture group holds the value.
//! The first (leftmost) match in the whole text wins; matching is not line-anchored.
//!
//! Outcomes per spec:
//! - no match          -> `MetricValue::Absent` (not an error)
//! - match, number     -> `MetricValue::Present`
//! - match, not number -> `ParseFailure` (callers record the value as absent)

use crate::error::{Fault, ParseFailure, SpecError};
use crate::{InputFile, MetricRecord, MetricValue};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

/// A named extraction rule
#[derive(Debug, Clone)]
pub struct MetricSpec {
    name: String,
    pattern: Regex,
}

impl MetricSpec {
    /// Compile a spec. The pattern must contain at least one capture group.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, SpecError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SpecError::EmptyName);
        }
        let regex = Regex::new(pattern).map_err(|source| SpecError::InvalidPattern {
            name: name.clone(),
            source,
        })?;
        // captures_len counts the implicit whole-match group
        if regex.captures_len() < 2 {
            return Err(SpecError::MissingCaptureGroup {
                name,
                pattern: pattern.to_string(),
            });
        }
        Ok(Self {
            name,
            pattern: regex,
        })
    }

    /// Metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pattern source text
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Search `text` for the first match of this spec
    pub fn find(&self, text: &str) -> Result<MetricValue, ParseFailure> {
        let Some(caps) = self.pattern.captures(text) else {
            return Ok(MetricValue::Absent);
        };
        let captured = caps.get(1).map_or("", |m| m.as_str());
        match captured.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(MetricValue::Present(v)),
            _ => Err(ParseFailure {
                captured: captured.to_string(),
            }),
        }
    }
}

/// Ordered collection of specs with unique names
#[derive(Debug, Clone, Default)]
pub struct MetricSet {
    specs: Vec<MetricSpec>,
}

impl MetricSet {
    /// Build a set, rejecting duplicate names
    pub fn new(specs: Vec<MetricSpec>) -> Result<Self, SpecError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.name()) {
                return Err(SpecError::DuplicateMetricName(spec.name().to_string()));
            }
        }
        Ok(Self { specs })
    }

    /// Compile a set from `(name, pattern)` pairs
    pub fn from_pairs<N, P>(pairs: impl IntoIterator<Item = (N, P)>) -> Result<Self, SpecError>
    where
        N: Into<String>,
        P: AsRef<str>,
    {
        let specs = pairs
            .into_iter()
            .map(|(name, pattern)| MetricSpec::new(name, pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(specs)
    }

    /// Specs in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, MetricSpec> {
        self.specs.iter()
    }

    /// Metric names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name.clone()).collect()
    }

    /// Number of specs
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the set has no specs
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Extract every metric of `set` from `text`.
///
/// Keyed by metric name, so the result is independent of declaration order.
pub fn extract(text: &str, set: &MetricSet) -> BTreeMap<String, Result<MetricValue, ParseFailure>> {
    set.iter()
        .map(|spec| (spec.name.clone(), spec.find(text)))
        .collect()
}

/// Records and isolated faults produced by one file
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    /// One record per metric (empty when the file could not be read)
    pub records: Vec<MetricRecord>,
    /// Parse or read faults for this file
    pub faults: Vec<Fault>,
}

/// Read one file and extract every metric from it.
///
/// The file is read in full and closed before matching. Bytes that are not
/// UTF-8 are replaced rather than rejected.
pub fn extract_file(file: &InputFile, set: &MetricSet) -> FileExtraction {
    let bytes = match std::fs::read(&file.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            let fault = Fault::UnreadableFile {
                path: file.path.clone(),
                core_count: file.core_count,
                run_index: file.run_index,
                reason: e.to_string(),
            };
            tracing::warn!(path = %file.path.display(), error = %e, "skipping unreadable file");
            return FileExtraction {
                records: Vec::new(),
                faults: vec![fault],
            };
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    let mut out = FileExtraction::default();
    for (metric, result) in extract(&text, set) {
        let value = match result {
            Ok(value) => value,
            Err(failure) => {
                tracing::warn!(
                    path = %file.path.display(),
                    core_count = file.core_count,
                    run_index = file.run_index,
                    metric = %metric,
                    captured = %failure.captured,
                    "metric value did not parse, recording as absent"
                );
                out.faults.push(Fault::MetricParse {
                    path: file.path.clone(),
                    core_count: file.core_count,
                    run_index: file.run_index,
                    metric: metric.clone(),
                    failure,
                });
                MetricValue::Absent
            }
        };
        if value.is_absent() {
            tracing::debug!(path = %file.path.display(), metric = %metric, "metric absent");
        }
        out.records.push(MetricRecord {
            core_count: file.core_count,
            run_index: file.run_index,
            metric,
            value,
        });
    }
    out
}
