//! Dynamic-page binding configuration.
//!
//! A templated page (product/post detail) is materialized by resolving a
//! [`DynamicConfig`] against an externally fetched record: the
//! [`SlugPattern`] matches the request URL and yields the slug, the external
//! collaborator fetches the record by `slug_field`, and the engine applies
//! each [`Binding`] to the block tree. This module holds only the persisted
//! configuration shape plus the pattern matching the config type owns —
//! fetching belongs to the collaborator.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::EnumString;
use thiserror::Error;

use crate::ids::BlockId;

/// Which data query the dynamic-page collaborator selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSourceKind {
    /// Commerce product record.
    #[default]
    Product,
    /// Blog/CMS post record.
    Post,
    /// Taxonomy category record.
    Category,
    /// Host-defined custom collection.
    Custom,
}

impl DataSourceKind {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Product => "PRODUCT",
            DataSourceKind::Post => "POST",
            DataSourceKind::Category => "CATEGORY",
            DataSourceKind::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from [`SlugPattern::parse`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern did not start with `/`.
    #[error("slug pattern must start with '/': {0:?}")]
    MissingLeadingSlash(String),

    /// A `:` segment had no parameter name.
    #[error("slug pattern {pattern:?} has an empty parameter at segment {segment}")]
    EmptyParameter { pattern: String, segment: usize },
}

/// A URL template with named parameters, e.g. `/product/:productSlug`.
///
/// Literal segments match exactly; `:name` segments capture one non-empty
/// path segment. Stored as the raw template string (the persisted form).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlugPattern(String);

impl SlugPattern {
    /// Parse and validate a pattern string.
    pub fn parse(pattern: impl Into<String>) -> Result<Self, PatternError> {
        let pattern = pattern.into();
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern));
        }
        for (i, seg) in pattern[1..].split('/').enumerate() {
            if seg == ":" {
                return Err(PatternError::EmptyParameter {
                    pattern: pattern.clone(),
                    segment: i,
                });
            }
        }
        Ok(Self(pattern))
    }

    /// The raw template string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Named parameters in template order, without the leading `:`.
    pub fn params(&self) -> Vec<&str> {
        self.0
            .split('/')
            .filter_map(|seg| seg.strip_prefix(':'))
            .collect()
    }

    /// Match a concrete request path, extracting parameter values.
    ///
    /// Returns `None` unless the segment counts agree, every literal segment
    /// matches exactly, and every parameter captures a non-empty value.
    pub fn match_path(&self, path: &str) -> Option<IndexMap<String, String>> {
        let template: Vec<&str> = self.0.split('/').collect();
        let concrete: Vec<&str> = path.split('/').collect();
        if template.len() != concrete.len() {
            return None;
        }

        let mut captured = IndexMap::new();
        for (tpl, got) in template.iter().zip(&concrete) {
            match tpl.strip_prefix(':') {
                Some(name) => {
                    if got.is_empty() {
                        return None;
                    }
                    captured.insert(name.to_string(), got.to_string());
                }
                None => {
                    if tpl != got {
                        return None;
                    }
                }
            }
        }
        Some(captured)
    }
}

impl fmt::Display for SlugPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One declared mapping from a record field to a block content property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// The block the value lands on.
    pub block_id: BlockId,
    /// Dotted path into the fetched record, e.g. `"pricing.amount"`.
    pub source_field_path: String,
    /// Dotted path on the node, e.g. `"content.title"`.
    pub target_property: String,
}

impl Binding {
    pub fn new(
        block_id: impl Into<BlockId>,
        source_field_path: impl Into<String>,
        target_property: impl Into<String>,
    ) -> Self {
        Self {
            block_id: block_id.into(),
            source_field_path: source_field_path.into(),
            target_property: target_property.into(),
        }
    }
}

/// Binding configuration persisted as a field of the page document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicConfig {
    /// Which data query the collaborator selects.
    pub data_source_kind: DataSourceKind,
    /// URL template the page is served under.
    pub slug_pattern: SlugPattern,
    /// Record field matched against the captured slug parameter.
    pub slug_field: String,
    /// Ordered binding list. Order is presentation only — resolution is
    /// order-independent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,
}

// ============================================================================
// Tests
// ============================================================================
