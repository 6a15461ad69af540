//! Validation engine for compression run files.
//!
//! Each [`ValidationRule`] inspects a
//! [`CompressionSpec`](super::spec::CompressionSpec) independently; the
//! [`ValidationEngine`] gathers their findings into one [`ValidationReport`]
//! so every problem in a config file is reported in a single pass.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rapid_msc::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&spec);
//! for warning in report.warnings() {
//!     eprintln!("{warning}");
//! }
//! report.into_result()?;
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::spec::CompressionSpec;
use crate::errors::{CompressionError, Result};

/// Highest run file version this build understands.
pub const SUPPORTED_VERSION: u32 = 1;

// ─── Issue ──────────────────────────────────────────────────────────────────

/// Machine-readable category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    UnsupportedVersion,
    InvalidValue,
    Conflict,
    UnknownField,
    ValidationFailed,
}

/// What is wrong, where (JSON pointer), and how to fix it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecIssue {
    pub code: IssueCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SpecIssue {
    pub fn new(code: IssueCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for SpecIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({})", hint)?;
        }
        Ok(())
    }
}

/// Errors reject the configuration; warnings are only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub issue: SpecIssue,
}

impl ValidationDiagnostic {
    pub fn error(issue: SpecIssue) -> Self {
        Self {
            severity: Severity::Error,
            issue,
        }
    }

    pub fn warning(issue: SpecIssue) -> Self {
        Self {
            severity: Severity::Warning,
            issue,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Every finding of one validation run, in rule order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity issues.
    pub fn errors(&self) -> impl Iterator<Item = &SpecIssue> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.issue)
    }

    /// Iterate over warning-severity issues.
    pub fn warnings(&self) -> impl Iterator<Item = &SpecIssue> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.issue)
    }

    /// At least one error was found.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// The configuration can be used (warnings allowed).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Turn the first error into a [`CompressionError::InvalidConfig`].
    pub fn into_result(self) -> Result<()> {
        match self.errors().next() {
            Some(issue) => {
                let mut message = issue.message.clone();
                let others = self.errors().count() - 1;
                if others > 0 {
                    message.push_str(&format!(" (and {} more)", others));
                }
                Err(CompressionError::invalid_config(issue.path.clone(), message))
            }
            None => Ok(()),
        }
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// One check over a [`CompressionSpec`].
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"search_limits"`).
    fn name(&self) -> &str;

    fn validate(&self, spec: &CompressionSpec) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`CompressionSpec`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Engine without rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Engine with version, search limit, resource and unknown-field rules.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(VersionRule));
        engine.add_rule(Box::new(SearchLimitsRule));
        engine.add_rule(Box::new(ResourceConflictRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run every rule; findings are never short-circuited.
    pub fn validate(&self, spec: &CompressionSpec) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            let found = rule.validate(spec);
            if !found.is_empty() {
                tracing::debug!(rule = rule.name(), count = found.len(), "validation findings");
            }
            report.diagnostics.extend(found);
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ─── 1. Version ─────────────────────────────────────────────────────────────

struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &str {
        "version"
    }

    fn validate(&self, spec: &CompressionSpec) -> Vec<ValidationDiagnostic> {
        if spec.v == 0 || spec.v > SUPPORTED_VERSION {
            vec![ValidationDiagnostic::error(
                SpecIssue::new(
                    IssueCode::UnsupportedVersion,
                    "/v",
                    format!("unsupported spec version {}", spec.v),
                )
                .with_hint(format!("Set \"v\" to {SUPPORTED_VERSION}")),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 2. Search limits ───────────────────────────────────────────────────────

struct SearchLimitsRule;

impl ValidationRule for SearchLimitsRule {
    fn name(&self) -> &str {
        "search_limits"
    }

    fn validate(&self, spec: &CompressionSpec) -> Vec<ValidationDiagnostic> {
        let search = &spec.search;
        let mut out = Vec::new();

        let positive: &[(&str, Option<usize>)] = &[
            ("max_neighbors", search.max_neighbors),
            ("queue_size", search.queue_size),
            ("result_count", search.result_count),
            ("max_expansions", search.max_expansions),
        ];
        for &(field, value) in positive {
            if value == Some(0) {
                out.push(ValidationDiagnostic::error(
                    SpecIssue::new(
                        IssueCode::InvalidValue,
                        format!("/search/{field}"),
                        format!("{field} must be greater than 0"),
                    )
                    .with_hint(format!("Remove {field} to use the default, or set it to a positive value")),
                ));
            }
        }

        if let Some(lambda) = search.lambda {
            if !lambda.is_finite() || lambda < 0.0 {
                out.push(ValidationDiagnostic::error(SpecIssue::new(
                    IssueCode::InvalidValue,
                    "/search/lambda",
                    format!("lambda must be a finite, non-negative number, got {lambda}"),
                )));
            }
        }

        if let Some(length) = search.min_path_length {
            if length < 2 {
                out.push(ValidationDiagnostic::error(
                    SpecIssue::new(
                        IssueCode::InvalidValue,
                        "/search/min_path_length",
                        "min_path_length counts both sentinels and must be at least 2",
                    )
                    .with_hint("The usual value is 8"),
                ));
            }
        }

        if search.pos_separator.as_deref().is_some_and(str::is_empty) {
            out.push(ValidationDiagnostic::error(SpecIssue::new(
                IssueCode::InvalidValue,
                "/search/pos_separator",
                "pos_separator must not be empty",
            )));
        }

        if search.score_precision.is_some_and(|p| p > 17) {
            out.push(ValidationDiagnostic::warning(SpecIssue::new(
                IssueCode::InvalidValue,
                "/search/score_precision",
                "score_precision above 17 adds no information to an f64",
            )));
        }

        out
    }
}

// ─── 3. stopwords_path and language both given ──────────────────────────────

struct ResourceConflictRule;

impl ValidationRule for ResourceConflictRule {
    fn name(&self) -> &str {
        "resource_conflict"
    }

    fn validate(&self, spec: &CompressionSpec) -> Vec<ValidationDiagnostic> {
        let resources = &spec.resources;
        if resources.stopwords_path.is_some() && resources.language.is_some() {
            vec![ValidationDiagnostic::warning(
                SpecIssue::new(
                    IssueCode::Conflict,
                    "/resources/language",
                    "language is ignored when stopwords_path is set",
                )
                .with_hint("Remove one of the two"),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 4. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    /// Keys captured by `#[serde(flatten)]` below `path`, sorted.
    fn check_unknowns(
        path: &str,
        unknowns: &HashMap<String, serde_json::Value>,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        let mut keys: Vec<&String> = unknowns.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let diag_fn = if strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    SpecIssue::new(
                        IssueCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unknown field \"{key}\""),
                    )
                    .with_hint("Remove it or fix its spelling"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &CompressionSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        out.extend(Self::check_unknowns("", &spec.unknown_fields, spec.strict));
        out.extend(Self::check_unknowns("/search", &spec.search.unknown_fields, spec.strict));
        out.extend(Self::check_unknowns(
            "/resources",
            &spec.resources.unknown_fields,
            spec.strict,
        ));
        out
    }
}
