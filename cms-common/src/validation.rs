//! Form validation primitives
//!
//! Validators collect every problem they find instead of stopping at the
//! first one, so a form can highlight all offending fields in one round.
//! Field paths use dotted notation with array indices, e.g. `answers.1.match`.

use serde::Serialize;
use std::fmt;

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field
    pub path: String,
    /// Human-readable message
    pub message: String,
}

/// Accumulated field errors for one form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at `path`
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Fail `path` when `value` is empty or whitespace only
    pub fn require_text(&mut self, path: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.push(path, "Required");
        }
    }

    /// Fail `path` unless `value` looks like an absolute http(s) URL
    pub fn require_url(&mut self, path: impl Into<String>, value: &str) {
        let path = path.into();
        if value.trim().is_empty() {
            self.push(path, "Required");
        } else if !is_http_url(value) {
            self.push(path, "Must be an http(s) URL");
        }
    }

    /// Same as [`require_url`](Self::require_url) but accepts `None`
    pub fn optional_url(&mut self, path: impl Into<String>, value: Option<&str>) {
        if let Some(v) = value {
            if !v.trim().is_empty() && !is_http_url(v) {
                self.push(path, "Must be an http(s) URL");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// True if any error was recorded for exactly `path`
    pub fn has(&self, path: &str) -> bool {
        self.0.iter().any(|e| e.path == path)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn is_http_url(value: &str) -> bool {
    let v = value.trim();
    let rest = v
        .strip_prefix("https://")
        .or_else(|| v.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}
