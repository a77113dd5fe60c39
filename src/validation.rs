//! Validation System - input checks run before a step writes anything
//!
//! Rules produce structured violations. A step collects every violation
//! first, so one run reports all missing inputs at once.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BuildError, Result};
use crate::nsid::Nsid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// Warnings are logged; any error fails with every message joined.
    pub fn into_result(self) -> Result<()> {
        for v in &self.violations {
            if v.severity == ViolationSeverity::Warning {
                tracing::warn!("{}: {}", v.rule, v.message);
            }
        }
        if !self.has_errors() {
            return Ok(());
        }
        let messages: Vec<_> = self
            .violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| v.message.clone())
            .collect();
        Err(BuildError::ValidationFailed(messages.join("\n")))
    }
}

/// One thing a build step depends on
#[derive(Debug, Clone)]
pub enum Input {
    /// A file that must exist, with a label for messages (e.g. "face").
    File { label: String, path: PathBuf },
    /// An image that must decode to a non-empty picture.
    Image { label: String, path: PathBuf },
    Nsid(String),
}

impl Input {
    pub fn file(label: &str, path: impl Into<PathBuf>) -> Self {
        Input::File {
            label: label.to_string(),
            path: path.into(),
        }
    }

    pub fn image(label: &str, path: impl Into<PathBuf>) -> Self {
        Input::Image {
            label: label.to_string(),
            path: path.into(),
        }
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &Input) -> Vec<ValidationViolation>;

    fn violation(&self, message: String) -> ValidationViolation {
        ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message,
        }
    }
}

// --- Concrete Rules ---

pub struct FileExistsRule;

impl ValidationRule for FileExistsRule {
    fn name(&self) -> &'static str {
        "file_exists"
    }

    fn validate(&self, input: &Input) -> Vec<ValidationViolation> {
        match input {
            Input::File { label, path } | Input::Image { label, path } if !path.is_file() => {
                vec![self.violation(format!("File {} not found: \"{}\"", label, path.display()))]
            }
            _ => vec![],
        }
    }
}

pub struct ImageReadableRule;

impl ValidationRule for ImageReadableRule {
    fn name(&self) -> &'static str {
        "image_readable"
    }

    fn validate(&self, input: &Input) -> Vec<ValidationViolation> {
        let Input::Image { label, path } = input else {
            return vec![];
        };
        if !path.is_file() {
            // reported by FileExistsRule
            return vec![];
        }
        match image::image_dimensions(path) {
            Ok((w, h)) if w > 0 && h > 0 => vec![],
            Ok(_) => vec![self.violation(format!(
                "Image {} is empty: \"{}\"",
                label,
                path.display()
            ))],
            Err(e) => vec![self.violation(format!(
                "Image {} unreadable: \"{}\": {}",
                label,
                path.display(),
                e
            ))],
        }
    }
}

pub struct NsidFormatRule;

impl ValidationRule for NsidFormatRule {
    fn name(&self) -> &'static str {
        "nsid_format"
    }

    fn validate(&self, input: &Input) -> Vec<ValidationViolation> {
        match input {
            Input::Nsid(nsid) => match Nsid::parse(nsid) {
                Ok(_) => vec![],
                Err(e) => vec![self.violation(e.to_string())],
            },
            _ => vec![],
        }
    }
}

/// Validator runs every rule over every input
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(FileExistsRule),
                Box::new(ImageReadableRule),
                Box::new(NsidFormatRule),
            ],
        }
    }

    pub fn validate(&self, inputs: &[Input]) -> ValidationResult {
        let violations = inputs
            .iter()
            .flat_map(|input| self.rules.iter().flat_map(move |rule| rule.validate(input)))
            .collect();
        ValidationResult { violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
