//! Homebrew Prebuild - asset pipeline for TI4 homebrew on Tabletop Playground
//!
//! Turns staged images and card data into host object templates and
//! textures, and emits the registration bundle the mod's load script hands
//! to the host's homebrew registry.
//!
//! # Guarantees
//! 1. Template GUIDs are a pure function of the template path
//! 2. Rerunning a step on unchanged inputs rewrites identical outputs
//! 3. Any failure stops the build

pub mod bundle;
pub mod config;
pub mod deck;
pub mod error;
pub mod files;
pub mod hashing;
pub mod imaging;
pub mod make;
pub mod nsid;
pub mod nsid_map;
pub mod pipeline;
pub mod templates;
pub mod validation;

pub use bundle::HomebrewBundle;
pub use config::{BuildPaths, HomebrewConfig};
pub use deck::{CardsheetCard, CardsheetParams, CreateDeck};
pub use error::{BuildError, Result};
pub use hashing::{canonical_json, sha256_hex, template_guid};
pub use nsid::Nsid;
pub use nsid_map::{MapFormat, NsidToTemplateId};
pub use pipeline::{BuildPipeline, Step};
pub use templates::{BaseTemplate, ObjectTemplate, TemplateRegistry};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};

pub const PREBUILD_VERSION: &str = env!("CARGO_PKG_VERSION");
