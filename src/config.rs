//! Homebrew definition (`homebrew.json`) and project layout.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::bundle::{
    FactionSchema, PlanetAttachmentSchema, SourceAndPackageId, SystemSchema, TechSchema,
    UnitAttrsSchema,
};
use crate::error::{BuildError, Result};
use crate::files;
use crate::PREBUILD_VERSION;

fn default_min_version() -> String {
    "1.0.0".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomebrewConfig {
    /// NSID source, e.g. `homebrew.loxon`.
    pub source: String,
    #[serde(default)]
    pub package_id: String,
    #[serde(default = "default_min_version")]
    pub min_prebuild_version: String,
    #[serde(default)]
    pub factions: Vec<FactionSchema>,
    #[serde(default)]
    pub systems: Vec<SystemSchema>,
    #[serde(default)]
    pub planet_attachments: Vec<PlanetAttachmentSchema>,
    #[serde(default)]
    pub unit_attrs: Vec<UnitAttrsSchema>,
    #[serde(default)]
    pub technologies: Vec<TechSchema>,
    /// Card types to assemble; every standard type when absent.
    #[serde(default)]
    pub decks: Option<Vec<String>>,
}

impl HomebrewConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = files::read_json(path)?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        if self.source.is_empty() || self.source.contains([':', '/']) {
            return Err(BuildError::Config(format!(
                "source \"{}\" must be non-empty without ':' or '/'",
                self.source
            )));
        }
        let mut nsid_names = HashSet::new();
        for faction in &self.factions {
            if faction.nsid_name.is_empty() || faction.abbr.is_empty() {
                return Err(BuildError::Config(format!(
                    "faction \"{}\" needs nsidName and abbr",
                    faction.name
                )));
            }
            if !nsid_names.insert(faction.nsid_name.as_str()) {
                return Err(BuildError::Config(format!(
                    "faction nsidName \"{}\" is used more than once",
                    faction.nsid_name
                )));
            }
        }
        let mut tiles = HashSet::new();
        for system in &self.systems {
            if !tiles.insert(system.tile) {
                return Err(BuildError::Config(format!(
                    "system tile {} is defined more than once",
                    system.tile
                )));
            }
        }
        self.check_version()
    }

    fn check_version(&self) -> Result<()> {
        let current = semver::Version::parse(PREBUILD_VERSION)
            .map_err(|_| BuildError::Config("Invalid prebuild version".into()))?;
        let required = semver::Version::parse(&self.min_prebuild_version).map_err(|_| {
            BuildError::Config(format!(
                "Invalid minPrebuildVersion \"{}\"",
                self.min_prebuild_version
            ))
        })?;
        if current < required {
            return Err(BuildError::VersionMismatch {
                required: self.min_prebuild_version.clone(),
                current: PREBUILD_VERSION.to_string(),
            });
        }
        Ok(())
    }

    pub fn source_and_package_id(&self) -> SourceAndPackageId {
        SourceAndPackageId {
            source: self.source.clone(),
            package_id: self.package_id.clone(),
        }
    }

    /// True if `tile` is flagged home or is some faction's home system.
    pub fn is_home_system(&self, system: &SystemSchema) -> bool {
        system.is_home || self.factions.iter().any(|f| f.home == system.tile)
    }
}

/// Input and output trees under a project root
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub root: PathBuf,
    pub prebuild: PathBuf,
    pub templates: PathBuf,
    pub textures: PathBuf,
}

impl BuildPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            prebuild: root.join("prebuild"),
            templates: root.join("assets").join("Templates"),
            textures: root.join("assets").join("Textures"),
            root,
        }
    }

    pub fn prebuild_file(&self, relative: &str) -> PathBuf {
        self.prebuild.join(relative)
    }

    pub fn texture_file(&self, relative: &str) -> PathBuf {
        self.textures.join(relative)
    }

    pub fn template_file(&self, relative: &str) -> PathBuf {
        self.templates.join(relative)
    }
}
