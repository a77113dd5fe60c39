//! Registration bundle handed to the host's homebrew registry at load time.
//!
//! Field names follow the registry's schema (camelCase). Records are read
//! from `homebrew.json` and written back out together with the NSID map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;
use crate::files;
use crate::hashing::fingerprint;

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAndPackageId {
    pub source: String,
    /// Empty means "the package this script runs from", resolved by the host.
    #[serde(default)]
    pub package_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionLeaders {
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub commanders: Vec<String>,
    #[serde(default)]
    pub heroes: Vec<String>,
    #[serde(default)]
    pub mechs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionExtra {
    pub nsid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionSchema {
    pub name: String,
    pub nsid_name: String,
    pub abbr: String,
    #[serde(default)]
    pub abilities: Vec<String>,
    pub commodities: u32,
    #[serde(default)]
    pub faction_techs: Vec<String>,
    pub home: i32,
    #[serde(default)]
    pub leaders: FactionLeaders,
    #[serde(default)]
    pub promissories: Vec<String>,
    #[serde(default)]
    pub starting_techs: Vec<String>,
    #[serde(default)]
    pub starting_units: BTreeMap<String, u32>,
    #[serde(default)]
    pub unit_overrides: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<FactionExtra>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetSchema {
    pub name: String,
    pub nsid_name: String,
    #[serde(default)]
    pub resources: u32,
    #[serde(default)]
    pub influence: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub techs: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_legendary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSchema {
    pub tile: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub planets: Vec<PlanetSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wormholes: Vec<String>,
    /// `"off-map"` for systems that never sit on the map grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_home: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub img_face_down: bool,
}

impl SystemSchema {
    pub fn is_off_map(&self) -> bool {
        self.class.as_deref() == Some("off-map")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetAttachmentSchema {
    pub name: String,
    pub nsid_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influence: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub techs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatAttrs {
    pub hit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dice: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitAttrsSchema {
    pub unit: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsid_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#move: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_sustain_damage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_combat: Option<CombatAttrs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_combat: Option<CombatAttrs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechSchema {
    pub name: String,
    pub nsid_name: String,
    pub color: String,
    #[serde(default)]
    pub prerequisites: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_faction_tech: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces_nsid_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomebrewBundle {
    pub source_and_package_id: SourceAndPackageId,
    pub factions: Vec<FactionSchema>,
    pub systems: Vec<SystemSchema>,
    pub planet_attachments: Vec<PlanetAttachmentSchema>,
    pub unit_attrs: Vec<UnitAttrsSchema>,
    pub technologies: Vec<TechSchema>,
    pub nsid_to_template_id: BTreeMap<String, String>,
}

impl HomebrewBundle {
    /// Cross-reference problems that do not stop the build.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = vec![];
        for faction in &self.factions {
            if !self.systems.iter().any(|s| s.tile == faction.home) {
                out.push(format!(
                    "faction \"{}\" home system {} is not defined by this homebrew",
                    faction.nsid_name, faction.home
                ));
            }
            for extra in &faction.extras {
                if !self.nsid_to_template_id.contains_key(&extra.nsid) {
                    out.push(format!(
                        "faction \"{}\" extra \"{}\" has no template",
                        faction.nsid_name, extra.nsid
                    ));
                }
            }
        }
        for tech in &self.technologies {
            if let Some(replaced) = &tech.replaces_nsid_name {
                if replaced == &tech.nsid_name {
                    out.push(format!("technology \"{}\" replaces itself", tech.nsid_name));
                }
            }
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        for warning in self.warnings() {
            warn!("{}", warning);
        }
        files::write_json_pretty(path, self)?;
        info!(
            "Created: {} (fingerprint {})",
            path.display(),
            &fingerprint(self)?[..12]
        );
        Ok(())
    }
}
