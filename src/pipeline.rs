//! Build Pipeline - one entry point per build step
//!
//! Each step is a linear transform. The first error aborts the step and,
//! through [`BuildPipeline::all`], the whole build.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span};

use crate::bundle::HomebrewBundle;
use crate::config::{BuildPaths, HomebrewConfig};
use crate::deck::{all_decks, CreateDeck};
use crate::error::Result;
use crate::make;
use crate::nsid_map::{self, MapFormat, NsidToTemplateId};
use crate::templates::TemplateRegistry;

pub const DEFAULT_NSID_MAP: &str = "src/nsid/nsid-to-template-id.ts";
pub const DEFAULT_BUNDLE: &str = "assets/homebrew-bundle.json";

/// The build steps, in the order [`BuildPipeline::all`] runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Icons,
    Tokens,
    FactionSheets,
    Tiles,
    Decks,
    NsidMap,
    Bundle,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Icons,
        Step::Tokens,
        Step::FactionSheets,
        Step::Tiles,
        Step::Decks,
        Step::NsidMap,
        Step::Bundle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Icons => "icons",
            Step::Tokens => "tokens",
            Step::FactionSheets => "faction-sheets",
            Step::Tiles => "tiles",
            Step::Decks => "decks",
            Step::NsidMap => "nsid-map",
            Step::Bundle => "bundle",
        }
    }
}

#[derive(Debug)]
pub struct BuildPipeline {
    paths: BuildPaths,
    config: HomebrewConfig,
    registry: TemplateRegistry,
}

impl BuildPipeline {
    pub fn new(paths: BuildPaths, config: HomebrewConfig, registry: TemplateRegistry) -> Self {
        Self {
            paths,
            config,
            registry,
        }
    }

    /// Load `homebrew.json` and optional base-template overrides.
    pub fn open(root: &Path, config_file: &Path, base_templates: Option<&Path>) -> Result<Self> {
        let paths = BuildPaths::new(root);
        let config_path = root.join(config_file);
        let config = HomebrewConfig::load(&config_path)?;
        let registry = match base_templates {
            Some(dir) => TemplateRegistry::load_from_dir(&root.join(dir))?,
            None => TemplateRegistry::new(),
        };
        Ok(Self::new(paths, config, registry))
    }

    pub fn paths(&self) -> &BuildPaths {
        &self.paths
    }

    pub fn config(&self) -> &HomebrewConfig {
        &self.config
    }

    pub fn icons(&self) -> Result<Vec<PathBuf>> {
        self.config
            .factions
            .iter()
            .map(|f| make::icon_faction(&self.paths, &f.nsid_name))
            .collect()
    }

    pub fn tokens(&self) -> Result<Vec<PathBuf>> {
        let mut written = vec![];
        for faction in &self.config.factions {
            written.extend(make::command_control_tokens(
                &self.paths,
                &self.registry,
                &self.config.source,
                faction,
            )?);
        }
        Ok(written)
    }

    pub fn faction_sheets(&self) -> Result<Vec<PathBuf>> {
        self.config
            .factions
            .iter()
            .map(|f| make::faction_sheet(&self.paths, &self.registry, &self.config.source, f))
            .collect()
    }

    pub fn tiles(&self) -> Result<Vec<PathBuf>> {
        make::system_tiles(&self.paths, &self.registry, &self.config)
    }

    /// Assemble decks for `card_types`, or the configured / standard set.
    pub fn decks(&self, card_types: &[String]) -> Result<Vec<PathBuf>> {
        let catalogue = all_decks();
        let wanted: Vec<String> = if !card_types.is_empty() {
            card_types.to_vec()
        } else if let Some(configured) = &self.config.decks {
            configured.clone()
        } else {
            catalogue.iter().map(|d| d.card_type().to_string()).collect()
        };

        let mut written = vec![];
        for card_type in &wanted {
            let deck = catalogue
                .iter()
                .find(|d| d.card_type() == card_type.as_str())
                .cloned()
                .unwrap_or_else(|| CreateDeck::new(card_type));
            written.extend(deck.go(&self.paths, &self.registry)?);
        }
        Ok(written)
    }

    pub fn nsid_map(&self) -> Result<NsidToTemplateId> {
        nsid_map::build_map(&self.paths.templates)
    }

    pub fn write_nsid_map(
        &self,
        out: Option<&Path>,
        format: MapFormat,
    ) -> Result<NsidToTemplateId> {
        let map = self.nsid_map()?;
        let out = self
            .paths
            .root
            .join(out.unwrap_or_else(|| Path::new(DEFAULT_NSID_MAP)));
        nsid_map::write_map(&map, &out, format)?;
        Ok(map)
    }

    pub fn bundle(&self, nsid_to_template_id: NsidToTemplateId) -> HomebrewBundle {
        HomebrewBundle {
            source_and_package_id: self.config.source_and_package_id(),
            factions: self.config.factions.clone(),
            systems: self.config.systems.clone(),
            planet_attachments: self.config.planet_attachments.clone(),
            unit_attrs: self.config.unit_attrs.clone(),
            technologies: self.config.technologies.clone(),
            nsid_to_template_id,
        }
    }

    pub fn write_bundle(&self, out: Option<&Path>) -> Result<HomebrewBundle> {
        let bundle = self.bundle(self.nsid_map()?);
        let out = self
            .paths
            .root
            .join(out.unwrap_or_else(|| Path::new(DEFAULT_BUNDLE)));
        bundle.write(&out)?;
        Ok(bundle)
    }

    /// Run one step with default outputs.
    pub fn run(&self, step: Step) -> Result<()> {
        let _span = info_span!("step", name = step.name()).entered();
        let start = Instant::now();
        let count = match step {
            Step::Icons => self.icons()?.len(),
            Step::Tokens => self.tokens()?.len(),
            Step::FactionSheets => self.faction_sheets()?.len(),
            Step::Tiles => self.tiles()?.len(),
            Step::Decks => self.decks(&[])?.len(),
            Step::NsidMap => self.write_nsid_map(None, MapFormat::Ts)?.len(),
            Step::Bundle => {
                self.write_bundle(None)?;
                1
            }
        };
        info!("{} done: {} outputs in {:?}", step.name(), count, start.elapsed());
        Ok(())
    }

    /// Every step in order. Stops at the first failure.
    pub fn all(&self) -> Result<()> {
        for step in Step::ALL {
            self.run(step).map_err(|e| {
                tracing::error!("{} failed", step.name());
                e
            })?;
        }
        Ok(())
    }
}

