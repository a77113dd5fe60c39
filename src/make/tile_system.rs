//! System tile objects.
//!
//! Reads `prebuild/tile/system/tile-NNN.jpg` (plus shared backs) and writes
//! `assets/Templates/tile/system/tile-NNN.json` and the adjusted textures.

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;

use crate::bundle::SystemSchema;
use crate::config::{BuildPaths, HomebrewConfig};
use crate::error::{BuildError, Result};
use crate::files;
use crate::hashing::template_guid;
use crate::imaging::adjust_tile;
use crate::templates::{BaseTemplate, TemplateRegistry};
use crate::validation::{Input, Validator};

const MODEL: &str = "tile/system/system-tile.obj";
const MODEL_OFF_MAP_FACE: &str = "tile/system/system-tile-off-map.face.obj";
const MODEL_OFF_MAP_BACK: &str = "tile/system/system-tile-off-map.back.obj";
const BLANK_TILE: &str = "tile/system/blank.png";

/// Everything needed to write one tile. Image paths are relative to
/// `prebuild` and `assets/Textures` alike.
#[derive(Debug, Clone, PartialEq)]
pub struct TileInfo {
    pub guid: String,
    pub name: String,
    pub nsid: String,
    pub img_file_face: String,
    pub img_file_back: String,
    pub model_file_face: String,
    pub model_file_back: String,
    pub template_file: String,
}

impl TileInfo {
    pub fn new(source: &str, system: &SystemSchema, is_home: bool) -> Self {
        let tile = system.tile;
        let tile_str = format!("{:03}", tile);
        let template_file = format!("tile/system/tile-{}.json", tile_str);

        let (model_file_face, model_file_back) = if system.is_off_map() {
            (MODEL_OFF_MAP_FACE, MODEL_OFF_MAP_BACK)
        } else {
            (MODEL, MODEL)
        };

        let img_file_back = if system.img_face_down {
            format!("tile/system/tile-{}.back.jpg", tile_str)
        } else if is_home {
            "tile/system/green.back.jpg".to_string()
        } else if !system.anomalies.is_empty() || system.planets.is_empty() {
            "tile/system/red.back.jpg".to_string()
        } else {
            "tile/system/blue.back.jpg".to_string()
        };

        Self {
            guid: template_guid(&template_file),
            name: format!("Tile {}", tile_str),
            nsid: format!("tile.system:{}/{}", source, tile),
            img_file_face: format!("tile/system/tile-{}.jpg", tile_str),
            img_file_back,
            model_file_face: model_file_face.to_string(),
            model_file_back: model_file_back.to_string(),
            template_file,
        }
    }

    /// Backs unique to this tile get the same image adjustment as faces.
    fn has_own_back(&self) -> bool {
        self.img_file_back.starts_with("tile/system/tile-")
    }
}

/// Tile records for every system of `source` with a non-negative tile number.
/// The `base` source also gets the blank tile 0. Two systems sharing a tile
/// number would write the same template, so that is an error.
pub fn tile_infos(
    config: &HomebrewConfig,
    source: &str,
    systems: &[SystemSchema],
) -> Result<Vec<TileInfo>> {
    let mut systems = systems.to_vec();
    if source == "base" && !systems.iter().any(|s| s.tile == 0) {
        systems.push(SystemSchema {
            tile: 0,
            ..Default::default()
        });
    }
    let mut seen = HashSet::new();
    let mut infos = vec![];
    for system in systems.iter().filter(|s| s.tile >= 0) {
        let info = TileInfo::new(source, system, config.is_home_system(system));
        if !seen.insert(info.template_file.clone()) {
            return Err(BuildError::DuplicateNsid(info.nsid));
        }
        infos.push(info);
    }
    Ok(infos)
}

/// Build all system tiles for the homebrew's source.
pub fn system_tiles(
    paths: &BuildPaths,
    registry: &TemplateRegistry,
    config: &HomebrewConfig,
) -> Result<Vec<PathBuf>> {
    let infos = tile_infos(config, &config.source, &config.systems)?;

    let mut inputs = vec![];
    for info in &infos {
        inputs.push(Input::file("face", paths.prebuild_file(&info.img_file_face)));
        inputs.push(Input::file("back", paths.prebuild_file(&info.img_file_back)));
    }
    if !infos.is_empty() {
        inputs.push(Input::image("blank tile", paths.prebuild_file(BLANK_TILE)));
    }
    Validator::new().validate(&inputs).into_result()?;

    let mut written = vec![];
    let mut transform_files = vec![];
    for info in &infos {
        info!("Building tile: {}", info.name);

        let mut tile = registry.instantiate(BaseTemplate::TileSystem);
        tile.set_guid(&info.guid)
            .set_name(&info.name)
            .set_metadata(&info.nsid)
            .set_tags(&["system"]);
        tile.set_model_texture(0, &info.img_file_face)?
            .set_model_texture(1, &info.img_file_back)?
            .set_model(0, &info.model_file_face)?
            .set_model(1, &info.model_file_back)?;
        tile.write_to(&paths.templates, &info.template_file)?;
        written.push(paths.template_file(&info.template_file));

        for img in [&info.img_file_face, &info.img_file_back] {
            files::copy(&paths.prebuild_file(img), &paths.texture_file(img))?;
        }
        transform_files.push(paths.texture_file(&info.img_file_face));
        if info.has_own_back() {
            transform_files.push(paths.texture_file(&info.img_file_back));
        }
    }

    let blank = paths.prebuild_file(BLANK_TILE);
    transform_files
        .par_iter()
        .try_for_each(|file| adjust_tile(file, &blank))?;
    Ok(written)
}
