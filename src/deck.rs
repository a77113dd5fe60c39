//! Deck assembly: per-card JSON + image pairs grouped by source into cardsheets.
//!
//! Inputs live under `prebuild/card/<card type>/`. Each `<card>.json` holds
//! `{ "name", "nsid" }` and sits next to either `<card>.jpg` (shared back)
//! or `<card>.face.jpg` + `<card>.back.jpg`.

use image::{imageops, imageops::FilterType, DynamicImage, RgbImage};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::BuildPaths;
use crate::error::{BuildError, Result};
use crate::files;
use crate::hashing::template_guid;
use crate::imaging;
use crate::nsid::deck_source_key;
use crate::templates::{BaseTemplate, TemplateRegistry};
use crate::validation::{Input, Validator};

/// Largest cardsheet texture the host loads.
pub const MAX_SHEET_PX: u32 = 4096;

const STRIP_NAME_SUFFIX: &str = " (PoK)";

/// A card on a sheet. Image paths are relative to the project root.
#[derive(Debug, Clone, PartialEq)]
pub struct CardsheetCard {
    pub metadata: String,
    pub name: String,
    pub face: String,
    pub back: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardsheetParams {
    /// Output path stem relative to the Templates/Textures roots.
    pub asset_filename: String,
    pub template_name: String,
    pub apply_all_tags: Vec<String>,
    pub card_size_pixel: (u32, u32),
    pub card_size_world: (f64, f64),
    /// Shared back image, relative to the project root.
    pub back: Option<String>,
    pub cards: Vec<CardsheetCard>,
}

#[derive(Deserialize)]
struct CardJson {
    name: String,
    nsid: String,
}

#[derive(Debug, Clone)]
pub struct CreateDeck {
    card_type: String,
    portrait: bool,
    w_px: u32,
    h_px: u32,
    w_world: f64,
    h_world: f64,
}

impl CreateDeck {
    pub fn new(card_type: &str) -> Self {
        Self {
            card_type: card_type.to_string(),
            portrait: true,
            w_px: 500,
            h_px: 750,
            w_world: 4.2,
            h_world: 6.3,
        }
    }

    pub fn set_is_portrait(mut self, portrait: bool) -> Self {
        self.portrait = portrait;
        self
    }

    pub fn set_size_px(mut self, w: u32, h: u32) -> Self {
        self.w_px = w;
        self.h_px = h;
        self
    }

    pub fn set_size_world(mut self, w: f64, h: f64) -> Self {
        self.w_world = w;
        self.h_world = h;
        self
    }

    pub fn card_type(&self) -> &str {
        &self.card_type
    }

    fn dashed_type(&self) -> String {
        self.card_type.replace('/', "-")
    }

    pub fn card_json_files(&self, paths: &BuildPaths) -> Result<Vec<PathBuf>> {
        files::files_with_extension(&paths.prebuild.join("card").join(&self.card_type), "json")
    }

    pub fn source_to_cards(
        &self,
        paths: &BuildPaths,
        json_files: &[PathBuf],
    ) -> Result<BTreeMap<String, Vec<CardsheetCard>>> {
        let mut result: BTreeMap<String, Vec<CardsheetCard>> = BTreeMap::new();
        for json_file in json_files {
            let card: CardJson = files::read_json(json_file)?;

            let name = card
                .name
                .strip_suffix(STRIP_NAME_SUFFIX)
                .unwrap_or(&card.name)
                .to_string();
            let nsid = card.nsid.replace('_', "-");
            let source = deck_source_key(&nsid)?;

            let stem = json_file.to_string_lossy();
            let stem = stem.strip_suffix(".json").unwrap_or(&stem);
            let single = PathBuf::from(format!("{}.jpg", stem));
            let (face, back) = if single.exists() {
                (single, None)
            } else {
                (
                    PathBuf::from(format!("{}.face.jpg", stem)),
                    Some(PathBuf::from(format!("{}.back.jpg", stem))),
                )
            };

            debug!("card {} ({}) in {}", nsid, name, source);
            result.entry(source).or_default().push(CardsheetCard {
                metadata: nsid,
                name,
                face: files::relative_slash(&face, &paths.root),
                back: back.map(|b| files::relative_slash(&b, &paths.root)),
            });
        }
        Ok(result)
    }

    pub fn params(&self, source: &str, cards: Vec<CardsheetCard>) -> Result<CardsheetParams> {
        let first = cards
            .first()
            .ok_or_else(|| BuildError::Config(format!("no cards for source: {}", source)))?;
        let uses_shared_back = first.back.is_none();

        let mut tags = vec![format!("card-{}", self.dashed_type())];
        if self.card_type.starts_with("technology") {
            tags.push("card-technology".to_string());
        }
        let apply_all_tags = tags
            .into_iter()
            .map(|tag| tag.replacen("-public-", "-", 1))
            .collect();

        let (card_size_pixel, card_size_world) = if self.portrait {
            ((self.w_px, self.h_px), (self.w_world, self.h_world))
        } else {
            ((self.h_px, self.w_px), (self.h_world, self.w_world))
        };

        Ok(CardsheetParams {
            asset_filename: format!("card/{}/{}", self.card_type, source),
            template_name: self.card_type.clone(),
            apply_all_tags,
            card_size_pixel,
            card_size_world,
            back: uses_shared_back
                .then(|| format!("prebuild/card/shared-back/{}.back.jpg", self.dashed_type())),
            cards,
        })
    }

    /// Build every source's cardsheet in parallel. Returns the templates written.
    pub fn go(&self, paths: &BuildPaths, registry: &TemplateRegistry) -> Result<Vec<PathBuf>> {
        let json_files = self.card_json_files(paths)?;
        if json_files.is_empty() {
            debug!("no cards for {}", self.card_type);
            return Ok(vec![]);
        }
        let params = self
            .source_to_cards(paths, &json_files)?
            .into_iter()
            .map(|(source, cards)| self.params(&source, cards))
            .collect::<Result<Vec<_>>>()?;

        let written: Vec<Vec<PathBuf>> = params
            .into_par_iter()
            .map(|p| {
                let sheet = Cardsheet::new(p, paths, registry);
                sheet.clean()?;
                sheet.write_files()
            })
            .collect::<Result<_>>()?;
        Ok(written.into_iter().flatten().collect())
    }
}

/// Standard card types and their sizing
pub fn all_decks() -> Vec<CreateDeck> {
    vec![
        CreateDeck::new("action"),
        CreateDeck::new("agenda"),
        CreateDeck::new("alliance").set_is_portrait(false),
        CreateDeck::new("event")
            .set_size_px(1417, 826)
            .set_size_world(12.9, 7.5),
        CreateDeck::new("exploration/cultural"),
        CreateDeck::new("exploration/industrial"),
        CreateDeck::new("exploration/hazardous"),
        CreateDeck::new("exploration/frontier"),
        CreateDeck::new("faction-reference")
            .set_size_px(969, 682)
            .set_size_world(8.8, 6.3),
        CreateDeck::new("faction-token"),
        CreateDeck::new("leader").set_is_portrait(false),
        CreateDeck::new("legendary-planet").set_is_portrait(false),
        CreateDeck::new("objective/public-1"),
        CreateDeck::new("objective/public-2"),
        CreateDeck::new("objective/secret"),
        CreateDeck::new("other"),
        CreateDeck::new("planet"),
        CreateDeck::new("promissory"),
        CreateDeck::new("relic"),
        CreateDeck::new("technology/blue").set_is_portrait(false),
        CreateDeck::new("technology/green").set_is_portrait(false),
        CreateDeck::new("technology/red").set_is_portrait(false),
        CreateDeck::new("technology/yellow").set_is_portrait(false),
        CreateDeck::new("technology/unit-upgrade").set_is_portrait(false),
        CreateDeck::new("technology/none").set_is_portrait(false),
        CreateDeck::new("unknown"),
    ]
}

/// Grid of a single sheet holding `count` cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub cols: u32,
    pub rows: u32,
}

/// Split `count` cards of `card_px` into sheets that fit [`MAX_SHEET_PX`].
pub fn sheet_layouts(card_px: (u32, u32), count: usize) -> Vec<(usize, SheetLayout)> {
    let max_cols = (MAX_SHEET_PX / card_px.0.max(1)).max(1) as usize;
    let max_rows = (MAX_SHEET_PX / card_px.1.max(1)).max(1) as usize;
    let per_sheet = max_cols * max_rows;

    let mut out = vec![];
    let mut remaining = count;
    while remaining > 0 {
        let n = remaining.min(per_sheet);
        let cols = n.min(max_cols);
        let rows = n.div_ceil(cols);
        out.push((
            n,
            SheetLayout {
                cols: cols as u32,
                rows: rows as u32,
            },
        ));
        remaining -= n;
    }
    out
}

pub struct Cardsheet<'a> {
    params: CardsheetParams,
    paths: &'a BuildPaths,
    registry: &'a TemplateRegistry,
}

impl<'a> Cardsheet<'a> {
    pub fn new(
        params: CardsheetParams,
        paths: &'a BuildPaths,
        registry: &'a TemplateRegistry,
    ) -> Self {
        Self {
            params,
            paths,
            registry,
        }
    }

    /// Asset stem of sheet `index`: the first sheet keeps the plain name.
    fn sheet_asset(&self, index: usize) -> String {
        if index == 0 {
            self.params.asset_filename.clone()
        } else {
            format!("{}.{}", self.params.asset_filename, index)
        }
    }

    /// Remove outputs of a previous run, including overflow sheets.
    pub fn clean(&self) -> Result<()> {
        let asset = Path::new(&self.params.asset_filename);
        let leaf = asset
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix = format!("{}.", leaf);
        let parent = asset.parent().unwrap_or(Path::new(""));

        for root in [&self.paths.templates, &self.paths.textures] {
            let dir = root.join(parent);
            if !dir.is_dir() {
                continue;
            }
            let entries = std::fs::read_dir(&dir).map_err(|e| BuildError::io(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| BuildError::io(&dir, e))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                let Some(rest) = name.strip_prefix(&prefix) else {
                    continue;
                };
                let head = rest.split('.').next().unwrap_or_default();
                let ours = matches!(head, "json" | "face" | "back")
                    || (!head.is_empty() && head.chars().all(|c| c.is_ascii_digit()));
                if ours && files::remove_if_exists(&entry.path())? {
                    debug!("removed {}", entry.path().display());
                }
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let mut inputs = vec![];
        for card in &self.params.cards {
            inputs.push(Input::Nsid(card.metadata.clone()));
            inputs.push(Input::image("face", self.paths.root.join(&card.face)));
            if let Some(back) = &card.back {
                inputs.push(Input::image("back", self.paths.root.join(back)));
            }
        }
        if let Some(back) = &self.params.back {
            inputs.push(Input::image("shared back", self.paths.root.join(back)));
        }
        let per_card_backs = self.params.cards.iter().filter(|c| c.back.is_some()).count();
        if per_card_backs != 0 && per_card_backs != self.params.cards.len() {
            return Err(BuildError::Config(format!(
                "{}: cards mix shared and per-card backs",
                self.params.asset_filename
            )));
        }
        Validator::new().validate(&inputs).into_result()
    }

    fn compose(&self, images: &[&str], layout: SheetLayout) -> Result<RgbImage> {
        let (w, h) = self.params.card_size_pixel;
        let mut sheet = RgbImage::new(layout.cols * w, layout.rows * h);
        for (i, rel) in images.iter().enumerate() {
            let path = self.paths.root.join(rel);
            let img = image::open(&path).map_err(|e| BuildError::image(&path, e))?.to_rgb8();
            let img = if img.dimensions() == (w, h) {
                img
            } else {
                imageops::resize(&img, w, h, FilterType::Lanczos3)
            };
            let col = i as u32 % layout.cols;
            let row = i as u32 / layout.cols;
            imageops::replace(&mut sheet, &img, (col * w) as i64, (row * h) as i64);
        }
        Ok(sheet)
    }

    /// Write textures and templates. Returns the template paths.
    pub fn write_files(&self) -> Result<Vec<PathBuf>> {
        self.validate()?;
        let mut written = vec![];
        let mut offset = 0;
        let layouts = sheet_layouts(self.params.card_size_pixel, self.params.cards.len());
        for (index, (count, layout)) in layouts.into_iter().enumerate() {
            let cards = &self.params.cards[offset..offset + count];
            offset += count;
            written.push(self.write_sheet(index, cards, layout)?);
        }
        Ok(written)
    }

    fn write_sheet(
        &self,
        index: usize,
        cards: &[CardsheetCard],
        layout: SheetLayout,
    ) -> Result<PathBuf> {
        let asset = self.sheet_asset(index);
        let face_file = format!("{}.face.jpg", asset);
        let back_file = format!("{}.back.jpg", asset);

        let faces: Vec<&str> = cards.iter().map(|c| c.face.as_str()).collect();
        let face_sheet = self.compose(&faces, layout)?;
        let face_path = self.paths.texture_file(&face_file);
        imaging::save(DynamicImage::ImageRgb8(face_sheet), &face_path)?;
        info!("Created: {}", face_path.display());

        let back_path = self.paths.texture_file(&back_file);
        let back_index = match &self.params.back {
            Some(shared) => {
                files::copy(&self.paths.root.join(shared), &back_path)?;
                -1
            }
            None => {
                let backs: Vec<&str> = cards.iter().filter_map(|c| c.back.as_deref()).collect();
                let back_sheet = self.compose(&backs, layout)?;
                imaging::save(DynamicImage::ImageRgb8(back_sheet), &back_path)?;
                -2
            }
        };
        info!("Created: {}", back_path.display());

        let template_file = format!("{}.json", asset);
        let mut template = self.registry.instantiate(BaseTemplate::CardDeck);
        template
            .set_guid(&template_guid(&template_file))
            .set_name(&self.params.template_name)
            .set_metadata(&cards[0].metadata)
            .set_tags(&self.params.apply_all_tags)
            .set_field("FrontTexture", face_file)
            .set_field("BackTexture", back_file)
            .set_field("BackIndex", back_index)
            .set_field("NumHorizontal", layout.cols)
            .set_field("NumVertical", layout.rows)
            .set_field("Width", self.params.card_size_world.0)
            .set_field("Height", self.params.card_size_world.1)
            .set_field("Indices", (0..cards.len()).collect::<Vec<_>>())
            .set_field("CardNames", serde_json::Map::new())
            .set_field("CardMetadata", serde_json::Map::new());
        for (i, card) in cards.iter().enumerate() {
            template.set_indexed("CardNames", i, &card.name)?;
            template.set_indexed("CardMetadata", i, &card.metadata)?;
        }
        template.write_to(&self.paths.templates, &template_file)?;
        let template_path = self.paths.template_file(&template_file);
        info!("Created: {} ({} cards)", template_path.display(), cards.len());
        Ok(template_path)
    }
}
