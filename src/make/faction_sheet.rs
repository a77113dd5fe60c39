use std::path::PathBuf;

use crate::bundle::FactionSchema;
use crate::config::BuildPaths;
use crate::error::Result;
use crate::files;
use crate::hashing::template_guid;
use crate::templates::{BaseTemplate, TemplateRegistry};

/// Write the faction sheet template for textures already in
/// `assets/Textures/faction-sheet/<n>.{face,back}.jpg`.
pub fn faction_sheet(
    paths: &BuildPaths,
    registry: &TemplateRegistry,
    source: &str,
    faction: &FactionSchema,
) -> Result<PathBuf> {
    let name = faction.nsid_name.as_str();

    // The sheet spawns face-down: swap face and back so it needs no flip.
    let face = format!("faction-sheet/{}.back.jpg", name);
    let back = format!("faction-sheet/{}.face.jpg", name);
    files::require_file(&paths.texture_file(&face))?;
    files::require_file(&paths.texture_file(&back))?;

    let template_file = format!("faction-sheet/{}.json", name);
    let metadata = format!("sheet.faction:{}/{}", source, name);

    let mut sheet = registry.instantiate(BaseTemplate::SheetFaction);
    sheet
        .set_guid(&template_guid(&template_file))
        .set_name(&faction.abbr)
        .set_metadata(&metadata)
        .set_field("FrontTexture", face)
        .set_field("BackTexture", back);
    sheet.set_indexed("CardNames", 0, &faction.abbr)?;
    sheet.set_indexed("CardMetadata", 0, &metadata)?;
    sheet.write_to(&paths.templates, &template_file)?;
    Ok(paths.template_file(&template_file))
}
