use std::path::PathBuf;
use tracing::info;

use crate::bundle::FactionSchema;
use crate::config::BuildPaths;
use crate::error::Result;
use crate::files;
use crate::hashing::template_guid;
use crate::templates::{BaseTemplate, TemplateRegistry};

const TOKEN_MASK: &str = "token/command-control/token-mask.png";

/// Keleres variants share one token texture.
fn texture_name(nsid_name: &str) -> &str {
    if nsid_name.contains("keleres") {
        "keleres"
    } else {
        nsid_name
    }
}

/// Write the faction's command and control token templates and textures.
pub fn command_control_tokens(
    paths: &BuildPaths,
    registry: &TemplateRegistry,
    source: &str,
    faction: &FactionSchema,
) -> Result<Vec<PathBuf>> {
    let name = faction.nsid_name.as_str();
    let texture = format!("token/command-control/{}.jpg", texture_name(name));
    files::copy(&paths.prebuild_file(&texture), &paths.texture_file(&texture))?;
    files::copy(&paths.prebuild_file(TOKEN_MASK), &paths.texture_file(TOKEN_MASK))?;

    let mut written = vec![];
    for (kind, base, label) in [
        ("command", BaseTemplate::TokenCommand, "Command"),
        ("control", BaseTemplate::TokenControl, "Control"),
    ] {
        let template_file = format!("token/{}/{}.json", kind, name);
        let guid = template_guid(&template_file);
        info!("{} {} {}", name, kind, guid);

        let mut token = registry.instantiate(base);
        token
            .set_guid(&guid)
            .set_name(&format!("{} ({})", label, faction.abbr))
            .set_metadata(&format!("token.{}:{}/{}", kind, source, name));
        token.set_model_texture(0, &texture)?;
        token.set_model_extra_map(0, TOKEN_MASK)?;
        token.write_to(&paths.templates, &template_file)?;
        written.push(paths.template_file(&template_file));
    }
    Ok(written)
}
