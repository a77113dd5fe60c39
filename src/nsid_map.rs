//! Map template metadata ("NSID") to template GUID.
//!
//! Scans the generated templates and produces the table the load-time script
//! registers with the host.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{BuildError, Result};
use crate::files;
use crate::nsid::{common_dot_prefix, strip_extra, Nsid};
use crate::templates::ObjectTemplate;

pub type NsidToTemplateId = BTreeMap<String, String>;

/// Output flavours of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MapFormat {
    Json,
    /// A TypeScript module exporting `NSID_TO_TEMPLATE_ID`.
    Ts,
}

/// Split a card NSID into `(type, source)`; empty strings when malformed.
fn type_and_source(nsid: &str) -> (&str, &str) {
    let Some((kind, rest)) = nsid.split_once(':') else {
        return ("", "");
    };
    match rest.split_once('/') {
        Some((source, name)) if !kind.is_empty() && !source.is_empty() && !name.is_empty() => {
            (kind, source)
        }
        _ => ("", ""),
    }
}

/// The NSID a deck template is registered under.
///
/// A single-card deck uses its card's NSID. Larger decks get
/// `<type prefix>:<source prefix>/<i>` with the first free `i`.
fn deck_nsid(card_nsids: &[String], current: &str, map: &NsidToTemplateId) -> Option<String> {
    match card_nsids {
        [] => None,
        [only] if only.is_empty() || only == current => None,
        [only] => Some(only.clone()),
        many => {
            let parts: Vec<(&str, &str)> = many.iter().map(|n| type_and_source(n)).collect();
            let types: Vec<&str> = parts.iter().map(|(t, _)| *t).collect();
            let sources: Vec<&str> = parts.iter().map(|(_, s)| *s).collect();
            let kind = common_dot_prefix(&types);
            let source = common_dot_prefix(&sources);
            let nsid = (0..)
                .map(|i| format!("{}:{}/{}", kind, source, i))
                .find(|candidate| !map.contains_key(candidate))?;
            if nsid != current {
                Some(nsid)
            } else {
                None
            }
        }
    }
}

/// Add one parsed template to the map. `Ok(false)` means it was rejected.
pub fn accept_template(
    map: &mut NsidToTemplateId,
    label: &str,
    template: &ObjectTemplate,
) -> Result<bool> {
    let Some(template_id) = template.guid() else {
        warn!("rejecting no GUID: \"{}\"", label);
        return Ok(false);
    };
    let Some(metadata) = template.metadata() else {
        warn!("rejecting no metadata: \"{}\"", label);
        return Ok(false);
    };
    let mut nsid = metadata.to_string();

    if template.template_type() == Some("Card") {
        if let Some(card_nsids) = template.card_metadata() {
            if let Some(replacement) = deck_nsid(&card_nsids, &nsid, map) {
                let kind = if card_nsids.len() == 1 { "SINGLETON" } else { "DECK" };
                info!("REPLACING {} \"{}\" with \"{}\" ({})", kind, nsid, replacement, label);
                nsid = replacement;
            }
        }
    }

    if !Nsid::looks_like_nsid(&nsid) {
        warn!("rejecting not nsid: \"{}\" (\"{}\")", label, nsid);
        return Ok(false);
    }
    let nsid = strip_extra(&nsid).to_string();

    debug!("accepting \"{}: {}\"", label, nsid);
    if map.contains_key(&nsid) {
        return Err(BuildError::DuplicateNsid(nsid));
    }
    map.insert(nsid, template_id.to_string());
    Ok(true)
}

/// Build the map from every template under `templates_root`, in path order.
pub fn build_map(templates_root: &Path) -> Result<NsidToTemplateId> {
    if !templates_root.is_dir() {
        return Err(BuildError::MissingInput(templates_root.to_path_buf()));
    }
    info!("scanning \"{}\"", templates_root.display());

    let mut map = NsidToTemplateId::new();
    for path in files::files_with_extension(templates_root, "json")? {
        let label = files::relative_slash(&path, templates_root);
        let value: Value = files::read_json(&path)?;
        let Ok(template) = ObjectTemplate::from_value(value) else {
            warn!("rejecting not an object: \"{}\"", label);
            continue;
        };
        accept_template(&mut map, &label, &template)?;
    }
    Ok(map)
}

/// Render with 4-space indentation and sorted keys.
pub fn render(map: &NsidToTemplateId, format: MapFormat) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(map, &mut ser)?;
    let json = String::from_utf8(buf).map_err(|e| BuildError::Template(e.to_string()))?;
    Ok(match format {
        MapFormat::Json => format!("{}\n", json),
        MapFormat::Ts => format!(
            "export const NSID_TO_TEMPLATE_ID: {{ [key: string]: string }} = {}\n;\n",
            json
        ),
    })
}

pub fn write_map(map: &NsidToTemplateId, out: &Path, format: MapFormat) -> Result<()> {
    files::write(out, render(map, format)?)?;
    info!("Created: {} ({} entries)", out.display(), map.len());
    Ok(())
}
