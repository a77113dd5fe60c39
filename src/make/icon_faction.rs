use std::path::PathBuf;

use crate::config::BuildPaths;
use crate::error::Result;
use crate::files;
use crate::imaging::outline_only;

/// Copy a faction icon into the textures and add its outline-only variant.
///
/// Reads `prebuild/icon/faction/<n>.png`, writes
/// `assets/Textures/icon/faction/<n>.png` and `<n>-outline-only.png`.
pub fn icon_faction(paths: &BuildPaths, nsid_name: &str) -> Result<PathBuf> {
    let relative = format!("icon/faction/{}.png", nsid_name);
    let src = paths.prebuild_file(&relative);
    let dst = paths.texture_file(&relative);
    files::copy(&src, &dst)?;
    outline_only(&dst)
}
