//! Builders for individual object kinds.

pub mod faction_sheet;
pub mod icon_faction;
pub mod tile_system;
pub mod tokens;

pub use faction_sheet::faction_sheet;
pub use icon_faction::icon_faction;
pub use tile_system::{system_tiles, TileInfo};
pub use tokens::command_control_tokens;
