//! End-to-end build invariants
//!
//! Each test lays out a small homebrew project in a temp dir and runs the
//! pipeline over it.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use homebrew_prebuild::{
    template_guid, BuildError, BuildPaths, BuildPipeline, HomebrewConfig, MapFormat, Step,
    TemplateRegistry,
};

fn write_jpg(path: &Path, w: u32, h: u32, color: [u8; 3]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)))
        .save(path)
        .unwrap();
}

fn write_png(path: &Path, img: RgbaImage) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    img.save(path).unwrap();
}

fn write_json(path: &Path, value: Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn homebrew() -> Value {
    json!({
        "source": "homebrew.loxon",
        "factions": [{
            "name": "Loxon Herd",
            "nsidName": "loxon",
            "abbr": "Loxon",
            "abilities": ["vigilant", "trampling", "imposing-stature"],
            "commodities": 3,
            "factionTechs": ["resolute-2", "universal-docking-protocols"],
            "home": 3001,
            "leaders": {"agents": ["shahm-kewr"], "commanders": ["daahzi-pohip"],
                        "heroes": ["fractured-spyglass"], "mechs": ["surveyor"]},
            "promissories": ["exotic-locale"],
            "startingTechs": ["duranium-arbor"],
            "startingUnits": {"flagship": 1, "destroyer": 2, "infantry": 4, "spaceDock": 1},
            "unitOverrides": ["arill-queen", "resolute", "resolute-2"]
        }],
        "systems": [{
            "tile": 3001,
            "planets": [
                {"name": "Pachydra", "nsidName": "pachydra", "resources": 3, "influence": 3},
                {"name": "Gomphyr", "nsidName": "gomphyr", "resources": 1, "influence": 1}
            ]
        }],
        "planetAttachments": [{"name": "Loxon A", "nsidName": "loxon-a", "traits": ["cultural"]}],
        "unitAttrs": [{"unit": "flagship", "name": "Arill Queen", "nsidName": "arill-queen",
                       "spaceCombat": {"hit": 9, "dice": 2}}],
        "technologies": [{"name": "Resolute 2", "nsidName": "resolute-2",
                          "replacesNsidName": "resolute", "color": "unit-upgrade",
                          "prerequisites": {"red": 2}, "isFactionTech": true}],
        "decks": ["promissory", "leader"]
    })
}

/// A project with every input the pipeline needs.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_json(&root.join("homebrew.json"), homebrew());

    let pre = root.join("prebuild");
    write_png(
        &pre.join("icon/faction/loxon.png"),
        RgbaImage::from_fn(32, 32, |x, y| {
            if (8..24).contains(&x) && (8..24).contains(&y) {
                Rgba([10, 200, 10, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }),
    );
    write_jpg(&pre.join("token/command-control/loxon.jpg"), 64, 64, [90, 40, 20]);
    write_png(
        &pre.join("token/command-control/token-mask.png"),
        RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255])),
    );

    write_jpg(&pre.join("tile/system/tile-3001.jpg"), 1024, 1024, [20, 30, 90]);
    write_jpg(&pre.join("tile/system/green.back.jpg"), 1024, 1024, [10, 120, 10]);
    write_png(
        &pre.join("tile/system/blank.png"),
        RgbaImage::from_pixel(256, 256, Rgba([0, 0, 0, 255])),
    );

    let card = pre.join("card/promissory/homebrew.loxon");
    write_json(
        &card.join("exotic-locale.json"),
        json!({"name": "Exotic Locale", "nsid": "card.promissory:homebrew.loxon/exotic-locale"}),
    );
    write_jpg(&card.join("exotic-locale.jpg"), 250, 375, [200, 200, 0]);
    write_jpg(
        &pre.join("card/shared-back/promissory.back.jpg"),
        500,
        750,
        [0, 0, 0],
    );

    let leader = pre.join("card/leader/homebrew.loxon");
    for (name, kind) in [("shahm-kewr", "agent"), ("fractured-spyglass", "hero")] {
        write_json(
            &leader.join(format!("{}.json", name)),
            json!({"name": name, "nsid": format!("card.leader.{}:homebrew.loxon/{}", kind, name)}),
        );
        write_jpg(&leader.join(format!("{}.face.jpg", name)), 750, 500, [1, 2, 3]);
        write_jpg(&leader.join(format!("{}.back.jpg", name)), 750, 500, [4, 5, 6]);
    }

    let tex = root.join("assets/Textures/faction-sheet");
    write_jpg(&tex.join("loxon.face.jpg"), 64, 40, [0, 0, 0]);
    write_jpg(&tex.join("loxon.back.jpg"), 64, 40, [0, 0, 0]);
    dir
}

fn pipeline(dir: &TempDir) -> BuildPipeline {
    BuildPipeline::open(dir.path(), Path::new("homebrew.json"), None).unwrap()
}

#[test]
fn invariant_full_build_produces_expected_nsid_map() {
    let dir = project();
    let pipeline = pipeline(&dir);
    pipeline.all().unwrap();

    let map = pipeline.nsid_map().unwrap();
    let keys: Vec<_> = map.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "card.leader:homebrew.loxon/0",
            "card.promissory:homebrew.loxon/exotic-locale",
            "sheet.faction:homebrew.loxon/loxon",
            "tile.system:homebrew.loxon/3001",
            "token.command:homebrew.loxon/loxon",
            "token.control:homebrew.loxon/loxon",
        ]
    );
    assert_eq!(
        map["tile.system:homebrew.loxon/3001"],
        template_guid("tile/system/tile-3001.json")
    );
    assert_eq!(
        map["sheet.faction:homebrew.loxon/loxon"],
        template_guid("faction-sheet/loxon.json")
    );

    let ts = fs::read_to_string(dir.path().join("src/nsid/nsid-to-template-id.ts")).unwrap();
    assert!(ts.starts_with("export const NSID_TO_TEMPLATE_ID"));

    let bundle = read_json(&dir.path().join("assets/homebrew-bundle.json"));
    assert_eq!(bundle["sourceAndPackageId"]["source"], "homebrew.loxon");
    assert_eq!(bundle["factions"][0]["nsidName"], "loxon");
    assert_eq!(bundle["technologies"][0]["replacesNsidName"], "resolute");
    assert_eq!(bundle["nsidToTemplateId"].as_object().unwrap().len(), 6);
}

#[test]
fn invariant_rebuild_is_idempotent() {
    let dir = project();
    let pipeline = pipeline(&dir);
    pipeline.run(Step::Tokens).unwrap();
    pipeline.run(Step::Decks).unwrap();

    let files = [
        "assets/Templates/token/command/loxon.json",
        "assets/Templates/card/promissory/homebrew-loxon.json",
        "assets/Templates/card/leader/homebrew-loxon.json",
    ];
    let first: Vec<String> = files
        .iter()
        .map(|f| fs::read_to_string(dir.path().join(f)).unwrap())
        .collect();

    pipeline.run(Step::Tokens).unwrap();
    pipeline.run(Step::Decks).unwrap();
    for (file, before) in files.iter().zip(&first) {
        assert_eq!(&fs::read_to_string(dir.path().join(file)).unwrap(), before, "{}", file);
    }
}

#[test]
fn invariant_token_templates() {
    let dir = project();
    pipeline(&dir).run(Step::Tokens).unwrap();

    let command = read_json(&dir.path().join("assets/Templates/token/command/loxon.json"));
    assert_eq!(command["GUID"], template_guid("token/command/loxon.json"));
    assert_eq!(command["Name"], "Command (Loxon)");
    assert_eq!(command["Metadata"], "token.command:homebrew.loxon/loxon");
    assert_eq!(command["Models"][0]["Texture"], "token/command-control/loxon.jpg");
    assert_eq!(
        command["Models"][0]["ExtraMap"],
        "token/command-control/token-mask.png"
    );

    let control = read_json(&dir.path().join("assets/Templates/token/control/loxon.json"));
    assert_eq!(control["Name"], "Control (Loxon)");
    assert!(dir
        .path()
        .join("assets/Textures/token/command-control/token-mask.png")
        .is_file());
}

#[test]
fn invariant_deck_templates() {
    let dir = project();
    pipeline(&dir).run(Step::Decks).unwrap();

    let textures = dir.path().join("assets/Textures/card/leader");
    let leader = read_json(&dir.path().join("assets/Templates/card/leader/homebrew-loxon.json"));
    assert_eq!(leader["Type"], "Card");
    assert_eq!(leader["BackIndex"], -2);
    assert_eq!(leader["NumHorizontal"], 2);
    assert_eq!(leader["NumVertical"], 1);
    assert_eq!(leader["Width"], 6.3);
    assert_eq!(leader["Tags"], json!(["card-leader"]));
    assert_eq!(leader["CardMetadata"]["0"], "card.leader.hero:homebrew.loxon/fractured-spyglass");
    assert_eq!(leader["CardMetadata"]["1"], "card.leader.agent:homebrew.loxon/shahm-kewr");
    let face = image::open(textures.join("homebrew-loxon.face.jpg")).unwrap();
    assert_eq!((face.width(), face.height()), (1500, 500));
    assert!(textures.join("homebrew-loxon.back.jpg").is_file());

    let promissory =
        read_json(&dir.path().join("assets/Templates/card/promissory/homebrew-loxon.json"));
    assert_eq!(promissory["BackIndex"], -1);
    assert_eq!(promissory["CardNames"]["0"], "Exotic Locale");
    assert_eq!(promissory["FrontTexture"], "card/promissory/homebrew-loxon.face.jpg");
}

#[test]
fn invariant_tiles_validate_all_inputs_before_writing() {
    let dir = project();
    fs::remove_file(dir.path().join("prebuild/tile/system/tile-3001.jpg")).unwrap();
    fs::remove_file(dir.path().join("prebuild/tile/system/green.back.jpg")).unwrap();

    let err = pipeline(&dir).run(Step::Tiles).unwrap_err();
    assert!(matches!(err, BuildError::ValidationFailed(_)));
    let message = err.to_string();
    assert!(message.contains("tile-3001.jpg"));
    assert!(message.contains("green.back.jpg"));
    assert!(!dir.path().join("assets/Templates/tile").exists());
}

#[test]
fn invariant_tiles_written_and_adjusted() {
    let dir = project();
    pipeline(&dir).run(Step::Tiles).unwrap();

    let tile = read_json(&dir.path().join("assets/Templates/tile/system/tile-3001.json"));
    assert_eq!(tile["Name"], "Tile 3001");
    assert_eq!(tile["Tags"], json!(["system"]));
    assert_eq!(tile["Models"][1]["Texture"], "tile/system/green.back.jpg");

    let ui = image::open(dir.path().join("assets/Textures/tile/system/tile-3001.png")).unwrap();
    assert_eq!((ui.width(), ui.height()), (512, 512));
}

#[test]
fn invariant_duplicate_nsid_is_fatal() {
    let dir = project();
    let templates = dir.path().join("assets/Templates");
    for name in ["a.json", "b.json"] {
        write_json(
            &templates.join(name),
            json!({"GUID": name, "Metadata": "token.x:homebrew.loxon/same"}),
        );
    }
    let err = pipeline(&dir).write_nsid_map(None, MapFormat::Json).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateNsid(_)));
}

#[test]
fn invariant_missing_faction_sheet_texture() {
    let dir = project();
    fs::remove_file(dir.path().join("assets/Textures/faction-sheet/loxon.back.jpg")).unwrap();
    let err = pipeline(&dir).run(Step::FactionSheets).unwrap_err();
    assert!(matches!(err, BuildError::MissingInput(_)));
}

#[test]
fn invariant_pipeline_from_parts() {
    let dir = project();
    let config: HomebrewConfig = serde_json::from_value(homebrew()).unwrap();
    let pipeline = BuildPipeline::new(BuildPaths::new(dir.path()), config, TemplateRegistry::new());
    let written = pipeline.faction_sheets().unwrap();
    assert_eq!(written.len(), 1);

    let sheet = read_json(&written[0]);
    assert_eq!(sheet["Name"], "Loxon");
    // spawns face-down, so the textures are swapped
    assert_eq!(sheet["FrontTexture"], "faction-sheet/loxon.back.jpg");
    assert_eq!(sheet["CardMetadata"]["0"], "sheet.faction:homebrew.loxon/loxon");
}

#[test]
fn invariant_repeated_tile_fails_before_writing() {
    let dir = project();
    let mut value = homebrew();
    let system = value["systems"][0].clone();
    value["systems"].as_array_mut().unwrap().push(system);

    write_json(&dir.path().join("homebrew.json"), value.clone());
    let err = BuildPipeline::open(dir.path(), Path::new("homebrew.json"), None).unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));

    // unchecked config goes straight to the tile builder
    let config: HomebrewConfig = serde_json::from_value(value).unwrap();
    let pipeline = BuildPipeline::new(BuildPaths::new(dir.path()), config, TemplateRegistry::new());
    let err = pipeline.tiles().unwrap_err();
    assert!(matches!(err, BuildError::DuplicateNsid(_)));
    assert!(!dir.path().join("assets/Templates/tile").exists());
    assert!(!dir.path().join("assets/Textures/tile").exists());
}

#[test]
fn invariant_deck_overflow_and_clean() {
    let dir = project();
    let cards = dir.path().join("prebuild/card/action/homebrew.loxon");
    for i in 0..41 {
        let name = format!("card-{:02}", i);
        write_json(
            &cards.join(format!("{}.json", name)),
            json!({"name": name, "nsid": format!("card.action:homebrew.loxon/{}", name)}),
        );
        write_jpg(&cards.join(format!("{}.jpg", name)), 10, 15, [i as u8, 0, 0]);
    }
    write_jpg(&dir.path().join("prebuild/card/shared-back/action.back.jpg"), 10, 15, [0, 0, 0]);

    let pipeline = pipeline(&dir);
    let written = pipeline.decks(&["action".to_string()]).unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["homebrew-loxon.json", "homebrew-loxon.1.json"]);

    let templates = dir.path().join("assets/Templates/card/action");
    let textures = dir.path().join("assets/Textures/card/action");
    let overflow = read_json(&templates.join("homebrew-loxon.1.json"));
    assert_eq!(overflow["CardNames"]["0"], "card-40");
    assert_eq!(overflow["FrontTexture"], "card/action/homebrew-loxon.1.face.jpg");
    assert_eq!(read_json(&templates.join("homebrew-loxon.json"))["NumVertical"], 5);
    assert!(textures.join("homebrew-loxon.1.face.jpg").is_file());

    fs::remove_file(cards.join("card-40.json")).unwrap();
    let written = pipeline.decks(&["action".to_string()]).unwrap();
    assert_eq!(written.len(), 1);
    assert!(!templates.join("homebrew-loxon.1.json").exists());
    assert!(!textures.join("homebrew-loxon.1.face.jpg").exists());
    assert!(!textures.join("homebrew-loxon.1.back.jpg").exists());
    assert!(templates.join("homebrew-loxon.json").is_file());
}
