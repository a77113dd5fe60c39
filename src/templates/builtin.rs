//! Built-in base templates.

use serde_json::{json, Value};

use super::{BaseTemplate, ObjectTemplate};

/// Get the built-in base template for `kind`
pub fn base_template(kind: BaseTemplate) -> ObjectTemplate {
    let value = match kind {
        BaseTemplate::TileSystem => tile_system(),
        BaseTemplate::TokenCommand => token(2.2, 0.4),
        BaseTemplate::TokenControl => token(1.6, 0.4),
        BaseTemplate::SheetFaction => sheet_faction(),
        BaseTemplate::CardDeck => card_deck(),
    };
    ObjectTemplate { fields: into_map(value) }
}

fn into_map(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn white() -> Value {
    json!({"R": 255, "G": 255, "B": 255})
}

fn common(object_type: &str) -> Value {
    json!({
        "Type": object_type,
        "GUID": "",
        "Name": "",
        "Metadata": "",
        "CollisionType": "Regular",
        "Friction": 0.7,
        "Restitution": 0.3,
        "Density": 0.5,
        "SurfaceType": "Cardboard",
        "Roughness": 1,
        "Metallic": 0,
        "PrimaryColor": white(),
        "SecondaryColor": {"R": 0, "G": 0, "B": 0},
        "Flippable": true,
        "AutoStraighten": false,
        "ShouldSnap": true,
        "ScriptName": "",
        "Blueprint": "",
        "Models": [],
        "Collision": [],
        "Lights": [],
        "SnapPointsGlobal": false,
        "SnapPoints": [],
        "ZoomViewDirection": {"X": 0, "Y": 0, "Z": 1},
        "GroundAccessibility": "ZoomAndContext",
        "Tags": []
    })
}

fn model(model: &str, texture: &str, scale: [f64; 3]) -> Value {
    json!({
        "Model": model,
        "Offset": {"X": 0, "Y": 0, "Z": 0},
        "Scale": {"X": scale[0], "Y": scale[1], "Z": scale[2]},
        "Rotation": {"X": 0, "Y": 0, "Z": 0},
        "Texture": texture,
        "NormalMap": "",
        "ExtraMap": "",
        "ExtraMap2": "",
        "IsTransparent": false,
        "CastShadow": true,
        "IsTwoSided": false,
        "UseOverrides": true,
        "SurfaceType": "Cardboard"
    })
}

fn with_models(mut base: Value, models: Vec<Value>) -> Value {
    base["Models"] = Value::Array(models);
    base
}

fn tile_system() -> Value {
    let mut base = with_models(
        common("Generic"),
        vec![
            model("tile/system/system-tile.obj", "", [1.0, 1.0, 1.0]),
            model("tile/system/system-tile.obj", "", [1.0, 1.0, 1.0]),
        ],
    );
    base["Collision"] = json!([{
        "Model": "tile/system/system-tile.col.obj",
        "Offset": {"X": 0, "Y": 0, "Z": 0},
        "Scale": {"X": 1, "Y": 1, "Z": 1},
        "Rotation": {"X": 0, "Y": 0, "Z": 0},
        "Type": "Convex"
    }]);
    base
}

fn token(diameter: f64, thickness: f64) -> Value {
    with_models(
        common("Generic"),
        vec![model(
            "token/command-control/token.obj",
            "",
            [diameter, diameter, thickness],
        )],
    )
}

fn cardish() -> Value {
    let mut base = common("Card");
    let extra = json!({
        "FrontTexture": "",
        "BackTexture": "",
        "HiddenTexture": "",
        "BackIndex": -1,
        "HiddenIndex": 0,
        "NumHorizontal": 1,
        "NumVertical": 1,
        "Width": 4.2,
        "Height": 6.3,
        "Thickness": 0.05,
        "HiddenCardsSurfaceType": "Cardboard",
        "EdgeColor": white(),
        "UsedWithCardHolders": true,
        "CanStack": true,
        "UsePrimaryColorForSide": false,
        "FrontTextureOverrideExposed": false,
        "AllowFlippedInStack": false,
        "MirrorBack": true,
        "Model": "Rounded",
        "Indices": [0],
        "CardNames": {},
        "CardMetadata": {},
        "CardTags": {}
    });
    if let (Some(base_map), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base_map.extend(extra);
    }
    base
}

fn sheet_faction() -> Value {
    let mut base = cardish();
    base["Width"] = json!(26.0);
    base["Height"] = json!(17.0);
    base["Thickness"] = json!(0.1);
    base["UsedWithCardHolders"] = json!(false);
    base["CanStack"] = json!(false);
    base["Model"] = json!("Square");
    base["Tags"] = json!(["faction-sheet"]);
    base
}

fn card_deck() -> Value {
    cardish()
}
