use crate::model::Atlas;
use serde::Serialize;
use serde_json::{Value, json};

/// Serialize the whole `Atlas` as `{ pages: [{ id, width, height, frames }], meta }`.
pub fn to_json_array<K: ToString + Serialize>(atlas: &Atlas<K>) -> Value {
    let pages_val = atlas
        .pages
        .iter()
        .map(|p| {
            let frames_val: Vec<Value> = p
                .frames
                .iter()
                .map(|fr| {
                    json!({
                        "name": fr.key.to_string(),
                        "frame": {"x": fr.frame.x, "y": fr.frame.y, "w": fr.frame.w, "h": fr.frame.h},
                        "rotated": fr.rotated,
                        "trimmed": fr.trimmed,
                        "sourceColorRect": {"x": fr.source.x, "y": fr.source.y, "w": fr.source.w, "h": fr.source.h},
                        "sourceSize": {"w": fr.source_size.0, "h": fr.source_size.1},
                    })
                })
                .collect();
            json!({
                "id": p.id,
                "width": p.width,
                "height": p.height,
                "frames": frames_val,
            })
        })
        .collect::<Vec<_>>();
    json!({"pages": pages_val, "meta": &atlas.meta})
}

/// Frames keyed by name with their page id and page size.
/// Shape: `{ frames: { name: { frame, rotated, trimmed, sourceColorRect, sourceSize, page, pageSize } }, meta }`.
pub fn to_json_hash<K: ToString>(atlas: &Atlas<K>) -> Value {
    let mut frames = serde_json::Map::new();
    for page in &atlas.pages {
        for fr in &page.frames {
            frames.insert(
                fr.key.to_string(),
                json!({
                    "frame": {"x": fr.frame.x, "y": fr.frame.y, "w": fr.frame.w, "h": fr.frame.h},
                    "rotated": fr.rotated,
                    "trimmed": fr.trimmed,
                    "sourceColorRect": {"x": fr.source.x, "y": fr.source.y, "w": fr.source.w, "h": fr.source.h},
                    "sourceSize": {"w": fr.source_size.0, "h": fr.source_size.1},
                    "page": page.id,
                    "pageSize": {"w": page.width, "h": page.height},
                }),
            );
        }
    }
    json!({ "frames": frames, "meta": &atlas.meta })
}
