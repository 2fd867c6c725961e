use std::fs;
use std::path::Path;

use serde_json::Value;

/// Writes a small media file with recognizable content, so tests can check
/// which source file a relocated copy came from.
pub fn write_media(path: &Path, marker: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, format!("media:{marker}")).expect("write media file");
}

/// Reads back the marker written by [`write_media`].
pub fn media_marker(path: &Path) -> String {
    fs::read_to_string(path).expect("read media file")
}

/// Writes `value` as `annotations.json` inside `dir`, creating the
/// directory if needed.
pub fn write_descriptor(dir: &Path, value: &Value) {
    fs::create_dir_all(dir).expect("create dataset dir");
    let json = serde_json::to_string_pretty(value).expect("serialize descriptor");
    fs::write(dir.join("annotations.json"), json).expect("write descriptor");
}
