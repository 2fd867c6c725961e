//! COCO descriptor discovery, reading and writing.
//!
//! A source dataset is a directory holding media files plus one descriptor
//! (`*.json`). Discovery scans only the directory's immediate entries and
//! is deterministic: candidates are considered in lexicographic file-name
//! order and the first one wins. Zero candidates is a hard error, never a
//! silent empty result.
//!
//! The writer produces a pretty-printed document whose top-level keys are
//! `annotations`, `images`, `info`, `license`, `categories`; reading it
//! back with [`read_coco_json`] reproduces equivalent collections.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::model::AnnotationSet;
use crate::error::CocomergeError;

/// Locates the descriptor file inside a source dataset directory.
///
/// Scans the directory's immediate entries and returns the
/// lexicographically-first file whose name ends in `.json`.
///
/// # Errors
/// Returns [`CocomergeError::DescriptorNotFound`] if the directory holds no
/// `.json` file, or an IO error if the directory cannot be read.
pub fn locate_descriptor(dir: &Path) -> Result<PathBuf, CocomergeError> {
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| CocomergeError::Io(source.into()))?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(".json") {
            return Ok(entry.into_path());
        }
    }

    Err(CocomergeError::DescriptorNotFound {
        dir: dir.to_path_buf(),
    })
}

/// Reads an annotation set from a COCO descriptor file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or lacks
/// any of the required top-level keys (`images`, `annotations`,
/// `categories`).
pub fn read_coco_json(path: &Path) -> Result<AnnotationSet, CocomergeError> {
    let file = File::open(path).map_err(CocomergeError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| CocomergeError::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a source dataset's annotation set: descriptor discovery plus parse.
pub fn load_annotation_set(dir: &Path) -> Result<AnnotationSet, CocomergeError> {
    let descriptor = locate_descriptor(dir)?;
    read_coco_json(&descriptor)
}

/// Writes an annotation set to a COCO descriptor file.
///
/// # Errors
/// Returns an error if the file cannot be created or serialized.
pub fn write_coco_json(path: &Path, set: &AnnotationSet) -> Result<(), CocomergeError> {
    let file = File::create(path).map_err(CocomergeError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, set).map_err(|source| CocomergeError::DescriptorWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads an annotation set from a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<AnnotationSet, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads an annotation set from a COCO JSON byte slice.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation
/// overhead.
pub fn from_coco_slice(bytes: &[u8]) -> Result<AnnotationSet, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes an annotation set to a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn to_coco_string(set: &AnnotationSet) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::{AnnotationId, ImageId};
    use std::fs;

    fn sample_coco_json() -> &'static str {
        r#"{
            "info": {"description": "Test dataset", "year": 2024},
            "license": {"name": "CC BY 4.0"},
            "images": [
                {"id": 5, "width": 640, "height": 480, "file_name": "a.png"}
            ],
            "categories": [
                {"id": 1, "name": "person", "supercategory": "human"}
            ],
            "annotations": [
                {"id": 9, "image_id": 5, "category_id": 1, "bbox": [10.0, 20.0, 90.0, 60.0]}
            ]
        }"#
    }

    #[test]
    fn test_parse_basic() {
        let set = from_coco_str(sample_coco_json()).expect("parse failed");

        assert_eq!(set.images.len(), 1);
        assert_eq!(set.images[0].id, ImageId(5));
        assert_eq!(set.images[0].file_name, "a.png");
        assert_eq!(set.annotations.len(), 1);
        assert_eq!(set.annotations[0].id, AnnotationId(9));
        assert_eq!(set.annotations[0].image_id, ImageId(5));
        assert_eq!(set.categories[0].name, "person");
        assert_eq!(set.info["year"], 2024);
        assert_eq!(set.license["name"], "CC BY 4.0");
    }

    #[test]
    fn test_licenses_alias_parses() {
        let json = r#"{
            "licenses": [{"id": 1, "name": "CC0"}],
            "images": [],
            "categories": [],
            "annotations": []
        }"#;
        let set = from_coco_str(json).expect("parse failed");
        assert_eq!(set.license[0]["name"], "CC0");

        // Normalized on output: always written under "license".
        let out = to_coco_string(&set).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("license").is_some());
        assert!(value.get("licenses").is_none());
    }

    #[test]
    fn test_missing_required_key_is_parse_error() {
        // No "annotations" key at all.
        let json = r#"{"images": [], "categories": []}"#;
        assert!(from_coco_str(json).is_err());
    }

    #[test]
    fn test_roundtrip_preserves_opaque_fields() {
        let original = from_coco_str(sample_coco_json()).expect("parse failed");
        let json = to_coco_string(&original).expect("serialize failed");
        let restored = from_coco_str(&json).expect("reparse failed");

        assert_eq!(restored.images[0].extra.get("width"), Some(&640.into()));
        assert_eq!(
            restored.annotations[0].extra.get("bbox"),
            original.annotations[0].extra.get("bbox")
        );
        assert_eq!(restored.info, original.info);
    }

    #[test]
    fn test_locate_descriptor_is_lexicographic() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("zz.json"), "{}").unwrap();
        fs::write(temp.path().join("annotations.json"), "{}").unwrap();
        fs::write(temp.path().join("image.png"), b"not json").unwrap();

        let found = locate_descriptor(temp.path()).expect("locate failed");
        assert_eq!(found.file_name().unwrap(), "annotations.json");
    }

    #[test]
    fn test_locate_descriptor_ignores_subdirectories() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested/deep.json"), "{}").unwrap();

        let err = locate_descriptor(temp.path()).unwrap_err();
        assert!(matches!(err, CocomergeError::DescriptorNotFound { .. }));
    }

    #[test]
    fn test_locate_descriptor_empty_dir_fails() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = locate_descriptor(temp.path()).unwrap_err();
        assert!(matches!(err, CocomergeError::DescriptorNotFound { .. }));
    }
}
