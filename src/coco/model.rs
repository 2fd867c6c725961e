//! In-memory model of a COCO descriptor file.
//!
//! Only the fields the merge actually re-indexes are typed: image and
//! annotation ids, the image/annotation foreign key, and the image file
//! name. Everything else a descriptor carries (bounding boxes,
//! segmentations, image dimensions, vendor extensions) is passed through
//! unchanged via flattened maps, so a merge never interprets or loses
//! fields it does not understand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{AnnotationId, CategoryId, ImageId};

/// One dataset's parsed descriptor content.
///
/// Field order here is the key order written to disk, matching the layout
/// merged descriptors have always been written in: `annotations`, `images`,
/// `info`, `license`, `categories`.
///
/// `images`, `annotations` and `categories` are required on input; a
/// descriptor missing any of them fails to parse. `info` and `license` are
/// optional and default to JSON null.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnnotationSet {
    /// All annotations. Ids are unique within this set only.
    pub annotations: Vec<Annotation>,

    /// All images. Ids are unique within this set only.
    pub images: Vec<Image>,

    /// Opaque dataset metadata, passed through verbatim.
    #[serde(default)]
    pub info: Value,

    /// Opaque license block. Some inputs spell this `licenses` (and make it
    /// a list); both spellings parse, and output always uses `license`.
    #[serde(default, alias = "licenses")]
    pub license: Value,

    /// Category records, assumed compatible across all merged sets.
    pub categories: Vec<Category>,
}

/// One media item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Image {
    /// Identifier within the owning dataset.
    pub id: ImageId,

    /// Name of the media file, relative to the dataset directory. The
    /// extension after the last `.` is preserved verbatim through a merge.
    pub file_name: String,

    /// All remaining fields (width, height, license, ...), untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One labeled region, tied to exactly one image of the same dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Annotation {
    /// Identifier within the owning dataset.
    pub id: AnnotationId,

    /// Foreign key into the owning dataset's image id space.
    pub image_id: ImageId,

    /// All remaining fields (bbox, category_id, area, ...), untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One category record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Image {
    /// Creates an image with no extra fields. Mostly useful in tests.
    pub fn new(id: impl Into<ImageId>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            extra: Map::new(),
        }
    }
}

impl Annotation {
    /// Creates an annotation with no extra fields. Mostly useful in tests.
    pub fn new(id: impl Into<AnnotationId>, image_id: impl Into<ImageId>) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            extra: Map::new(),
        }
    }
}

impl Category {
    /// Creates a category with no extra fields. Mostly useful in tests.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_set_creation() {
        let set = AnnotationSet {
            images: vec![Image::new(1u64, "image001.jpg")],
            categories: vec![Category::new(1u64, "person")],
            annotations: vec![Annotation::new(1u64, 1u64)],
            ..Default::default()
        };

        assert_eq!(set.images.len(), 1);
        assert_eq!(set.categories.len(), 1);
        assert_eq!(set.annotations.len(), 1);
        assert!(set.info.is_null());
    }

    #[test]
    fn test_extra_fields_roundtrip() {
        let json = r#"{"id": 3, "file_name": "a.png", "width": 640, "height": 480}"#;
        let image: Image = serde_json::from_str(json).unwrap();

        assert_eq!(image.id, ImageId(3));
        assert_eq!(image.file_name, "a.png");
        assert_eq!(image.extra.get("width"), Some(&Value::from(640)));

        let back = serde_json::to_string(&image).unwrap();
        let reparsed: Image = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed.extra.get("height"), Some(&Value::from(480)));
    }
}
