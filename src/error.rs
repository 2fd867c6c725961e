use std::path::PathBuf;
use thiserror::Error;

use crate::coco::{AnnotationId, ImageId};

/// The main error type for cocomerge operations.
///
/// Every variant carries enough context (source directory, file name, ids)
/// to diagnose which input broke the merge. Any error aborts the whole
/// merge; the destination directory may hold already-copied media but never
/// a descriptor file, and is only safe to delete and retry.
#[derive(Debug, Error)]
pub enum CocomergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no source datasets given")]
    NoSources,

    #[error("no descriptor file (*.json) found in {dir}")]
    DescriptorNotFound { dir: PathBuf },

    #[error("Failed to parse descriptor {path}: {source}")]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse metadata override {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image '{file_name}' in {dataset} has no file extension")]
    MediaNaming { dataset: PathBuf, file_name: String },

    #[error("media file '{file_name}' not found in {dataset}")]
    MediaNotFound { dataset: PathBuf, file_name: String },

    #[error("Failed to copy media {from} -> {to}: {source}")]
    MediaCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "annotation {annotation_id} in {dataset} references image {image_id}, \
         which does not exist in that dataset (pass --allow-dangling to drop it)"
    )]
    DanglingAnnotation {
        dataset: PathBuf,
        annotation_id: AnnotationId,
        image_id: ImageId,
    },

    #[error("Failed to write descriptor {path}: {source}")]
    DescriptorWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize merge report: {0}")]
    ReportSerialize(serde_json::Error),
}
