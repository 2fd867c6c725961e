//! The merge engine: re-indexing and combining annotation sets.
//!
//! Merging maps N independent id spaces (one per source dataset) into a
//! single dense id space while keeping every annotation attached to its
//! image. Datasets are processed in the caller-supplied order, and that
//! order is part of the contract: it determines the final ids. Within a
//! dataset, image order is preserved, and each image's annotations are
//! emitted together in their original relative order.
//!
//! Media files are copied into the destination directory under their new
//! sequential names (`{new_id}.{original_extension}`, extension preserved
//! verbatim); the descriptor is written last, so a failed merge never
//! leaves a descriptor behind.

pub mod report;

pub use report::{MergeCounts, MergeIssue, MergeIssueCode, MergeReport, Severity};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::coco::io_json::{load_annotation_set, write_coco_json};
use crate::coco::{Annotation, AnnotationId, AnnotationSet, Image, ImageId};
use crate::error::CocomergeError;

/// Default name of the merged descriptor file.
pub const DEFAULT_DESCRIPTOR_NAME: &str = "annotations.json";

/// Options controlling a merge.
#[derive(Clone, Debug)]
pub struct MergeOptions {
    /// Replaces the merged `info` block. Default: the first dataset's.
    pub info: Option<Value>,
    /// Replaces the merged `license` block. Default: the first dataset's.
    pub license: Option<Value>,
    /// File name of the merged descriptor inside the destination directory.
    pub descriptor_name: String,
    /// Drop annotations whose `image_id` matches no image in their own
    /// dataset instead of failing. Drops are counted in the report.
    pub allow_dangling: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            info: None,
            license: None,
            descriptor_name: DEFAULT_DESCRIPTOR_NAME.to_string(),
            allow_dangling: false,
        }
    }
}

/// One loaded source dataset: its directory plus its parsed descriptor.
#[derive(Clone, Debug)]
struct Source {
    root: PathBuf,
    set: AnnotationSet,
}

/// The merge engine.
///
/// Construction loads every source descriptor into memory; [`Merger::merge`]
/// then runs the whole re-index in one pass. `merge` consumes the engine,
/// so the id counters can never leak into a second invocation.
#[derive(Clone, Debug)]
pub struct Merger {
    dest_root: PathBuf,
    sources: Vec<Source>,
    options: MergeOptions,
}

impl Merger {
    /// Loads all source datasets and captures the merge configuration.
    ///
    /// Sources are merged in the given order; that order decides the final
    /// ids. Categories always come from the first dataset: callers needing
    /// a different category set must pre-edit their first input.
    ///
    /// # Errors
    /// Fails if the source list is empty, if any source directory has no
    /// descriptor, or if any descriptor does not parse.
    pub fn load(
        dest_root: impl Into<PathBuf>,
        source_dirs: &[PathBuf],
        options: MergeOptions,
    ) -> Result<Self, CocomergeError> {
        if source_dirs.is_empty() {
            return Err(CocomergeError::NoSources);
        }

        let sources = source_dirs
            .iter()
            .map(|dir| {
                Ok(Source {
                    root: dir.clone(),
                    set: load_annotation_set(dir)?,
                })
            })
            .collect::<Result<Vec<_>, CocomergeError>>()?;

        Ok(Self {
            dest_root: dest_root.into(),
            sources,
            options,
        })
    }

    /// Runs the merge: re-indexes all datasets, relocates their media files
    /// into the destination directory, and writes the merged descriptor.
    ///
    /// # Errors
    /// Any error aborts immediately. The destination directory may then
    /// hold a partial set of copied media files but no descriptor; treat it
    /// as invalid and safe only to delete and retry.
    pub fn merge(self) -> Result<MergeReport, CocomergeError> {
        fs::create_dir_all(&self.dest_root)?;

        let mut report = MergeReport::new();
        let mut merged_images: Vec<Image> = Vec::new();
        let mut merged_annotations: Vec<Annotation> = Vec::new();
        let mut next_image_id: u64 = 0;
        let mut next_annotation_id: u64 = 0;

        for source in &self.sources {
            // One pass over the annotations up front: group them by owning
            // image and catch dangling references before any media moves.
            let anns_by_image = index_annotations(source, self.options.allow_dangling)?;
            let dropped = source.set.annotations.len()
                - anns_by_image.values().map(Vec::len).sum::<usize>();
            if dropped > 0 {
                report.add(MergeIssue::warning(
                    MergeIssueCode::DanglingAnnotationsDropped,
                    format!(
                        "{} dangling annotation(s) dropped from {}",
                        dropped,
                        source.root.display()
                    ),
                ));
            }

            for image in &source.set.images {
                let ext = media_extension(&image.file_name).ok_or_else(|| {
                    CocomergeError::MediaNaming {
                        dataset: source.root.clone(),
                        file_name: image.file_name.clone(),
                    }
                })?;
                let new_file_name = format!("{next_image_id}.{ext}");

                let from = source.root.join(&image.file_name);
                if !from.is_file() {
                    return Err(CocomergeError::MediaNotFound {
                        dataset: source.root.clone(),
                        file_name: image.file_name.clone(),
                    });
                }
                let to = self.dest_root.join(&new_file_name);
                fs::copy(&from, &to).map_err(|source| CocomergeError::MediaCopy {
                    from,
                    to,
                    source,
                })?;

                let new_image_id = ImageId::new(next_image_id);
                if let Some(indices) = anns_by_image.get(&image.id) {
                    for &idx in indices {
                        let annotation = &source.set.annotations[idx];
                        merged_annotations.push(Annotation {
                            id: AnnotationId::new(next_annotation_id),
                            image_id: new_image_id,
                            extra: annotation.extra.clone(),
                        });
                        next_annotation_id += 1;
                    }
                }

                merged_images.push(Image {
                    id: new_image_id,
                    file_name: new_file_name,
                    extra: image.extra.clone(),
                });
                next_image_id += 1;
            }
        }

        let merged = self.assemble(merged_images, merged_annotations, &mut report);

        let descriptor_path = self.dest_root.join(&self.options.descriptor_name);
        write_coco_json(&descriptor_path, &merged)?;

        report.counts = MergeCounts {
            datasets: self.sources.len(),
            images: merged.images.len(),
            annotations: merged.annotations.len(),
        };
        report.descriptor_path = descriptor_path;

        Ok(report)
    }

    /// Combines the re-indexed collections with the merged metadata.
    fn assemble(
        &self,
        images: Vec<Image>,
        annotations: Vec<Annotation>,
        report: &mut MergeReport,
    ) -> AnnotationSet {
        let first = &self.sources[0].set;

        if self.options.info.is_none() || self.options.license.is_none() {
            report.add(MergeIssue::info(
                MergeIssueCode::MetadataFromFirstDataset,
                "info/license taken from the first source dataset (no override given)",
            ));
        }
        report.add(MergeIssue::info(
            MergeIssueCode::CategoriesFromFirstDataset,
            "categories taken verbatim from the first source dataset",
        ));

        AnnotationSet {
            annotations,
            images,
            info: self
                .options
                .info
                .clone()
                .unwrap_or_else(|| first.info.clone()),
            license: self
                .options
                .license
                .clone()
                .unwrap_or_else(|| first.license.clone()),
            categories: first.categories.clone(),
        }
    }
}

/// Groups a dataset's annotation indices by owning image, preserving the
/// original annotation order within each group.
///
/// Annotations referencing an image id that does not exist in the dataset
/// either abort the merge or, when `allow_dangling` is set, are left out of
/// the index (the caller derives the drop count from the index totals).
fn index_annotations(
    source: &Source,
    allow_dangling: bool,
) -> Result<HashMap<ImageId, Vec<usize>>, CocomergeError> {
    let image_ids: HashSet<ImageId> = source.set.images.iter().map(|i| i.id).collect();

    let mut by_image: HashMap<ImageId, Vec<usize>> = HashMap::new();
    for (idx, annotation) in source.set.annotations.iter().enumerate() {
        if !image_ids.contains(&annotation.image_id) {
            if allow_dangling {
                continue;
            }
            return Err(CocomergeError::DanglingAnnotation {
                dataset: source.root.clone(),
                annotation_id: annotation.id,
                image_id: annotation.image_id,
            });
        }
        by_image.entry(annotation.image_id).or_default().push(idx);
    }

    Ok(by_image)
}

/// Returns the suffix after the last `.` of a media file name, or `None`
/// when there is no usable extension.
fn media_extension(file_name: &str) -> Option<&str> {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}
