//! COCO descriptor types and I/O.
//!
//! A descriptor is the JSON file enumerating a dataset's `info`, `license`,
//! `categories`, `images` and `annotations`. This module owns its in-memory
//! model ([`AnnotationSet`]) and the reader/writer pair for it. The model
//! is deliberately shallow: ids and file names are typed because the merge
//! rewrites them; every other field passes through opaquely.

mod ids;
pub mod io_json;
mod model;

// Re-export core types for convenient access
pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{Annotation, AnnotationSet, Category, Image};
