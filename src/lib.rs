//! regionsort - classify geo-tagged images into named GeoJSON regions and
//! route each file to a per-region destination directory.
//!
//! Pipeline: load the region set once, collect a timestamp-ordered record
//! list from the source tree, then dispatch each record. The matcher keeps
//! the previous hit as a hint, so a capture session that stays inside one
//! region costs one containment test per image.

pub mod collect;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod matcher;
pub mod metadata;
pub mod regions;
pub mod report;

pub use collect::{collect, Collection, Record};
pub use dispatch::{run_pipeline, DispatchOptions, NO_REGION};
pub use error::{Error, Result};
pub use matcher::find_region;
pub use metadata::{Capture, ExifReader, ExifTagWriter, MetadataReader, TagWriter};
pub use regions::{load_regions, Region, RegionSet};
pub use report::RunSummary;
