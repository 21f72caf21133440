//! Record collection: walk the source tree, extract capture metadata, sort.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use geo::Point;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::metadata::MetadataReader;

/// Extensions of containers the EXIF reader understands (case-insensitive).
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tif", "tiff", "png", "webp"];

/// One geo-tagged source file. Immutable once collected.
#[derive(Debug, Clone)]
pub struct Record {
    pub path: PathBuf,
    pub timestamp: NaiveDateTime,
    pub point: Point<f64>,
}

/// The collected, timestamp-ordered record list plus collection stats.
#[derive(Debug, Default)]
pub struct Collection {
    pub records: Vec<Record>,
    /// Files matching the image predicate, including skipped ones.
    pub candidates: usize,
    /// Candidates dropped for missing or unreadable metadata.
    pub skipped: usize,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// Walk `source_root` and produce records sorted ascending by capture time.
///
/// The walk itself is in sorted file-name order, so a given filesystem state
/// always yields the same sequence. The sort is stable: records with equal
/// timestamps keep their walk order. Files the reader cannot extract
/// metadata from are skipped with a warning; an unreadable root is fatal.
pub fn collect(source_root: &Path, reader: &dyn MetadataReader) -> Result<Collection> {
    if !source_root.is_dir() {
        return Err(Error::SourceWalk {
            path: source_root.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "not a directory",
            ),
        });
    }

    let mut collection = Collection::default();
    for entry in WalkDir::new(source_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }

        collection.candidates += 1;
        match reader.read(entry.path()) {
            Ok(capture) => collection.records.push(Record {
                path: entry.path().to_path_buf(),
                timestamp: capture.timestamp,
                point: capture.point,
            }),
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping file");
                collection.skipped += 1;
            }
        }
    }

    collection.records.sort_by_key(|record| record.timestamp);
    info!(
        candidates = collection.candidates,
        skipped = collection.skipped,
        "collected records"
    );
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Capture, MetadataError, MetadataReader};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::fs;

    /// Map-backed reader: paths not present behave like files without EXIF.
    struct FakeReader {
        captures: HashMap<PathBuf, Capture>,
    }

    impl MetadataReader for FakeReader {
        fn read(&self, path: &Path) -> std::result::Result<Capture, MetadataError> {
            self.captures
                .get(path)
                .copied()
                .ok_or(MetadataError::Missing("DateTimeOriginal"))
        }
    }

    fn at(seconds: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, seconds)
            .unwrap()
    }

    fn capture(seconds: u32) -> Capture {
        Capture {
            timestamp: at(seconds),
            point: Point::new(0.0, 0.0),
        }
    }

    #[test]
    fn collect_sorts_by_timestamp_and_skips_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("nested")).unwrap();
        for name in ["late.jpg", "nested/early.jpg", "no_exif.jpg", "notes.txt"] {
            fs::write(root.join(name), b"").unwrap();
        }

        let mut captures = HashMap::new();
        captures.insert(root.join("late.jpg"), capture(30));
        captures.insert(root.join("nested/early.jpg"), capture(10));
        let reader = FakeReader { captures };

        let collection = collect(root, &reader).unwrap();
        // notes.txt never counts; no_exif.jpg counts but is skipped
        assert_eq!(collection.candidates, 3);
        assert_eq!(collection.skipped, 1);
        let paths: Vec<&Path> = collection.records.iter().map(|r| r.path.as_path()).collect();
        assert_eq!(paths, [root.join("nested/early.jpg"), root.join("late.jpg")]);
    }

    #[test]
    fn equal_timestamps_keep_walk_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut captures = HashMap::new();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            fs::write(root.join(name), b"").unwrap();
            captures.insert(root.join(name), capture(5));
        }
        let reader = FakeReader { captures };

        let collection = collect(root, &reader).unwrap();
        let names: Vec<String> = collection
            .records
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // walk order is sorted by file name; the stable sort must not reorder
        assert_eq!(names, ["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_image(Path::new("x/y/photo.JPG")));
        assert!(is_image(Path::new("photo.JpEg")));
        assert!(!is_image(Path::new("photo.raw")));
        assert!(!is_image(Path::new("no_extension")));
    }

    #[test]
    fn missing_root_is_fatal() {
        let result = collect(Path::new("/definitely/not/here"), &FakeReader {
            captures: HashMap::new(),
        });
        assert!(matches!(result, Err(Error::SourceWalk { .. })));
    }
}
