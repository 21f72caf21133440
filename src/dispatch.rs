//! The dispatch pipeline: match each record, route its file, keep score.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::collect::{Collection, Record};
use crate::matcher;
use crate::metadata::TagWriter;
use crate::regions::RegionSet;
use crate::report::RunSummary;

/// Destination subdirectory and tally bucket for records outside every region.
pub const NO_REGION: &str = "no-region";

/// Run-wide dispatch settings.
#[derive(Debug, Default)]
pub struct DispatchOptions {
    /// Where files go. None means match and report only.
    pub destination: Option<PathBuf>,
    /// Process records that fall outside every region.
    pub include_orphans: bool,
    /// Move instead of copy.
    pub move_files: bool,
    /// Write the region name into dispatched files.
    pub write_tag: bool,
    /// Suppress per-record stdout lines.
    pub quiet: bool,
}

/// Terminal state of one record.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// Placed (or no destination configured / same-path no-op).
    Dispatched,
    /// Orphan dropped by policy.
    Excluded,
    /// Copy/move failed; the run continues.
    Failed(String),
}

/// Process the full record list sequentially.
///
/// The previous successful match is kept in a slot owned by this loop and
/// passed to the matcher as a hint; it is sequential state by nature, so any
/// parallel split must give each worker its own slot and merge summaries.
///
/// Per-record failures never abort the run. The function itself is
/// infallible: fatal conditions are all caught before records exist.
pub fn run_pipeline(
    collection: &Collection,
    regions: &RegionSet,
    source_root: &Path,
    options: &DispatchOptions,
    tagger: &dyn TagWriter,
) -> RunSummary {
    let mut summary = RunSummary {
        candidates: collection.candidates,
        skipped: collection.skipped,
        ..RunSummary::default()
    };
    let mut last_hit: Option<String> = None;

    for record in &collection.records {
        let region = matcher::find_region(&record.point, regions, last_hit.as_deref());
        if let Some(name) = region {
            last_hit = Some(name.to_string());
        }

        let outcome = dispatch_record(record, region, source_root, options, tagger, &mut summary);
        match &outcome {
            Outcome::Dispatched => {
                summary.dispatched += 1;
                summary.bump(region.unwrap_or(NO_REGION));
            }
            Outcome::Excluded => summary.excluded += 1,
            Outcome::Failed(error) => {
                summary.failures += 1;
                summary.bump(region.unwrap_or(NO_REGION));
                warn!(path = %record.path.display(), error = %error, "dispatch failed");
            }
        }

        if !options.quiet {
            match &outcome {
                Outcome::Dispatched => {
                    println!("{} -> {}", record.path.display(), region.unwrap_or(NO_REGION))
                }
                Outcome::Excluded => println!("{} -> excluded", record.path.display()),
                Outcome::Failed(error) => {
                    println!("{} -> failed: {}", record.path.display(), error)
                }
            }
        }
    }

    summary
}

fn dispatch_record(
    record: &Record,
    region: Option<&str>,
    source_root: &Path,
    options: &DispatchOptions,
    tagger: &dyn TagWriter,
    summary: &mut RunSummary,
) -> Outcome {
    if region.is_none() && !options.include_orphans {
        return Outcome::Excluded;
    }

    let Some(destination) = &options.destination else {
        // match-only run
        return Outcome::Dispatched;
    };

    let target = destination_path(&record.path, source_root, destination, region);
    if let Err(e) = place_file(&record.path, &target, options.move_files) {
        return Outcome::Failed(e.to_string());
    }

    if options.write_tag {
        if let Some(name) = region {
            // best effort: a tag failure never reverts the placement
            if let Err(e) = tagger.write_tag(&target, name) {
                summary.tag_failures += 1;
                warn!(path = %target.display(), error = %e, "tag write failed");
            }
        }
    }

    Outcome::Dispatched
}

/// `<destination>/<region-or-no-region>/<path relative to source root>`.
fn destination_path(
    source: &Path,
    source_root: &Path,
    destination: &Path,
    region: Option<&str>,
) -> PathBuf {
    let relative = source.strip_prefix(source_root).unwrap_or(source);
    destination.join(region.unwrap_or(NO_REGION)).join(relative)
}

/// Copy or move `source` to `target`, creating parent directories as needed.
///
/// Identical absolute paths are a no-op so re-running against the same tree
/// is safe. A move that cannot rename (cross-device) falls back to
/// copy-then-remove.
fn place_file(source: &Path, target: &Path, move_file: bool) -> io::Result<()> {
    if std::path::absolute(source)? == std::path::absolute(target)? {
        return Ok(());
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    if move_file {
        if fs::rename(source, target).is_err() {
            fs::copy(source, target)?;
            fs::remove_file(source)?;
        }
    } else {
        fs::copy(source, target)?;
    }
    Ok(())
}
