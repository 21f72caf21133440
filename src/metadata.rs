//! Metadata collaborators.
//!
//! The pipeline only needs two capabilities from image metadata: "extract
//! capture time and position" and "write a string tag". Both are traits so
//! tests can substitute map-backed fakes; the shipped implementations read
//! EXIF through `kamadak-exif` and write through `little_exif`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Tag, Value};
use geo::Point;
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use thiserror::Error;

/// Capture time and position extracted from one file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capture {
    pub timestamp: NaiveDateTime,
    pub point: Point<f64>,
}

/// Why a file yields no usable capture metadata. Always recovered by
/// skipping the file.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("no EXIF data: {0}")]
    Exif(String),

    #[error("missing or malformed {0}")]
    Missing(&'static str),
}

#[derive(Error, Debug)]
#[error("tag write failed: {0}")]
pub struct TagWriteError(pub String);

/// Extracts (timestamp, point) from a file.
pub trait MetadataReader {
    fn read(&self, path: &Path) -> Result<Capture, MetadataError>;
}

/// Persists a region name into a file's embedded metadata.
pub trait TagWriter {
    fn write_tag(&self, path: &Path, value: &str) -> Result<(), TagWriteError>;
}

/// EXIF-backed reader: `DateTimeOriginal` for time, the GPS IFD for position.
pub struct ExifReader;

impl MetadataReader for ExifReader {
    fn read(&self, path: &Path) -> Result<Capture, MetadataError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(&file);
        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| MetadataError::Exif(e.to_string()))?;

        Ok(Capture {
            timestamp: capture_time(&exif)?,
            point: capture_point(&exif)?,
        })
    }
}

fn capture_time(exif: &exif::Exif) -> Result<NaiveDateTime, MetadataError> {
    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or(MetadataError::Missing("DateTimeOriginal"))?;
    let Value::Ascii(ref lines) = field.value else {
        return Err(MetadataError::Missing("DateTimeOriginal"));
    };
    let raw = lines.first().ok_or(MetadataError::Missing("DateTimeOriginal"))?;
    let dt = exif::DateTime::from_ascii(raw)
        .map_err(|_| MetadataError::Missing("DateTimeOriginal"))?;
    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())
        .and_then(|date| date.and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into()))
        .ok_or(MetadataError::Missing("DateTimeOriginal"))
}

fn capture_point(exif: &exif::Exif) -> Result<Point<f64>, MetadataError> {
    let latitude = coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S', "GPSLatitude")?;
    let longitude =
        coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W', "GPSLongitude")?;
    Ok(Point::new(longitude, latitude))
}

/// Degrees/minutes/seconds to signed decimal degrees.
fn coordinate(
    exif: &exif::Exif,
    value_tag: Tag,
    ref_tag: Tag,
    negative_ref: u8,
    label: &'static str,
) -> Result<f64, MetadataError> {
    let field = exif
        .get_field(value_tag, In::PRIMARY)
        .ok_or(MetadataError::Missing(label))?;
    let Value::Rational(ref parts) = field.value else {
        return Err(MetadataError::Missing(label));
    };
    if parts.len() < 3 {
        return Err(MetadataError::Missing(label));
    }
    let degrees = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;

    let reference = exif
        .get_field(ref_tag, In::PRIMARY)
        .ok_or(MetadataError::Missing(label))?;
    let negative = matches!(
        reference.value,
        Value::Ascii(ref lines) if lines.first().is_some_and(|l| l.first() == Some(&negative_ref))
    );
    Ok(if negative { -degrees } else { degrees })
}

/// Writes the region name into the file's `ImageDescription` field.
pub struct ExifTagWriter;

impl TagWriter for ExifTagWriter {
    fn write_tag(&self, path: &Path, value: &str) -> Result<(), TagWriteError> {
        let mut metadata =
            Metadata::new_from_path(path).map_err(|e| TagWriteError(e.to_string()))?;
        metadata.set_tag(ExifTag::ImageDescription(value.to_string()));
        metadata
            .write_to_file(path)
            .map_err(|e| TagWriteError(e.to_string()))?;
        Ok(())
    }
}
