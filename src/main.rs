use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use regionsort::{collect, load_regions, run_pipeline, DispatchOptions, ExifReader, ExifTagWriter};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("regionsort")
        .version("1.0")
        .author("Jesper Fjellin")
        .about("Sorts geo-tagged images into directories named after the GeoJSON polygon containing them")
        .arg(
            Arg::new("json_file")
                .short('j')
                .long("json-file")
                .required(true)
                .help("Path to the GeoJSON file defining the regions"),
        )
        .arg(
            Arg::new("properties")
                .short('p')
                .long("properties")
                .required(true)
                .help("GeoJSON properties key used to name each region"),
        )
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .required(true)
                .help("Path to the images folder; subfolders are scanned too"),
        )
        .arg(
            Arg::new("destination")
                .short('d')
                .long("destination")
                .help("Destination folder; omit to only match and report"),
        )
        .arg(
            Arg::new("include_orphans")
                .short('a')
                .long("include-orphans")
                .action(ArgAction::SetTrue)
                .help("Also dispatch images outside every region, under the no-region directory"),
        )
        .arg(
            Arg::new("move")
                .short('m')
                .long("move")
                .action(ArgAction::SetTrue)
                .help("Move files to the destination instead of copying"),
        )
        .arg(
            Arg::new("write_tag")
                .short('w')
                .long("write-tag")
                .action(ArgAction::SetTrue)
                .help("Write the region name into each dispatched image's EXIF metadata"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Don't print per-image results"),
        )
        .get_matches();

    let json_file = PathBuf::from(matches.get_one::<String>("json_file").unwrap());
    let properties = matches.get_one::<String>("properties").unwrap();
    let source = PathBuf::from(matches.get_one::<String>("source").unwrap());
    let options = DispatchOptions {
        destination: matches.get_one::<String>("destination").map(PathBuf::from),
        include_orphans: matches.get_flag("include_orphans"),
        move_files: matches.get_flag("move"),
        write_tag: matches.get_flag("write_tag"),
        quiet: matches.get_flag("quiet"),
    };

    // Fatal errors all happen here, before any file is touched.
    if options.destination.is_none() && (options.move_files || options.write_tag) {
        eprintln!(
            "Error: {}",
            regionsort::Error::config("--move and --write-tag require --destination")
        );
        std::process::exit(1);
    }

    let regions = match load_regions(&json_file, properties) {
        Ok(regions) => regions,
        Err(e) => {
            eprintln!("Error loading regions: {e}");
            std::process::exit(1);
        }
    };

    let collection = match collect(&source, &ExifReader) {
        Ok(collection) => collection,
        Err(e) => {
            eprintln!("Error collecting images: {e}");
            std::process::exit(1);
        }
    };

    let summary = run_pipeline(&collection, &regions, &source, &options, &ExifTagWriter);
    print!("{summary}");
}
