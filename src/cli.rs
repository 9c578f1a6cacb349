use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use tracing::{error, info};
use walkdir::WalkDir;

use crate::catalog;
use crate::config::{CatalogConfig, ConvertConfig};
use crate::convert;
use crate::error::{Error, Result};
use crate::parse::SchemaPolicy;
use crate::rearrange;
use crate::rename;
use crate::tagwrite;
use crate::types::Field;

#[derive(Parser)]
#[command(name = "toccata", version, about = "Album cataloging and ToC-driven file transformations")]
pub enum Cli {
    /// Build ToC documents from delimiter-encoded filenames
    Catalog(CatalogArgs),
    /// Convert cataloged tracks into another format and write tags
    Convert(ConvertArgs),
    /// Re-derive short filenames from ToC metadata
    Rename(RenameArgs),
    /// Move files into a tag-derived directory tree
    Rearrange(RearrangeArgs),
    /// Set tag fields on a file or directory tree
    Tag(TagArgs),
    /// Print the tag fields of a file or directory tree
    List(ListArgs),
}

#[derive(clap::Args)]
pub struct CatalogArgs {
    /// Configuration file
    #[arg(short, long, default_value = "etc/catalog.json")]
    config: PathBuf,
    /// Override the configured source directory
    #[arg(short, long)]
    source: Option<PathBuf>,
    /// Override the configured field delimiter
    #[arg(short, long)]
    delimiter: Option<String>,
    /// Override the configured field schema, comma-separated
    /// (e.g. "artist,album,year,genre,track,title")
    #[arg(short, long)]
    format: Option<String>,
    /// Override the configured source extension (without dot)
    #[arg(short = 't', long)]
    extension: Option<String>,
    /// Scan recursively
    #[arg(short, long)]
    recurse: bool,
    /// Segment-count policy: strict or minimum
    #[arg(long)]
    policy: Option<SchemaPolicy>,
}

#[derive(clap::Args)]
pub struct ConvertArgs {
    /// Configuration file
    #[arg(short, long, default_value = "etc/convert.json")]
    config: PathBuf,
    /// Output profile to use, as configured
    #[arg(short = 't', long = "type")]
    kind: String,
    /// Override the configured input root
    #[arg(short, long)]
    source: Option<PathBuf>,
    /// Walk the input root recursively
    #[arg(short, long)]
    recurse: bool,
}

#[derive(clap::Args)]
pub struct RenameArgs {
    /// Directory holding a ToC, or a tree of them with --recurse
    #[arg(short, long)]
    source: PathBuf,
    /// Walk the source recursively
    #[arg(short, long)]
    recurse: bool,
    /// Separator between track number and title
    #[arg(long, default_value = "-")]
    separator: String,
}

#[derive(clap::Args)]
pub struct RearrangeArgs {
    /// Source tree to scan for tagged files
    #[arg(short, long)]
    source: PathBuf,
    /// Destination root under which to create the structure
    #[arg(short, long)]
    dest: PathBuf,
    /// Relative destination path template; the last segment becomes the
    /// file name (e.g. "{artist}/{year} - {album}/{track} - {title}")
    #[arg(short, long)]
    format: String,
}

#[derive(clap::Args)]
pub struct TagArgs {
    /// File or directory tree to modify
    #[arg(short, long)]
    source: PathBuf,
    #[arg(short, long)]
    artist: Option<String>,
    #[arg(short = 'b', long)]
    album: Option<String>,
    #[arg(short = 't', long)]
    title: Option<String>,
    #[arg(short, long)]
    genre: Option<String>,
    #[arg(short, long)]
    year: Option<String>,
    #[arg(short = 'n', long)]
    track: Option<String>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// File or directory tree to read
    #[arg(short, long)]
    source: PathBuf,
}

pub fn run() -> Result<()> {
    match Cli::parse() {
        Cli::Catalog(args) => run_catalog(args),
        Cli::Convert(args) => run_convert(args),
        Cli::Rename(args) => run_rename(args),
        Cli::Rearrange(args) => run_rearrange(args),
        Cli::Tag(args) => run_tag(args),
        Cli::List(args) => run_list(args),
    }
}

fn run_catalog(args: CatalogArgs) -> Result<()> {
    let mut config = CatalogConfig::load(&args.config)?;
    if let Some(source) = args.source {
        config.source = source;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(format) = args.format {
        config.schema = parse_schema(&format)?;
    }
    if let Some(extension) = args.extension {
        config.extension = extension;
    }
    if args.recurse {
        config.recurse = true;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }

    let summary = catalog::run(&config)?;
    info!(
        "cataloged {} directories, {} skipped, {} failed",
        summary.cataloged, summary.skipped, summary.failed
    );
    finish(summary.failed)
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let mut config = ConvertConfig::load(&args.config)?;
    if let Some(source) = args.source {
        config.input.path = source;
    }
    if args.recurse {
        config.input.recurse = true;
    }
    let profile = config.profile(&args.kind)?;

    let summary = convert::run(&config.input, profile)?;
    info!(
        "converted {} tracks, {} already done, {} failed",
        summary.converted, summary.skipped, summary.failed
    );
    finish(summary.failed)
}

fn run_rename(args: RenameArgs) -> Result<()> {
    let summary = rename::run(&args.source, args.recurse, &args.separator)?;
    info!(
        "renamed {} tracks, {} skipped, {} failed",
        summary.renamed, summary.skipped, summary.failed
    );
    finish(summary.failed)
}

fn run_rearrange(args: RearrangeArgs) -> Result<()> {
    let summary = rearrange::run(&args.source, &args.dest, &args.format)?;
    info!(
        "moved {} files, {} discarded, {} failed",
        summary.moved, summary.discarded, summary.failed
    );
    finish(summary.failed)
}

fn run_tag(args: TagArgs) -> Result<()> {
    let mut fields = BTreeMap::new();
    let pairs = [
        (Field::Artist, args.artist),
        (Field::Album, args.album),
        (Field::Title, args.title),
        (Field::Genre, args.genre),
        (Field::Year, args.year),
        (Field::Track, args.track),
    ];
    for (field, value) in pairs {
        if let Some(value) = value {
            fields.insert(field, value);
        }
    }
    if fields.is_empty() {
        return Err(Error::Config("no tag fields given".to_string()));
    }

    let failed = for_each_file(&args.source, |path| {
        tagwrite::write_fields(path, &fields, None)
    })?;
    finish(failed)
}

fn run_list(args: ListArgs) -> Result<()> {
    let failed = for_each_file(&args.source, |path| {
        let fields = tagwrite::read_fields(path)?;
        println!("{}", path.display());
        for (field, value) in &fields {
            println!("  {field}: {value}");
        }
        Ok(())
    })?;
    finish(failed)
}

/// Apply `op` to `source` itself, or to every non-hidden file below it when
/// it is a directory. Per-file failures are logged and counted.
fn for_each_file(source: &Path, op: impl Fn(&Path) -> Result<()>) -> Result<usize> {
    if source.is_file() {
        op(source)?;
        return Ok(0);
    }
    if !source.is_dir() {
        return Err(Error::Config(format!(
            "source {} is neither a file nor a directory",
            source.display()
        )));
    }

    let mut failed = 0;
    for entry in WalkDir::new(source)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if !entry.file_type().is_file() || hidden {
            continue;
        }
        if let Err(err) = op(path) {
            error!("{err}");
            failed += 1;
        }
    }
    Ok(failed)
}

fn parse_schema(format: &str) -> Result<Vec<Field>> {
    format.split(',').map(Field::from_str).collect()
}

fn finish(failed: usize) -> Result<()> {
    if failed > 0 {
        return Err(Error::Incomplete(failed));
    }
    Ok(())
}
