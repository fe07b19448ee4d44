//! pdfparts - Map the structure of PDF files
//!
//! Lists the typed byte ranges (signature, objects, xref tables, footers,
//! streams, data, overlay) recovered from each file, and optionally dumps
//! object tokens, the trailer, values of one key, or the decoded streams.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use memmap2::Mmap;
use pdfcarve_core::{
    FilePart, FilePartKind, FilterDecoder, PartMask, PdfFile, ScanContext, ScanOptions,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdfparts")]
#[command(author, version, about = "Map the structure of PDF files", long_about = None)]
#[command(disable_version_flag = true)]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Comma-separated part kinds to list (signature,object,table,footer,stream,data,overlay)
    #[arg(short = 'k', long, value_delimiter = ',')]
    kinds: Option<Vec<String>>,

    /// Maximum number of objects to consider
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Write JSON instead of a table (parts only)
    #[arg(short = 'j', long, action = ArgAction::SetTrue, conflicts_with_all = ["objects", "trailer", "key"])]
    json: bool,

    /// Dump the token list of every object
    #[arg(long = "objects", action = ArgAction::SetTrue)]
    objects: bool,

    /// Dump the last trailer dictionary
    #[arg(long = "trailer", action = ArgAction::SetTrue)]
    trailer: bool,

    /// Print the distinct values of a dictionary key (e.g. /Producer)
    #[arg(long = "key")]
    key: Option<String>,

    /// Write decoded streams into this directory
    #[arg(short = 'u', long = "unpack")]
    unpack: Option<PathBuf>,

    /// Do not scan revisions that end in an xref stream
    #[arg(long = "no-recover-appends", action = ArgAction::SetTrue)]
    no_recover_appends: bool,

    /// Output file name ("-" for stdout)
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

#[derive(Serialize)]
struct PartRow<'a> {
    kind: &'static str,
    offset: u64,
    size: u64,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bits_per_component: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extension: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<&'a str>,
}

impl<'a> From<&'a FilePart> for PartRow<'a> {
    fn from(part: &'a FilePart) -> Self {
        let props = &part.properties;
        Self {
            kind: part.kind.as_str(),
            offset: part.offset,
            size: part.size,
            name: &part.name,
            method: props.compress_method.map(|m| m.as_str()),
            width: props.width,
            height: props.height,
            bits_per_component: props.bits_per_component,
            extension: props.extension.as_deref(),
            info: props.info.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: String,
    size: u64,
    version: String,
    parts: Vec<PartRow<'a>>,
}

fn parse_kinds(names: &[String]) -> Result<PartMask> {
    names.iter().try_fold(PartMask::NONE, |mask, name| {
        match FilePartKind::from_name(name) {
            Some(kind) => Ok(mask | kind),
            None => bail!("unknown part kind: {name}"),
        }
    })
}

fn write_parts<W: Write>(out: &mut W, pdf: &PdfFile, path: &Path, parts: &[FilePart]) -> Result<()> {
    writeln!(
        out,
        "# {} ({} bytes, PDF {})",
        path.display(),
        pdf.len(),
        pdf.version()
    )?;
    for part in parts {
        write!(
            out,
            "{:<10} {:>12} {:>12}  {}",
            part.kind, part.offset, part.size, part.name
        )?;
        let props = &part.properties;
        if part.kind == FilePartKind::Stream {
            write!(out, "  [{}", part.compress_method())?;
            if let (Some(w), Some(h)) = (props.width, props.height) {
                write!(out, " {w}x{h}")?;
                if let Some(bpc) = props.bits_per_component {
                    write!(out, "x{bpc}")?;
                }
            }
            write!(out, "]")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_objects<W: Write>(out: &mut W, pdf: &PdfFile, limit: Option<usize>, ctx: &ScanContext<'_>) -> Result<()> {
    for obj in pdf.get_objects(limit, ctx) {
        writeln!(out, "{} @{} (+{}): {}", obj.id, obj.offset, obj.size, obj.tokens.join(" "))?;
        for stream in &obj.streams {
            writeln!(out, "  stream @{} (+{})", stream.offset, stream.size)?;
        }
    }
    Ok(())
}

fn unpack(pdf: &PdfFile, dir: &Path, ctx: &ScanContext<'_>) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let streams = pdf.unpack_streams(&FilterDecoder::new(), ctx);
    for stream in &streams {
        let target = dir.join(stream.file_name());
        fs::write(&target, &stream.data).with_context(|| format!("writing {}", target.display()))?;
    }
    Ok(streams.len())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let kinds = match args.kinds.as_deref() {
        Some(names) => parse_kinds(names)?,
        None => PartMask::ALL,
    };
    let options = ScanOptions::default().with_recover_appends(!args.no_recover_appends);
    let ctx = ScanContext::new();

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)?;
        Box::new(BufWriter::new(file))
    };

    let mut pdfs = Vec::new();
    for path in &args.files {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mmap = unsafe { Mmap::map(&file) }?;
        let pdf = PdfFile::new_from_mmap(mmap).with_options(options);
        if !pdf.is_valid() {
            warn!(path = %path.display(), "not a PDF file, skipping");
            continue;
        }
        pdfs.push((path, pdf));
    }

    let mut reports = Vec::new();
    for (path, pdf) in &pdfs {
        let parts = pdf.get_file_parts(kinds, args.limit, &ctx);
        if let Some(dir) = &args.unpack {
            let count = unpack(pdf, dir, &ctx)?;
            eprintln!("{}: unpacked {count} streams into {}", path.display(), dir.display());
        }
        if args.json {
            reports.push((path, pdf, parts));
            continue;
        }
        write_parts(&mut output, pdf, path, &parts)?;
        if args.trailer {
            writeln!(output, "trailer:")?;
            for (key, value) in pdf.read_trailer(&ctx) {
                writeln!(output, "  /{key} {value}")?;
            }
        }
        if let Some(key) = &args.key {
            for value in pdf.values_by_key(key, &ctx) {
                writeln!(output, "{key} = {value}")?;
            }
        }
        if args.objects {
            write_objects(&mut output, pdf, args.limit, &ctx)?;
        }
    }

    if args.json {
        let json: Vec<FileReport<'_>> = reports
            .iter()
            .map(|(path, pdf, parts)| FileReport {
                path: path.display().to_string(),
                size: pdf.len(),
                version: pdf.version(),
                parts: parts.iter().map(PartRow::from).collect(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut output, &json)?;
        writeln!(output)?;
    }

    output.flush()?;
    Ok(())
}
