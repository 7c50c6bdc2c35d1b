//! apidoc: build a resolved API documentation tree from `@api` comment blocks.
//!
//! Two modes:
//!
//! - **stdin mode**: `apidoc < users.js` parses one source read from stdin
//! - **file mode**: `apidoc -o api.json src/ lib/**/*.py`
//!
//! The resolved tree is written as pretty JSON to `--output` or stdout.
//! Diagnostics go to stderr; any `error:` makes the exit status non-zero
//! unless `--no-fail` is given.

use anyhow::{Context, Result};
use apidoc_core::{parse_sources, ParseOptions, ParseOutput, ProjectInfo, Registry, Severity, SourceFile};
use clap::Parser;
use log::{debug, LevelFilter};
use semver::Version;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Project file looked up in the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "apidoc.json";

#[derive(Parser)]
#[command(
    name = "apidoc",
    version,
    about = "Generate a resolved API documentation tree from @api comment blocks"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    inputs: Vec<String>,

    /// Output file (stdout if omitted)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Project file (name, version, title, description, sampleUrl).
    /// Defaults to ./apidoc.json when present.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Version of blocks without @apiVersion (overrides the project version)
    #[arg(long)]
    default_version: Option<String>,

    /// Include blocks marked @apiPrivate
    #[arg(long)]
    private: bool,

    /// Keep Markdown fields as written instead of rendering HTML
    #[arg(long)]
    no_markdown: bool,

    /// Keep only blocks with a matching tag, e.g. --filter-by apiGroup=User
    #[arg(long)]
    filter_by: Option<String>,

    /// Exit successfully even when references could not be resolved
    #[arg(long)]
    no_fail: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let project = load_project(cli.config.as_deref())?;
    let options = parse_options(&cli, &project)?;
    let sources = if cli.inputs.is_empty() {
        read_stdin()?
    } else {
        read_sources(&cli.inputs)?
    };

    let output = parse_sources(&sources, &Registry::standard(), &options, &project);
    print_diagnostics(&output);
    write_output(&output, cli.output.as_deref())?;

    if output.report.has_errors() && !cli.no_fail {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Read the project file given with `--config`, else `./apidoc.json` if it
/// exists, else use empty project information.
fn load_project(config: Option<&Path>) -> Result<ProjectInfo> {
    let path = match config {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).is_file() => Path::new(DEFAULT_CONFIG),
        None => return Ok(ProjectInfo::default()),
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read project file: {}", path.display()))?;
    let project: ProjectInfo = serde_json::from_str(&raw)
        .with_context(|| format!("invalid project file: {}", path.display()))?;
    debug!("loaded project file {}", path.display());
    Ok(project)
}

/// `--default-version` wins, then a valid project version, then `0.0.0`.
fn parse_options(cli: &Cli, project: &ProjectInfo) -> Result<ParseOptions> {
    let default_version = match cli.default_version.as_deref() {
        Some(raw) => Version::parse(raw).with_context(|| format!("invalid --default-version: {}", raw))?,
        None => match project.version.as_deref().map(Version::parse) {
            Some(Ok(version)) => version,
            Some(Err(e)) => {
                eprintln!("warning: ignoring project version: {}", e);
                Version::new(0, 0, 0)
            }
            None => Version::new(0, 0, 0),
        },
    };

    Ok(ParseOptions {
        default_version,
        include_private: cli.private,
        markdown: !cli.no_markdown,
        filter_by: cli.filter_by.clone(),
    })
}

fn read_stdin() -> Result<Vec<SourceFile>> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    Ok(vec![SourceFile::new("stdin", input)])
}

fn read_sources(inputs: &[String]) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for path in expand_globs(inputs)? {
        let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        match String::from_utf8(bytes) {
            Ok(content) => sources.push(SourceFile::new(path.to_string_lossy(), content)),
            Err(_) => eprintln!("warning: skipping {}: not valid UTF-8", path.display()),
        }
    }
    Ok(sources)
}

/// File extensions scanned when a directory is given.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cs", "dart", "erl", "ex", "exs", "go", "groovy", "h", "hpp", "java", "js", "jsx",
    "kt", "lua", "m", "nim", "php", "pl", "pm", "py", "rb", "rs", "scala", "sh", "swift", "ts", "tsx",
    "cr", "bash", "mjs", "cjs",
];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Expand glob patterns into a list of real file paths.
/// Directories are scanned recursively for supported file types; symlinked
/// directories below an input directory are not followed.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            scan_dir(path, &mut files)?;
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?;
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let p = entry.path();
        if file_type.is_dir() {
            let hidden = p
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.') || n == "node_modules");
            if !hidden {
                scan_dir(&p, files)?;
            }
        } else if (file_type.is_file() || (file_type.is_symlink() && p.is_file())) && is_supported(&p) {
            files.push(p);
        }
    }
    Ok(())
}

fn print_diagnostics(output: &ParseOutput) {
    for diagnostic in &output.report.diagnostics {
        let label = match diagnostic.severity() {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("{}: {}", label, diagnostic);
    }
}

fn write_output(output: &ParseOutput, path: Option<&Path>) -> Result<()> {
    let mut json = serde_json::to_string_pretty(output).context("failed to serialize output")?;
    json.push('\n');
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
            }
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            print!("{}", json);
            Ok(())
        }
    }
}
