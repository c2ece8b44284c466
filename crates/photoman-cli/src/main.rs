use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photoman_core::{Outcome, Progress, RenameOptions};
use regex::Regex;
use walkdir::WalkDir;

static EXTENSION_SEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;\s]+").unwrap());

#[derive(Parser)]
#[command(name = "photoman", version, about = "Rename images so that new name is its date/time taken")]
struct Cli {
    /// Be verbose
    #[arg(short, long)]
    verbose: bool,

    /// Working directory to search for files
    #[arg(short = 'C', long, default_value = ".")]
    directory: PathBuf,

    /// File extensions to process; repeatable, or separated by "," ";" or spaces
    #[arg(short, long, required = true)]
    extensions: Vec<String>,

    /// Find files recursively
    #[arg(short, long, short_alias = 'R')]
    recursive: bool,

    /// Output directory (default: the working directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Create separate directories for each day and camera
    #[arg(short = 'z', long)]
    create_dirs: bool,

    /// Delete files that are duplicates of an already renamed file
    #[arg(short = 'd', long)]
    remove_duplicates: bool,

    /// Use short directory names (date only)
    #[arg(short, long)]
    short: bool,

    /// ffprobe binary used for videos
    #[arg(long)]
    ffprobe: Option<PathBuf>,

    /// Write per-file outcomes to this JSON file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Lower-cased extensions without dots, in first-seen order.
fn parse_extensions(values: &[String]) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for value in values {
        for ext in EXTENSION_SEP_RE.split(value) {
            let ext = ext.trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
    }
    extensions
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Absolute paths of matching files under `dir`, sorted by name.
fn find_files(dir: &Path, extensions: &[String], recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let root = dir
        .canonicalize()
        .with_context(|| format!("cannot open directory {}", dir.display()))?;
    log::debug!("Getting file list:");
    log::debug!("\troot directory: {}", root.display());
    log::debug!("\tsearching extensions: {}", extensions.join(" "));
    log::debug!("\trecursive: {}", recursive);

    let mut walker = WalkDir::new(&root).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cannot read entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn progress_line(p: &Progress<'_>) -> String {
    let dest = match p.outcome {
        Outcome::Moved { to, .. } => to.display().to_string(),
        Outcome::SkippedDuplicate { duplicate_of, .. } => {
            format!(" <duplicate of {}>", duplicate_of.display())
        }
        Outcome::SkippedError { .. } => " <skipping>".to_string(),
    };
    format!(
        "{:3.0}%\t{}\t-->\t{}",
        p.percent,
        p.outcome.source().display(),
        dest
    )
}

fn write_report(path: &Path, outcomes: &[Outcome]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create report {}", path.display()))?;
    serde_json::to_writer_pretty(file, outcomes)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let extensions = parse_extensions(&cli.extensions);
    if extensions.is_empty() {
        anyhow::bail!("no file extensions given");
    }

    let files = find_files(&cli.directory, &extensions, cli.recursive)?;
    let output = cli.output.unwrap_or_else(|| cli.directory.clone());
    std::fs::create_dir_all(&output)
        .with_context(|| format!("cannot create output directory {}", output.display()))?;
    let output = output
        .canonicalize()
        .with_context(|| format!("cannot open output directory {}", output.display()))?;

    let options = RenameOptions {
        output,
        group_by_directory: cli.create_dirs,
        remove_duplicates: cli.remove_duplicates,
        short_names: cli.short,
        ffprobe: cli.ffprobe,
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} renaming files")?);

    let result = photoman_core::process(&files, &options, &|p| {
        let line = progress_line(p);
        pb.suspend(|| match p.outcome {
            Outcome::Moved { .. } => log::info!("{}", line),
            _ => log::warn!("{}", line),
        });
        pb.inc(1);
    });
    pb.finish_and_clear();

    let outcomes = match &result {
        Ok(outcomes) => outcomes,
        Err(aborted) => &aborted.outcomes,
    };
    if let Some(report) = &cli.report {
        write_report(report, outcomes)?;
    }

    match result {
        Ok(outcomes) => {
            let moved = outcomes.iter().filter(|o| matches!(o, Outcome::Moved { .. })).count();
            let duplicates = outcomes
                .iter()
                .filter(|o| matches!(o, Outcome::SkippedDuplicate { .. }))
                .count();
            eprintln!(
                "Done! {} files, {} renamed, {} duplicates, {} skipped",
                outcomes.len(),
                moved,
                duplicates,
                outcomes.len() - moved - duplicates
            );
            Ok(())
        }
        Err(aborted) => {
            log::error!("Could not find ffprobe: {}", aborted.source);
            Err(aborted.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_extensions() {
        let values = vec!["jpg, .MP4".to_string(), "rw2;JPG  mov".to_string()];
        assert_eq!(parse_extensions(&values), vec!["jpg", "mp4", "rw2", "mov"]);
        assert!(parse_extensions(&[" ;, ".to_string()]).is_empty());
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["jpg".to_string(), "rw2".to_string()];
        assert!(has_extension(Path::new("/in/a.JPG"), &exts));
        assert!(has_extension(Path::new("/in/P100.Rw2"), &exts));
        assert!(!has_extension(Path::new("/in/clip.mp4"), &exts));
        assert!(!has_extension(Path::new("/in/README"), &exts));
    }

    #[test]
    fn test_find_files_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.JPG"), b"").unwrap();
        fs::write(dir.path().join("a.jpg"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.jpg"), b"").unwrap();

        let exts = vec!["jpg".to_string()];
        let names = |files: Vec<PathBuf>| -> Vec<String> {
            files
                .iter()
                .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };

        let flat = find_files(dir.path(), &exts, false).unwrap();
        assert!(flat.iter().all(|f| f.is_absolute()));
        assert_eq!(names(flat), vec!["a.jpg", "b.JPG"]);

        let deep = find_files(dir.path(), &exts, true).unwrap();
        assert_eq!(names(deep), vec!["a.jpg", "b.JPG", "c.jpg"]);
    }

    #[test]
    fn test_progress_line() {
        let outcome = Outcome::Moved {
            from: PathBuf::from("/in/IMG_1.jpg"),
            to: PathBuf::from("/out/20160922_101213.JPG"),
        };
        let p = Progress {
            current: 1,
            total: 4,
            percent: 25.0,
            outcome: &outcome,
        };
        assert_eq!(
            progress_line(&p),
            " 25%\t/in/IMG_1.jpg\t-->\t/out/20160922_101213.JPG"
        );

        let skipped = Outcome::SkippedError {
            path: PathBuf::from("/in/x.txt"),
            cause: "unsupported".to_string(),
        };
        let p = Progress {
            current: 0,
            total: 4,
            percent: 0.0,
            outcome: &skipped,
        };
        assert_eq!(progress_line(&p), "  0%\t/in/x.txt\t-->\t <skipping>");
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "photoman", "-e", "jpg", "-e", "mp4,mov", "-R", "-z", "-d", "-s", "-o", "/out",
        ])
        .unwrap();
        assert!(cli.recursive && cli.create_dirs && cli.remove_duplicates && cli.short);
        assert_eq!(parse_extensions(&cli.extensions), vec!["jpg", "mp4", "mov"]);
        assert_eq!(cli.output, Some(PathBuf::from("/out")));

        assert!(Cli::try_parse_from(["photoman"]).is_err());
    }
}
