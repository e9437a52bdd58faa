//! `sheetmerge run | merge | validate`: load two tables, match, merge, save.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use sheetmerge_engine::Table;
use sheetmerge_io::IoError;
use sheetmerge_merge::config::{parse_pair, validate_pairs, DEFAULT_OUTPUT};
use sheetmerge_merge::merge::plan_columns;
use sheetmerge_merge::{MatchPair, Matcher, MergeConfig, MergeError, MergeSummary, Side};

use crate::exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_IO, EXIT_NO_MATCHES, EXIT_USAGE};
use crate::progress::ConsoleReporter;
use crate::CliError;

/// Flags shared by `run` and `merge`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunFlags {
    /// Print the summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Exit with code 5 when no primary row matched (output is still written)
    #[arg(long)]
    pub require_match: bool,
}

#[derive(Debug, Clone)]
pub struct Source {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

/// Everything needed to run one merge, however it was specified.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    pub primary: Source,
    pub reference: Source,
    pub pairs: Vec<MatchPair>,
    pub output: PathBuf,
}

impl Job {
    /// Load a job from a TOML config. Relative paths resolve against the
    /// config file's directory.
    pub fn from_config(config_path: &Path) -> Result<Self, CliError> {
        let config_str = std::fs::read_to_string(config_path).map_err(|e| {
            job_err(EXIT_IO, format!("cannot read config {}: {e}", config_path.display()))
        })?;

        let mut config = MergeConfig::from_toml(&config_str).map_err(|e| {
            job_err(EXIT_CONFIG, format!("{}: {e}", config_path.display()))
        })?;

        let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base_dir);

        Ok(Self {
            name: config.display_name().to_string(),
            output: config.output_path(),
            primary: Source { path: config.primary.file, sheet: config.primary.sheet },
            reference: Source { path: config.reference.file, sheet: config.reference.sheet },
            pairs: config.pairs,
        })
    }

    /// Build a job from `--pair PRIMARY=REFERENCE` arguments.
    pub fn from_args(
        primary: Source,
        reference: Source,
        pair_args: &[String],
        output: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let pairs = pair_args
            .iter()
            .map(|arg| parse_pair(arg))
            .collect::<Result<Vec<_>, _>>()
            .map_err(merge_err)?;

        Ok(Self {
            name: "merge".to_string(),
            primary,
            reference,
            pairs,
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        })
    }
}

fn job_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn merge_err(e: MergeError) -> CliError {
    let code = if e.is_configuration() { EXIT_CONFIG } else { EXIT_ERROR };
    job_err(code, e.to_string())
}

pub(crate) fn io_err(e: IoError) -> CliError {
    let hint = match e {
        IoError::UnsupportedFormat(_) => {
            Some("supported formats: csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods".to_string())
        }
        IoError::SheetNotFound { ref path, .. } => {
            Some(format!("run `sheetmerge columns {path}` to list its sheets"))
        }
        _ => None,
    };
    CliError { code: EXIT_IO, message: e.to_string(), hint }
}

fn load(source: &Source) -> Result<Table, CliError> {
    log::debug!("loading {}", source.path.display());
    sheetmerge_io::import(&source.path, source.sheet.as_deref()).map_err(io_err)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    matches!((a.canonicalize(), b.canonicalize()), (Ok(x), Ok(y)) if x == y)
}

/// Map a merge error, pointing missing-column errors at `sheetmerge columns`.
fn merge_err_for(e: MergeError, job: &Job) -> CliError {
    let hint = match &e {
        MergeError::MissingColumn { side, .. } => {
            let path = match side {
                Side::Primary => &job.primary.path,
                Side::Reference => &job.reference.path,
            };
            Some(format!(
                "run `sheetmerge columns {}` to list the available columns",
                path.display()
            ))
        }
        _ => None,
    };
    CliError { hint, ..merge_err(e) }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    name: &'a str,
    output: String,
    #[serde(flatten)]
    summary: &'a MergeSummary,
}

/// Run a job end to end. The output file is written only when the merge
/// itself succeeded.
pub fn execute(job: &Job, flags: &RunFlags, quiet: bool) -> Result<(), CliError> {
    // Fail on configuration before touching any file
    validate_pairs(&job.pairs).map_err(merge_err)?;

    for input in [&job.primary.path, &job.reference.path] {
        if same_file(&job.output, input) {
            return Err(job_err(
                EXIT_USAGE,
                format!("output {} would overwrite an input file", job.output.display()),
            )
            .with_hint("pass a different --output path"));
        }
    }
    // Reject an unwritable format up front rather than after the merge
    sheetmerge_io::FileFormat::from_path(&job.output).map_err(io_err)?;

    log::info!("Job: {}", job.name);
    let primary = load(&job.primary)?;
    let reference = load(&job.reference)?;

    let mut reporter = ConsoleReporter::new(quiet);
    let result = sheetmerge_merge::run(&primary, &reference, &job.pairs, &mut reporter);
    reporter.finish();
    let out = result.map_err(|e| merge_err_for(e, job))?;

    sheetmerge_io::export(&out.table, &job.output).map_err(io_err)?;
    log::info!("File saved: {}", job.output.display());

    let s = &out.summary;
    if flags.json {
        let report = JsonReport { name: &job.name, output: job.output.display().to_string(), summary: s };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| job_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!(
        "{} rows: {} matched, {} unmatched ({:.1}%), {} column(s) added -> {}",
        s.primary_rows,
        s.matched,
        s.unmatched,
        s.match_rate,
        s.additional_columns.len(),
        job.output.display(),
    );

    if flags.require_match && s.matched == 0 && s.primary_rows > 0 {
        return Err(job_err(EXIT_NO_MATCHES, "no rows matched (--require-match)")
            .with_hint("check the --pair column mappings"));
    }

    Ok(())
}

/// Load both tables and check every pair against them without merging.
pub fn validate(job: &Job) -> Result<(), CliError> {
    validate_pairs(&job.pairs).map_err(merge_err)?;

    let primary = load(&job.primary)?;
    let reference = load(&job.reference)?;

    Matcher::new(&primary, &reference, &job.pairs)
        .map_err(|e| merge_err_for(e, job))?;
    let plan = plan_columns(&primary, &reference, &job.pairs);

    eprintln!("config OK: {}", job.name);
    eprintln!(
        "  primary:   {} ({} rows, {} columns)",
        job.primary.path.display(),
        primary.row_count(),
        primary.col_count()
    );
    eprintln!(
        "  reference: {} ({} rows, {} columns)",
        job.reference.path.display(),
        reference.row_count(),
        reference.col_count()
    );
    for (i, pair) in job.pairs.iter().enumerate() {
        eprintln!("  pair #{}: {pair}", i + 1);
    }
    eprintln!("  columns to add: {}", plan.additional.join(", "));
    if !plan.dropped.is_empty() {
        eprintln!("  skipped (name already in primary): {}", plan.dropped.join(", "));
    }
    eprintln!("  output: {}", job.output.display());

    Ok(())
}
