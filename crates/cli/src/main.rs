// sheetmerge CLI - match rows across two tables and merge reference columns

mod exit_codes;
mod job;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use exit_codes::EXIT_SUCCESS;
use job::{Job, RunFlags, Source};

#[derive(Parser)]
#[command(name = "sheetmerge")]
#[command(about = "Match rows of a primary table against a reference table and merge its columns in")]
#[command(version)]
struct Cli {
    /// Only warnings and errors on stderr; no progress line
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a merge described by a TOML config file
    #[command(after_help = "\
Config format:
  name = \"customers\"            # optional
  [primary]
  file = \"orders.xlsx\"          # relative to the config file
  sheet = \"2024\"                # optional, first sheet by default
  [reference]
  file = \"customers.csv\"
  [[pairs]]
  primary = \"Customer ID\"
  reference = \"id\"
  [output]
  file = \"orders_merged.xlsx\"   # optional, merged_output.xlsx by default

Examples:
  sheetmerge run orders.merge.toml
  sheetmerge run orders.merge.toml --json
  sheetmerge run orders.merge.toml --output /tmp/out.csv --require-match")]
    Run {
        /// Path to the .merge.toml config file
        config: PathBuf,

        /// Override the output file from the config
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        flags: RunFlags,
    },

    /// Run a merge described entirely on the command line
    #[command(after_help = "\
Each --pair is PRIMARY_COLUMN=REFERENCE_COLUMN. Rows match when every pair's
normalized values agree; the first matching reference row wins.

Examples:
  sheetmerge merge --primary orders.csv --reference customers.xlsx --pair customer_id=id
  sheetmerge merge --primary a.xlsx --primary-sheet Q1 --reference b.csv \\
      --pair name=full_name --pair dob=birth_date --output merged.xlsx")]
    Merge {
        /// Table to keep every row of
        #[arg(long)]
        primary: PathBuf,

        /// Worksheet of the primary file (spreadsheets only)
        #[arg(long)]
        primary_sheet: Option<String>,

        /// Table to take additional columns from
        #[arg(long)]
        reference: PathBuf,

        /// Worksheet of the reference file (spreadsheets only)
        #[arg(long)]
        reference_sheet: Option<String>,

        /// Match pair PRIMARY_COLUMN=REFERENCE_COLUMN (repeatable)
        #[arg(long = "pair", required = true, value_name = "PRIMARY=REFERENCE")]
        pairs: Vec<String>,

        /// Output file (.xlsx, .csv or .tsv)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        flags: RunFlags,
    },

    /// Check a config against its input files without merging
    #[command(after_help = "\
Examples:
  sheetmerge validate orders.merge.toml")]
    Validate {
        /// Path to the .merge.toml config file
        config: PathBuf,
    },

    /// List the column names of a table
    #[command(after_help = "\
Examples:
  sheetmerge columns customers.csv
  sheetmerge columns orders.xlsx --sheet Q1")]
    Columns {
        file: PathBuf,

        /// Worksheet (spreadsheets only)
        #[arg(long)]
        sheet: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = cli.quiet;
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let result = match cli.command {
        Commands::Run { config, output, flags } => Job::from_config(&config).and_then(|mut job| {
            if let Some(output) = output {
                job.output = output;
            }
            job::execute(&job, &flags, quiet)
        }),
        Commands::Merge {
            primary,
            primary_sheet,
            reference,
            reference_sheet,
            pairs,
            output,
            flags,
        } => Job::from_args(
            Source { path: primary, sheet: primary_sheet },
            Source { path: reference, sheet: reference_sheet },
            &pairs,
            output,
        )
        .and_then(|job| job::execute(&job, &flags, quiet)),
        Commands::Validate { config } => Job::from_config(&config).and_then(|job| job::validate(&job)),
        Commands::Columns { file, sheet } => cmd_columns(file, sheet),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Column names on stdout, one per line. Row count and sheets on stderr.
fn cmd_columns(file: PathBuf, sheet: Option<String>) -> Result<(), CliError> {
    let table = sheetmerge_io::import(&file, sheet.as_deref())
        .map_err(job::io_err)?;

    for name in table.column_names() {
        println!("{name}");
    }

    eprintln!("{}: {} rows, {} columns", file.display(), table.row_count(), table.col_count());
    if sheetmerge_io::FileFormat::from_path(&file).ok() == Some(sheetmerge_io::FileFormat::Spreadsheet) {
        if let Ok(names) = sheetmerge_io::xlsx::sheet_names(&file) {
            eprintln!("sheets: {}", names.join(", "));
        }
    }
    Ok(())
}
