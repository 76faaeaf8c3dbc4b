use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "heist-ledger")]
#[command(about = "Classify OCR'd loot text and keep a de-duplicated loot log")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to config.json next to the executable)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one block of OCR text and log the results
    Scan(ScanArgs),

    /// Print loot log rows
    List(ListArgs),

    /// Set one column of a logged row
    Edit(EditArgs),

    /// Remove a logged row
    Delete(DeleteArgs),

    /// Summarize the loot log
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// OCR text file, or "-" for stdin
    pub file: Option<PathBuf>,

    /// Record matches even if seen within the dedup window
    #[arg(long)]
    pub allow_duplicates: bool,

    /// Enable fuzzy term matching for this scan
    #[arg(long)]
    pub fuzzy: bool,

    /// Print rows without writing them to the log
    #[arg(long)]
    pub dry_run: bool,
}

impl ScanArgs {
    /// True when the text should come from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.file.as_ref().is_none_or(|f| f.as_os_str() == "-")
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show the last N rows
    #[arg(long)]
    pub last: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Record number
    pub record: u64,

    /// Column header name, e.g. Stack-Size
    pub column: String,

    /// New value
    pub value: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record number
    pub record: u64,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Also write the summary as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}
