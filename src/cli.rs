use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drivesplit")]
#[command(about = "Split a PDF stored on Google Drive into parts at given start pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a PDF from Drive, split it and upload the parts
    Split(SplitArgs),

    /// Split a local PDF into a directory
    Local {
        /// PDF file to split
        path: PathBuf,

        /// Pages that start a new part (e.g., "5,10,15" or "[5,10,15]")
        #[arg(short, long, default_value = "")]
        start_pages: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// File name prefix (defaults to the input file stem)
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Show the page ranges a split would produce
    Plan {
        /// Pages that start a new part
        #[arg(short, long, default_value = "")]
        start_pages: String,

        /// Total number of pages in the document
        #[arg(short, long, required_unless_present = "path", conflicts_with = "path")]
        total: Option<u32>,

        /// Read the page count from this PDF instead
        #[arg(long)]
        path: Option<PathBuf>,

        /// Print the ranges as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Everything `split` needs; each flag can also come from the environment.
///
/// Required values are optional here so that the config layer can report
/// every missing one at once.
#[derive(Args, Default)]
pub struct SplitArgs {
    /// Drive ID of the source PDF
    #[arg(long, env = "FILE_ID")]
    pub file_id: Option<String>,

    /// Drive ID of the folder the parts are uploaded to
    #[arg(long, env = "OUTPUT_FOLDER_ID")]
    pub output_folder_id: Option<String>,

    /// Pages that start a new part (e.g., "5,10,15" or "[5,10,15]")
    #[arg(long, env = "START_PAGES")]
    pub start_pages: Option<String>,

    /// Name prefix for the parts (defaults to the source file name)
    #[arg(long, env = "NAME_PREFIX")]
    pub prefix: Option<String>,

    /// OAuth access token
    #[arg(long, env = "GDRIVE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Credential JSON ("authorized_user" or "service_account" type)
    #[arg(long, env = "GDRIVE_CREDENTIALS_JSON", hide_env_values = true)]
    pub credentials_json: Option<String>,

    /// Service account key JSON
    #[arg(long, env = "GDRIVE_SA_KEY", hide_env_values = true)]
    pub service_account_key: Option<String>,

    /// Path to a credential JSON file
    #[arg(long, env = "GDRIVE_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Use the service account of the machine's metadata server
    #[arg(long)]
    pub metadata_server: bool,

    /// Plan and log the uploads without performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the uploaded parts as JSON
    #[arg(long)]
    pub json: bool,
}
