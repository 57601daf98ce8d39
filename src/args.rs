use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::UrlStyle;
use crate::objects::urls::DEFAULT_PRESIGN_EXPIRY_SECS;
use crate::pipeline::{DEFAULT_FILTER_COLUMN, DEFAULT_THRESHOLD};

/// Longest expiry S3 SigV4 presigning accepts (7 days).
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 604_800;

pub fn args_checks() -> Args {
    Args::parse()
}

#[derive(Parser, Debug, Clone, PartialEq, serde::Serialize)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Env file holding ACCESS_KEY, SECRET_KEY, ENDPOINT_URL, REGION, BUCKET_NAME,
    /// INPUT_FILE_KEY and OUTPUT_FILE_KEY. Defaults to ./.env when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Print extra stuff (use -v -v or --verbose --verbose for even more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, serde::Serialize)]
pub enum Command {
    /// Download a CSV object, keep rows below a threshold, upload the result
    Transform(TransformArgs),
    /// List every bucket visible to the credentials
    ListBuckets,
    /// List root-level folders (common prefixes) in a bucket
    ListFolders {
        /// Defaults to BUCKET_NAME
        bucket: Option<String>,
    },
    /// List every object key in a bucket
    ListFiles {
        /// Defaults to BUCKET_NAME
        bucket: Option<String>,
    },
    /// Download bucket/key to a local file
    Download {
        /// Source as bucket/path/to/key
        source: String,
        /// Local path; defaults to the key's file name in the current directory
        #[arg(default_value = "")]
        destination: String,
    },
    /// Upload a local file to bucket/key
    Upload {
        /// Destination as bucket/path/to/key
        destination: String,
        /// Local file to upload
        local: PathBuf,
    },
    /// Delete one object
    Delete { bucket: String, key: String },
    /// Delete every object in a bucket
    Clear {
        /// Defaults to BUCKET_NAME
        bucket: Option<String>,
        /// Confirm the bulk delete
        #[arg(long)]
        yes: bool,
    },
    /// Print the public URL of an object (OCI endpoints only)
    PublicUrl {
        bucket: String,
        key: String,
        #[arg(long, value_enum, default_value_t = UrlStyle::Oci2024)]
        style: UrlStyle,
    },
    /// Print a time-limited presigned GET URL
    Presign {
        bucket: String,
        key: String,
        /// Lifetime in seconds
        #[arg(long, default_value_t = DEFAULT_PRESIGN_EXPIRY_SECS)]
        expires_in: u64,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq, serde::Serialize)]
pub struct TransformArgs {
    /// Defaults to BUCKET_NAME
    #[arg(long)]
    pub bucket: Option<String>,
    /// Source key, defaults to INPUT_FILE_KEY
    #[arg(long)]
    pub input: Option<String>,
    /// Destination key, defaults to OUTPUT_FILE_KEY
    #[arg(long)]
    pub output: Option<String>,
    /// Numeric column the filter reads
    #[arg(long, default_value = DEFAULT_FILTER_COLUMN)]
    pub column: String,
    /// Keep rows whose column is strictly below this value
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    pub below: f64,
    /// Print the bucket list before processing
    #[arg(long)]
    pub list_buckets_first: bool,
}

impl Default for TransformArgs {
    fn default() -> Self {
        Self {
            bucket: None,
            input: None,
            output: None,
            column: DEFAULT_FILTER_COLUMN.to_string(),
            below: DEFAULT_THRESHOLD,
            list_buckets_first: false,
        }
    }
}

impl Args {
    /// Checks clap cannot express on its own.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid argument.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Transform(t) => {
                if !t.below.is_finite() {
                    return Err(format!("--below must be a finite number, got {}", t.below));
                }
                if t.column.trim().is_empty() {
                    return Err("--column must not be empty".to_string());
                }
            }
            Command::Presign { expires_in, .. } => {
                if *expires_in == 0 || *expires_in > MAX_PRESIGN_EXPIRY_SECS {
                    return Err(format!(
                        "--expires-in must be between 1 and {MAX_PRESIGN_EXPIRY_SECS} seconds"
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
