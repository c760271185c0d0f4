use clap::{ArgAction, Parser};

// command-line arguments are defined here

/// s3fetch - fetch the metadata and bytes of an object from an s3-compatible store
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Object store endpoint, with or without scheme
    #[arg(long, default_value = "https://localhost:9443")]
    pub endpoint: String,
    /// Access key
    #[arg(long, default_value = "")]
    pub access_key: String,
    /// Secret key
    #[arg(long, default_value = "")]
    pub secret_key: String,
    /// Bucket name
    #[arg(long = "bucket", default_value = "")]
    pub s3_bucket: String,
    /// Object path in the bucket
    #[arg(long = "object", default_value = "")]
    pub s3_object: String,
    /// Read the complete object, ignoring --start and --end
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub read_full: bool,
    /// Start byte offset
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub start: String,
    /// End byte offset (exclusive), negative reads through the end of the object
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    pub end: String,
    /// Use a secure (https) connection
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub secure: bool,
    /// Skip TLS certificate verification (insecure)
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub skip_tls_verify: bool,
    /// Signing region
    #[arg(long, default_value = "us-east-1")]
    pub region: String,
    /// Log at debug level
    #[arg(long)]
    pub verbose: bool,
}
