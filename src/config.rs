use crate::byte_range::ByteRange;
use crate::clapargs::Args;
use crate::error::{FetchError, Result};

/// Validated settings for a single run. Built once, before any network
/// activity, and never mutated afterwards.
#[derive(Debug)]
pub struct RunConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub object: String,
    pub region: String,
    /// `None` reads the complete object.
    pub range: Option<ByteRange>,
    pub secure: bool,
    pub skip_tls_verify: bool,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let missing: Vec<&str> = [
            ("access-key", &args.access_key),
            ("secret-key", &args.secret_key),
            ("bucket", &args.s3_bucket),
            ("object", &args.s3_object),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(FetchError::ConfigValidation(format!(
                "access key, secret key, bucket, and object path are required (missing: {})",
                missing.join(", ")
            )));
        }

        let start = parse_offset("start", &args.start)?;
        let end = parse_offset("end", &args.end)?;
        // offsets are validated even when the whole object is read
        let range = ByteRange::new(start, end)?;

        Ok(Self {
            endpoint: args.endpoint.clone(),
            access_key: args.access_key.clone(),
            secret_key: args.secret_key.clone(),
            bucket: args.s3_bucket.clone(),
            object: args.s3_object.clone(),
            region: args.region.clone(),
            range: if args.read_full { None } else { Some(range) },
            secure: args.secure,
            skip_tls_verify: args.skip_tls_verify,
        })
    }
}

fn parse_offset(name: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|e| FetchError::ConfigValidation(format!("invalid {} range '{}': {}", name, value, e)))
}
