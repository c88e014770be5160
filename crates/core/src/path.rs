//! S3 path parsing and joining
//!
//! An `S3Path` is a `(bucket, key)` pair. It renders to and parses from
//! URIs of the form `s3://<bucket>[/<key>]`.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ParseError;

/// URI scheme for S3 locations
pub const SCHEME: &str = "s3";

/// Separator between bucket and key segments
pub const SEPARATOR: char = '/';

/// Bytes escaped when a key is written into a URI path. `%` is included so
/// that decoding gives back the exact key.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A bucket and key identifying a location in an object store
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct S3Path {
    /// Bucket name
    pub bucket: String,
    /// Object key (empty for bucket root)
    pub key: String,
}

impl S3Path {
    /// Create a new S3Path
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Bucket and key joined by a single separator, with leading,
    /// trailing and repeated separators removed.
    pub fn join(&self) -> String {
        join_segments(&[&self.bucket, &self.key])
    }

    /// The `s3://bucket/key` form of this path, with the key percent-escaped
    pub fn to_uri(&self) -> String {
        format!("{SCHEME}://{}", utf8_percent_encode(&self.join(), PATH_ESCAPE))
    }

    /// Parse an `s3://<bucket>[/<key>]` URI.
    ///
    /// Fails when the input is not a URL, the scheme is not `s3`, the host
    /// is empty, or the decoded key is not UTF-8. A missing path and a bare
    /// `/` both give an empty key.
    pub fn from_uri(uri: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError(uri.to_string());

        let url = Url::parse(uri).map_err(|_| invalid())?;
        if url.scheme() != SCHEME {
            return Err(invalid());
        }

        let bucket = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(invalid()),
        };

        let path = url.path();
        let key = if path.len() <= 1 {
            String::new()
        } else {
            percent_decode_str(&path[1..])
                .decode_utf8()
                .map_err(|_| invalid())?
                .into_owned()
        };

        Ok(Self { bucket, key })
    }

    /// A new path in the same bucket with `suffix` joined onto the key
    pub fn append(&self, suffix: &str) -> Self {
        Self {
            bucket: self.bucket.clone(),
            key: join_segments(&[&self.key, suffix]),
        }
    }

    /// Listing prefix for the "directory" this path names: `key/`,
    /// or the empty prefix at the bucket root
    pub fn dir_prefix(&self) -> String {
        let key = self.key.trim_end_matches(SEPARATOR);
        if key.is_empty() {
            String::new()
        } else {
            format!("{key}{SEPARATOR}")
        }
    }
}

impl fmt::Display for S3Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for S3Path {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

fn join_segments(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split(SEPARATOR))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
