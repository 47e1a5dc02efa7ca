//! # Request Signer
//!
//! The Marvel API authenticates server-side requests with an MD5 digest of
//! `ts + private_key + public_key`. The digest depends on the timestamp, so it is
//! recomputed for every page.

use crate::credentials::Credentials;
use serde::Serialize;

/// Computes the request fingerprint for a timestamp and key pair.
///
/// The result is always a 32 character lowercase hex string.
pub fn fingerprint(ts: i64, private_key: &str, public_key: &str) -> String {
    let to_hash = format!("{ts}{private_key}{public_key}");
    format!("{:x}", md5::compute(to_hash.as_bytes()))
}

/// The query string of a single signed page request.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery<'a> {
    pub ts: i64,
    pub apikey: &'a str,
    pub hash: String,
    pub limit: usize,
    pub offset: usize,
}

impl<'a> SignedQuery<'a> {
    /// Builds the parameters for the page starting at `offset`.
    pub fn new(credentials: &'a Credentials, ts: i64, limit: usize, offset: usize) -> Self {
        Self {
            ts,
            apikey: credentials.public_key(),
            hash: fingerprint(ts, credentials.private_key(), credentials.public_key()),
            limit,
            offset,
        }
    }
}
