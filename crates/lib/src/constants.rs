//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the crates in the `marvel-etl` workspace, so that defaults and fallback literals
//! are spelled exactly once.

/// The public characters endpoint of the Marvel API.
pub const DEFAULT_API_URL: &str = "http://gateway.marvel.com/v1/public/characters";

/// The number of records requested per page. The API caps `limit` at 100.
pub const PAGE_SIZE: usize = 100;

/// The default cap on the number of records collected per run.
pub const DEFAULT_MAX_RECORDS: usize = 350;

/// Substituted for an `id` or `name` key missing from a raw record.
pub const MISSING_VALUE: &str = "N/A";

/// Substituted for a `description` that is missing, null, or empty.
pub const NO_DESCRIPTION: &str = "No_description";

/// The secret version resolved when none is configured.
pub const DEFAULT_SECRET_VERSION: &str = "latest";

/// Default secret holding the public API key.
pub const DEFAULT_PUBLIC_KEY_SECRET: &str = "marvel_public_key";

/// Default secret holding the private API key.
pub const DEFAULT_PRIVATE_KEY_SECRET: &str = "marvel_private_key";

/// Default destination dataset.
pub const DEFAULT_DATASET_ID: &str = "marvel";

/// Default destination table.
pub const DEFAULT_TABLE_ID: &str = "characters";

/// The column names of the output table, in order.
pub const COLUMNS: [&str; 3] = ["id", "name", "description"];
