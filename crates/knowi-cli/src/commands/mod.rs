pub mod evaluate;
pub mod init;
pub mod math;
pub mod practice;
pub mod questions;
pub mod validate;

use anyhow::Result;
use knowi_core::model::Difficulty;

/// Parse an optional `--difficulty` flag.
pub(crate) fn parse_difficulty(value: Option<&str>) -> Result<Option<Difficulty>> {
    value
        .map(|d| d.parse::<Difficulty>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}
