//! CLI command implementations

pub(crate) mod common;
pub(crate) mod db;
pub(crate) mod version;
