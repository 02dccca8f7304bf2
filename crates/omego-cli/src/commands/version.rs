//! Version command implementation

use anyhow::Result;

/// Print the omego version
pub fn execute() -> Result<()> {
    println!("{}", version_string());
    Ok(())
}

pub(crate) fn version_string() -> String {
    format!("omego {}", env!("CARGO_PKG_VERSION"))
}
