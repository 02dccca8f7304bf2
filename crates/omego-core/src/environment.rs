//! Host environment snapshot.
//!
//! Detection of the hostname and of a CI job happens once at the process
//! boundary. Everything downstream receives the resulting value instead of
//! reading process-global state.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;

/// Variables that are all set when running inside a Jenkins job.
const CI_JOB_VARS: [&str; 3] = ["JOB_NAME", "BUILD_NUMBER", "BUILD_URL"];

/// Hostname used when the real one cannot be determined.
pub const FALLBACK_HOSTNAME: &str = "localhost";

/// Facts about the host captured at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    /// Hostname, used as the default database host
    pub hostname: String,

    /// Running inside a CI job
    pub ci_job: bool,
}

impl EnvironmentSnapshot {
    /// Capture the snapshot from the running process.
    pub fn capture() -> Self {
        Self::from_parts(hostname_or_fallback(hostname::get()), std::env::vars())
    }

    /// Build a snapshot from explicit parts.
    pub fn from_parts<I, K, V>(hostname: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let present: Vec<String> = vars
            .into_iter()
            .map(|(k, _)| k.as_ref().to_string())
            .collect();
        let ci_job = CI_JOB_VARS
            .iter()
            .all(|name| present.iter().any(|p| p == name));

        Self {
            hostname: hostname.into(),
            ci_job,
        }
    }

    /// Extra environment for spawned processes.
    ///
    /// A CI job kills processes it spawned when it terminates unless their
    /// `BUILD_ID` is changed.
    pub fn child_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        if self.ci_job {
            env.insert("BUILD_ID".to_string(), "DONT_KILL_ME".to_string());
        }
        env
    }
}

/// Hostname from a system lookup, or [`FALLBACK_HOSTNAME`] if the lookup
/// failed or returned nothing usable
fn hostname_or_fallback(lookup: io::Result<OsString>) -> String {
    match lookup {
        Ok(name) => {
            let name = name.to_string_lossy().trim().to_string();
            if name.is_empty() {
                log::warn!("System hostname is empty, defaulting to {}", FALLBACK_HOSTNAME);
                FALLBACK_HOSTNAME.to_string()
            } else {
                name
            }
        }
        Err(e) => {
            log::warn!("Failed to read hostname ({}), defaulting to {}", e, FALLBACK_HOSTNAME);
            FALLBACK_HOSTNAME.to_string()
        }
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
