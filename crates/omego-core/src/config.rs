//! Configuration types and parsing for omego.yml

use crate::environment::EnvironmentSnapshot;
use crate::error::{CoreError, CoreResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Config file names searched in the working directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["omego.yml", "omego.yaml"];

/// Administration settings from omego.yml, command line flags and defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root directory of the unpacked OMERO server
    #[serde(default)]
    pub serverdir: Option<PathBuf>,

    /// Python interpreter used to run the OMERO CLI
    #[serde(default = "default_python")]
    pub python: String,

    /// Database connection and initialisation settings
    #[serde(default)]
    pub db: DbConfig,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    /// Database server hostname (default: this host's name)
    #[serde(default)]
    pub host: Option<String>,

    /// Database name. No default, so a database is never upgraded by accident
    #[serde(default)]
    pub name: Option<String>,

    /// Database user
    #[serde(default = "default_user")]
    pub user: String,

    /// Database password
    #[serde(default = "default_pass")]
    pub pass: String,

    /// SQL script used to create a new database. `%(dbname)s` style
    /// placeholders are expanded.
    #[serde(default = "default_omerosql")]
    pub omerosql: String,

    /// OMERO root user password written into a generated creation script
    #[serde(default = "default_rootpass")]
    pub rootpass: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serverdir: None,
            python: default_python(),
            db: DbConfig::default(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: None,
            name: None,
            user: default_user(),
            pass: default_pass(),
            omerosql: default_omerosql(),
            rootpass: default_rootpass(),
        }
    }
}

fn default_python() -> String {
    "python".to_string()
}

fn default_user() -> String {
    "omero".to_string()
}

fn default_pass() -> String {
    "omero".to_string()
}

fn default_omerosql() -> String {
    "omero.sql".to_string()
}

fn default_rootpass() -> String {
    "omero".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Load omego.yml or omego.yaml from a directory, or the defaults if
    /// neither exists
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
        {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Fill environment-dependent defaults, expand placeholders and validate.
    ///
    /// Call once, after command line overrides have been applied.
    pub fn finalize(mut self, env: &EnvironmentSnapshot) -> CoreResult<Self> {
        if self.db.host.as_deref().map_or(true, str::is_empty) {
            self.db.host = Some(env.hostname.clone());
        }

        let vars = self.placeholder_values();
        self.db.omerosql = interpolate(&self.db.omerosql, &vars)?;

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.db.name.as_deref().map_or(true, str::is_empty) {
            return Err(CoreError::ConfigInvalid {
                message: "Database name required (--dbname or db.name)".to_string(),
            });
        }

        if self.db.user.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Database user cannot be empty".to_string(),
            });
        }

        if self.python.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Python interpreter cannot be empty".to_string(),
            });
        }

        self.server_dir().map(|_| ())
    }

    /// The server directory, which must be set and exist
    pub fn server_dir(&self) -> CoreResult<&Path> {
        let dir = self
            .serverdir
            .as_deref()
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: "OMERO server directory required (--serverdir or serverdir)"
                    .to_string(),
            })?;
        if !dir.is_dir() {
            return Err(CoreError::ServerDirNotFound {
                path: dir.display().to_string(),
            });
        }
        Ok(dir)
    }

    fn placeholder_values(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert("dbhost", self.db.host.clone().unwrap_or_default());
        vars.insert("dbname", self.db.name.clone().unwrap_or_default());
        vars.insert("dbuser", self.db.user.clone());
        vars.insert(
            "serverdir",
            self.serverdir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        );
        vars
    }
}

impl DbConfig {
    /// Database host, `localhost` before [`Config::finalize`] filled it in
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("localhost")
    }

    /// Database name, empty before validation
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

static PLACEHOLDER_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Expand `%(key)s` placeholders. Unknown keys are an error.
pub fn interpolate(template: &str, vars: &HashMap<&'static str, String>) -> CoreResult<String> {
    let re = PLACEHOLDER_PATTERN
        .get_or_init(|| Regex::new(r"%\((\w+)\)s").expect("valid regex literal"));

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in re.captures_iter(template) {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = vars
            .get(key.as_str())
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!(
                    "Unknown placeholder '%({})s' in '{}'",
                    key.as_str(),
                    template
                ),
            })?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
