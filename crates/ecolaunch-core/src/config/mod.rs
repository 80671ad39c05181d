//! Configuration parsing and management.
//!
//! This module handles parsing of ecosystem files (TOML/JSON) that declare
//! the applications a process manager launches. Each `[[apps]]` entry is an
//! [`AppLaunchSpec`]: an immutable record read once at launch time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::process::{ProcessError, split_args};

/// Keys understood on an app entry. Anything else is reported and ignored.
const KNOWN_APP_KEYS: &[&str] = &[
    "name",
    "script",
    "args",
    "interpreter",
    "interpreter_args",
    "cwd",
    "env",
    "env_profiles",
];

/// On-disk format of an ecosystem file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `ecosystem.toml`
    Toml,
    /// `ecosystem.json`
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] when the extension is not
    /// `toml` or `json`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?
            .parse()
            .map_err(|_| ConfigError::UnsupportedFormat(path.display().to_string()))
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("toml") {
            Ok(Self::Toml)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(ConfigError::UnsupportedFormat(s.to_string()))
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => f.write_str("toml"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Top-level ecosystem configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemConfig {
    /// Application definitions.
    #[serde(default)]
    pub apps: Vec<AppLaunchSpec>,
}

impl EcosystemConfig {
    /// Load configuration from a TOML or JSON file.
    ///
    /// Relative `cwd` values are anchored to the absolute directory holding
    /// the file, so the result does not depend on where it is launched from.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;

        let parent = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let base = std::path::absolute(parent).map_err(ConfigError::Io)?;
        Ok(config.anchored_to(&base))
    }

    /// Load configuration from a file exactly as written.
    ///
    /// Unlike [`EcosystemConfig::from_file`], relative `cwd` values are left
    /// untouched. Use this when the result is written back out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or cannot be parsed.
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = Self::parse(&content, format)?;
        debug!(path = %path.display(), %format, apps = config.apps.len(), "loaded ecosystem file");
        Ok(config)
    }

    /// Parse configuration in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid for the format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => Self::from_toml(content),
            ConfigFormat::Json => Self::from_json(content),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or does not match the schema.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        // Unknown app keys are common in files shared with other process
        // managers (`instances`, `watch`, ...). Report them, then let serde
        // skip them.
        if let Ok(raw) = content.parse::<toml::Table>() {
            if let Some(apps) = raw.get("apps").and_then(toml::Value::as_array) {
                for (index, app) in apps.iter().enumerate() {
                    if let Some(table) = app.as_table() {
                        report_unknown_keys(index, table.keys().map(String::as_str));
                    }
                }
            }
        }
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or does not match the schema.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: serde_json::Value = serde_json::from_str(content).map_err(ConfigError::Json)?;
        if let Some(apps) = raw.get("apps").and_then(serde_json::Value::as_array) {
            for (index, app) in apps.iter().enumerate() {
                if let Some(object) = app.as_object() {
                    report_unknown_keys(index, object.keys().map(String::as_str));
                }
            }
        }
        serde_json::from_value(raw).map_err(ConfigError::Json)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Serialize configuration to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }

    /// Serialize configuration in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => self.to_toml(),
            ConfigFormat::Json => self.to_json(),
        }
    }

    /// Look up an application by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownApp`] if no app has that name.
    pub fn app(&self, name: &str) -> Result<&AppLaunchSpec, ConfigError> {
        self.apps
            .iter()
            .find(|app| app.name == name)
            .ok_or_else(|| ConfigError::UnknownApp(name.to_string()))
    }

    /// Check every app and the file as a whole.
    ///
    /// All problems are collected before returning so an operator sees the
    /// full list at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        let mut seen = BTreeSet::new();

        for (index, app) in self.apps.iter().enumerate() {
            if !app.name.trim().is_empty() && !seen.insert(app.name.as_str()) {
                problems.push(format!("app '{}': duplicate name", app.name));
            }
            problems.extend(
                app.problems()
                    .into_iter()
                    .map(|problem| format!("{}: {problem}", app.label(index))),
            );
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems.join("; ")))
        }
    }

    /// Resolve relative working directories against `base`.
    #[must_use]
    pub fn anchored_to(mut self, base: &Path) -> Self {
        for app in &mut self.apps {
            if let Some(cwd) = app.cwd.as_mut() {
                if cwd.is_relative() && !base.as_os_str().is_empty() {
                    *cwd = base.join(&*cwd);
                }
            }
        }
        self
    }
}

fn report_unknown_keys<'a>(index: usize, keys: impl Iterator<Item = &'a str>) {
    for key in keys.filter(|key| !KNOWN_APP_KEYS.contains(key)) {
        warn!(app_index = index, key, "ignoring unsupported app key");
    }
}

/// Arguments passed to the script.
///
/// Ecosystem files accept either a single command-line string or an explicit
/// list. The shape read is the shape written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Args {
    /// One string, split shell-style at launch.
    Line(String),
    /// Pre-split argument vector.
    List(Vec<String>),
}

impl Default for Args {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Args {
    /// Whether this is the empty default list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::List(list) if list.is_empty())
    }

    /// Expand into an argument vector.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::InvalidArgs`] if a `Line` has unbalanced
    /// quoting.
    pub fn to_argv(&self) -> Result<Vec<String>, ProcessError> {
        match self {
            Self::Line(line) => split_args(line),
            Self::List(list) => Ok(list.clone()),
        }
    }
}

/// How to launch one application.
///
/// Created at deployment time and never mutated afterwards: fields are only
/// reachable through accessors, and a redeploy replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLaunchSpec {
    name: String,

    script: String,

    #[serde(default, skip_serializing_if = "Args::is_empty")]
    args: Args,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    interpreter: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    interpreter_args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cwd: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    env_profiles: BTreeMap<String, BTreeMap<String, String>>,
}

impl AppLaunchSpec {
    /// Start building a spec for `script` under the identifier `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>, script: impl Into<String>) -> AppLaunchSpecBuilder {
        AppLaunchSpecBuilder::new(name, script)
    }

    /// Application identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executable path or command name.
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Arguments as written in the ecosystem file.
    #[must_use]
    pub const fn args(&self) -> &Args {
        &self.args
    }

    /// Runtime binary used to execute the script, if any.
    #[must_use]
    pub fn interpreter(&self) -> Option<&Path> {
        self.interpreter.as_deref()
    }

    /// Arguments for the interpreter, placed before the script.
    #[must_use]
    pub fn interpreter_args(&self) -> &[String] {
        &self.interpreter_args
    }

    /// Working directory.
    #[must_use]
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Environment overrides applied on every launch.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Named environment overlays.
    #[must_use]
    pub const fn env_profiles(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.env_profiles
    }

    /// The overlay for one profile.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.env_profiles.get(name)
    }

    fn label(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            format!("app #{index}")
        } else {
            format!("app '{}'", self.name)
        }
    }

    /// Problems with this record in isolation.
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.name.trim().is_empty() {
            problems.push("name must not be empty".to_string());
        }
        if self.script.trim().is_empty() {
            problems.push("script must not be empty".to_string());
        }
        if self
            .interpreter
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            problems.push("interpreter must not be empty when set".to_string());
        }
        if let Err(err) = self.args.to_argv() {
            problems.push(err.to_string());
        }

        for (key, value) in &self.env {
            problems.extend(env_entry_problem(key, value).map(|p| format!("env {p}")));
        }
        for (profile, overrides) in &self.env_profiles {
            if profile.trim().is_empty() {
                problems.push("env profile name must not be empty".to_string());
            }
            for (key, value) in overrides {
                problems.extend(
                    env_entry_problem(key, value).map(|p| format!("env profile '{profile}' {p}")),
                );
            }
        }

        problems
    }
}

/// Keys and values the OS will refuse or silently mangle.
fn env_entry_problem(key: &str, value: &str) -> Option<String> {
    if key.is_empty() {
        Some("key must not be empty".to_string())
    } else if key.contains('=') {
        Some(format!("key '{key}' must not contain '='"))
    } else if key.contains('\0') || value.contains('\0') {
        Some(format!("entry '{key}' must not contain NUL"))
    } else {
        None
    }
}

/// Builder for [`AppLaunchSpec`].
#[derive(Debug, Clone)]
pub struct AppLaunchSpecBuilder {
    spec: AppLaunchSpec,
}

impl AppLaunchSpecBuilder {
    fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            spec: AppLaunchSpec {
                name: name.into(),
                script: script.into(),
                args: Args::default(),
                interpreter: None,
                interpreter_args: Vec::new(),
                cwd: None,
                env: BTreeMap::new(),
                env_profiles: BTreeMap::new(),
            },
        }
    }

    /// Sets the arguments as a single command-line string.
    #[must_use]
    pub fn args_line(mut self, line: impl Into<String>) -> Self {
        self.spec.args = Args::Line(line.into());
        self
    }

    /// Sets the arguments as a list.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.args = Args::List(args.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the interpreter.
    #[must_use]
    pub fn interpreter(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.interpreter = Some(path.into());
        self
    }

    /// Appends an interpreter argument.
    #[must_use]
    pub fn interpreter_arg(mut self, arg: impl Into<String>) -> Self {
        self.spec.interpreter_args.push(arg.into());
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.cwd = Some(path.into());
        self
    }

    /// Adds an environment override.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.env.insert(key.into(), value.into());
        self
    }

    /// Adds an override to a named environment profile.
    #[must_use]
    pub fn profile_env(
        mut self,
        profile: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.spec
            .env_profiles
            .entry(profile.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> AppLaunchSpec {
        self.spec
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// JSON parsing or serialization error.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization error.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Unrecognized file extension or format name.
    #[error("unsupported configuration format: {0} (expected toml or json)")]
    UnsupportedFormat(String),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),

    /// No app with the requested name.
    #[error("no app named '{0}' in configuration")]
    UnknownApp(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const DJANGO_TOML: &str = r#"
        [[apps]]
        name = "django-app"
        script = "gunicorn"
        args = "coursesapp.wsgi:application --bind 0.0.0.0:8080"
        interpreter = "/home/truong/course-be/Courses-Online-Api/venv/bin/python3"
        cwd = "/home/truong/course-be/Courses-Online-Api"

        [apps.env]
        DJANGO_SETTINGS_MODULE = "coursesapp.settings"
        PYTHONUNBUFFERED = "1"
    "#;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [[apps]]
            name = "test"
            script = "echo"
        "#;

        let config = EcosystemConfig::from_toml(toml).unwrap();
        assert_eq!(config.apps.len(), 1);
        assert_eq!(config.apps[0].name(), "test");
        assert_eq!(config.apps[0].script(), "echo");
        assert!(config.apps[0].env().is_empty());
        assert!(config.apps[0].args().is_empty());
        assert_eq!(config.apps[0].cwd(), None);
        assert_eq!(config.apps[0].interpreter(), None);
    }

    #[test]
    fn test_parse_empty_file() {
        let config = EcosystemConfig::from_toml("").unwrap();
        assert!(config.apps.is_empty());
    }

    #[test]
    fn test_parse_django_config() {
        let config = EcosystemConfig::from_toml(DJANGO_TOML).unwrap();
        let app = config.app("django-app").unwrap();

        assert_eq!(app.script(), "gunicorn");
        assert_eq!(
            app.args(),
            &Args::Line("coursesapp.wsgi:application --bind 0.0.0.0:8080".to_string())
        );
        assert_eq!(
            app.interpreter(),
            Some(Path::new(
                "/home/truong/course-be/Courses-Online-Api/venv/bin/python3"
            ))
        );
        assert_eq!(
            app.cwd(),
            Some(Path::new("/home/truong/course-be/Courses-Online-Api"))
        );
        assert_eq!(app.env().len(), 2);
        assert_eq!(app.env()["DJANGO_SETTINGS_MODULE"], "coursesapp.settings");
        assert_eq!(app.env()["PYTHONUNBUFFERED"], "1");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EcosystemConfig::from_toml(DJANGO_TOML).unwrap();
        let rendered = config.to_toml().unwrap();
        let reparsed = EcosystemConfig::from_toml(&rendered).unwrap();
        assert_eq!(config, reparsed);
    }

    #[test]
    fn test_args_shape_is_preserved() {
        let toml = r#"
            [[apps]]
            name = "listed"
            script = "worker"
            args = ["--queue", "high priority"]

            [[apps]]
            name = "lined"
            script = "worker"
            args = "--queue 'high priority'"
        "#;

        let config = EcosystemConfig::from_toml(toml).unwrap();
        let reparsed = EcosystemConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert!(matches!(reparsed.apps[0].args(), Args::List(_)));
        assert!(matches!(reparsed.apps[1].args(), Args::Line(_)));
        assert_eq!(
            reparsed.apps[0].args().to_argv().unwrap(),
            reparsed.apps[1].args().to_argv().unwrap()
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let toml = r#"
            [[apps]]
            name = "web"
            script = "server"
            instances = 4
            watch = true
        "#;

        let config = EcosystemConfig::from_toml(toml).unwrap();
        assert_eq!(config.apps[0].name(), "web");
    }

    #[test]
    fn test_missing_script_is_parse_error() {
        let toml = r#"
            [[apps]]
            name = "web"
        "#;

        let err = EcosystemConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_validate_accepts_django_config() {
        let config = EcosystemConfig::from_toml(DJANGO_TOML).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config = EcosystemConfig {
            apps: vec![
                AppLaunchSpec::builder("web", "server").build(),
                AppLaunchSpec::builder("web", "server")
                    .env("BAD=KEY", "x")
                    .build(),
                AppLaunchSpec::builder("", " ").args_line("'open").build(),
            ],
        };

        let msg = match config.validate().unwrap_err() {
            ConfigError::Validation(msg) => msg,
            other => panic!("expected ConfigError::Validation, got {other:?}"),
        };
        assert!(msg.contains("app 'web': duplicate name"), "{msg}");
        assert!(msg.contains("must not contain '='"), "{msg}");
        assert!(msg.contains("app #2: name must not be empty"), "{msg}");
        assert!(msg.contains("app #2: script must not be empty"), "{msg}");
        assert!(msg.contains("unterminated"), "{msg}");
    }

    #[test]
    fn test_validate_checks_profile_entries() {
        let config = EcosystemConfig {
            apps: vec![
                AppLaunchSpec::builder("web", "server")
                    .profile_env("production", "", "x")
                    .build(),
            ],
        };

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("env profile 'production' key must not be empty"), "{err}");
    }

    #[test]
    fn test_unknown_app() {
        let config = EcosystemConfig::from_toml(DJANGO_TOML).unwrap();
        let err = config.app("celery").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownApp(ref name) if name == "celery"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("ecosystem.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("deploy/ecosystem.JSON")).unwrap(),
            ConfigFormat::Json
        );
        assert!(matches!(
            ConfigFormat::from_path(Path::new("ecosystem.config.js")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(ConfigFormat::from_path(Path::new("ecosystem")).is_err());
    }

    #[test]
    fn test_anchored_to_joins_relative_cwd() {
        let config = EcosystemConfig {
            apps: vec![
                AppLaunchSpec::builder("rel", "server").cwd("app").build(),
                AppLaunchSpec::builder("abs", "server").cwd("/srv/app").build(),
                AppLaunchSpec::builder("none", "server").build(),
            ],
        }
        .anchored_to(Path::new("/etc/deploy"));

        assert_eq!(config.apps[0].cwd(), Some(Path::new("/etc/deploy/app")));
        assert_eq!(config.apps[1].cwd(), Some(Path::new("/srv/app")));
        assert_eq!(config.apps[2].cwd(), None);
    }

    #[test]
    fn test_from_file_picks_format_and_anchors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecosystem.json");
        std::fs::write(
            &path,
            r#"{"apps": [{"name": "api", "script": "./bin/api", "cwd": "srv"}]}"#,
        )
        .unwrap();

        let config = EcosystemConfig::from_file(&path).unwrap();
        assert_eq!(config.apps[0].name(), "api");
        assert_eq!(config.apps[0].cwd(), Some(dir.path().join("srv").as_path()));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = EcosystemConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_from_file_anchor_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecosystem.toml");
        std::fs::write(
            &path,
            r#"
            [[apps]]
            name = "api"
            script = "./bin/api"
            cwd = "srv"
            "#,
        )
        .unwrap();

        let path = relative_to_current_dir(&path);
        assert!(path.is_relative());

        let cwd = EcosystemConfig::from_file(&path).unwrap().apps[0]
            .cwd()
            .map(Path::to_path_buf)
            .unwrap();
        assert!(cwd.is_absolute(), "{}", cwd.display());
        assert_eq!(
            std::fs::canonicalize(cwd.parent().unwrap()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn test_read_file_keeps_relative_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecosystem.toml");
        std::fs::write(
            &path,
            r#"
            [[apps]]
            name = "api"
            script = "./bin/api"
            cwd = "srv"
            "#,
        )
        .unwrap();

        let config = EcosystemConfig::read_file(&path).unwrap();
        assert_eq!(config.apps[0].cwd(), Some(Path::new("srv")));
    }

    /// The same file addressed relative to the test's working directory.
    #[cfg(unix)]
    fn relative_to_current_dir(path: &Path) -> PathBuf {
        let current = std::env::current_dir().unwrap();
        let ups = current
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .count();
        let mut relative: PathBuf = std::iter::repeat_n("..", ups).collect();
        relative.push(path.strip_prefix("/").unwrap());
        relative
    }
}
