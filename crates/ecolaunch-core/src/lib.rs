//! ecolaunch-core - ecosystem file schema and launch resolution.
//!
//! An ecosystem file lists the apps a process manager starts. Each entry is
//! an [`config::AppLaunchSpec`]: name, script, arguments, optional
//! interpreter, working directory and environment overrides. This crate
//! parses those files, validates them, and turns an entry into a concrete
//! [`process::LaunchCommand`] that can be checked and spawned.
//!
//! Supervision (restart loops, health checks, log capture) is left to the
//! process manager that consumes the spec.
//!
//! # Example
//!
//! ```
//! use ecolaunch_core::config::EcosystemConfig;
//! use ecolaunch_core::process::LaunchCommand;
//!
//! let config = EcosystemConfig::from_toml(
//!     r#"
//!     [[apps]]
//!     name = "django-app"
//!     script = "gunicorn"
//!     args = "coursesapp.wsgi:application --bind 0.0.0.0:8080"
//!
//!     [apps.env]
//!     PYTHONUNBUFFERED = "1"
//!     "#,
//! )
//! .unwrap();
//!
//! let app = config.app("django-app").unwrap();
//! let command = LaunchCommand::resolve(app, None).unwrap();
//! assert_eq!(command.args, ["coursesapp.wsgi:application", "--bind", "0.0.0.0:8080"]);
//! ```

pub mod config;
pub mod log;
pub mod process;

pub use config::{AppLaunchSpec, Args, ConfigError, ConfigFormat, EcosystemConfig};
pub use process::{LaunchCommand, ProcessError};
