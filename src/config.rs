//! Deployment configuration.
//!
//! Resolution order per field: optional TOML file as the base, then
//! `EDGE_*` environment variables, then the CI-runner `INPUT_*` form.
//! Validation runs before any filesystem or network access.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::utils::errors::{DeployError, Result};

/// Validated configuration for one deployment run.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Absolute URL of the deployment endpoint.
    pub server: String,

    /// Numeric string identifying the target site.
    pub app_id: String,

    /// Bearer credential. Never logged in full.
    pub token: String,

    /// Build-output directory to package.
    pub directory: PathBuf,
}

/// File-sourced values before env overrides and validation.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    server: Option<String>,
    app_id: Option<String>,
    token: Option<String>,
    directory: Option<String>,
}

impl DeployConfig {
    /// Load from the environment only.
    pub fn from_env() -> Result<Self> {
        Self::resolve(RawConfig::default())
    }

    /// Load a TOML file as the base, with environment overrides on top.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&content).map_err(|e| DeployError::Config {
            field: "config",
            message: e.to_string(),
        })?;
        Self::resolve(raw)
    }

    fn resolve(raw: RawConfig) -> Result<Self> {
        let config = Self {
            server: required("server", lookup("SERVER").or(raw.server))?,
            app_id: required("app_id", lookup("APP_ID").or(raw.app_id))?,
            token: required("token", lookup("TOKEN").or(raw.token))?,
            directory: PathBuf::from(required(
                "directory",
                lookup("DIRECTORY").or(raw.directory),
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.server).map_err(|e| DeployError::Config {
            field: "server",
            message: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(DeployError::Config {
                field: "server",
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        // A plain-digit pattern keeps scientific-notation lookalikes out.
        if self.app_id.is_empty() || !self.app_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DeployError::Config {
                field: "app_id",
                message: format!("'{}' is not a plain numeric id", self.app_id),
            });
        }

        debug!(token_length = self.token.len(), "credential loaded");
        Ok(())
    }
}

/// Look up `EDGE_<NAME>`, falling back to the CI input form `INPUT_<NAME>`.
/// Empty values count as unset.
fn lookup(name: &str) -> Option<String> {
    std::env::var(format!("EDGE_{name}"))
        .or_else(|_| std::env::var(format!("INPUT_{name}")))
        .ok()
        .filter(|v| !v.is_empty())
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    value.filter(|v| !v.is_empty()).ok_or(DeployError::Config {
        field,
        message: "required value is missing".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "EDGE_SERVER",
        "EDGE_APP_ID",
        "EDGE_TOKEN",
        "EDGE_DIRECTORY",
        "INPUT_SERVER",
        "INPUT_APP_ID",
        "INPUT_TOKEN",
        "INPUT_DIRECTORY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn set_edge_vars() {
        std::env::set_var("EDGE_SERVER", "https://x.test");
        std::env::set_var("EDGE_APP_ID", "42");
        std::env::set_var("EDGE_TOKEN", "abc");
        std::env::set_var("EDGE_DIRECTORY", "dist");
    }

    #[test]
    #[serial]
    fn loads_from_edge_env_vars() {
        clear_env();
        set_edge_vars();

        let config = DeployConfig::from_env().unwrap();
        assert_eq!(config.server, "https://x.test");
        assert_eq!(config.app_id, "42");
        assert_eq!(config.token, "abc");
        assert_eq!(config.directory, PathBuf::from("dist"));
    }

    #[test]
    #[serial]
    fn falls_back_to_ci_input_vars() {
        clear_env();
        std::env::set_var("INPUT_SERVER", "https://ci.test");
        std::env::set_var("INPUT_APP_ID", "7");
        std::env::set_var("INPUT_TOKEN", "tok");
        std::env::set_var("INPUT_DIRECTORY", "build");

        let config = DeployConfig::from_env().unwrap();
        assert_eq!(config.server, "https://ci.test");
        assert_eq!(config.directory, PathBuf::from("build"));
    }

    #[test]
    #[serial]
    fn edge_vars_win_over_ci_inputs() {
        clear_env();
        set_edge_vars();
        std::env::set_var("INPUT_SERVER", "https://other.test");

        let config = DeployConfig::from_env().unwrap();
        assert_eq!(config.server, "https://x.test");
    }

    #[test]
    #[serial]
    fn missing_token_names_the_field() {
        clear_env();
        set_edge_vars();
        std::env::remove_var("EDGE_TOKEN");

        let err = DeployConfig::from_env().unwrap_err();
        match err {
            DeployError::Config { field, .. } => assert_eq!(field, "token"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[serial]
    fn scientific_notation_app_id_is_rejected() {
        clear_env();
        set_edge_vars();
        std::env::set_var("EDGE_APP_ID", "1e10");

        let err = DeployConfig::from_env().unwrap_err();
        match err {
            DeployError::Config { field, .. } => assert_eq!(field, "app_id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[serial]
    fn relative_server_url_is_rejected() {
        clear_env();
        set_edge_vars();
        std::env::set_var("EDGE_SERVER", "x.test/deploy");

        let err = DeployConfig::from_env().unwrap_err();
        match err {
            DeployError::Config { field, .. } => assert_eq!(field, "server"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[serial]
    fn non_http_scheme_is_rejected() {
        clear_env();
        set_edge_vars();
        std::env::set_var("EDGE_SERVER", "ftp://x.test");

        let err = DeployConfig::from_env().unwrap_err();
        assert!(matches!(err, DeployError::Config { field: "server", .. }));
    }

    #[test]
    #[serial]
    fn file_values_are_overridden_by_env() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.toml");
        std::fs::write(
            &path,
            "server = \"https://file.test\"\napp_id = \"1\"\ntoken = \"filetok\"\ndirectory = \"out\"\n",
        )
        .unwrap();

        let config = DeployConfig::from_file(&path).unwrap();
        assert_eq!(config.server, "https://file.test");

        std::env::set_var("EDGE_SERVER", "https://env.test");
        let config = DeployConfig::from_file(&path).unwrap();
        assert_eq!(config.server, "https://env.test");
        assert_eq!(config.token, "filetok");
    }

    #[test]
    #[serial]
    fn empty_env_value_counts_as_unset() {
        clear_env();
        set_edge_vars();
        std::env::set_var("EDGE_TOKEN", "");

        let err = DeployConfig::from_env().unwrap_err();
        assert!(matches!(err, DeployError::Config { field: "token", .. }));
    }
}
