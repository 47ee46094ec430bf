//! Layered configuration loading.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{ConfigError, VertexConfig};

/// Builds a [`VertexConfig`] from defaults, files, strings and the environment.
///
/// Layers apply in the order they are added; a later layer overrides keys set
/// by an earlier one and leaves the rest untouched. Environment overrides apply
/// last, at [`load`](Self::load) time.
///
/// # Environment variables
///
/// With prefix `VERTEX`, variables look like `VERTEX__SERVER__HTTP_ADDR`.
/// The section and key are matched case-insensitively against the config
/// structure; an unknown section or key is an error.
///
/// # Example
///
/// ```rust,no_run
/// use vertex_config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_optional_file("vertex.toml")?
///     .with_env_prefix("VERTEX")
///     .load()?;
/// # Ok::<(), vertex_config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    value: Value,
    env_prefix: Option<String>,
    env_vars: Option<Vec<(String, String)>>,
    files_loaded: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Start from [`VertexConfig::default`].
    pub fn new() -> Self {
        Self::from_config(&VertexConfig::default())
    }

    /// Start from [`VertexConfig::development`].
    pub fn with_development() -> Self {
        Self::from_config(&VertexConfig::development())
    }

    /// Start from [`VertexConfig::production`].
    pub fn with_production() -> Self {
        Self::from_config(&VertexConfig::production())
    }

    fn from_config(config: &VertexConfig) -> Self {
        Self {
            value: serde_json::to_value(config).unwrap_or_else(|_| Value::Object(Map::new())),
            env_prefix: None,
            env_vars: None,
            files_loaded: Vec::new(),
        }
    }

    /// Layer a TOML or JSON file, chosen by extension.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml");

        let layer = parse(&content, format)?;
        merge(&mut self.value, layer);
        self.files_loaded.push(path.to_path_buf());
        Ok(self)
    }

    /// Layer a file if it exists.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Layer configuration text in `"toml"` or `"json"` format.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer = parse(content, format)?;
        merge(&mut self.value, layer);
        Ok(self)
    }

    /// Read overrides from environment variables with this prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into().to_uppercase());
        self
    }

    /// Use these variables instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Load a `.env` file from the current directory into the process
    /// environment. A missing file is not an error.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Files layered so far, in order.
    pub fn files_loaded(&self) -> &[PathBuf] {
        &self.files_loaded
    }

    /// Apply environment overrides, deserialize and validate.
    pub fn load(self) -> Result<VertexConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides and deserialize without validating.
    pub fn load_unvalidated(mut self) -> Result<VertexConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars = match self.env_vars.take() {
                Some(vars) => vars,
                None => std::env::vars().collect(),
            };
            let marker = format!("{prefix}__");
            for (name, raw) in vars {
                if let Some(rest) = name.strip_prefix(&marker) {
                    apply_env_var(&mut self.value, &name, rest, &raw)?;
                }
            }
        }

        Ok(serde_json::from_value(self.value)?)
    }
}

fn parse(content: &str, format: &str) -> Result<Value, ConfigError> {
    match format.to_ascii_lowercase().as_str() {
        "toml" => Ok(toml::from_str::<Value>(content)?),
        "json" => Ok(serde_json::from_str::<Value>(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn apply_env_var(root: &mut Value, var: &str, rest: &str, raw: &str) -> Result<(), ConfigError> {
    let parts: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
    let [section, key] = parts.as_slice() else {
        return Err(ConfigError::env_parse_error(
            var,
            "expected PREFIX__SECTION__KEY",
        ));
    };

    let slot = root
        .get_mut(section.as_str())
        .and_then(|s| s.get_mut(key.as_str()))
        .ok_or_else(|| {
            ConfigError::env_parse_error(var, format!("unknown configuration key {section}.{key}"))
        })?;

    *slot = match &*slot {
        Value::Bool(_) => Value::Bool(
            parse_bool(raw).ok_or_else(|| ConfigError::env_parse_error(var, "expected boolean"))?,
        ),
        Value::Number(_) => Value::from(
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::env_parse_error(var, "expected unsigned integer"))?,
        ),
        _ => Value::String(raw.to_string()),
    };
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
