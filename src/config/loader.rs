// file: src/config/loader.rs
// version: 1.1.0
// guid: c93a5f0e-2b7d-4e18-a6c4-5d20f8b71e93

//! Configuration file loading and environment variable substitution

use super::AppConfig;
use crate::error::ProvisionError;
use crate::Result;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use validator::Validate;

/// Directory name under the user's config dir
const CONFIG_DIR_NAME: &str = "pve-devbox-agent";

/// Answers that are passed verbatim to the host and must never be type-coerced
const STRING_ONLY_ANSWERS: &[&str] = &["password"];

/// Pre-filled answers for the prompts, keyed by prompt key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    values: BTreeMap<String, String>,
}

impl Answers {
    /// Build answers from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up an answer
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Default location of `config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load the tool configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and built-in defaults otherwise.
    pub fn load_app_config(&self, explicit: Option<&Path>) -> Result<AppConfig> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_config_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => {
                    debug!("No configuration file found, using built-in defaults");
                    return Ok(AppConfig::default());
                }
            },
        };

        let content = self.read_expanded(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load an answers file. `.toml` files are parsed as TOML, anything else as YAML.
    ///
    /// `${VAR}` references are expanded per value after parsing, so substituted
    /// text is never interpreted as YAML or TOML syntax.
    pub fn load_answers<P: AsRef<Path>>(&self, path: P) -> Result<Answers> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProvisionError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let parsed = if is_toml {
            parse_toml_answers(&content)?
        } else {
            parse_yaml_answers(&content)?
        };
        let answers = self.expand_answers(parsed)?;

        info!(
            "Loaded {} answers from {}",
            answers.len(),
            path.display()
        );
        Ok(answers)
    }

    fn read_expanded(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProvisionError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.expand_env_vars(&content)
    }

    /// Expand `${VAR}` references in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ProvisionError::config(format!("Invalid regex pattern: {}", e)))?;

        let mut result = content.to_string();
        let mut missing_vars = Vec::new();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];

            if let Some(value) = self.env_vars.get(var_name) {
                result = result.replace(placeholder, value);
            } else if !missing_vars.iter().any(|v| v == var_name) {
                missing_vars.push(var_name.to_string());
            }
        }

        if !missing_vars.is_empty() {
            return Err(ProvisionError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result)
    }

    fn expand_answers(&self, answers: Answers) -> Result<Answers> {
        let mut values = BTreeMap::new();
        for (key, value) in answers.values {
            let expanded = self.expand_env_vars(&value).map_err(|e| {
                ProvisionError::config(format!("Answer '{}': {}", key, e))
            })?;
            values.insert(key, expanded);
        }
        Ok(Answers { values })
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_yaml_answers(content: &str) -> Result<Answers> {
    let document: serde_yaml::Value = serde_yaml::from_str(content)?;
    let mapping = match document {
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Null => return Ok(Answers::default()),
        _ => {
            return Err(ProvisionError::config(
                "Answers file must be a mapping of prompt keys to values",
            ))
        }
    };

    let mut values = BTreeMap::new();
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(key) => key,
            other => {
                return Err(ProvisionError::config(format!(
                    "Answer keys must be strings, got {:?}",
                    other
                )))
            }
        };
        let value = match value {
            serde_yaml::Value::String(s) => s,
            other if STRING_ONLY_ANSWERS.contains(&key.as_str()) => {
                return Err(string_required(&key, yaml_kind(&other)))
            }
            serde_yaml::Value::Null => continue,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => {
                return Err(ProvisionError::config(format!(
                    "Answer '{}' must be a scalar value",
                    key
                )))
            }
        };
        values.insert(key, value);
    }

    Ok(Answers { values })
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "an empty value",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

fn string_required(key: &str, found: &str) -> ProvisionError {
    ProvisionError::config(format!(
        "Answer '{}' must be a quoted string, found {}; wrap the value in quotes",
        key, found
    ))
}

fn parse_toml_answers(content: &str) -> Result<Answers> {
    let table: toml::Table = toml::from_str(content)?;

    let mut values = BTreeMap::new();
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => s,
            other if STRING_ONLY_ANSWERS.contains(&key.as_str()) => {
                return Err(string_required(&key, other.type_str()))
            }
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            _ => {
                return Err(ProvisionError::config(format!(
                    "Answer '{}' must be a scalar value",
                    key
                )))
            }
        };
        values.insert(key, value);
    }

    Ok(Answers { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_env_var_expansion() {
        let mut loader = ConfigLoader::new();
        loader.set_env_var("DEVBOX_TEST_PASSWORD".to_string(), "hunter2".to_string());

        let result = loader
            .expand_env_vars("password: ${DEVBOX_TEST_PASSWORD}")
            .unwrap();
        assert_eq!(result, "password: hunter2");
    }

    #[test]
    fn test_missing_env_var() {
        let loader = ConfigLoader::new();
        let result = loader.expand_env_vars("password: ${DEVBOX_SURELY_UNSET_VAR}");

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("DEVBOX_SURELY_UNSET_VAR"));
    }

    #[test]
    fn test_load_yaml_answers() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
ctid: 130
hostname: builder
cores: 8
install_editor: true
ssh_key_path:
"#
        )?;

        let answers = ConfigLoader::new().load_answers(file.path())?;

        assert_eq!(answers.get("ctid"), Some("130"));
        assert_eq!(answers.get("hostname"), Some("builder"));
        assert_eq!(answers.get("cores"), Some("8"));
        assert_eq!(answers.get("install_editor"), Some("true"));
        assert_eq!(answers.get("ssh_key_path"), None);
        Ok(())
    }

    #[test]
    fn test_load_toml_answers() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "ctid = 140\nhostname = \"tomlbox\"\nnetwork = \"dhcp\"")?;

        let answers = ConfigLoader::new().load_answers(file.path())?;

        assert_eq!(answers.get("ctid"), Some("140"));
        assert_eq!(answers.get("hostname"), Some("tomlbox"));
        Ok(())
    }

    #[test]
    fn test_nested_answer_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "network:\n  mode: static")?;

        assert!(ConfigLoader::new().load_answers(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_numeric_looking_password_rejected() -> Result<()> {
        for raw in ["1.50", "0x1F", "1e3", "true"] {
            let mut file = NamedTempFile::new()?;
            writeln!(file, "hostname: builder\npassword: {}", raw)?;

            let result = ConfigLoader::new().load_answers(file.path());

            assert!(
                matches!(result, Err(ProvisionError::ConfigError(ref msg)) if msg.contains("password")),
                "password {} should be rejected, got {:?}",
                raw,
                result
            );
        }
        Ok(())
    }

    #[test]
    fn test_comment_password_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "password: #x")?;

        let result = ConfigLoader::new().load_answers(file.path());

        assert!(matches!(result, Err(ProvisionError::ConfigError(_))));
        Ok(())
    }

    #[test]
    fn test_quoted_password_kept_verbatim() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "password: \"1.50\"\ncores: 0x1F")?;

        let answers = ConfigLoader::new().load_answers(file.path())?;

        assert_eq!(answers.get("password"), Some("1.50"));
        assert_eq!(answers.get("cores"), Some("31"));
        Ok(())
    }

    #[test]
    fn test_env_value_with_yaml_syntax_expanded_after_parse() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "hostname: builder\npassword: ${{DEVBOX_TEST_PW}}")?;
        let mut loader = ConfigLoader::new();
        loader.set_env_var("DEVBOX_TEST_PW".to_string(), "s3cret: x #1".to_string());

        let answers = loader.load_answers(file.path())?;

        assert_eq!(answers.get("password"), Some("s3cret: x #1"));
        assert_eq!(answers.get("hostname"), Some("builder"));
        Ok(())
    }

    #[test]
    fn test_missing_env_var_in_answers_names_key() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "password: ${{DEVBOX_SURELY_UNSET_VAR}}")?;

        let err = ConfigLoader::new().load_answers(file.path()).unwrap_err();

        assert!(err.to_string().contains("password"));
        assert!(err.to_string().contains("DEVBOX_SURELY_UNSET_VAR"));
        Ok(())
    }

    #[test]
    fn test_toml_float_password_rejected() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "password = 1.50")?;

        let result = ConfigLoader::new().load_answers(file.path());

        assert!(matches!(result, Err(ProvisionError::ConfigError(_))));
        Ok(())
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let loader = ConfigLoader::new();
        let result = loader.load_app_config(Some(Path::new("/nonexistent/devbox.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_app_config_validates() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[network_wait]\nattempts = 0")?;

        let result = ConfigLoader::new().load_app_config(Some(file.path()));
        assert!(matches!(result, Err(ProvisionError::ValidationError(_))));
        Ok(())
    }
}
