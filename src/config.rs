use crate::error::{AquaGuardError, Result};
use dialoguer::{Confirm, Input};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".into(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DemoConfig {
    /// Fixed seed for reproducible demo series. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub region: RegionConfig,
}

/// Bounding box where synthetic parcel geometry is placed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RegionConfig {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_lat: 37.2,
            max_lat: 38.2,
            min_lng: 32.2,
            max_lng: 33.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_rain_factor")]
    pub rain_factor: f64,
}

fn default_rain_factor() -> f64 {
    1.0
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            rain_factor: default_rain_factor(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(AquaGuardError::Config(format!(
                "Config file not found at {:?}. Run `aquaguard init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| AquaGuardError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if Self::exists(config_override.as_ref()) {
            Self::load(config_override)
        } else {
            tracing::warn!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| AquaGuardError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.enabled && self.backend.url.trim().is_empty() {
            return Err(AquaGuardError::Config(
                "backend.url must be set when the backend is enabled".into(),
            ));
        }

        let r = &self.demo.region;
        if !(r.min_lat < r.max_lat && r.min_lng < r.max_lng) {
            return Err(AquaGuardError::Config(format!(
                "demo.region is empty: lat {}..{}, lng {}..{}",
                r.min_lat, r.max_lat, r.min_lng, r.max_lng
            )));
        }

        let f = self.scenario.rain_factor;
        if !f.is_finite() || f < 0.0 {
            return Err(AquaGuardError::Config(format!(
                "scenario.rain_factor must be a non-negative number, got {}",
                f
            )));
        }

        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("aquaguard").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/aquaguard/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AquaGuardError::Config("Cannot determine config directory".into()))?
            .join("aquaguard");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up AquaGuard!");
        println!();

        println!("Prediction backend");
        let use_backend = Confirm::new()
            .with_prompt("  Use a prediction backend?")
            .default(true)
            .interact()
            .map_err(|e| AquaGuardError::Config(format!("Input error: {}", e)))?;

        let url: String = if use_backend {
            Input::new()
                .with_prompt("  Backend URL")
                .default("http://localhost:8000".into())
                .interact_text()
                .map_err(|e| AquaGuardError::Config(format!("Input error: {}", e)))?
        } else {
            BackendConfig::default().url
        };

        println!();

        println!("Demo data (used when the backend is unreachable)");
        let seed: String = Input::new()
            .with_prompt("  Random seed (blank for random)")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AquaGuardError::Config(format!("Input error: {}", e)))?;

        let seed = if seed.trim().is_empty() {
            None
        } else {
            Some(seed.trim().parse::<u64>().map_err(|_| {
                AquaGuardError::Config(format!("Seed must be a whole number, got '{}'", seed))
            })?)
        };

        let rain_factor: f64 = Input::new()
            .with_prompt("  Default rainfall scenario (1.0 = observed)")
            .default(1.0)
            .interact_text()
            .map_err(|e| AquaGuardError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            backend: BackendConfig {
                url,
                enabled: use_backend,
            },
            demo: DemoConfig {
                seed,
                region: RegionConfig::default(),
            },
            scenario: ScenarioConfig { rain_factor },
        };
        config.validate()?;

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| AquaGuardError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# AquaGuard Configuration\n# Generated by `aquaguard init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| AquaGuardError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("AQUAGUARD_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| AquaGuardError::Config("Cannot determine data directory".into()))?
            .join("aquaguard");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn log_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("aquaguard.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
backend:
  url: http://api.example:9000
  enabled: false
demo:
  seed: 42
  region:
    min_lat: 37.0
    max_lat: 38.0
    min_lng: 32.0
    max_lng: 33.0
scenario:
  rain_factor: 0.8
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.backend.url, "http://api.example:9000");
        assert!(!config.backend.enabled);
        assert_eq!(config.demo.seed, Some(42));
        assert_eq!(config.demo.region.min_lat, 37.0);
        assert_eq!(config.scenario.rain_factor, 0.8);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = Config::parse("backend:\n  url: http://x\n").unwrap();
        assert!(config.backend.enabled);
        assert_eq!(config.demo, DemoConfig::default());
        assert_eq!(config.scenario.rain_factor, 1.0);
    }

    #[test]
    fn substitutes_environment_variables() {
        std::env::set_var("AQUAGUARD_TEST_BACKEND_URL", "http://from-env:8000");
        let config = Config::parse("backend:\n  url: ${AQUAGUARD_TEST_BACKEND_URL}\n").unwrap();
        assert_eq!(config.backend.url, "http://from-env:8000");
    }

    #[test]
    fn rejects_empty_region() {
        let yaml = "demo:\n  region:\n    min_lat: 38.0\n    max_lat: 37.0\n    min_lng: 32.0\n    max_lng: 33.0\n";
        assert!(matches!(Config::parse(yaml), Err(AquaGuardError::Config(_))));
    }

    #[test]
    fn rejects_negative_rain_factor() {
        let yaml = "scenario:\n  rain_factor: -1.0\n";
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(Config::parse("backend: [unclosed").is_err());
    }

    #[test]
    fn missing_override_path_is_not_found() {
        let path = PathBuf::from("/nonexistent/aquaguard/config.yaml");
        assert!(!Config::exists(Some(&path)));
        assert!(Config::load(Some(path.clone())).is_err());
        assert_eq!(Config::load_or_default(Some(path)).unwrap(), Config::default());
    }
}
