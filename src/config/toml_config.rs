use crate::utils::error::{GenError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub strict_keyword_count: bool,
    #[serde(default = "default_min_words")]
    pub min_words: u32,
    #[serde(default = "default_max_words")]
    pub max_words: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: Option<String>,
    #[serde(default)]
    pub copy_to_clipboard: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_min_words() -> u32 {
    150
}

fn default_max_words() -> u32 {
    200
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            strict_keyword_count: false,
            min_words: default_min_words(),
            max_words: default_max_words(),
        }
    }
}

fn env_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl GeneratorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GenError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: Self = toml::from_str(&processed_content).map_err(|e| {
            GenError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            }
        })?;
        config.fill_api_key_from_env();
        Ok(config)
    }

    /// Defaults plus the API key from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.fill_api_key_from_env();
        config
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn fill_api_key_from_env(&mut self) {
        let unresolved = match &self.api.api_key {
            None => true,
            Some(key) => key.trim().is_empty() || env_placeholder().is_match(key),
        };
        if unresolved {
            self.api.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api
            .api_key
            .as_deref()
            .ok_or_else(|| GenError::MissingConfigError {
                field: "api.api_key".to_string(),
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_api_base_url("api.base_url", &self.api.base_url)?;
        validation::validate_not_blank("api.model", &self.api.model)?;
        validation::validate_not_blank("api.api_key", self.api_key()?)?;
        validation::validate_within("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;
        validation::validate_word_range(self.generation.min_words, self.generation.max_words)?;

        if let Some(path) = &self.output.output_path {
            validation::validate_output_dir("output.output_path", path)?;
        }

        Ok(())
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
