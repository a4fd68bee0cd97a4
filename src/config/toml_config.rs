use crate::utils::error::{ExporterError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_relative_path,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "exporter.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub setup: SetupSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub output_dir: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupSection {
    pub root: Option<String>,
    pub env_dir: Option<String>,
    pub manifest: Option<String>,
    pub python: Option<String>,
    pub keep_going: Option<bool>,
    pub companion: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExporterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No config file at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExporterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExporterError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(output_dir) = &self.export.output_dir {
            validate_path("export.output_dir", output_dir)?;
        }
        if let Some(user_agent) = &self.export.user_agent {
            validate_non_empty_string("export.user_agent", user_agent)?;
        }
        if let Some(timeout) = self.export.timeout_seconds {
            validate_range("export.timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(api_base) = &self.export.api_base {
            validate_url("export.api_base", api_base)?;
        }
        if let Some(env_dir) = &self.setup.env_dir {
            validate_relative_path("setup.env_dir", env_dir)?;
        }
        if let Some(manifest) = &self.setup.manifest {
            validate_relative_path("setup.manifest", manifest)?;
        }
        Ok(())
    }
}
