use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use blueprint_core::{
    CoreError,
    dimension::{DEFAULT_EXPANSION_FACTOR, DEFAULT_WALL_THICKNESS, ExpansionRule},
    perimeter::PerimeterMethod,
};
use serde::Deserialize;
use thiserror::Error;

/// 结果输出允许的最大小数位数。
const MAX_PRECISION: usize = 10;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从显式路径加载配置，并在返回前完成校验。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `BLUEPRINT_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("BLUEPRINT_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let cwd = env::current_dir().map_err(|source| ConfigError::Context {
            message: "获取当前工作目录失败".to_string(),
            source,
        })?;
        Self::discover_in(&cwd)
    }

    /// 在 `base_dir/config/default.toml` 查找配置，缺失时返回默认配置。
    pub fn discover_in(base_dir: &Path) -> Result<Self, ConfigError> {
        let default_path = base_dir.join("config").join("default.toml");
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// 在任何计算开始前拒绝非法的放量规则与输出设置。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.expansion_rule()?;
        if self.output.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "output.precision 不能超过 {MAX_PRECISION}（当前 {}）",
                self.output.precision
            )));
        }
        Ok(())
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    #[default]
    WallThickness,
    Multiplicative,
}

/// 尺寸推算相关配置。两种放量参数都可以写出，由 `rule` 决定实际生效的一种。
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub rule: RuleKind,
    #[serde(default = "AnalysisConfig::default_wall_thickness")]
    pub wall_thickness: f64,
    #[serde(default = "AnalysisConfig::default_factor")]
    pub factor: f64,
    #[serde(default)]
    pub perimeter: PerimeterMethod,
}

impl AnalysisConfig {
    fn default_wall_thickness() -> f64 {
        DEFAULT_WALL_THICKNESS
    }

    fn default_factor() -> f64 {
        DEFAULT_EXPANSION_FACTOR
    }

    pub fn expansion_rule(&self) -> Result<ExpansionRule, ConfigError> {
        let rule = match self.rule {
            RuleKind::WallThickness => ExpansionRule::wall_thickness(self.wall_thickness)?,
            RuleKind::Multiplicative => ExpansionRule::multiplicative(self.factor)?,
        };
        Ok(rule)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rule: RuleKind::default(),
            wall_thickness: Self::default_wall_thickness(),
            factor: Self::default_factor(),
            perimeter: PerimeterMethod::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "OutputConfig::default_precision")]
    pub precision: usize,
}

impl OutputConfig {
    fn default_precision() -> usize {
        2
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: Self::default_precision(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Rule(#[from] CoreError),
    #[error("{0}")]
    Invalid(String),
}
