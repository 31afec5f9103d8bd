// crates/rd_config/src/error.rs

//! 配置层错误类型

use rd_foundation::RdError;
use rd_geo::GeoError;

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 坐标系或边界框无法解析
    #[error("地理参数错误: {0}")]
    Geo(#[from] GeoError),
}

impl ConfigError {
    /// 无效值
    pub fn invalid(key: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for RdError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => RdError::io_with_source("读取配置文件失败", e),
            ConfigError::Parse(msg) => RdError::configuration("<file>", msg),
            ConfigError::InvalidValue { key, value, reason } => {
                RdError::configuration(key, format!("{value} - {reason}"))
            }
            ConfigError::Geo(e) => e.into(),
        }
    }
}
