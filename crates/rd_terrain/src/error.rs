// crates/rd_terrain/src/error.rs

//! 地形合成错误类型
//!
//! 全部为致命错误，在任何栅格写出之前返回。验证阶段的软性问题
//! 不走错误通道，见 [`crate::validation::ValidationWarning`]。

use rd_config::ConfigError;
use rd_foundation::RdError;
use rd_geo::GeoError;
use thiserror::Error;

/// 地形模块结果类型
pub type TerrainResult<T> = Result<T, TerrainError>;

/// 地形合成错误
#[derive(Error, Debug)]
pub enum TerrainError {
    /// 预检阶段的配置错误
    #[error("配置错误 [{key}]: {message}")]
    Configuration {
        /// 出错的参数
        key: &'static str,
        /// 错误描述
        message: String,
    },

    /// 栅格行列数非正
    #[error("栅格尺寸无效: nrows={nrows}, ncols={ncols}")]
    Bounds {
        /// 行数
        nrows: i64,
        /// 列数
        ncols: i64,
    },

    /// 坐标投影失败
    #[error("投影错误: {0}")]
    Projection(#[from] GeoError),

    /// 配置文件无效
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TerrainError {
    /// 配置错误
    pub fn configuration(key: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            key,
            message: message.into(),
        }
    }

    /// 是否为预检阶段错误
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Config(_))
    }
}

impl From<TerrainError> for RdError {
    fn from(err: TerrainError) -> Self {
        match err {
            TerrainError::Configuration { key, message } => RdError::configuration(key, message),
            TerrainError::Bounds { nrows, ncols } => RdError::bounds(nrows, ncols),
            TerrainError::Projection(e) => e.into(),
            TerrainError::Config(e) => e.into(),
        }
    }
}
