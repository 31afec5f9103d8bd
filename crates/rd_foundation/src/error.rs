// crates/rd_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `RdError` 枚举和 `RdResult` 类型别名。各上层 crate 定义自己的错误枚举，
//! 并实现 `From<..> for RdError` 以便跨层传递。
//!
//! # 错误分类
//!
//! | 变体 | 性质 | 说明 |
//! |------|------|------|
//! | `Configuration` | 致命，预检 | 单元尺寸非正、控制点不足、边界框倒置 |
//! | `Projection` | 致命 | 坐标投影无法解析或产生 NaN/Inf |
//! | `Bounds` | 致命 | 栅格行列数非正 |
//! | `Io` / `Parse` | 致命，读写时 | 目标路径不可写、栅格文件格式错误 |
//!
//! 验证类问题（局部极小覆盖率不足等）不属于错误，由验证报告返回。
//!
//! # 示例
//!
//! ```
//! use rd_foundation::error::{RdError, RdResult};
//!
//! fn check_cell_size(cell_size: f64) -> RdResult<()> {
//!     rd_foundation::ensure!(
//!         cell_size > 0.0,
//!         RdError::configuration("cell_size", "单元尺寸必须为正")
//!     );
//!     Ok(())
//! }
//!
//! assert!(check_cell_size(50.0).is_ok());
//! assert!(check_cell_size(0.0).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type RdResult<T> = Result<T, RdError>;

/// RiverDEM 错误类型
#[derive(Error, Debug)]
pub enum RdError {
    /// 配置错误（预检阶段）
    #[error("配置错误 [{key}]: {message}")]
    Configuration {
        /// 出错的配置项
        key: String,
        /// 错误描述
        message: String,
    },

    /// 投影错误
    #[error("投影错误: {0}")]
    Projection(String),

    /// 栅格尺寸错误
    #[error("栅格尺寸无效: nrows={nrows}, ncols={ncols}")]
    Bounds {
        /// 计算得到的行数
        nrows: i64,
        /// 计算得到的列数
        ncols: i64,
    },

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件解析错误
    #[error("文件解析错误: {file} 第{line}行: {message}")]
    Parse {
        /// 文件路径
        file: PathBuf,
        /// 行号（从 1 开始）
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl RdError {
    /// 配置错误
    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// 投影错误
    pub fn projection(message: impl Into<String>) -> Self {
        Self::Projection(message.into())
    }

    /// 栅格尺寸错误
    pub fn bounds(nrows: i64, ncols: i64) -> Self {
        Self::Bounds { nrows, ncols }
    }

    /// IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// IO 错误（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 是否为预检阶段的配置错误
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<std::io::Error> for RdError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 宏
// ========================================================================

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// 从 `Option` 取值，为 `None` 时提前返回错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr $(,)?) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// ========================================================================
// 测试
// ========================================================================
