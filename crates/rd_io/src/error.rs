// crates/rd_io/src/error.rs
//! IO 错误类型定义
//!
//! 写出阶段的错误是致命的；流水线本身的错误经 `Terrain` 变体透传，
//! 保证出错时不会留下部分写出的栅格。

use std::path::{Path, PathBuf};

use rd_foundation::RdError;
use rd_geo::GeoError;
use rd_terrain::TerrainError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件读写失败
    #[error("文件读写失败 [{}]: {source}", path.display())]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 解析错误
    #[error("文件解析错误: {file}:{line} - {message}")]
    Parse {
        /// 文件
        file: String,
        /// 行号（从 1 开始）
        line: usize,
        /// 描述
        message: String,
    },

    /// 查询坐标无法投影
    #[error("查询坐标无效: {0}")]
    Geo(#[from] GeoError),

    /// 地形合成失败
    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

impl IoError {
    /// 带路径的 IO 错误
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// 解析错误
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

impl From<IoError> for RdError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io { path, source } => {
                RdError::io_with_source(format!("{}", path.display()), source)
            }
            IoError::Parse { file, line, message } => RdError::parse(file, line, message),
            IoError::Geo(e) => e.into(),
            IoError::Terrain(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = IoError::parse("dem.asc", 7, "列数不符");
        assert_eq!(err.to_string(), "文件解析错误: dem.asc:7 - 列数不符");
        assert!(matches!(RdError::from(err), RdError::Parse { line: 7, .. }));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = IoError::io("/nope/dem.asc", std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert!(err.to_string().contains("/nope/dem.asc"));
        assert!(matches!(RdError::from(err), RdError::Io { source: Some(_), .. }));
    }

    #[test]
    fn test_terrain_error_keeps_taxonomy() {
        let err: IoError = TerrainError::configuration("grid.cell_size", "必须为正").into();
        assert!(RdError::from(err).is_configuration());
    }
}
