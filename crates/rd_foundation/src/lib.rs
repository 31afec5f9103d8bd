// crates/rd_foundation/src/lib.rs

//! RiverDEM Foundation Layer
//!
//! 基础层，只提供统一错误类型与检查宏，其余 crate 均依赖本层。
//!
//! # 层级架构
//!
//! ```text
//! Layer 6: rd_cli
//! Layer 5: rd_io        ─> ASCII 栅格读写、DEM 查询
//! Layer 4: rd_terrain   ─> 河道约束地形合成流水线
//! Layer 3: rd_config    ─> TerrainConfig
//! Layer 2: rd_geo       ─> 投影、空间索引
//! Layer 1: rd_foundation（本层）
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{RdError, RdResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{RdError, RdResult};
    pub use crate::{ensure, require};
}
