// crates/rd_terrain/src/lib.rs

//! RiverDEM Terrain Layer (Layer 4)
//!
//! 河道约束的合成数字高程模型。给定按流向排列的河道控制点和
//! [`TerrainConfig`](rd_config::TerrainConfig)，生成一张河道单元为严格局部最小、
//! 沿程高程不升的高程栅格。
//!
//! # 层级架构
//!
//! ```text
//! Layer 6: rd_cli
//! Layer 5: rd_io       ─> 写出 / 读取 ASCII 栅格
//! Layer 4: rd_terrain  ─> 栅格、剖面、区带、约束、平滑、验证（本层）
//! Layer 3: rd_config
//! Layer 2: rd_geo
//! Layer 1: rd_foundation
//! ```
//!
//! # 模块
//!
//! - [`raster`]: `GridSpec`、`Grid`、`GridAllocator`
//! - [`river`]: 控制点序列、高程剖面、投影后的河道
//! - [`zonal`]: 按距离分带生成高程（rayon 按行并行）
//! - [`enforcement`]: 河道周围的抬升锥面
//! - [`smoothing`]: 可分离高斯平滑与河道恢复
//! - [`validation`]: 只读验证报告
//! - [`pipeline`]: 串联全部阶段
//! - [`reference`]: 内置的泰晤士河 40 点剖面
//!
//! # 示例
//!
//! ```no_run
//! use rd_config::TerrainConfig;
//! use rd_terrain::{reference, TerrainPipeline};
//!
//! let pipeline = TerrainPipeline::new(TerrainConfig::default()).unwrap();
//! let output = pipeline.run(&reference::thames_profile()).unwrap();
//! assert!(output.report.local_minima_ratio() >= 0.9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod enforcement;
pub mod error;
pub mod pipeline;
pub mod raster;
pub mod reference;
pub mod river;
pub mod smoothing;
pub mod validation;
pub mod zonal;

pub use enforcement::{ConstraintEnforcer, EnforcementStats};
pub use error::{TerrainError, TerrainResult};
pub use pipeline::{TerrainOutput, TerrainPipeline};
pub use raster::{CellIndex, Grid, GridAllocator, GridSpec};
pub use river::{
    ElevationRange, ProjectedRiverPoint, RiverChannel, RiverControlPoint, RiverElevationProfiler, RiverProfile,
};
pub use smoothing::{Smoother, SmoothingStats};
pub use validation::{ValidationReport, ValidationThresholds, ValidationWarning, Validator};
pub use zonal::{Zone, ZonalStats, ZonalTerrainGenerator};
