// crates/rd_io/src/lib.rs

//! RiverDEM IO 模块 (Layer 5)
//!
//! 提供合成 DEM 的输入输出。
//!
//! # 模块
//!
//! - [`ascii_grid`]: ESRI ASCII 栅格写出与读取（第 0 行为最北）
//! - [`sampler`]: 按经纬度查询单元高程
//! - [`export`]: 运行流水线并写出
//!
//! # 使用示例
//!
//! ```no_run
//! use rd_config::TerrainConfig;
//! use rd_io::export_dem;
//! use rd_terrain::reference::thames_profile;
//!
//! let output = export_dem(TerrainConfig::default(), &thames_profile(), "output/thames_dem.asc")?;
//! println!("{} 个河道点", output.report.river_points_checked);
//! # Ok::<(), rd_io::IoError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ascii_grid;
pub mod error;
pub mod export;
pub mod sampler;

pub use ascii_grid::{AsciiGrid, AsciiGridReader, AsciiGridWriter, DEFAULT_DECIMALS, DEFAULT_NODATA};
pub use error::{IoError, IoResult};
pub use export::{export_dem, export_dem_to_configured_path};
pub use sampler::{DemSampler, ElevationSample};
