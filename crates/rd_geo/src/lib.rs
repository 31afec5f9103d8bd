// crates/rd_geo/src/lib.rs
//! RiverDEM 地理空间处理模块
//!
//! 提供椭球体、基准转换、横轴墨卡托投影和 R-tree 空间索引。
//!
//! # 模块
//!
//! - `ellipsoid`: WGS84 / GRS80 / Airy 1830
//! - `datum`: ECEF 互换与 Helmert 七参数变换
//! - `geometry`: `GeoPoint`、`Point2D`、边界框
//! - `projection`: `Crs` 与 `CoordinateProjector`
//! - `spatial_index`: 最近点查询
//!
//! # 示例
//!
//! ```
//! use rd_geo::prelude::*;
//!
//! let projector = CoordinateProjector::from_epsg(27700).unwrap();
//! let bounds = GeoBounds::new(-0.35, 51.41, 0.38, 51.52).unwrap();
//! let projected = projector.project_bounds(&bounds).unwrap();
//! assert!(projected.width() > 50_000.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod datum;
pub mod ellipsoid;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod spatial_index;

/// 预导入模块
pub mod prelude {
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::geometry::{GeoBounds, GeoPoint, Point2D, ProjectedBounds};
    pub use crate::projection::{CoordinateProjector, Crs};
    pub use crate::spatial_index::SpatialIndex;
}

pub use error::{GeoError, GeoResult};
pub use geometry::{GeoBounds, GeoPoint, Point2D, ProjectedBounds};
pub use projection::{CoordinateProjector, Crs};
pub use spatial_index::SpatialIndex;
