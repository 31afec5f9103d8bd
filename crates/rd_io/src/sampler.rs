// crates/rd_io/src/sampler.rs

//! DEM 高程查询
//!
//! 供下游（地图展示、洪水风险评估）按经纬度取高程：投影到栅格坐标系后
//! 取所在单元的值，不做插值。栅格外与 NODATA 单元分别返回明确的信号。

use std::path::Path;

use rd_geo::{CoordinateProjector, GeoPoint, Point2D};
use rd_terrain::Grid;

use crate::ascii_grid::AsciiGridReader;
use crate::error::IoResult;

/// 查询结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElevationSample {
    /// 单元高程 [m]
    Value(f64),
    /// 单元在栅格内但无数据
    NoData,
    /// 查询点位于栅格外
    OutOfBounds,
}

impl ElevationSample {
    /// 有效高程
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NoData | Self::OutOfBounds => None,
        }
    }
}

/// DEM 查询器
#[derive(Debug, Clone)]
pub struct DemSampler {
    grid: Grid,
    projector: CoordinateProjector,
}

impl DemSampler {
    /// 由栅格与其坐标系的投影器创建
    #[must_use]
    pub fn new(grid: Grid, projector: CoordinateProjector) -> Self {
        Self { grid, projector }
    }

    /// 读取 ASCII 栅格文件
    pub fn from_file(path: impl AsRef<Path>, projector: CoordinateProjector) -> IoResult<Self> {
        let parsed = AsciiGridReader::read(path)?;
        Ok(Self::new(parsed.grid, projector))
    }

    /// 栅格
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// 按经纬度查询
    pub fn sample(&self, point: &GeoPoint) -> IoResult<ElevationSample> {
        let projected = self.projector.project_point(point)?;
        Ok(self.sample_projected(&projected))
    }

    /// 按平面坐标查询
    #[must_use]
    pub fn sample_projected(&self, point: &Point2D) -> ElevationSample {
        match self.grid.spec().locate(point).and_then(|cell| self.grid.at(cell)) {
            None => ElevationSample::OutOfBounds,
            Some(v) if Grid::is_unset(v) => ElevationSample::NoData,
            Some(v) => ElevationSample::Value(v),
        }
    }
}
