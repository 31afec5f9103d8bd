// crates/rd_terrain/src/river.rs

//! 河道控制点与高程剖面
//!
//! - [`RiverProfile`]：按流向排列的控制点序列，构造时校验
//! - [`RiverElevationProfiler`]：为每个控制点分配目标高程，保证沿程不升
//! - [`RiverChannel`]：控制点投影到栅格后的位置与高程，供后续阶段只读使用

use std::collections::BTreeMap;

use rand::Rng;
use rd_config::RiverConfig;
use rd_geo::{GeoPoint, Point2D};
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::raster::{CellIndex, GridSpec};

// ============================================================================
// 控制点序列
// ============================================================================

/// 河道控制点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiverControlPoint {
    /// 沿流向的序号
    pub index: usize,
    /// 地理位置
    pub location: GeoPoint,
    /// 预设高程（实测值），为 `None` 时由剖面插值
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl RiverControlPoint {
    /// 创建无预设高程的控制点
    #[must_use]
    pub fn new(index: usize, lat: f64, lon: f64) -> Self {
        Self {
            index,
            location: GeoPoint::new(lat, lon),
            elevation: None,
        }
    }

    /// 附加预设高程
    #[must_use]
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// 经过校验的控制点序列（上游 → 下游）
///
/// 不变量：至少 2 个点、序号严格递增、坐标有限且互不重复。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverProfile {
    points: Vec<RiverControlPoint>,
}

impl RiverProfile {
    /// 校验并创建
    pub fn new(points: Vec<RiverControlPoint>) -> TerrainResult<Self> {
        if points.len() < 2 {
            return Err(TerrainError::configuration(
                "river.points",
                format!("至少需要 2 个控制点，实际 {}", points.len()),
            ));
        }

        for (i, p) in points.iter().enumerate() {
            p.location
                .validate()
                .map_err(|e| TerrainError::configuration("river.points", format!("第 {i} 个控制点: {e}")))?;
            if let Some(z) = p.elevation {
                if !z.is_finite() {
                    return Err(TerrainError::configuration(
                        "river.points",
                        format!("第 {i} 个控制点的预设高程不是有限值"),
                    ));
                }
            }
        }

        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].index <= pair[0].index {
                return Err(TerrainError::configuration(
                    "river.points",
                    format!(
                        "序号必须严格递增: 位置 {} 的序号 {} 不大于前一个 {}",
                        i + 1,
                        pair[1].index,
                        pair[0].index
                    ),
                ));
            }
        }

        for (i, a) in points.iter().enumerate() {
            if let Some(j) = points[i + 1..].iter().position(|b| b.location == a.location) {
                return Err(TerrainError::configuration(
                    "river.points",
                    format!("控制点 {} 与 {} 坐标重复: {:?}", a.index, points[i + 1 + j].index, a.location),
                ));
            }
        }

        Ok(Self { points })
    }

    /// 内置数据专用，跳过校验
    pub(crate) fn from_verified(points: Vec<RiverControlPoint>) -> Self {
        Self { points }
    }

    /// 由 (纬度, 经度) 列表创建，序号按顺序编为 0..n
    pub fn from_coordinates(coords: &[(f64, f64)]) -> TerrainResult<Self> {
        Self::new(
            coords
                .iter()
                .enumerate()
                .map(|(i, &(lat, lon))| RiverControlPoint::new(i, lat, lon))
                .collect(),
        )
    }

    /// 控制点
    #[must_use]
    pub fn points(&self) -> &[RiverControlPoint] {
        &self.points
    }

    /// 控制点数
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 恒为 false（至少 2 个点）
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ============================================================================
// 高程剖面
// ============================================================================

/// 河道高程允许范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationRange {
    /// 下限
    pub min: f64,
    /// 上限
    pub max: f64,
}

impl ElevationRange {
    /// 创建范围
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 是否在范围内（含端点）
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// 截断到范围内
    #[inline]
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// 河道高程剖面生成器
///
/// 对第 i 个点，`p = (lon_i - lon_min) / (lon_max - lon_min)`，
/// 基准高程 `west - p·(west - east)`，加 `[-v/2, v/2]` 均匀扰动后截断到范围内。
/// 若高于上一个点，则取 `上一个点 - ε`，再以范围下限兜底。
#[derive(Debug, Clone, PartialEq)]
pub struct RiverElevationProfiler {
    west_elevation: f64,
    east_elevation: f64,
    variation_amplitude: f64,
    range: ElevationRange,
    downstream_step: f64,
}

impl RiverElevationProfiler {
    /// 创建剖面生成器
    #[must_use]
    pub fn new(
        west_elevation: f64,
        east_elevation: f64,
        variation_amplitude: f64,
        range: ElevationRange,
        downstream_step: f64,
    ) -> Self {
        Self {
            west_elevation,
            east_elevation,
            variation_amplitude,
            range,
            downstream_step,
        }
    }

    /// 由配置段创建
    #[must_use]
    pub fn from_config(config: &RiverConfig) -> Self {
        Self::new(
            config.west_elevation,
            config.east_elevation,
            config.variation_amplitude,
            ElevationRange::new(config.global_min, config.global_max),
            config.downstream_step,
        )
    }

    /// 高程范围
    #[must_use]
    pub fn range(&self) -> ElevationRange {
        self.range
    }

    /// 为每个控制点分配高程，结果与输入顺序一一对应
    pub fn assign<R: Rng + ?Sized>(&self, profile: &RiverProfile, rng: &mut R) -> Vec<f64> {
        let points = profile.points();
        let (lon_min, lon_max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.location.lon), hi.max(p.location.lon))
        });
        let span = lon_max - lon_min;
        let last = (points.len() - 1).max(1) as f64;
        let half = self.variation_amplitude / 2.0;

        let mut elevations = Vec::with_capacity(points.len());
        let mut tie_breaks = 0_usize;

        for (i, point) in points.iter().enumerate() {
            let raw = match point.elevation {
                Some(surveyed) => surveyed,
                None => {
                    let p = if span > 0.0 {
                        (point.location.lon - lon_min) / span
                    } else {
                        i as f64 / last
                    };
                    let base = self.west_elevation - p * (self.west_elevation - self.east_elevation);
                    // 非有限振幅不扰动
                    if half > 0.0 && half.is_finite() {
                        base + rng.gen_range(-half..=half)
                    } else {
                        base
                    }
                }
            };

            let mut elevation = self.range.clamp(raw);
            if let Some(&prev) = elevations.last() {
                if elevation > prev {
                    elevation = prev - self.downstream_step;
                    tie_breaks += 1;
                }
            }
            elevations.push(elevation.max(self.range.min));
        }

        if tie_breaks > 0 {
            tracing::debug!(tie_breaks, "河道剖面逆坡点已改为下游步长");
        }
        elevations
    }
}

// ============================================================================
// 投影后的河道
// ============================================================================

/// 投影到平面并分配了高程的控制点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedRiverPoint {
    /// 沿流向的序号
    pub index: usize,
    /// 平面坐标
    pub position: Point2D,
    /// 目标高程
    pub elevation: f64,
    /// 所在栅格单元，栅格外为 `None`
    pub cell: Option<CellIndex>,
}

/// 栅格上的河道
///
/// 多个控制点落入同一单元时，取流向上最后一个点的高程
/// （剖面沿程不升，即其中最低者）。
#[derive(Debug, Clone, PartialEq)]
pub struct RiverChannel {
    points: Vec<ProjectedRiverPoint>,
    cells: BTreeMap<CellIndex, f64>,
}

impl RiverChannel {
    /// 定位每个控制点所在单元
    ///
    /// `positions` 与 `elevations` 均与 `profile` 顺序一致。
    pub fn new(
        spec: &GridSpec,
        profile: &RiverProfile,
        positions: &[Point2D],
        elevations: &[f64],
    ) -> TerrainResult<Self> {
        if positions.len() != profile.len() || elevations.len() != profile.len() {
            return Err(TerrainError::configuration(
                "river.points",
                format!(
                    "控制点 {} 个，坐标 {} 个，高程 {} 个",
                    profile.len(),
                    positions.len(),
                    elevations.len()
                ),
            ));
        }

        let mut cells = BTreeMap::new();
        let points: Vec<ProjectedRiverPoint> = profile
            .points()
            .iter()
            .zip(positions)
            .zip(elevations)
            .map(|((cp, &position), &elevation)| {
                let cell = spec.locate(&position);
                match cell {
                    Some(c) => {
                        cells.insert(c, elevation);
                    }
                    None => tracing::warn!(
                        index = cp.index,
                        x = position.x,
                        y = position.y,
                        "河道控制点位于栅格外，跳过约束与验证"
                    ),
                }
                ProjectedRiverPoint {
                    index: cp.index,
                    position,
                    elevation,
                    cell,
                }
            })
            .collect();

        Ok(Self { points, cells })
    }

    /// 全部控制点（含栅格外的点）
    #[must_use]
    pub fn points(&self) -> &[ProjectedRiverPoint] {
        &self.points
    }

    /// 位于栅格内的控制点及其单元
    pub fn in_grid(&self) -> impl Iterator<Item = (&ProjectedRiverPoint, CellIndex)> {
        self.points.iter().filter_map(|p| p.cell.map(|c| (p, c)))
    }

    /// 河道单元及其精确高程
    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, f64)> + '_ {
        self.cells.iter().map(|(c, z)| (*c, *z))
    }

    /// 单元是否为河道单元
    #[must_use]
    pub fn is_river_cell(&self, cell: &CellIndex) -> bool {
        self.cells.contains_key(cell)
    }

    /// 河道单元的精确高程
    #[must_use]
    pub fn cell_elevation(&self, cell: &CellIndex) -> Option<f64> {
        self.cells.get(cell).copied()
    }

    /// 栅格外被跳过的控制点数
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.points.iter().filter(|p| p.cell.is_none()).count()
    }
}

// ============================================================================
// 测试
// ============================================================================
