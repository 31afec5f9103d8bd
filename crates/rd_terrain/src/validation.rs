// crates/rd_terrain/src/validation.rs

//! 结果验证
//!
//! 只读遍历，生成 [`ValidationReport`]。软性问题以 [`ValidationWarning`]
//! 列表返回，是否中止由调用方决定。

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::raster::{CellIndex, Grid};
use crate::river::{ElevationRange, RiverChannel};

// ============================================================================
// 报告
// ============================================================================

/// 验证报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// 最低高程（无有效值时为 NaN）
    pub elevation_min: f64,
    /// 最高高程（无有效值时为 NaN）
    pub elevation_max: f64,
    /// 参与检查的河道点（栅格内）
    pub river_points_checked: usize,
    /// 3×3 邻域严格局部最小的河道点
    pub local_minima_count: usize,
    /// 沿流向相邻两点中下游更高的段数
    pub uphill_segment_count: usize,
    /// 单元值位于河道高程范围内的河道点
    pub river_points_in_range: usize,
    /// 低于范围下限的单元
    pub cells_below_floor: usize,
    /// 未赋值单元
    pub unset_cells: usize,
    /// 不同有效值的个数
    pub distinct_values: usize,
    /// 栅格外被跳过的河道点
    pub river_points_skipped: usize,
}

impl ValidationReport {
    /// 局部最小覆盖率，没有可检查的点时为 0
    #[must_use]
    pub fn local_minima_ratio(&self) -> f64 {
        if self.river_points_checked == 0 {
            0.0
        } else {
            self.local_minima_count as f64 / self.river_points_checked as f64
        }
    }

    /// 按阈值列出软性问题
    #[must_use]
    pub fn warnings(&self, thresholds: &ValidationThresholds) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let ratio = self.local_minima_ratio();
        if ratio < thresholds.min_local_minima_ratio {
            warnings.push(ValidationWarning::LowLocalMinimaCoverage {
                ratio,
                required: thresholds.min_local_minima_ratio,
            });
        }
        if self.uphill_segment_count > 0 {
            warnings.push(ValidationWarning::UphillSegments {
                count: self.uphill_segment_count,
            });
        }
        let out_of_range = self.river_points_checked - self.river_points_in_range;
        if out_of_range > 0 {
            warnings.push(ValidationWarning::RiverOutOfRange { count: out_of_range });
        }
        if self.cells_below_floor > 0 {
            warnings.push(ValidationWarning::CellsBelowFloor {
                count: self.cells_below_floor,
            });
        }
        if self.unset_cells > 0 {
            warnings.push(ValidationWarning::UnsetCells { count: self.unset_cells });
        }
        if self.distinct_values <= 1 {
            warnings.push(ValidationWarning::FlatGrid);
        }
        warnings
    }

    /// 无任何软性问题
    #[must_use]
    pub fn passes(&self, thresholds: &ValidationThresholds) -> bool {
        self.warnings(thresholds).is_empty()
    }
}

/// 验证阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationThresholds {
    /// 局部最小覆盖率下限
    pub min_local_minima_ratio: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_local_minima_ratio: 0.9,
        }
    }
}

/// 软性验证问题
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// 局部最小覆盖率不足
    #[error("河道局部最小覆盖率 {ratio:.3} 低于要求 {required:.3}")]
    LowLocalMinimaCoverage {
        /// 实际比例
        ratio: f64,
        /// 要求比例
        required: f64,
    },

    /// 存在逆坡段
    #[error("河道存在 {count} 处逆坡段")]
    UphillSegments {
        /// 段数
        count: usize,
    },

    /// 河道单元超出高程范围
    #[error("{count} 个河道单元超出高程范围")]
    RiverOutOfRange {
        /// 点数
        count: usize,
    },

    /// 单元低于全局下限
    #[error("{count} 个单元低于全局高程下限")]
    CellsBelowFloor {
        /// 单元数
        count: usize,
    },

    /// 存在未赋值单元
    #[error("{count} 个单元未赋值")]
    UnsetCells {
        /// 单元数
        count: usize,
    },

    /// 栅格只有一个（或没有）有效值
    #[error("栅格高程无变化")]
    FlatGrid,
}

// ============================================================================
// 验证器
// ============================================================================

/// 验证器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validator {
    range: ElevationRange,
}

impl Validator {
    /// `range` 为河道高程范围，其下限同时是全栅格下限
    #[must_use]
    pub fn new(range: ElevationRange) -> Self {
        Self { range }
    }

    /// 检查栅格
    #[must_use]
    pub fn validate(&self, grid: &Grid, channel: &RiverChannel) -> ValidationReport {
        let (elevation_min, elevation_max) = grid.min_max().unwrap_or((f64::NAN, f64::NAN));

        let mut distinct = HashSet::new();
        let mut cells_below_floor = 0;
        for &v in grid.data() {
            if Grid::is_unset(v) {
                continue;
            }
            distinct.insert(v.to_bits());
            if v < self.range.min {
                cells_below_floor += 1;
            }
        }

        let mut checked = 0;
        let mut minima = 0;
        let mut uphill = 0;
        let mut in_range = 0;
        let mut previous: Option<f64> = None;

        for (_, cell) in channel.in_grid() {
            let Some(value) = grid.at(cell) else { continue };
            checked += 1;
            if is_strict_local_minimum(grid, cell) {
                minima += 1;
            }
            if self.range.contains(value) {
                in_range += 1;
            }
            if previous.is_some_and(|p| value > p) {
                uphill += 1;
            }
            previous = Some(value);
        }

        let report = ValidationReport {
            elevation_min,
            elevation_max,
            river_points_checked: checked,
            local_minima_count: minima,
            uphill_segment_count: uphill,
            river_points_in_range: in_range,
            cells_below_floor,
            unset_cells: grid.count_unset(),
            distinct_values: distinct.len(),
            river_points_skipped: channel.skipped(),
        };
        tracing::info!(
            checked = report.river_points_checked,
            minima = report.local_minima_count,
            uphill = report.uphill_segment_count,
            min = report.elevation_min,
            max = report.elevation_max,
            "验证完成"
        );
        report
    }
}

/// 3×3 邻域内所有（栅格内的）邻居都严格更高
///
/// 未赋值的邻居视为不满足。
#[must_use]
pub fn is_strict_local_minimum(grid: &Grid, cell: CellIndex) -> bool {
    let Some(center) = grid.at(cell) else { return false };
    if Grid::is_unset(center) {
        return false;
    }
    grid.spec()
        .window(cell, 1)
        .filter(|(_, d)| *d == 1)
        .all(|(n, _)| grid.at(n).is_some_and(|v| v > center))
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GridSpec;
    use crate::river::RiverProfile;
    use rd_geo::Point2D;

    fn setup() -> (Grid, RiverChannel) {
        // 5×5，河道自西向东穿过第 2 行的 (2,1) 与 (2,3)
        let spec = GridSpec::new(0.0, 0.0, 1.0, 5, 5).unwrap();
        let profile = RiverProfile::from_coordinates(&[(51.0, 0.0), (51.0, 0.1)]).unwrap();
        let positions = [Point2D::new(1.5, 2.5), Point2D::new(3.5, 2.5)];
        let channel = RiverChannel::new(&spec, &profile, &positions, &[6.0, 5.0]).unwrap();
        let mut grid = Grid::filled(spec, 10.0);
        for (cell, z) in channel.cells() {
            grid.set(cell, z);
        }
        (grid, channel)
    }

    #[test]
    fn test_clean_grid_passes() {
        let (grid, channel) = setup();
        let report = Validator::new(ElevationRange::new(4.0, 14.0)).validate(&grid, &channel);

        assert_eq!(report.river_points_checked, 2);
        assert_eq!(report.local_minima_count, 2);
        assert_eq!(report.uphill_segment_count, 0);
        assert_eq!(report.river_points_in_range, 2);
        assert_eq!(report.cells_below_floor, 0);
        assert_eq!(report.unset_cells, 0);
        assert_eq!(report.distinct_values, 3);
        assert_eq!(report.elevation_min, 5.0);
        assert_eq!(report.elevation_max, 10.0);
        assert!(report.passes(&ValidationThresholds::default()));
    }

    #[test]
    fn test_detects_uphill_and_lost_minimum() {
        let (mut grid, channel) = setup();
        grid.set(CellIndex::new(2, 3), 7.0);
        grid.set(CellIndex::new(1, 3), 7.0);

        let report = Validator::new(ElevationRange::new(4.0, 14.0)).validate(&grid, &channel);
        assert_eq!(report.uphill_segment_count, 1);
        assert_eq!(report.local_minima_count, 1);
        assert!((report.local_minima_ratio() - 0.5).abs() < 1e-12);

        let warnings = report.warnings(&ValidationThresholds::default());
        assert!(warnings.contains(&ValidationWarning::UphillSegments { count: 1 }));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::LowLocalMinimaCoverage { .. })));
    }

    #[test]
    fn test_detects_floor_and_unset() {
        let (mut grid, channel) = setup();
        grid.set(CellIndex::new(0, 0), 1.0);
        grid.set(CellIndex::new(4, 4), f64::NAN);

        let report = Validator::new(ElevationRange::new(4.0, 14.0)).validate(&grid, &channel);
        assert_eq!(report.cells_below_floor, 1);
        assert_eq!(report.unset_cells, 1);
        let warnings = report.warnings(&ValidationThresholds::default());
        assert!(warnings.contains(&ValidationWarning::CellsBelowFloor { count: 1 }));
        assert!(warnings.contains(&ValidationWarning::UnsetCells { count: 1 }));
    }

    #[test]
    fn test_flat_grid_flagged() {
        let spec = GridSpec::new(0.0, 0.0, 1.0, 3, 3).unwrap();
        let profile = RiverProfile::from_coordinates(&[(51.0, 0.0), (51.0, 0.1)]).unwrap();
        let channel = RiverChannel::new(
            &spec,
            &profile,
            &[Point2D::new(0.5, 1.5), Point2D::new(2.5, 1.5)],
            &[5.0, 5.0],
        )
        .unwrap();
        let grid = Grid::filled(spec, 5.0);

        let report = Validator::new(ElevationRange::new(4.0, 14.0)).validate(&grid, &channel);
        assert_eq!(report.distinct_values, 1);
        assert_eq!(report.local_minima_count, 0);
        assert!(report.warnings(&ValidationThresholds::default()).contains(&ValidationWarning::FlatGrid));
    }

    #[test]
    fn test_edge_cell_uses_in_bounds_neighbours() {
        let spec = GridSpec::new(0.0, 0.0, 1.0, 3, 3).unwrap();
        let mut grid = Grid::filled(spec, 9.0);
        grid.set(CellIndex::new(0, 0), 1.0);
        assert!(is_strict_local_minimum(&grid, CellIndex::new(0, 0)));
        grid.set(CellIndex::new(1, 1), 1.0);
        assert!(!is_strict_local_minimum(&grid, CellIndex::new(0, 0)));
        grid.set(CellIndex::new(1, 1), f64::NAN);
        assert!(!is_strict_local_minimum(&grid, CellIndex::new(0, 0)));
    }

    #[test]
    fn test_report_serializes() {
        let (grid, channel) = setup();
        let report = Validator::new(ElevationRange::new(4.0, 14.0)).validate(&grid, &channel);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["local_minima_count"], 2);

        let w = serde_json::to_value(ValidationWarning::UnsetCells { count: 3 }).unwrap();
        assert_eq!(w["kind"], "unset_cells");
    }
}
