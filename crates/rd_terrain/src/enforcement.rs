// crates/rd_terrain/src/enforcement.rs

//! 河道约束
//!
//! 以每个河道单元为中心，在切比雪夫半径 `radius` 的方窗内建立一个向外抬升的锥面：
//!
//! - `d == 0`：强制写入精确河道高程
//! - `d == 1`：写入 `river + channel_offset`
//! - `d > 1`：若当前值低于 `river + d·slope_step` 则抬升，已更高的单元不动
//!
//! 窗口内的其他河道单元不被改写；全部控制点处理完后，再把所有河道单元
//! 恢复为精确高程，保证中心单元在 3×3 邻域中为严格局部最小。

use rd_config::{EnforcementConfig, ZoneProfile};
use serde::Serialize;

use crate::raster::Grid;
use crate::river::RiverChannel;

/// 约束统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnforcementStats {
    /// 处理的控制点数（栅格内）
    pub points_enforced: usize,
    /// 位于栅格外被跳过的控制点数
    pub points_skipped: usize,
    /// 实际改变了数值的单元次数
    pub cells_modified: usize,
    /// 收尾阶段恢复的河道单元数
    pub centers_restored: usize,
}

/// 河道约束器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintEnforcer {
    radius: usize,
    channel_offset: f64,
    slope_step: f64,
}

impl ConstraintEnforcer {
    /// 创建约束器
    #[must_use]
    pub fn new(radius: usize, channel_offset: f64, slope_step: f64) -> Self {
        Self {
            radius,
            channel_offset,
            slope_step,
        }
    }

    /// 由区带参数（缓冲半径）与约束参数创建
    #[must_use]
    pub fn from_config(zones: &ZoneProfile, config: &EnforcementConfig) -> Self {
        Self::new(zones.buffer_radius_cells, config.channel_offset, config.slope_step)
    }

    /// 缓冲半径（单元）
    #[must_use]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// 距中心 `d` 圈处的目标下限
    #[inline]
    #[must_use]
    pub fn ring_floor(&self, river_elevation: f64, d: usize) -> f64 {
        match d {
            0 => river_elevation,
            1 => river_elevation + self.channel_offset,
            _ => river_elevation + d as f64 * self.slope_step,
        }
    }

    /// 对栅格施加约束
    pub fn enforce(&self, grid: &mut Grid, channel: &RiverChannel) -> EnforcementStats {
        let spec = *grid.spec();
        let mut stats = EnforcementStats {
            points_skipped: channel.skipped(),
            ..EnforcementStats::default()
        };

        for (point, center) in channel.in_grid() {
            let r = point.elevation;
            for (cell, d) in spec.window(center, self.radius) {
                if d > 0 && channel.is_river_cell(&cell) {
                    continue;
                }
                let Some(current) = grid.at(cell) else { continue };
                let target = self.ring_floor(r, d);
                let next = if d <= 1 {
                    target
                } else if Grid::is_unset(current) || current < target {
                    target
                } else {
                    current
                };
                if changed(current, next) {
                    grid.set(cell, next);
                    stats.cells_modified += 1;
                }
            }
            stats.points_enforced += 1;
        }

        for (cell, z) in channel.cells() {
            if grid.at(cell).is_some_and(|v| changed(v, z)) {
                grid.set(cell, z);
                stats.cells_modified += 1;
            }
            stats.centers_restored += 1;
        }

        tracing::info!(
            points = stats.points_enforced,
            skipped = stats.points_skipped,
            modified = stats.cells_modified,
            radius = self.radius,
            "河道约束完成"
        );
        stats
    }
}

#[inline]
fn changed(old: f64, new: f64) -> bool {
    old.to_bits() != new.to_bits()
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{CellIndex, GridSpec};
    use crate::river::RiverProfile;
    use rd_geo::Point2D;

    fn single_point(value: f64, river: f64) -> (Grid, RiverChannel) {
        // 11×11，控制点位于中心单元 (5, 5)
        let spec = GridSpec::new(0.0, 0.0, 10.0, 11, 11).unwrap();
        let profile = RiverProfile::from_coordinates(&[(51.0, 0.0), (51.0, 0.1)]).unwrap();
        let positions = [Point2D::new(55.0, 55.0), Point2D::new(-500.0, 55.0)];
        let channel = RiverChannel::new(&spec, &profile, &positions, &[river, river - 1.0]).unwrap();
        (Grid::filled(spec, value), channel)
    }

    #[test]
    fn test_cone_from_low_terrain() {
        let (mut grid, channel) = single_point(0.0, 8.0);
        let enforcer = ConstraintEnforcer::new(3, 0.5, 0.4);
        let stats = enforcer.enforce(&mut grid, &channel);

        assert_eq!(grid.get(5, 5), Some(8.0));
        assert_eq!(grid.get(4, 5), Some(8.5));
        assert_eq!(grid.get(6, 6), Some(8.5));
        assert!((grid.get(3, 5).unwrap() - 8.8).abs() < 1e-12);
        assert!((grid.get(2, 2).unwrap() - 9.2).abs() < 1e-12);
        // 半径之外不受影响
        assert_eq!(grid.get(1, 5), Some(0.0));

        assert_eq!(stats.points_enforced, 1);
        assert_eq!(stats.points_skipped, 1);
        assert_eq!(stats.cells_modified, 49);
        assert_eq!(stats.centers_restored, 1);
    }

    #[test]
    fn test_never_lowers_outer_rings() {
        let (mut grid, channel) = single_point(20.0, 8.0);
        ConstraintEnforcer::new(3, 0.5, 0.4).enforce(&mut grid, &channel);

        assert_eq!(grid.get(5, 5), Some(8.0));
        assert_eq!(grid.get(4, 4), Some(8.5));
        assert_eq!(grid.get(3, 3), Some(20.0));
        assert_eq!(grid.get(2, 8), Some(20.0));
    }

    #[test]
    fn test_ring_three_floor() {
        // 第 3 圈原值低于河面，约束后不低于 river + 3·slope
        let (mut grid, channel) = single_point(2.0, 10.0);
        let enforcer = ConstraintEnforcer::new(3, 0.5, 0.45);
        enforcer.enforce(&mut grid, &channel);
        for cell in [CellIndex::new(2, 5), CellIndex::new(8, 8), CellIndex::new(5, 2)] {
            assert!(grid.at(cell).unwrap() >= 10.0 + 3.0 * 0.45);
        }
    }

    #[test]
    fn test_unset_cells_are_raised() {
        let (mut grid, channel) = single_point(f64::NAN, 8.0);
        ConstraintEnforcer::new(2, 0.5, 0.4).enforce(&mut grid, &channel);
        assert!((grid.get(3, 3).unwrap() - 8.8).abs() < 1e-12);
        assert_eq!(grid.count_unset(), 121 - 25);
    }

    #[test]
    fn test_neighbouring_river_cells_survive() {
        let spec = GridSpec::new(0.0, 0.0, 10.0, 10, 10).unwrap();
        let profile = RiverProfile::from_coordinates(&[(51.0, 0.0), (51.0, 0.1)]).unwrap();
        // 两个相邻的河道单元 (5, 4) 与 (5, 5)
        let positions = [Point2D::new(45.0, 45.0), Point2D::new(55.0, 45.0)];
        let channel = RiverChannel::new(&spec, &profile, &positions, &[9.0, 8.0]).unwrap();
        let mut grid = Grid::filled(spec, 0.0);

        ConstraintEnforcer::new(3, 0.5, 0.4).enforce(&mut grid, &channel);
        assert_eq!(grid.get(5, 4), Some(9.0));
        assert_eq!(grid.get(5, 5), Some(8.0));
    }

    #[test]
    fn test_center_is_strict_local_minimum() {
        let (mut grid, channel) = single_point(5.0, 8.0);
        ConstraintEnforcer::new(3, 0.5, 0.4).enforce(&mut grid, &channel);
        let center = grid.get(5, 5).unwrap();
        for (cell, d) in grid.spec().window(CellIndex::new(5, 5), 1) {
            if d == 1 {
                assert!(grid.at(cell).unwrap() > center);
            }
        }
    }
}
