// crates/rd_terrain/src/smoothing.rs

//! 高斯平滑
//!
//! 可分离高斯核，先沿行后沿列卷积，边界按半样本对称反射
//! （`d c b a | a b c d | d c b a`）。核半径 `floor(truncate·σ + 0.5)`，权重归一化。
//!
//! 未赋值 (NaN) 单元保持未赋值，邻域权重只在有限值上重新归一化。
//! 平滑后所有河道单元恢复为平滑前的值，这一步是精确覆盖而不是近似。

use rd_config::{SmoothingConfig, MAX_SMOOTHING_RADIUS};
use serde::Serialize;

use crate::raster::Grid;
use crate::river::RiverChannel;

/// 平滑统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SmoothingStats {
    /// 是否实际执行了卷积
    pub applied: bool,
    /// 核半径（单元）
    pub radius: usize,
    /// 恢复的河道单元数
    pub cells_restored: usize,
    /// 恢复前河道单元的最大偏移 [m]
    pub max_river_drift: f64,
}

/// 高斯平滑器
#[derive(Debug, Clone, PartialEq)]
pub struct Smoother {
    sigma: f64,
    kernel: Vec<f64>,
}

impl Smoother {
    /// 创建平滑器，`sigma` 以单元为单位
    #[must_use]
    pub fn new(sigma: f64, truncate: f64) -> Self {
        Self {
            sigma,
            kernel: gaussian_kernel(sigma, truncate),
        }
    }

    /// 由配置段创建
    #[must_use]
    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self::new(config.sigma, config.truncate)
    }

    /// 归一化一维核，长度 `2·radius + 1`
    #[must_use]
    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    /// 核半径
    #[must_use]
    pub fn radius(&self) -> usize {
        self.kernel.len() / 2
    }

    /// σ 为 0 或核只有一个点时不做卷积
    #[must_use]
    pub fn is_identity(&self) -> bool {
        !(self.sigma > 0.0) || self.kernel.len() <= 1
    }

    /// 平滑全栅格并恢复河道单元
    pub fn smooth(&self, grid: &mut Grid, channel: &RiverChannel) -> SmoothingStats {
        let mut stats = SmoothingStats {
            radius: self.radius(),
            ..SmoothingStats::default()
        };
        if self.is_identity() {
            tracing::debug!(sigma = self.sigma, "平滑已关闭");
            return stats;
        }

        let saved: Vec<_> = channel
            .cells()
            .filter_map(|(cell, _)| grid.at(cell).map(|v| (cell, v)))
            .collect();

        let (nrows, ncols) = (grid.nrows(), grid.ncols());
        let data = grid.data_mut();

        let mut line = Vec::with_capacity(ncols.max(nrows));
        for row in data.chunks_mut(ncols) {
            line.clear();
            line.extend_from_slice(row);
            self.convolve(&line, row.iter_mut());
        }
        for col in 0..ncols {
            line.clear();
            line.extend((0..nrows).map(|r| data[r * ncols + col]));
            self.convolve(&line, data.iter_mut().skip(col).step_by(ncols));
        }
        stats.applied = true;

        for (cell, original) in saved {
            if let Some(smoothed) = grid.at(cell) {
                let drift = (smoothed - original).abs();
                if drift > stats.max_river_drift {
                    stats.max_river_drift = drift;
                }
            }
            grid.set(cell, original);
            stats.cells_restored += 1;
        }

        tracing::info!(
            sigma = self.sigma,
            radius = stats.radius,
            restored = stats.cells_restored,
            max_drift = stats.max_river_drift,
            "高斯平滑完成"
        );
        stats
    }

    /// 一维卷积：读 `src`，按顺序写入 `dst`
    fn convolve<'a>(&self, src: &[f64], dst: impl Iterator<Item = &'a mut f64>) {
        let n = src.len();
        let radius = self.radius() as isize;
        for (i, out) in dst.enumerate() {
            if Grid::is_unset(src[i]) {
                continue;
            }
            let mut acc = 0.0;
            let mut weight = 0.0;
            for (k, w) in self.kernel.iter().enumerate() {
                let v = src[reflect(i as isize + k as isize - radius, n)];
                if !Grid::is_unset(v) {
                    acc += w * v;
                    weight += w;
                }
            }
            *out = acc / weight;
        }
    }
}

/// 归一化高斯核
///
/// 半径截断在 [`MAX_SMOOTHING_RADIUS`] 以内。
#[must_use]
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    if !(sigma > 0.0 && sigma.is_finite()) {
        return vec![1.0];
    }
    let reach = (truncate.max(0.0) * sigma).min(MAX_SMOOTHING_RADIUS);
    let radius = (reach + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// 半样本对称反射，周期 `2n`
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m >= n {
        2 * n - 1 - m
    } else {
        m
    }
}

// ============================================================================
// 测试
// ============================================================================
