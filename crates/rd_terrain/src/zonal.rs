// crates/rd_terrain/src/zonal.rs

//! 区带地形生成
//!
//! 先把河道单元写成精确河道高程，再按“与最近河道点的距离”为其余未赋值单元
//! 生成高程：
//!
//! | 区带 | 距离 d | 高程 |
//! |------|--------|------|
//! | 河槽 | d < channel | r + U(-j, j) |
//! | 河漫滩 | d < floodplain | r + H_f·d/floodplain + N(0, σ_f) |
//! | 阶地 | d < terrace | r + H_f + (H_t - H_f)·(d - floodplain)/(terrace - floodplain) + N(0, σ_t) |
//! | 丘陵 | 其余 | r + H_h + N(0, σ_h) |
//!
//! 结果再取 `max(r, ·)` 与 `max(floor, ·)`，任何单元都不会低于其参考河面。
//!
//! # 并行与可复现性
//!
//! 各单元只依赖只读的河道数据，按行用 rayon 并行。每行使用独立的 ChaCha 流
//! （同一基础种子，`set_stream(row)`），结果与线程数无关。

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use rd_config::ZoneProfile;
use rd_geo::SpatialIndex;
use serde::Serialize;

use crate::raster::Grid;
use crate::river::RiverChannel;

/// 区带
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// 河槽
    Channel,
    /// 河漫滩
    Floodplain,
    /// 阶地
    Terrace,
    /// 丘陵
    Hills,
}

/// 各区带填充的单元数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZonalStats {
    /// 直接写入河道高程的单元
    pub river_cells: usize,
    /// 河槽
    pub channel: usize,
    /// 河漫滩
    pub floodplain: usize,
    /// 阶地
    pub terrace: usize,
    /// 丘陵
    pub hills: usize,
}

impl ZonalStats {
    fn record(&mut self, zone: Zone) {
        match zone {
            Zone::Channel => self.channel += 1,
            Zone::Floodplain => self.floodplain += 1,
            Zone::Terrace => self.terrace += 1,
            Zone::Hills => self.hills += 1,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.river_cells += other.river_cells;
        self.channel += other.channel;
        self.floodplain += other.floodplain;
        self.terrace += other.terrace;
        self.hills += other.hills;
        self
    }

    /// 区带生成的单元总数（不含河道单元）
    #[must_use]
    pub fn generated(&self) -> usize {
        self.channel + self.floodplain + self.terrace + self.hills
    }
}

/// 区带地形生成器
#[derive(Debug, Clone)]
pub struct ZonalTerrainGenerator {
    zones: ZoneProfile,
    floor: f64,
    floodplain_noise: Option<Normal<f64>>,
    terrace_noise: Option<Normal<f64>>,
    hill_noise: Option<Normal<f64>>,
}

/// 标准差为 0 时不采样
fn noise(sigma: f64) -> Option<Normal<f64>> {
    if sigma > 0.0 {
        Normal::new(0.0, sigma).ok()
    } else {
        None
    }
}

impl ZonalTerrainGenerator {
    /// 创建生成器，`floor` 为任何单元的高程下限
    #[must_use]
    pub fn new(zones: ZoneProfile, floor: f64) -> Self {
        Self {
            floodplain_noise: noise(zones.floodplain_sigma),
            terrace_noise: noise(zones.terrace_sigma),
            hill_noise: noise(zones.hill_sigma),
            zones,
            floor,
        }
    }

    /// 区带参数
    #[must_use]
    pub fn zones(&self) -> &ZoneProfile {
        &self.zones
    }

    /// 按距离 [m] 判定区带
    #[must_use]
    pub fn classify(&self, distance: f64, cell_size: f64) -> Zone {
        let z = &self.zones;
        if distance < z.channel_width_cells * cell_size {
            Zone::Channel
        } else if distance < z.floodplain_extent_cells * cell_size {
            Zone::Floodplain
        } else if distance < z.terrace_extent_cells * cell_size {
            Zone::Terrace
        } else {
            Zone::Hills
        }
    }

    /// 单个单元的高程
    pub fn elevation<R: Rng + ?Sized>(
        &self,
        distance: f64,
        river_elevation: f64,
        cell_size: f64,
        rng: &mut R,
    ) -> (Zone, f64) {
        let z = &self.zones;
        let zone = self.classify(distance, cell_size);
        let value = match zone {
            Zone::Channel => {
                let jitter = if z.channel_jitter > 0.0 {
                    rng.gen_range(-z.channel_jitter..=z.channel_jitter)
                } else {
                    0.0
                };
                river_elevation + jitter
            }
            Zone::Floodplain => {
                let extent = z.floodplain_extent_cells * cell_size;
                river_elevation + z.floodplain_height * (distance / extent) + sample(&self.floodplain_noise, rng)
            }
            Zone::Terrace => {
                let inner = z.floodplain_extent_cells * cell_size;
                let outer = z.terrace_extent_cells * cell_size;
                let progress = (distance - inner) / (outer - inner);
                river_elevation
                    + z.floodplain_height
                    + progress * (z.terrace_height - z.floodplain_height)
                    + sample(&self.terrace_noise, rng)
            }
            Zone::Hills => river_elevation + z.hill_height + sample(&self.hill_noise, rng),
        };
        (zone, value.max(river_elevation).max(self.floor))
    }

    /// 填充栅格中全部未赋值单元
    pub fn generate<R: Rng + ?Sized>(&self, grid: &mut Grid, channel: &RiverChannel, rng: &mut R) -> ZonalStats {
        let mut stats = ZonalStats::default();
        for (cell, elevation) in channel.cells() {
            grid.set(cell, elevation);
            stats.river_cells += 1;
        }

        let index = SpatialIndex::bulk_load(
            channel
                .points()
                .iter()
                .map(|p| (p.position, p.elevation))
                .collect(),
        );
        if index.is_empty() {
            return stats;
        }

        let spec = *grid.spec();
        let cell_size = spec.cell_size();
        let base_seed: u64 = rng.gen();

        let filled = grid
            .data_mut()
            .par_chunks_mut(spec.ncols())
            .enumerate()
            .map(|(row, cells)| {
                let mut row_rng = ChaCha8Rng::seed_from_u64(base_seed);
                row_rng.set_stream(row as u64);
                let mut counts = ZonalStats::default();

                for (col, value) in cells.iter_mut().enumerate() {
                    if !Grid::is_unset(*value) {
                        continue;
                    }
                    let center = spec.cell_center(row, col);
                    if let Some((_, &river_elevation, distance)) = index.nearest_with_distance(&center) {
                        let (zone, z) = self.elevation(distance, river_elevation, cell_size, &mut row_rng);
                        *value = z;
                        counts.record(zone);
                    }
                }
                counts
            })
            .reduce(ZonalStats::default, ZonalStats::merge);

        let stats = stats.merge(filled);
        tracing::info!(
            river_cells = stats.river_cells,
            channel = stats.channel,
            floodplain = stats.floodplain,
            terrace = stats.terrace,
            hills = stats.hills,
            "区带地形生成完成"
        );
        stats
    }
}

#[inline]
fn sample<R: Rng + ?Sized>(dist: &Option<Normal<f64>>, rng: &mut R) -> f64 {
    dist.as_ref().map_or(0.0, |d| d.sample(rng))
}

// ============================================================================
// 测试
// ============================================================================
