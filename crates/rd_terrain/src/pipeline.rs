// crates/rd_terrain/src/pipeline.rs

//! 地形合成流水线
//!
//! ```text
//! TerrainConfig ──new()──> 预检：配置、坐标系、投影边界、GridSpec
//!                               │
//! RiverProfile ──run()──> 1. 投影控制点
//!                         2. 分配栅格（全部未赋值）
//!                         3. 河道高程剖面 ──┐
//!                         4. 区带生成       │ 同一个 ChaCha8Rng
//!                         5. 河道约束  <────┘
//!                         6. 高斯平滑 + 恢复河道单元
//!                         7. 验证（只读）
//! ```
//!
//! 所有致命错误都在 `new()` 或 `run()` 的前两步返回，此后各阶段不会失败。
//! 写出栅格由调用方负责（见 `rd_io`）。

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rd_config::TerrainConfig;
use rd_geo::{CoordinateProjector, Point2D, ProjectedBounds};

use crate::enforcement::{ConstraintEnforcer, EnforcementStats};
use crate::error::{TerrainError, TerrainResult};
use crate::raster::{Grid, GridSpec};
use crate::river::{RiverChannel, RiverElevationProfiler, RiverProfile};
use crate::smoothing::{Smoother, SmoothingStats};
use crate::validation::{ValidationReport, ValidationThresholds, ValidationWarning, Validator};
use crate::zonal::{ZonalStats, ZonalTerrainGenerator};

/// 流水线输出
#[derive(Debug, Clone)]
pub struct TerrainOutput {
    /// 高程栅格
    pub grid: Grid,
    /// 投影后的河道
    pub river: RiverChannel,
    /// 河道剖面高程，与输入控制点一一对应
    pub river_elevations: Vec<f64>,
    /// 区带统计
    pub zonal: ZonalStats,
    /// 约束统计
    pub enforcement: EnforcementStats,
    /// 平滑统计
    pub smoothing: SmoothingStats,
    /// 验证报告
    pub report: ValidationReport,
    /// 按配置阈值得到的软性问题
    pub warnings: Vec<ValidationWarning>,
}

/// 地形合成流水线
#[derive(Debug, Clone)]
pub struct TerrainPipeline {
    config: TerrainConfig,
    projector: CoordinateProjector,
    bounds: ProjectedBounds,
    spec: GridSpec,
    smoother: Smoother,
}

impl TerrainPipeline {
    /// 预检配置并确定栅格几何
    pub fn new(config: TerrainConfig) -> TerrainResult<Self> {
        config.validate()?;
        let crs = config.region.crs()?;
        let projector = CoordinateProjector::new(crs)?;
        let bounds = projector.project_bounds(&config.region.geo_bounds()?)?;
        let spec = GridSpec::from_bounds(&bounds, config.grid.cell_size)?;
        let smoother = Smoother::from_config(&config.smoothing);

        tracing::info!(
            crs = %crs,
            nrows = spec.nrows(),
            ncols = spec.ncols(),
            cell_size = spec.cell_size(),
            smoothing_radius = smoother.radius(),
            "流水线已就绪"
        );
        Ok(Self {
            config,
            projector,
            bounds,
            spec,
            smoother,
        })
    }

    /// 配置
    #[must_use]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// 投影器
    #[must_use]
    pub fn projector(&self) -> &CoordinateProjector {
        &self.projector
    }

    /// 投影边界框
    #[must_use]
    pub fn bounds(&self) -> &ProjectedBounds {
        &self.bounds
    }

    /// 栅格几何
    #[must_use]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// 平滑器
    #[must_use]
    pub fn smoother(&self) -> &Smoother {
        &self.smoother
    }

    /// 验证阈值
    #[must_use]
    pub fn thresholds(&self) -> ValidationThresholds {
        ValidationThresholds {
            min_local_minima_ratio: self.config.validation.min_local_minima_ratio,
        }
    }

    /// 执行全部阶段
    pub fn run(&self, profile: &RiverProfile) -> TerrainResult<TerrainOutput> {
        let start = Instant::now();
        if profile.len() < 2 {
            return Err(TerrainError::configuration(
                "river.points",
                format!("至少需要 2 个控制点，实际 {}", profile.len()),
            ));
        }

        let positions = profile
            .points()
            .iter()
            .map(|p| self.projector.project_point(&p.location))
            .collect::<Result<Vec<Point2D>, _>>()?;

        let mut grid = Grid::unset(self.spec);
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let profiler = RiverElevationProfiler::from_config(&self.config.river);
        let river_elevations = profiler.assign(profile, &mut rng);
        let river = RiverChannel::new(&self.spec, profile, &positions, &river_elevations)?;
        tracing::info!(
            points = profile.len(),
            in_grid = river.points().len() - river.skipped(),
            cells = river.cells().count(),
            "河道剖面完成"
        );

        let zonal = ZonalTerrainGenerator::new(self.config.zones.clone(), self.config.river.global_min)
            .generate(&mut grid, &river, &mut rng);

        let enforcement =
            ConstraintEnforcer::from_config(&self.config.zones, &self.config.enforcement).enforce(&mut grid, &river);

        let smoothing = self.smoother.smooth(&mut grid, &river);

        let report = Validator::new(profiler.range()).validate(&grid, &river);
        let warnings = report.warnings(&self.thresholds());
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            warnings = warnings.len(),
            "地形合成完成"
        );
        Ok(TerrainOutput {
            grid,
            river,
            river_elevations,
            zonal,
            enforcement,
            smoothing,
            report,
            warnings,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================
