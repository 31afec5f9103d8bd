// crates/rd_config/src/terrain_config.rs

//! TerrainConfig - 地形合成配置
//!
//! 全部字段均可由 JSON 读入，缺省值复现泰晤士河谷参考场景：
//! 边界框 (-0.35, 51.41)-(0.38, 51.52)，英国国家格网，50 m 单元，
//! 河道高程西端 12 m、东端 5 m，全局范围 4-14 m，随机种子 42。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use rd_geo::{Crs, GeoBounds};

/// 地形合成配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// 地理范围与目标坐标系
    #[serde(default)]
    pub region: RegionConfig,

    /// 栅格参数
    #[serde(default)]
    pub grid: GridConfig,

    /// 河道高程剖面参数
    #[serde(default)]
    pub river: RiverConfig,

    /// 区带参数
    #[serde(default)]
    pub zones: ZoneProfile,

    /// 河道约束参数
    #[serde(default)]
    pub enforcement: EnforcementConfig,

    /// 平滑参数
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// 验证阈值
    #[serde(default)]
    pub validation: ValidationConfig,

    /// 输出参数
    #[serde(default)]
    pub output: OutputConfig,

    /// 随机种子
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 { 42 }

// ============================================================================
// 各配置段
// ============================================================================

/// 地理范围
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// 西边界经度
    #[serde(default = "default_min_lon")]
    pub min_lon: f64,
    /// 南边界纬度
    #[serde(default = "default_min_lat")]
    pub min_lat: f64,
    /// 东边界经度
    #[serde(default = "default_max_lon")]
    pub max_lon: f64,
    /// 北边界纬度
    #[serde(default = "default_max_lat")]
    pub max_lat: f64,
    /// 目标平面坐标系 EPSG 代码
    #[serde(default = "default_target_epsg")]
    pub target_epsg: u32,
}

fn default_min_lon() -> f64 { -0.35 }
fn default_min_lat() -> f64 { 51.41 }
fn default_max_lon() -> f64 { 0.38 }
fn default_max_lat() -> f64 { 51.52 }
fn default_target_epsg() -> u32 { 27700 }

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_lon: default_min_lon(),
            min_lat: default_min_lat(),
            max_lon: default_max_lon(),
            max_lat: default_max_lat(),
            target_epsg: default_target_epsg(),
        }
    }
}

impl RegionConfig {
    /// 地理边界框
    pub fn geo_bounds(&self) -> ConfigResult<GeoBounds> {
        Ok(GeoBounds::new(self.min_lon, self.min_lat, self.max_lon, self.max_lat)?)
    }

    /// 目标坐标系
    pub fn crs(&self) -> ConfigResult<Crs> {
        Ok(Crs::from_epsg(self.target_epsg)?)
    }
}

/// 栅格参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// 单元尺寸 [m]
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    /// 输出文件中的无数据值
    #[serde(default = "default_nodata")]
    pub nodata: f64,
}

fn default_cell_size() -> f64 { 50.0 }
fn default_nodata() -> f64 { -9999.0 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            nodata: default_nodata(),
        }
    }
}

/// 河道高程剖面参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiverConfig {
    /// 上游（西端）目标高程 [m]
    #[serde(default = "default_west_elevation")]
    pub west_elevation: f64,
    /// 下游（东端）目标高程 [m]
    #[serde(default = "default_east_elevation")]
    pub east_elevation: f64,
    /// 扰动幅度，扰动取 [-v/2, +v/2] 均匀分布 [m]
    #[serde(default = "default_variation_amplitude")]
    pub variation_amplitude: f64,
    /// 河道高程下限 [m]
    #[serde(default = "default_global_min")]
    pub global_min: f64,
    /// 河道高程上限 [m]
    #[serde(default = "default_global_max")]
    pub global_max: f64,
    /// 逆坡时的下游步长 ε [m]
    #[serde(default = "default_downstream_step")]
    pub downstream_step: f64,
}

fn default_west_elevation() -> f64 { 12.0 }
fn default_east_elevation() -> f64 { 5.0 }
fn default_variation_amplitude() -> f64 { 1.0 }
fn default_global_min() -> f64 { 4.0 }
fn default_global_max() -> f64 { 14.0 }
fn default_downstream_step() -> f64 { 0.1 }

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            west_elevation: default_west_elevation(),
            east_elevation: default_east_elevation(),
            variation_amplitude: default_variation_amplitude(),
            global_min: default_global_min(),
            global_max: default_global_max(),
            downstream_step: default_downstream_step(),
        }
    }
}

/// 区带参数
///
/// 距离以单元数计，换算成米时乘以单元尺寸。区带按与最近河道点的距离划分：
///
/// ```text
/// 0 ── channel ── floodplain_extent ── terrace_extent ──> hills
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneProfile {
    /// 河槽带外缘距离 [cells]
    #[serde(default = "default_channel_width_cells")]
    pub channel_width_cells: f64,
    /// 河漫滩外缘距离 [cells]
    #[serde(default = "default_floodplain_extent_cells")]
    pub floodplain_extent_cells: f64,
    /// 阶地外缘距离 [cells]
    #[serde(default = "default_terrace_extent_cells")]
    pub terrace_extent_cells: f64,
    /// 河漫滩外缘相对河面高度 [m]
    #[serde(default = "default_floodplain_height")]
    pub floodplain_height: f64,
    /// 阶地外缘相对河面高度 [m]
    #[serde(default = "default_terrace_height")]
    pub terrace_height: f64,
    /// 丘陵相对河面高度 [m]
    #[serde(default = "default_hill_height")]
    pub hill_height: f64,
    /// 河槽均匀扰动半幅 [m]
    #[serde(default = "default_channel_jitter")]
    pub channel_jitter: f64,
    /// 河漫滩正态扰动标准差 [m]
    #[serde(default = "default_floodplain_sigma")]
    pub floodplain_sigma: f64,
    /// 阶地正态扰动标准差 [m]
    #[serde(default = "default_terrace_sigma")]
    pub terrace_sigma: f64,
    /// 丘陵正态扰动标准差 [m]
    #[serde(default = "default_hill_sigma")]
    pub hill_sigma: f64,
    /// 河道约束邻域的切比雪夫半径 [cells]
    #[serde(default = "default_buffer_radius_cells")]
    pub buffer_radius_cells: usize,
}

fn default_channel_width_cells() -> f64 { 4.0 }
fn default_floodplain_extent_cells() -> f64 { 20.0 }
fn default_terrace_extent_cells() -> f64 { 50.0 }
fn default_floodplain_height() -> f64 { 6.0 }
fn default_terrace_height() -> f64 { 15.0 }
fn default_hill_height() -> f64 { 25.0 }
fn default_channel_jitter() -> f64 { 0.5 }
fn default_floodplain_sigma() -> f64 { 1.0 }
fn default_terrace_sigma() -> f64 { 2.0 }
fn default_hill_sigma() -> f64 { 3.0 }
fn default_buffer_radius_cells() -> usize { 3 }

impl Default for ZoneProfile {
    fn default() -> Self {
        Self {
            channel_width_cells: default_channel_width_cells(),
            floodplain_extent_cells: default_floodplain_extent_cells(),
            terrace_extent_cells: default_terrace_extent_cells(),
            floodplain_height: default_floodplain_height(),
            terrace_height: default_terrace_height(),
            hill_height: default_hill_height(),
            channel_jitter: default_channel_jitter(),
            floodplain_sigma: default_floodplain_sigma(),
            terrace_sigma: default_terrace_sigma(),
            hill_sigma: default_hill_sigma(),
            buffer_radius_cells: default_buffer_radius_cells(),
        }
    }
}

impl ZoneProfile {
    /// 无扰动的区带参数，常用于测试
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.channel_jitter = 0.0;
        self.floodplain_sigma = 0.0;
        self.terrace_sigma = 0.0;
        self.hill_sigma = 0.0;
        self
    }
}

/// 河道约束参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// 第一圈相对河面抬高 [m]
    #[serde(default = "default_channel_offset")]
    pub channel_offset: f64,
    /// 第 d 圈下限为 river + d·slope_step [m/ring]
    #[serde(default = "default_slope_step")]
    pub slope_step: f64,
}

fn default_channel_offset() -> f64 { 0.5 }
fn default_slope_step() -> f64 { 0.4 }

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            channel_offset: default_channel_offset(),
            slope_step: default_slope_step(),
        }
    }
}

/// 平滑参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// 高斯核标准差 [cells]，0 表示跳过平滑
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// 核截断倍数，半径 = round(truncate·sigma)
    #[serde(default = "default_truncate")]
    pub truncate: f64,
}

/// 平滑核半径上限 [cells]，约束 `sigma·truncate`
pub const MAX_SMOOTHING_RADIUS: f64 = 256.0;

fn default_sigma() -> f64 { 0.5 }
fn default_truncate() -> f64 { 4.0 }

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            sigma: default_sigma(),
            truncate: default_truncate(),
        }
    }
}

/// 验证阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// 局部极小覆盖率下限
    #[serde(default = "default_min_local_minima_ratio")]
    pub min_local_minima_ratio: f64,
}

fn default_min_local_minima_ratio() -> f64 { 0.9 }

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_local_minima_ratio: default_min_local_minima_ratio(),
        }
    }
}

/// 输出参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出栅格路径
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// 写出小数位数
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

fn default_output_path() -> PathBuf { PathBuf::from("output/thames_dem.asc") }
fn default_decimals() -> usize { 2 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            decimals: default_decimals(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            region: RegionConfig::default(),
            grid: GridConfig::default(),
            river: RiverConfig::default(),
            zones: ZoneProfile::default(),
            enforcement: EnforcementConfig::default(),
            smoothing: SmoothingConfig::default(),
            validation: ValidationConfig::default(),
            output: OutputConfig::default(),
            seed: default_seed(),
        }
    }
}

// ============================================================================
// 加载 / 保存 / 验证
// ============================================================================

impl TerrainConfig {
    /// 从 JSON 文件加载并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: TerrainConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存为 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> ConfigResult<()> {
        self.validate_region()?;
        self.validate_grid()?;
        self.validate_river()?;
        self.validate_zones()?;
        self.validate_post_processing()?;

        if !(0.0..=1.0).contains(&self.validation.min_local_minima_ratio) {
            return Err(ConfigError::invalid(
                "validation.min_local_minima_ratio",
                self.validation.min_local_minima_ratio,
                "必须在 [0, 1] 范围内",
            ));
        }
        if self.output.decimals > 12 {
            return Err(ConfigError::invalid("output.decimals", self.output.decimals, "不能超过 12"));
        }
        Ok(())
    }

    fn validate_region(&self) -> ConfigResult<()> {
        let r = &self.region;
        if !(r.max_lon > r.min_lon) {
            return Err(ConfigError::invalid(
                "region.max_lon",
                r.max_lon,
                format!("必须大于 min_lon ({})", r.min_lon),
            ));
        }
        if !(r.max_lat > r.min_lat) {
            return Err(ConfigError::invalid(
                "region.max_lat",
                r.max_lat,
                format!("必须大于 min_lat ({})", r.min_lat),
            ));
        }
        r.geo_bounds()?;
        r.crs()?;
        Ok(())
    }

    fn validate_grid(&self) -> ConfigResult<()> {
        if !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0) {
            return Err(ConfigError::invalid("grid.cell_size", self.grid.cell_size, "单元尺寸必须为正"));
        }
        if !self.grid.nodata.is_finite() {
            return Err(ConfigError::invalid("grid.nodata", self.grid.nodata, "必须为有限值"));
        }
        Ok(())
    }

    fn validate_river(&self) -> ConfigResult<()> {
        let r = &self.river;
        for (key, value) in [
            ("river.west_elevation", r.west_elevation),
            ("river.east_elevation", r.east_elevation),
            ("river.global_min", r.global_min),
            ("river.global_max", r.global_max),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(key, value, "必须为有限值"));
            }
        }
        if r.global_min > r.global_max {
            return Err(ConfigError::invalid(
                "river.global_min",
                r.global_min,
                format!("不能大于 global_max ({})", r.global_max),
            ));
        }
        for (key, value) in [
            ("river.variation_amplitude", r.variation_amplitude),
            ("river.downstream_step", r.downstream_step),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(key, value, "必须为非负有限值"));
            }
        }
        Ok(())
    }

    fn validate_zones(&self) -> ConfigResult<()> {
        let z = &self.zones;
        if !(z.channel_width_cells > 0.0) {
            return Err(ConfigError::invalid("zones.channel_width_cells", z.channel_width_cells, "必须为正"));
        }
        if !(z.floodplain_extent_cells >= z.channel_width_cells) {
            return Err(ConfigError::invalid(
                "zones.floodplain_extent_cells",
                z.floodplain_extent_cells,
                "不能小于 channel_width_cells",
            ));
        }
        if !(z.terrace_extent_cells >= z.floodplain_extent_cells) {
            return Err(ConfigError::invalid(
                "zones.terrace_extent_cells",
                z.terrace_extent_cells,
                "不能小于 floodplain_extent_cells",
            ));
        }
        for (key, value) in [
            ("zones.floodplain_height", z.floodplain_height),
            ("zones.terrace_height", z.terrace_height),
            ("zones.hill_height", z.hill_height),
            ("zones.channel_jitter", z.channel_jitter),
            ("zones.floodplain_sigma", z.floodplain_sigma),
            ("zones.terrace_sigma", z.terrace_sigma),
            ("zones.hill_sigma", z.hill_sigma),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(key, value, "必须为非负有限值"));
            }
        }
        if z.buffer_radius_cells == 0 {
            return Err(ConfigError::invalid("zones.buffer_radius_cells", 0, "至少为 1"));
        }
        Ok(())
    }

    fn validate_post_processing(&self) -> ConfigResult<()> {
        if !(self.enforcement.channel_offset.is_finite() && self.enforcement.channel_offset > 0.0) {
            return Err(ConfigError::invalid(
                "enforcement.channel_offset",
                self.enforcement.channel_offset,
                "必须为正，否则河道点不是严格局部极小",
            ));
        }
        if !(self.enforcement.slope_step.is_finite() && self.enforcement.slope_step > 0.0) {
            return Err(ConfigError::invalid("enforcement.slope_step", self.enforcement.slope_step, "必须为正"));
        }
        if !(self.smoothing.sigma.is_finite() && self.smoothing.sigma >= 0.0) {
            return Err(ConfigError::invalid("smoothing.sigma", self.smoothing.sigma, "不能为负"));
        }
        if !(self.smoothing.truncate.is_finite() && self.smoothing.truncate > 0.0) {
            return Err(ConfigError::invalid("smoothing.truncate", self.smoothing.truncate, "必须为正的有限值"));
        }
        let reach = self.smoothing.sigma * self.smoothing.truncate;
        if reach > MAX_SMOOTHING_RADIUS {
            return Err(ConfigError::invalid(
                "smoothing.sigma",
                self.smoothing.sigma,
                format!("sigma·truncate = {reach} 超过核半径上限 {MAX_SMOOTHING_RADIUS}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_thames() {
        let config = TerrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region.target_epsg, 27700);
        assert_eq!(config.grid.cell_size, 50.0);
        assert_eq!(config.river.west_elevation, 12.0);
        assert_eq!(config.river.east_elevation, 5.0);
        assert_eq!(config.zones.buffer_radius_cells, 3);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_invalid_cell_size() {
        let mut config = TerrainConfig::default();
        config.grid.cell_size = 0.0;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "grid.cell_size"),
            other => panic!("期望 InvalidValue: {other:?}"),
        }
        config.grid.cell_size = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_bbox() {
        let mut config = TerrainConfig::default();
        config.region.max_lat = config.region.min_lat;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "region.max_lat"),
            other => panic!("期望 InvalidValue: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_epsg() {
        let mut config = TerrainConfig::default();
        config.region.target_epsg = 3857;
        assert!(matches!(config.validate(), Err(ConfigError::Geo(_))));
    }

    #[test]
    fn test_inverted_elevation_range() {
        let mut config = TerrainConfig::default();
        config.river.global_min = 15.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zone_ordering() {
        let mut config = TerrainConfig::default();
        config.zones.terrace_extent_cells = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_sigma() {
        let mut config = TerrainConfig::default();
        config.smoothing.sigma = -0.5;
        assert!(config.validate().is_err());
        config.smoothing.sigma = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_smoothing_reach_is_bounded() {
        let mut config = TerrainConfig::default();
        config.smoothing.sigma = 1e20;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "smoothing.sigma"),
            other => panic!("期望 InvalidValue: {other:?}"),
        }

        let mut config = TerrainConfig::default();
        config.smoothing.truncate = f64::INFINITY;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "smoothing.truncate"),
            other => panic!("期望 InvalidValue: {other:?}"),
        }

        let mut config = TerrainConfig::default();
        config.smoothing.truncate = 4.0;
        config.smoothing.sigma = MAX_SMOOTHING_RADIUS / 4.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_river_amplitudes_must_be_finite() {
        for (amplitude, step) in [(f64::INFINITY, 0.1), (1.0, f64::INFINITY), (f64::NAN, 0.1), (-1.0, 0.1)] {
            let mut config = TerrainConfig::default();
            config.river.variation_amplitude = amplitude;
            config.river.downstream_step = step;
            assert!(config.validate().is_err(), "amplitude={amplitude} step={step}");
        }
    }

    #[test]
    fn test_enforcement_must_be_finite() {
        let mut config = TerrainConfig::default();
        config.enforcement.channel_offset = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = TerrainConfig::default();
        config.enforcement.slope_step = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "grid": { "cell_size": 25.0 }, "seed": 7 }"#;
        let config: TerrainConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.grid.cell_size, 25.0);
        assert_eq!(config.grid.nodata, -9999.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.river, RiverConfig::default());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terrain.json");

        let mut config = TerrainConfig::default();
        config.seed = 1234;
        config.zones = config.zones.without_jitter();
        config.save_to_file(&path).unwrap();

        let loaded = TerrainConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "grid": { "cell_size": -1 } }"#).unwrap();
        assert!(matches!(
            TerrainConfig::from_file(&path),
            Err(ConfigError::InvalidValue { .. })
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(TerrainConfig::from_file(&path), Err(ConfigError::Parse(_))));
    }
}
