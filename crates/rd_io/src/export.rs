// crates/rd_io/src/export.rs

//! 合成并写出 DEM
//!
//! 先完整运行流水线，成功后才创建输出文件，致命错误不会留下半成品。

use std::path::Path;

use rd_config::TerrainConfig;
use rd_terrain::{RiverProfile, TerrainOutput, TerrainPipeline};

use crate::ascii_grid::AsciiGridWriter;
use crate::error::IoResult;

/// 运行流水线并把栅格写到 `path`
pub fn export_dem(config: TerrainConfig, profile: &RiverProfile, path: impl AsRef<Path>) -> IoResult<TerrainOutput> {
    let writer = AsciiGridWriter::from_config(&config);
    let pipeline = TerrainPipeline::new(config)?;
    let output = pipeline.run(profile)?;
    writer.write(&output.grid, path)?;
    Ok(output)
}

/// 写到配置中的 `output.path`
pub fn export_dem_to_configured_path(config: TerrainConfig, profile: &RiverProfile) -> IoResult<TerrainOutput> {
    let path = config.output.path.clone();
    export_dem(config, profile, path)
}
