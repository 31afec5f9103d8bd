// apps/rd_cli/src/commands/sample.rs

//! 高程查询命令

use anyhow::{Context, Result};
use clap::Args;
use rd_geo::{CoordinateProjector, GeoPoint};
use rd_io::{DemSampler, ElevationSample};
use std::path::PathBuf;

/// 查询参数
#[derive(Args)]
pub struct SampleArgs {
    /// ASCII 栅格文件
    #[arg(short, long)]
    pub dem: PathBuf,

    /// 纬度 (WGS84)
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// 经度 (WGS84)
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// 栅格坐标系 EPSG 代码
    #[arg(long, default_value_t = 27700)]
    pub epsg: u32,
}

/// 执行查询命令
pub fn execute(args: SampleArgs) -> Result<()> {
    let projector = CoordinateProjector::from_epsg(args.epsg).context("无法构造投影")?;
    let sampler = DemSampler::from_file(&args.dem, projector)
        .with_context(|| format!("无法读取栅格 {}", args.dem.display()))?;

    let point = GeoPoint::new(args.lat, args.lon);
    match sampler.sample(&point).context("查询失败")? {
        ElevationSample::Value(z) => println!("{:.2}", z),
        ElevationSample::NoData => println!("NODATA"),
        ElevationSample::OutOfBounds => println!("OUT_OF_BOUNDS"),
    }
    Ok(())
}
