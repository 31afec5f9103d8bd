// apps/rd_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示配置（JSON）与由其派生的栅格几何。

use anyhow::{Context, Result};
use clap::Args;
use rd_config::TerrainConfig;
use rd_terrain::TerrainPipeline;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== RiverDEM 信息 ===");

    if args.defaults || args.config.is_none() {
        println!("=== 默认配置 ===");
        print_config(&TerrainConfig::default())?;
    }

    if let Some(path) = &args.config {
        let config = TerrainConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?;
        println!("=== {} ===", path.display());
        print_config(&config)?;
    }

    Ok(())
}

fn print_config(config: &TerrainConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);

    let pipeline = TerrainPipeline::new(config.clone()).context("配置无法生成栅格")?;
    let spec = pipeline.spec();
    let crs = pipeline.projector().crs();
    println!("\n坐标系: {crs}");
    println!("栅格: {} 行 × {} 列, 单元 {} m", spec.nrows(), spec.ncols(), spec.cell_size());
    println!("西南角: ({:.2}, {:.2})", spec.xll(), spec.yll());
    Ok(())
}
