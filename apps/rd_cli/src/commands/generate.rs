// apps/rd_cli/src/commands/generate.rs

//! 合成命令
//!
//! 读取配置（缺省为泰晤士河参考场景），运行流水线并写出 ASCII 栅格。

use anyhow::{bail, Context, Result};
use clap::Args;
use rd_config::TerrainConfig;
use rd_io::export_dem_to_configured_path;
use rd_terrain::reference::{thames_profile, thames_profile_with_survey};
use std::path::PathBuf;
use tracing::info;

/// 合成参数
#[derive(Args)]
pub struct GenerateArgs {
    /// 配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输出栅格路径，覆盖配置中的 output.path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 随机种子，覆盖配置中的 seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// 使用控制点的实测高程
    #[arg(long)]
    pub survey: bool,

    /// 验证报告输出路径 (JSON)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// 严格模式（验证警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行合成命令
pub fn execute(args: GenerateArgs) -> Result<()> {
    info!("=== RiverDEM 地形合成 ===");

    let mut config = match &args.config {
        Some(path) => TerrainConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
        None => TerrainConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    let path = config.output.path.clone();

    let profile = if args.survey {
        thames_profile_with_survey()
    } else {
        thames_profile()
    };
    info!("控制点: {}, 种子: {}, 实测高程: {}", profile.len(), config.seed, args.survey);

    let output = export_dem_to_configured_path(config, &profile).context("地形合成失败")?;

    let report = &output.report;
    println!("输出文件: {}", path.display());
    println!("栅格: {} 行 × {} 列", output.grid.nrows(), output.grid.ncols());
    println!("高程范围: {:.2} - {:.2} m", report.elevation_min, report.elevation_max);
    println!(
        "河道点: 检查 {}, 跳过 {}, 局部最小 {} ({:.1}%)",
        report.river_points_checked,
        report.river_points_skipped,
        report.local_minima_count,
        report.local_minima_ratio() * 100.0
    );
    println!("逆坡段: {}", report.uphill_segment_count);
    println!(
        "约束修改单元: {}, 平滑恢复单元: {}",
        output.enforcement.cells_modified, output.smoothing.cells_restored
    );

    if let Some(report_path) = &args.report {
        let json = serde_json::json!({
            "report": report,
            "warnings": output.warnings,
            "zonal": output.zonal,
            "enforcement": output.enforcement,
            "smoothing": output.smoothing,
            "river_elevations": output.river_elevations,
        });
        std::fs::write(report_path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("无法写出报告 {}", report_path.display()))?;
        info!("验证报告已写出: {}", report_path.display());
    }

    if output.warnings.is_empty() {
        println!("✓ 验证通过");
    } else {
        for warning in &output.warnings {
            println!("⚠ {warning}");
        }
        if args.strict {
            bail!("严格模式下存在 {} 个验证警告", output.warnings.len());
        }
    }

    Ok(())
}
