// apps/rd_cli/src/main.rs

//! RiverDEM 命令行界面
//!
//! 合成河道约束的 DEM、按经纬度查询高程、查看缺省配置。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 6: Application**，只负责参数解析、日志初始化与结果输出，
//! 全部计算委托给 `rd_terrain` 与 `rd_io`。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// RiverDEM 河道约束地形合成工具
#[derive(Parser)]
#[command(name = "rd_cli")]
#[command(author = "RiverDEM Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "River-constrained synthetic DEM generator", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 合成 DEM 并写出 ASCII 栅格
    Generate(commands::generate::GenerateArgs),
    /// 查询 DEM 在某点的高程
    Sample(commands::sample::SampleArgs),
    /// 显示配置信息
    Info(commands::info::InfoArgs),
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Sample(args) => commands::sample::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("bogus"), Level::INFO);
    }

    #[test]
    fn test_generate_args() {
        let cli = Cli::try_parse_from(["rd_cli", "-l", "debug", "generate", "--seed", "7", "--survey", "--strict"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.seed, Some(7));
                assert!(args.survey);
                assert!(args.strict);
                assert!(args.config.is_none());
            }
            _ => panic!("应解析为 generate"),
        }
    }

    #[test]
    fn test_sample_args() {
        let cli = Cli::try_parse_from([
            "rd_cli", "sample", "--dem", "dem.asc", "--lat", "51.5", "--lon", "-0.12",
        ])
        .unwrap();
        match cli.command {
            Commands::Sample(args) => {
                assert_eq!(args.lat, 51.5);
                assert_eq!(args.lon, -0.12);
                assert_eq!(args.epsg, 27700);
            }
            _ => panic!("应解析为 sample"),
        }
    }
}
