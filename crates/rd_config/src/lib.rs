// crates/rd_config/src/lib.rs

//! RiverDEM Config Layer (Layer 3)
//!
//! 配置层，提供 [`TerrainConfig`] 及各配置段。所有数值以 f64 存储，
//! 通过 serde JSON 读写，`validate()` 在流水线开始前做全部预检。
//!
//! # 层级架构
//!
//! ```text
//! Layer 4: rd_terrain  ─> 读取 TerrainConfig
//! Layer 3: rd_config   ─> TerrainConfig, ZoneProfile（本层）
//! Layer 2: rd_geo
//! Layer 1: rd_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod terrain_config;

pub use error::{ConfigError, ConfigResult};
pub use terrain_config::{
    EnforcementConfig, GridConfig, OutputConfig, RegionConfig, RiverConfig, SmoothingConfig,
    TerrainConfig, ValidationConfig, ZoneProfile, MAX_SMOOTHING_RADIUS,
};
