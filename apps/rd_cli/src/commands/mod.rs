// apps/rd_cli/src/commands/mod.rs

//! 子命令

pub mod generate;
pub mod info;
pub mod sample;
