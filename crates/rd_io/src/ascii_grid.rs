// crates/rd_io/src/ascii_grid.rs

//! ESRI ASCII 栅格读写
//!
//! ```text
//! ncols         1020
//! nrows         272
//! xllcorner     514852.91
//! yllcorner     169177.65
//! cellsize      50
//! NODATA_value  -9999
//! <nrows 行，每行 ncols 个以空格分隔的数值>
//! ```
//!
//! 第一行数据对应最北一行，与 [`rd_terrain::raster`] 的行约定一致，
//! 读写两侧都不做翻转。未赋值 (NaN) 单元写为 `NODATA_value`，读回时还原为 NaN。

use std::io::{BufWriter, Write};
use std::path::Path;

use rd_config::TerrainConfig;
use rd_foundation::{ensure, require};
use tempfile::NamedTempFile;
use rd_terrain::{Grid, GridSpec};

use crate::error::{IoError, IoResult};

/// 缺省 NODATA 值
pub const DEFAULT_NODATA: f64 = -9999.0;

/// 缺省小数位数
pub const DEFAULT_DECIMALS: usize = 2;

// ============================================================================
// 写出
// ============================================================================

/// ASCII 栅格写出器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsciiGridWriter {
    nodata: f64,
    decimals: usize,
}

impl Default for AsciiGridWriter {
    fn default() -> Self {
        Self::new(DEFAULT_NODATA, DEFAULT_DECIMALS)
    }
}

impl AsciiGridWriter {
    /// 创建写出器
    #[must_use]
    pub fn new(nodata: f64, decimals: usize) -> Self {
        Self { nodata, decimals }
    }

    /// 使用配置中的 `grid.nodata` 与 `output.decimals`
    #[must_use]
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self::new(config.grid.nodata, config.output.decimals)
    }

    /// NODATA 值
    #[must_use]
    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// 写出到文件，父目录不存在时自动创建
    ///
    /// 先写同目录下的临时文件，完整写出后再改名到 `path`；
    /// 失败时临时文件随 drop 删除，`path` 保持原状。
    pub fn write(&self, grid: &Grid, path: impl AsRef<Path>) -> IoResult<()> {
        let path = path.as_ref();
        let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(|e| IoError::io(parent, e))?;
                parent
            }
            None => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| IoError::io(dir, e))?;
        {
            let mut w = BufWriter::new(temp.as_file_mut());
            self.write_to(grid, &mut w)
                .and_then(|()| w.flush())
                .map_err(|e| IoError::io(path, e))?;
        }
        temp.persist(path).map_err(|e| IoError::io(path, e.error))?;

        tracing::info!(
            path = %path.display(),
            nrows = grid.nrows(),
            ncols = grid.ncols(),
            "ASCII 栅格已写出"
        );
        Ok(())
    }

    /// 写出到任意 `Write`
    pub fn write_to<W: Write>(&self, grid: &Grid, w: &mut W) -> std::io::Result<()> {
        let spec = grid.spec();
        writeln!(w, "{:<14}{}", "ncols", spec.ncols())?;
        writeln!(w, "{:<14}{}", "nrows", spec.nrows())?;
        writeln!(w, "{:<14}{}", "xllcorner", spec.xll())?;
        writeln!(w, "{:<14}{}", "yllcorner", spec.yll())?;
        writeln!(w, "{:<14}{}", "cellsize", spec.cell_size())?;
        writeln!(w, "{:<14}{}", "NODATA_value", self.nodata)?;

        let prec = self.decimals;
        for row in 0..grid.nrows() {
            for (col, &v) in grid.row(row).iter().enumerate() {
                if col > 0 {
                    w.write_all(b" ")?;
                }
                if v.is_finite() {
                    write!(w, "{v:.prec$}")?;
                } else {
                    write!(w, "{}", self.nodata)?;
                }
            }
            w.write_all(b"\n")?;
        }
        Ok(())
    }
}

// ============================================================================
// 读取
// ============================================================================

/// 读入的 ASCII 栅格
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    /// 高程栅格，NODATA 单元为 NaN
    pub grid: Grid,
    /// 文件中的 NODATA 值
    pub nodata: f64,
}

/// ASCII 栅格读取器
pub struct AsciiGridReader;

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<(f64, bool)>,
    yll: Option<(f64, bool)>,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

impl AsciiGridReader {
    /// 从文件读取
    pub fn read(path: impl AsRef<Path>) -> IoResult<AsciiGrid> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
        let parsed = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            nrows = parsed.grid.nrows(),
            ncols = parsed.grid.ncols(),
            "ASCII 栅格已读取"
        );
        Ok(parsed)
    }

    /// 从文本解析，`file` 仅用于错误信息
    ///
    /// 头部关键字不区分大小写，也接受 `xllcenter`/`yllcenter`；
    /// 缺少 `NODATA_value` 时使用 -9999。数据可以跨行换行，但总数必须等于 `nrows·ncols`。
    pub fn parse(content: &str, file: &str) -> IoResult<AsciiGrid> {
        let mut header = Header::default();
        let mut lines = content.lines().enumerate().peekable();

        while let Some(&(i, line)) = lines.peek() {
            let mut tokens = line.split_whitespace();
            let Some(key) = tokens.next() else {
                lines.next();
                continue;
            };
            if !key.starts_with(|c: char| c.is_ascii_alphabetic()) {
                break;
            }
            let line_no = i + 1;
            let value = require!(tokens.next(), IoError::parse(file, line_no, format!("{key} 缺少数值")));
            let number = |v: &str| -> IoResult<f64> {
                v.parse::<f64>()
                    .map_err(|_| IoError::parse(file, line_no, format!("{key} 的值无效: {v}")))
            };
            let count = |v: &str| -> IoResult<usize> {
                v.parse::<usize>()
                    .map_err(|_| IoError::parse(file, line_no, format!("{key} 必须为非负整数: {v}")))
            };

            match key.to_ascii_lowercase().as_str() {
                "ncols" => header.ncols = Some(count(value)?),
                "nrows" => header.nrows = Some(count(value)?),
                "xllcorner" => header.xll = Some((number(value)?, false)),
                "xllcenter" => header.xll = Some((number(value)?, true)),
                "yllcorner" => header.yll = Some((number(value)?, false)),
                "yllcenter" => header.yll = Some((number(value)?, true)),
                "cellsize" => header.cellsize = Some(number(value)?),
                "nodata_value" => header.nodata = Some(number(value)?),
                _ => return Err(IoError::parse(file, line_no, format!("未知的头部关键字: {key}"))),
            }
            lines.next();
        }

        let header_end = lines.peek().map_or(content.lines().count(), |(i, _)| *i) + 1;
        let missing = |name: &str| IoError::parse(file, header_end, format!("头部缺少 {name}"));
        let ncols = require!(header.ncols, missing("ncols"));
        let nrows = require!(header.nrows, missing("nrows"));
        let cellsize = require!(header.cellsize, missing("cellsize"));
        let (xll, x_center) = require!(header.xll, missing("xllcorner"));
        let (yll, y_center) = require!(header.yll, missing("yllcorner"));
        let nodata = header.nodata.unwrap_or(DEFAULT_NODATA);

        let half = cellsize / 2.0;
        let xll = if x_center { xll - half } else { xll };
        let yll = if y_center { yll - half } else { yll };
        let spec = GridSpec::new(xll, yll, cellsize, nrows, ncols)?;

        let mut data = Vec::with_capacity(spec.len().min(1 << 24));
        let mut last_line = header_end;
        for (i, line) in lines {
            last_line = i + 1;
            for token in line.split_whitespace() {
                let v: f64 = token
                    .parse()
                    .map_err(|_| IoError::parse(file, i + 1, format!("数值无效: {token}")))?;
                ensure!(
                    data.len() < spec.len(),
                    IoError::parse(file, i + 1, format!("数据多于 {nrows}×{ncols} 个"))
                );
                data.push(if v == nodata { f64::NAN } else { v });
            }
        }
        ensure!(
            data.len() == spec.len(),
            IoError::parse(
                file,
                last_line,
                format!("数据只有 {} 个，需要 {nrows}×{ncols} 个", data.len())
            )
        );

        Ok(AsciiGrid {
            grid: Grid::from_data(spec, data)?,
            nodata,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================
