// crates/rd_terrain/src/raster.rs

//! 栅格数据管理
//!
//! 行列约定（全工作区统一）：
//!
//! - 数据按行主序存储，**第 0 行为最北一行**，与 ESRI ASCII 栅格一致
//! - 原点 `(xll, yll)` 为栅格西南角
//! - 单元 `(row, col)` 中心为 `(xll + (col+0.5)·cs, yll + (nrows-row-0.5)·cs)`
//! - 点所在单元：`col = floor((x - xll) / cs)`，`row = floor((yll + nrows·cs - y) / cs)`
//!
//! 未赋值单元以 NaN 表示，0 是合法高程，不能用作哨兵。

use rd_geo::{Point2D, ProjectedBounds};
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// 栅格单元索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellIndex {
    /// 行号（0 为最北）
    pub row: usize,
    /// 列号（0 为最西）
    pub col: usize,
}

impl CellIndex {
    /// 创建单元索引
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// 与另一单元的切比雪夫距离
    #[must_use]
    pub fn chebyshev(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

// ============================================================================
// GridSpec
// ============================================================================

/// 栅格几何描述，构造后不可变，按值传给每个阶段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    xll: f64,
    yll: f64,
    cell_size: f64,
    nrows: usize,
    ncols: usize,
}

impl GridSpec {
    /// 直接由原点、单元尺寸与行列数创建
    pub fn new(xll: f64, yll: f64, cell_size: f64, nrows: usize, ncols: usize) -> TerrainResult<Self> {
        check_cell_size(cell_size)?;
        if !(xll.is_finite() && yll.is_finite()) {
            return Err(TerrainError::configuration("grid.origin", format!("原点不是有限值: ({xll}, {yll})")));
        }
        if nrows == 0 || ncols == 0 {
            return Err(TerrainError::Bounds {
                nrows: nrows as i64,
                ncols: ncols as i64,
            });
        }
        Ok(Self {
            xll,
            yll,
            cell_size,
            nrows,
            ncols,
        })
    }

    /// 由投影边界框派生：行列数向零截断
    pub fn from_bounds(bounds: &ProjectedBounds, cell_size: f64) -> TerrainResult<Self> {
        check_cell_size(cell_size)?;
        let ncols = (bounds.width() / cell_size).floor() as i64;
        let nrows = (bounds.height() / cell_size).floor() as i64;
        if nrows <= 0 || ncols <= 0 {
            return Err(TerrainError::Bounds { nrows, ncols });
        }
        Self::new(
            bounds.min_easting,
            bounds.min_northing,
            cell_size,
            nrows as usize,
            ncols as usize,
        )
    }

    /// 西南角东坐标
    #[inline]
    #[must_use]
    pub fn xll(&self) -> f64 {
        self.xll
    }

    /// 西南角北坐标
    #[inline]
    #[must_use]
    pub fn yll(&self) -> f64 {
        self.yll
    }

    /// 单元尺寸 [m]
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// 行数
    #[inline]
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// 列数
    #[inline]
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// 单元总数
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nrows * self.ncols
    }

    /// 行列数均为正，恒为 false
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 北边界
    #[must_use]
    pub fn y_top(&self) -> f64 {
        self.yll + self.nrows as f64 * self.cell_size
    }

    /// 东边界
    #[must_use]
    pub fn x_right(&self) -> f64 {
        self.xll + self.ncols as f64 * self.cell_size
    }

    /// 单元中心坐标
    #[must_use]
    pub fn cell_center(&self, row: usize, col: usize) -> Point2D {
        Point2D::new(
            self.xll + (col as f64 + 0.5) * self.cell_size,
            self.yll + (self.nrows as f64 - row as f64 - 0.5) * self.cell_size,
        )
    }

    /// 点所在单元，栅格外返回 `None`
    #[must_use]
    pub fn locate(&self, point: &Point2D) -> Option<CellIndex> {
        let col = ((point.x - self.xll) / self.cell_size).floor();
        let row = ((self.y_top() - point.y) / self.cell_size).floor();
        // NaN 比较恒为 false，一并拒绝
        if !(col >= 0.0 && row >= 0.0) {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.nrows && col < self.ncols).then_some(CellIndex { row, col })
    }

    /// 行主序线性下标
    #[inline]
    #[must_use]
    pub fn offset(&self, cell: CellIndex) -> usize {
        cell.row * self.ncols + cell.col
    }

    /// 以 `center` 为中心、切比雪夫半径 `radius` 的窗口内全部单元（已裁剪到栅格内）
    pub fn window(&self, center: CellIndex, radius: usize) -> impl Iterator<Item = (CellIndex, usize)> + '_ {
        let r0 = center.row.saturating_sub(radius);
        let r1 = (center.row + radius).min(self.nrows - 1);
        let c0 = center.col.saturating_sub(radius);
        let c1 = (center.col + radius).min(self.ncols - 1);
        (r0..=r1).flat_map(move |row| {
            (c0..=c1).map(move |col| {
                let cell = CellIndex { row, col };
                (cell, cell.chebyshev(&center))
            })
        })
    }
}

fn check_cell_size(cell_size: f64) -> TerrainResult<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::configuration("grid.cell_size", format!("单元尺寸必须为正: {cell_size}")))
    }
}

// ============================================================================
// Grid
// ============================================================================

/// 高程栅格
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    spec: GridSpec,
    data: Vec<f64>,
}

impl Grid {
    /// 创建全部未赋值 (NaN) 的栅格
    #[must_use]
    pub fn unset(spec: GridSpec) -> Self {
        Self {
            data: vec![f64::NAN; spec.len()],
            spec,
        }
    }

    /// 创建以常数填充的栅格
    #[must_use]
    pub fn filled(spec: GridSpec, value: f64) -> Self {
        Self {
            data: vec![value; spec.len()],
            spec,
        }
    }

    /// 由行主序数据创建
    pub fn from_data(spec: GridSpec, data: Vec<f64>) -> TerrainResult<Self> {
        if data.len() != spec.len() {
            return Err(TerrainError::configuration(
                "grid.data",
                format!("数据长度 {} 与 {}×{} 不符", data.len(), spec.nrows(), spec.ncols()),
            ));
        }
        Ok(Self { spec, data })
    }

    /// 几何描述
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// 行数
    #[inline]
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.spec.nrows()
    }

    /// 列数
    #[inline]
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.spec.ncols()
    }

    /// 行主序数据
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// 可变行主序数据
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// 取出底层数据
    #[must_use]
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// 单元值，越界返回 `None`
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.nrows() && col < self.ncols()).then(|| self.data[row * self.ncols() + col])
    }

    /// 按索引取值
    #[inline]
    #[must_use]
    pub fn at(&self, cell: CellIndex) -> Option<f64> {
        self.get(cell.row, cell.col)
    }

    /// 写入单元值，越界时忽略
    #[inline]
    pub fn set(&mut self, cell: CellIndex, value: f64) {
        if cell.row < self.nrows() && cell.col < self.ncols() {
            let i = self.spec.offset(cell);
            self.data[i] = value;
        }
    }

    /// 第 `row` 行
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.ncols();
        &self.data[row * n..(row + 1) * n]
    }

    /// 是否为未赋值哨兵
    #[inline]
    #[must_use]
    pub fn is_unset(value: f64) -> bool {
        value.is_nan()
    }

    /// 未赋值单元数
    #[must_use]
    pub fn count_unset(&self) -> usize {
        self.data.iter().filter(|v| Self::is_unset(**v)).count()
    }

    /// 已赋值单元的 (最小, 最大)，全部未赋值时为 `None`
    #[must_use]
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !Self::is_unset(*v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ============================================================================
// GridAllocator
// ============================================================================

/// 栅格分配器
pub struct GridAllocator;

impl GridAllocator {
    /// 由投影边界框与单元尺寸分配全部未赋值的栅格
    ///
    /// `ncols = floor(width / cs)`，`nrows = floor(height / cs)`。
    pub fn allocate(bounds: &ProjectedBounds, cell_size: f64) -> TerrainResult<Grid> {
        let spec = GridSpec::from_bounds(bounds, cell_size)?;
        tracing::debug!(nrows = spec.nrows(), ncols = spec.ncols(), cell_size, "分配栅格");
        Ok(Grid::unset(spec))
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(max_e: f64, max_n: f64) -> ProjectedBounds {
        ProjectedBounds::new(0.0, 0.0, max_e, max_n).unwrap()
    }

    #[test]
    fn test_allocate_square() {
        let grid = GridAllocator::allocate(&bounds(1000.0, 1000.0), 50.0).unwrap();
        assert_eq!(grid.ncols(), 20);
        assert_eq!(grid.nrows(), 20);
        assert_eq!(grid.count_unset(), 400);
        assert!(grid.min_max().is_none());
    }

    #[test]
    fn test_allocate_truncates() {
        let grid = GridAllocator::allocate(&bounds(1049.9, 260.0), 50.0).unwrap();
        assert_eq!(grid.ncols(), 20);
        assert_eq!(grid.nrows(), 5);
    }

    #[test]
    fn test_allocate_rejects_bad_cell_size() {
        for cs in [0.0, -50.0, f64::NAN] {
            let err = GridAllocator::allocate(&bounds(1000.0, 1000.0), cs).unwrap_err();
            assert!(err.is_configuration(), "cs={cs}: {err}");
        }
    }

    #[test]
    fn test_allocate_rejects_empty_grid() {
        let err = GridAllocator::allocate(&bounds(1000.0, 30.0), 50.0).unwrap_err();
        assert!(matches!(err, TerrainError::Bounds { nrows: 0, ncols: 20 }));
    }

    #[test]
    fn test_row_zero_is_north() {
        let spec = GridSpec::new(1000.0, 2000.0, 10.0, 4, 3).unwrap();
        let nw = spec.cell_center(0, 0);
        assert_eq!(nw, Point2D::new(1005.0, 2035.0));
        let se = spec.cell_center(3, 2);
        assert_eq!(se, Point2D::new(1025.0, 2005.0));
    }

    #[test]
    fn test_locate_inverts_cell_center() {
        let spec = GridSpec::new(1000.0, 2000.0, 10.0, 4, 3).unwrap();
        for row in 0..4 {
            for col in 0..3 {
                let c = spec.cell_center(row, col);
                assert_eq!(spec.locate(&c), Some(CellIndex::new(row, col)));
            }
        }
        assert_eq!(spec.locate(&Point2D::new(999.0, 2010.0)), None);
        assert_eq!(spec.locate(&Point2D::new(1010.0, 2040.5)), None);
        assert_eq!(spec.locate(&Point2D::new(1030.0, 2010.0)), None);
        assert_eq!(spec.locate(&Point2D::new(f64::NAN, 2010.0)), None);
    }

    #[test]
    fn test_window_clipped() {
        let spec = GridSpec::new(0.0, 0.0, 1.0, 10, 10).unwrap();
        assert_eq!(spec.window(CellIndex::new(5, 5), 3).count(), 49);
        assert_eq!(spec.window(CellIndex::new(0, 0), 3).count(), 16);

        let max_d = spec
            .window(CellIndex::new(5, 5), 2)
            .map(|(_, d)| d)
            .max()
            .unwrap();
        assert_eq!(max_d, 2);
    }

    #[test]
    fn test_grid_access() {
        let spec = GridSpec::new(0.0, 0.0, 1.0, 2, 3).unwrap();
        let mut grid = Grid::from_data(spec, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(grid.get(1, 2), Some(6.0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.row(0), &[1.0, 2.0, 3.0]);

        grid.set(CellIndex::new(0, 1), f64::NAN);
        assert_eq!(grid.count_unset(), 1);
        assert_eq!(grid.min_max(), Some((1.0, 6.0)));

        assert!(Grid::from_data(spec, vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_zero_is_not_unset() {
        let spec = GridSpec::new(0.0, 0.0, 1.0, 1, 2).unwrap();
        let grid = Grid::filled(spec, 0.0);
        assert_eq!(grid.count_unset(), 0);
    }
}
