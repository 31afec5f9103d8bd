// crates/rd_geo/src/spatial_index.rs
//! 空间索引
//!
//! 基于 R-tree 的点索引，主要用于“最近河道控制点”查询。
//!
//! # 示例
//!
//! ```
//! use rd_geo::spatial_index::SpatialIndex;
//! use rd_geo::geometry::Point2D;
//!
//! let index = SpatialIndex::bulk_load(vec![
//!     (Point2D::new(0.0, 0.0), 0_usize),
//!     (Point2D::new(100.0, 0.0), 1_usize),
//! ]);
//! let (_, id, dist) = index.nearest_with_distance(&Point2D::new(80.0, 0.0)).unwrap();
//! assert_eq!(*id, 1);
//! assert!((dist - 20.0).abs() < 1e-12);
//! ```

use crate::geometry::Point2D;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// 索引条目
#[derive(Debug, Clone)]
struct SpatialEntry<T> {
    point: Point2D,
    data: T,
}

impl<T> RTreeObject for SpatialEntry<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y])
    }
}

impl<T> PointDistance for SpatialEntry<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point.x - point[0];
        let dy = self.point.y - point[1];
        dx * dx + dy * dy
    }
}

/// 点空间索引
pub struct SpatialIndex<T> {
    tree: RTree<SpatialEntry<T>>,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SpatialIndex<T> {
    /// 创建空索引
    #[must_use]
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// 从点集批量构建
    #[must_use]
    pub fn bulk_load(points: Vec<(Point2D, T)>) -> Self {
        let entries = points
            .into_iter()
            .map(|(point, data)| SpatialEntry { point, data })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// 插入点
    pub fn insert(&mut self, point: Point2D, data: T) {
        self.tree.insert(SpatialEntry { point, data });
    }

    /// 最近点
    #[must_use]
    pub fn nearest(&self, query: &Point2D) -> Option<(&Point2D, &T)> {
        self.tree
            .nearest_neighbor(&[query.x, query.y])
            .map(|e| (&e.point, &e.data))
    }

    /// 最近点及其距离
    #[must_use]
    pub fn nearest_with_distance(&self, query: &Point2D) -> Option<(&Point2D, &T, f64)> {
        self.tree
            .nearest_neighbor(&[query.x, query.y])
            .map(|e| (&e.point, &e.data, e.point.distance_to(query)))
    }

    /// 给定半径内的全部点
    #[must_use]
    pub fn within_distance(&self, query: &Point2D, radius: f64) -> Vec<(&Point2D, &T)> {
        self.tree
            .locate_within_distance([query.x, query.y], radius * radius)
            .map(|e| (&e.point, &e.data))
            .collect()
    }

    /// 点数
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn river_like() -> SpatialIndex<usize> {
        let pts = (0..10)
            .map(|i| (Point2D::new(f64::from(i) * 100.0, f64::from(i % 3) * 10.0), i as usize))
            .collect();
        SpatialIndex::bulk_load(pts)
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let index = river_like();
        assert_eq!(index.len(), 10);

        for q in [Point2D::new(-50.0, 0.0), Point2D::new(449.0, 300.0), Point2D::new(2000.0, 5.0)] {
            let (_, id, dist) = index.nearest_with_distance(&q).unwrap();
            let brute = (0..10)
                .map(|i| Point2D::new(f64::from(i) * 100.0, f64::from(i % 3) * 10.0).distance_to(&q))
                .fold(f64::INFINITY, f64::min);
            assert!((dist - brute).abs() < 1e-9, "query {q:?} -> id {id}");
        }
    }

    #[test]
    fn test_within_distance() {
        let index = river_like();
        let found = index.within_distance(&Point2D::new(150.0, 0.0), 60.0);
        let mut ids: Vec<usize> = found.into_iter().map(|(_, id)| *id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_empty_index() {
        let mut index: SpatialIndex<u8> = SpatialIndex::new();
        assert!(index.is_empty());
        assert!(index.nearest(&Point2D::new(0.0, 0.0)).is_none());
        index.insert(Point2D::new(1.0, 1.0), 7);
        assert_eq!(index.nearest(&Point2D::new(0.0, 0.0)).map(|(_, v)| *v), Some(7));
    }
}
