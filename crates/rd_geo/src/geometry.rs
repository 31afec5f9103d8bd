// crates/rd_geo/src/geometry.rs
//! 几何类型
//!
//! - [`GeoPoint`]：地理坐标（纬度、经度，十进制度）
//! - [`Point2D`]：投影平面坐标（米）
//! - [`GeoBounds`] / [`ProjectedBounds`]：两种坐标下的边界框，构造时校验 `max > min`

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// 点
// ============================================================================

/// 地理坐标点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// 纬度 (度)
    pub lat: f64,
    /// 经度 (度)
    pub lon: f64,
}

impl GeoPoint {
    /// 创建地理坐标点
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// 两个分量均为有限值
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// 校验纬度/经度取值范围
    pub fn validate(&self) -> GeoResult<()> {
        GeoError::check_coordinate("纬度", self.lat, -90.0, 90.0)?;
        GeoError::check_coordinate("经度", self.lon, -180.0, 180.0)
    }
}

/// 平面坐标点（东坐标 x，北坐标 y）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// 东坐标 (m)
    pub x: f64,
    /// 北坐标 (m)
    pub y: f64,
}

impl Point2D {
    /// 创建平面点
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 欧氏距离
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// 边界框
// ============================================================================

/// 地理边界框
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// 西边界经度
    pub min_lon: f64,
    /// 南边界纬度
    pub min_lat: f64,
    /// 东边界经度
    pub max_lon: f64,
    /// 北边界纬度
    pub max_lat: f64,
}

impl GeoBounds {
    /// 创建并校验地理边界框
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> GeoResult<Self> {
        GeoError::check_interval("经度", min_lon, max_lon)?;
        GeoError::check_interval("纬度", min_lat, max_lat)?;
        GeoError::check_coordinate("纬度", min_lat, -90.0, 90.0)?;
        GeoError::check_coordinate("纬度", max_lat, -90.0, 90.0)?;
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// 四个角点，顺序：西南、东南、东北、西北
    #[must_use]
    pub fn corners(&self) -> [GeoPoint; 4] {
        [
            GeoPoint::new(self.min_lat, self.min_lon),
            GeoPoint::new(self.min_lat, self.max_lon),
            GeoPoint::new(self.max_lat, self.max_lon),
            GeoPoint::new(self.max_lat, self.min_lon),
        ]
    }

    /// 点是否落在边界框内（含边界）
    #[must_use]
    pub fn contains(&self, p: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }
}

/// 投影坐标边界框
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedBounds {
    /// 最小东坐标
    pub min_easting: f64,
    /// 最小北坐标
    pub min_northing: f64,
    /// 最大东坐标
    pub max_easting: f64,
    /// 最大北坐标
    pub max_northing: f64,
}

impl ProjectedBounds {
    /// 创建并校验投影边界框，任一轴 `max <= min` 即报错
    pub fn new(
        min_easting: f64,
        min_northing: f64,
        max_easting: f64,
        max_northing: f64,
    ) -> GeoResult<Self> {
        GeoError::check_interval("东坐标", min_easting, max_easting)?;
        GeoError::check_interval("北坐标", min_northing, max_northing)?;
        Ok(Self {
            min_easting,
            min_northing,
            max_easting,
            max_northing,
        })
    }

    /// 由点集求包络
    pub fn envelope<I>(points: I) -> GeoResult<Self>
    where
        I: IntoIterator<Item = Point2D>,
    {
        let mut min = Point2D::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self::new(min.x, min.y, max.x, max.y)
    }

    /// 东西向宽度
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_easting - self.min_easting
    }

    /// 南北向高度
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_northing - self.min_northing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projected_bounds_rejects_inverted() {
        assert!(ProjectedBounds::new(0.0, 0.0, 1000.0, 1000.0).is_ok());
        assert!(matches!(
            ProjectedBounds::new(1000.0, 0.0, 1000.0, 500.0),
            Err(GeoError::InvalidBounds { axis: "东坐标", .. })
        ));
        assert!(matches!(
            ProjectedBounds::new(0.0, 500.0, 10.0, 100.0),
            Err(GeoError::InvalidBounds { axis: "北坐标", .. })
        ));
        assert!(ProjectedBounds::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_envelope() {
        let b = ProjectedBounds::envelope([
            Point2D::new(3.0, 9.0),
            Point2D::new(-1.0, 4.0),
            Point2D::new(7.0, 5.0),
        ])
        .unwrap();
        assert_eq!(b, ProjectedBounds::new(-1.0, 4.0, 7.0, 9.0).unwrap());
        assert_eq!(b.width(), 8.0);
        assert_eq!(b.height(), 5.0);

        // 空集无法构成有效包络
        assert!(ProjectedBounds::envelope(Vec::new()).is_err());
    }

    #[test]
    fn test_geo_bounds() {
        let b = GeoBounds::new(-0.35, 51.41, 0.38, 51.52).unwrap();
        assert!(b.contains(&GeoPoint::new(51.5, 0.0)));
        assert!(!b.contains(&GeoPoint::new(51.6, 0.0)));
        assert_eq!(b.corners()[2], GeoPoint::new(51.52, 0.38));
        assert!(GeoBounds::new(0.38, 51.41, -0.35, 51.52).is_err());
    }

    #[test]
    fn test_geo_point_validate() {
        assert!(GeoPoint::new(51.5, -0.1).validate().is_ok());
        assert!(GeoPoint::new(f64::NAN, -0.1).validate().is_err());
        assert!(!GeoPoint::new(51.5, f64::INFINITY).is_finite());
    }
}
