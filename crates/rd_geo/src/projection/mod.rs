// crates/rd_geo/src/projection/mod.rs
//! 坐标投影
//!
//! 整条流水线只使用一对固定的坐标参考系统：源为 WGS84 地理坐标 (EPSG:4326)，
//! 目标为 [`Crs`] 指定的平面投影。[`CoordinateProjector`] 在构造时解析目标
//! 坐标系并试算一次，无法解析时立即失败，之后的逐点投影不会再遇到配置问题。
//!
//! # 支持的目标坐标系
//!
//! | EPSG | 名称 | 实现 |
//! |------|------|------|
//! | 27700 | OSGB36 / British National Grid | Helmert 七参数 + Airy 1830 横轴墨卡托 |
//! | 32601-32660 | WGS84 / UTM 北半球 | 横轴墨卡托 |
//! | 32701-32760 | WGS84 / UTM 南半球 | 横轴墨卡托 |
//!
//! # 示例
//!
//! ```
//! use rd_geo::projection::{CoordinateProjector, Crs};
//!
//! let projector = CoordinateProjector::new(Crs::BritishNationalGrid).unwrap();
//! let (e, n) = projector.project(51.5, -0.1).unwrap();
//! assert!((e - 531_979.29).abs() < 0.05);
//! assert!((n - 179_606.91).abs() < 0.05);
//! ```

pub mod params;
pub mod transverse_mercator;

pub use params::TransverseMercatorParams;
pub use transverse_mercator::TransverseMercator;

use crate::datum::DatumShift;
use crate::error::{GeoError, GeoResult};
use crate::geometry::{GeoBounds, GeoPoint, Point2D, ProjectedBounds};
use serde::{Deserialize, Serialize};
use std::fmt;

const SUPPORTED_EPSG: &str = "27700, 32601-32660, 32701-32760";

// ============================================================================
// Crs
// ============================================================================

/// 目标平面坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Crs {
    /// 英国国家格网 (EPSG:27700)
    #[default]
    BritishNationalGrid,
    /// WGS84 UTM
    Utm {
        /// 带号 1-60
        zone: u8,
        /// 是否北半球
        north: bool,
    },
}

impl Crs {
    /// 从 EPSG 代码解析
    pub fn from_epsg(code: u32) -> GeoResult<Self> {
        match code {
            27700 => Ok(Self::BritishNationalGrid),
            32601..=32660 => Ok(Self::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Self::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(GeoError::unsupported_epsg(code, SUPPORTED_EPSG)),
        }
    }

    /// EPSG 代码
    #[must_use]
    pub fn epsg(&self) -> u32 {
        match *self {
            Self::BritishNationalGrid => 27700,
            Self::Utm { zone, north: true } => 32600 + u32::from(zone),
            Self::Utm { zone, north: false } => 32700 + u32::from(zone),
        }
    }

    fn tm_params(&self) -> GeoResult<TransverseMercatorParams> {
        match *self {
            Self::BritishNationalGrid => Ok(TransverseMercatorParams::british_national_grid()),
            Self::Utm { zone, north } => {
                GeoError::check_utm_zone(zone)?;
                Ok(TransverseMercatorParams::utm(zone, north))
            }
        }
    }

    fn datum_shift(&self) -> Option<DatumShift> {
        match self {
            Self::BritishNationalGrid => Some(DatumShift::WGS84_TO_OSGB36),
            Self::Utm { .. } => None,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BritishNationalGrid => write!(f, "OSGB36 / British National Grid (EPSG:27700)"),
            Self::Utm { zone, north } => write!(
                f,
                "WGS 84 / UTM zone {zone}{} (EPSG:{})",
                if *north { 'N' } else { 'S' },
                self.epsg()
            ),
        }
    }
}

// ============================================================================
// CoordinateProjector
// ============================================================================

/// WGS84 经纬度 ↔ 平面坐标
///
/// 纯函数式，构造后不可变，可跨线程共享。
#[derive(Debug, Clone)]
pub struct CoordinateProjector {
    crs: Crs,
    tm: TransverseMercator,
    datum: Option<DatumShift>,
}

impl CoordinateProjector {
    /// 构造投影器，并在投影原点试算一次
    pub fn new(crs: Crs) -> GeoResult<Self> {
        let params = crs.tm_params()?;
        let projector = Self {
            crs,
            tm: TransverseMercator::new(params),
            datum: crs.datum_shift(),
        };

        let probe_lat = params.lat_origin.clamp(-80.0, 80.0);
        projector
            .project(probe_lat, params.central_meridian)
            .map_err(|e| GeoError::projection_failed("构造投影器", e.to_string()))?;

        tracing::debug!(crs = %crs, "坐标投影器已就绪");
        Ok(projector)
    }

    /// 由 EPSG 代码构造
    pub fn from_epsg(code: u32) -> GeoResult<Self> {
        Self::new(Crs::from_epsg(code)?)
    }

    /// 目标坐标系
    #[must_use]
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// (纬度, 经度) → (东坐标, 北坐标)
    pub fn project(&self, lat: f64, lon: f64) -> GeoResult<(f64, f64)> {
        GeoError::check_coordinate("纬度", lat, -90.0, 90.0)?;
        GeoError::check_finite("经度", lon)?;

        let (lat, lon) = match &self.datum {
            Some(shift) => shift.forward(lat, lon),
            None => (lat, lon),
        };
        let (e, n) = self.tm.forward(lon, lat)?;
        if !(e.is_finite() && n.is_finite()) {
            return Err(GeoError::projection_failed(
                "正向投影",
                format!("({lat}, {lon}) 得到非有限结果"),
            ));
        }
        Ok((e, n))
    }

    /// (东坐标, 北坐标) → (纬度, 经度)
    pub fn unproject(&self, easting: f64, northing: f64) -> GeoResult<(f64, f64)> {
        let (lon, lat) = self.tm.inverse(easting, northing)?;
        let (lat, lon) = match &self.datum {
            Some(shift) => shift.backward(lat, lon),
            None => (lat, lon),
        };
        if !(lat.is_finite() && lon.is_finite()) {
            return Err(GeoError::projection_failed(
                "逆向投影",
                format!("({easting}, {northing}) 得到非有限结果"),
            ));
        }
        Ok((lat, lon))
    }

    /// 投影单个地理点
    pub fn project_point(&self, p: &GeoPoint) -> GeoResult<Point2D> {
        self.project(p.lat, p.lon).map(Point2D::from)
    }

    /// 投影地理边界框：四个角点投影后取包络
    pub fn project_bounds(&self, bounds: &GeoBounds) -> GeoResult<ProjectedBounds> {
        let corners = bounds
            .corners()
            .iter()
            .map(|c| self.project_point(c))
            .collect::<GeoResult<Vec<_>>>()?;
        ProjectedBounds::envelope(corners)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_from_epsg() {
        assert_eq!(Crs::from_epsg(27700).unwrap(), Crs::BritishNationalGrid);
        assert_eq!(
            Crs::from_epsg(32631).unwrap(),
            Crs::Utm { zone: 31, north: true }
        );
        assert_eq!(
            Crs::from_epsg(32730).unwrap(),
            Crs::Utm { zone: 30, north: false }
        );
        assert!(matches!(
            Crs::from_epsg(3857),
            Err(GeoError::UnsupportedEpsg { code: 3857, .. })
        ));
    }

    #[test]
    fn test_crs_epsg_roundtrip() {
        for code in [27700, 32601, 32630, 32660, 32701, 32760] {
            assert_eq!(Crs::from_epsg(code).unwrap().epsg(), code);
        }
    }

    #[test]
    fn test_crs_serde_tagged() {
        let json = serde_json::to_string(&Crs::Utm { zone: 30, north: true }).unwrap();
        assert!(json.contains("\"kind\":\"utm\""));
        let back: Crs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Crs::Utm { zone: 30, north: true });
    }

    #[test]
    fn test_invalid_utm_zone_fails_at_construction() {
        let err = CoordinateProjector::new(Crs::Utm { zone: 0, north: true }).unwrap_err();
        assert!(matches!(err, GeoError::InvalidUtmZone { zone: 0 }));
    }

    #[test]
    fn test_project_rejects_nan() {
        let p = CoordinateProjector::new(Crs::BritishNationalGrid).unwrap();
        assert!(p.project(f64::NAN, 0.0).is_err());
        assert!(p.project(51.5, f64::NAN).is_err());
        assert!(p.unproject(f64::NAN, 180_000.0).is_err());
    }

    #[test]
    fn test_project_bounds_envelope() {
        let p = CoordinateProjector::new(Crs::BritishNationalGrid).unwrap();
        let geo = GeoBounds::new(-0.35, 51.41, 0.38, 51.52).unwrap();
        let b = p.project_bounds(&geo).unwrap();

        for corner in geo.corners() {
            let (e, n) = p.project(corner.lat, corner.lon).unwrap();
            assert!(e >= b.min_easting && e <= b.max_easting);
            assert!(n >= b.min_northing && n <= b.max_northing);
        }
        // 约 50 km × 12-13 km
        assert!(b.width() > 49_000.0 && b.width() < 52_000.0, "{}", b.width());
        assert!(b.height() > 12_000.0 && b.height() < 14_000.0, "{}", b.height());
    }
}
