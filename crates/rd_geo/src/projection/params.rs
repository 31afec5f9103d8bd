// crates/rd_geo/src/projection/params.rs
//! 横轴墨卡托投影参数

use crate::ellipsoid::Ellipsoid;
use serde::{Deserialize, Serialize};

/// 横轴墨卡托投影参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransverseMercatorParams {
    /// 椭球体
    pub ellipsoid: Ellipsoid,
    /// 中央子午线 (度)
    pub central_meridian: f64,
    /// 纬度原点 (度)
    pub lat_origin: f64,
    /// 中央子午线比例因子
    pub scale_factor: f64,
    /// 假东 (米)
    pub false_easting: f64,
    /// 假北 (米)
    pub false_northing: f64,
}

impl TransverseMercatorParams {
    /// WGS84 UTM 参数
    #[must_use]
    pub fn utm(zone: u8, north: bool) -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            central_meridian: f64::from(zone) * 6.0 - 183.0,
            lat_origin: 0.0,
            scale_factor: 0.9996,
            false_easting: 500_000.0,
            false_northing: if north { 0.0 } else { 10_000_000.0 },
        }
    }

    /// 英国国家格网 (OSGB36 / British National Grid, EPSG:27700)
    #[must_use]
    pub fn british_national_grid() -> Self {
        Self {
            ellipsoid: Ellipsoid::AIRY_1830,
            central_meridian: -2.0,
            lat_origin: 49.0,
            scale_factor: 0.999_601_271_7,
            false_easting: 400_000.0,
            false_northing: -100_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm_central_meridian() {
        assert_eq!(TransverseMercatorParams::utm(30, true).central_meridian, -3.0);
        assert_eq!(TransverseMercatorParams::utm(31, true).central_meridian, 3.0);
        assert_eq!(TransverseMercatorParams::utm(31, false).false_northing, 10_000_000.0);
    }

    #[test]
    fn test_bng_origin() {
        let p = TransverseMercatorParams::british_national_grid();
        assert_eq!(p.lat_origin, 49.0);
        assert_eq!(p.ellipsoid, Ellipsoid::AIRY_1830);
    }
}
