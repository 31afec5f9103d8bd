// crates/rd_geo/src/datum.rs
//! 基准转换
//!
//! 大地坐标 ↔ 地心直角坐标 (ECEF) 互换，以及七参数 Helmert 变换。
//!
//! Helmert 采用位置向量约定（与英国地形测量局公布的参数一致），
//! 旋转角为小角度近似：
//!
//! ```text
//! | x' |   | tx |          |  1  -rz  ry | | x |
//! | y' | = | ty | + (1+s)· |  rz  1  -rx | | y |
//! | z' |   | tz |          | -ry  rx  1  | | z |
//! ```

use crate::ellipsoid::Ellipsoid;
use serde::{Deserialize, Serialize};

/// 角秒转弧度
const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// 七参数 Helmert 变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelmertParams {
    /// X 平移 (m)
    pub tx: f64,
    /// Y 平移 (m)
    pub ty: f64,
    /// Z 平移 (m)
    pub tz: f64,
    /// 尺度变化 (ppm)
    pub scale_ppm: f64,
    /// X 轴旋转 (角秒)
    pub rx: f64,
    /// Y 轴旋转 (角秒)
    pub ry: f64,
    /// Z 轴旋转 (角秒)
    pub rz: f64,
}

impl HelmertParams {
    /// WGS84 → OSGB36，平面精度约 5 m
    pub const WGS84_TO_OSGB36: Self = Self {
        tx: -446.448,
        ty: 125.157,
        tz: -542.060,
        scale_ppm: 20.4894,
        rx: -0.1502,
        ry: -0.2470,
        rz: -0.8421,
    };

    /// 反向变换参数（全部取反）
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            tx: -self.tx,
            ty: -self.ty,
            tz: -self.tz,
            scale_ppm: -self.scale_ppm,
            rx: -self.rx,
            ry: -self.ry,
            rz: -self.rz,
        }
    }

    /// 对 ECEF 坐标应用变换
    #[must_use]
    pub fn apply(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        let s1 = 1.0 + self.scale_ppm * 1e-6;
        let rx = self.rx * ARCSEC_TO_RAD;
        let ry = self.ry * ARCSEC_TO_RAD;
        let rz = self.rz * ARCSEC_TO_RAD;

        [
            self.tx + s1 * x - rz * y + ry * z,
            self.ty + rz * x + s1 * y - rx * z,
            self.tz - ry * x + rx * y + s1 * z,
        ]
    }
}

/// 大地坐标（度、米）→ ECEF
#[must_use]
pub fn geodetic_to_ecef(ellipsoid: &Ellipsoid, lat: f64, lon: f64, h: f64) -> [f64; 3] {
    let phi = lat.to_radians();
    let lam = lon.to_radians();
    let nu = ellipsoid.prime_vertical_radius(phi);
    let (sphi, cphi) = phi.sin_cos();
    let (slam, clam) = lam.sin_cos();

    [
        (nu + h) * cphi * clam,
        (nu + h) * cphi * slam,
        ((1.0 - ellipsoid.e2()) * nu + h) * sphi,
    ]
}

/// ECEF → 大地坐标 (lat, lon, h)，迭代求解纬度
#[must_use]
pub fn ecef_to_geodetic(ellipsoid: &Ellipsoid, [x, y, z]: [f64; 3]) -> (f64, f64, f64) {
    const MAX_ITER: usize = 10;
    const TOL: f64 = 1e-13;

    let e2 = ellipsoid.e2();
    let p = x.hypot(y);
    let lam = y.atan2(x);

    let mut phi = z.atan2(p * (1.0 - e2));
    for _ in 0..MAX_ITER {
        let nu = ellipsoid.prime_vertical_radius(phi);
        let next = (z + e2 * nu * phi.sin()).atan2(p);
        let done = (next - phi).abs() < TOL;
        phi = next;
        if done {
            break;
        }
    }

    let nu = ellipsoid.prime_vertical_radius(phi);
    let h = p / phi.cos() - nu;
    (phi.to_degrees(), lam.to_degrees(), h)
}

/// 在两个椭球体之间做基准转换（大地高取 0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumShift {
    /// 源椭球
    pub source: Ellipsoid,
    /// 目标椭球
    pub target: Ellipsoid,
    /// 源 → 目标的 Helmert 参数
    pub helmert: HelmertParams,
}

impl DatumShift {
    /// WGS84 → OSGB36
    pub const WGS84_TO_OSGB36: Self = Self {
        source: Ellipsoid::WGS84,
        target: Ellipsoid::AIRY_1830,
        helmert: HelmertParams::WGS84_TO_OSGB36,
    };

    /// 正向转换 (lat, lon)
    #[must_use]
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let ecef = geodetic_to_ecef(&self.source, lat, lon, 0.0);
        let (lat, lon, _) = ecef_to_geodetic(&self.target, self.helmert.apply(ecef));
        (lat, lon)
    }

    /// 反向转换 (lat, lon)
    #[must_use]
    pub fn backward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let ecef = geodetic_to_ecef(&self.target, lat, lon, 0.0);
        let (lat, lon, _) = ecef_to_geodetic(&self.source, self.helmert.inverse().apply(ecef));
        (lat, lon)
    }
}

// ============================================================================
// 测试
// ============================================================================
