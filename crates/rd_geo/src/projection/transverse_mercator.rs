// crates/rd_geo/src/projection/transverse_mercator.rs
//! 高精度横轴墨卡托投影（Karney 2011 算法）
//!
//! 基于 6 阶 Krüger 级数，Clenshaw 求和。构造时预计算全部系数，
//! 之后的正反算只做纯计算，可在多线程间共享。
//!
//! 非零纬度原点（如英国国家格网的 49°N）通过减去原点处的子午线弧长实现。
//!
//! # 参考文献
//!
//! Karney, C. F. F. (2011). "Transverse Mercator with an accuracy of a few nanometers".
//! Journal of Geodesy, 85(8), 475-485.

use super::params::TransverseMercatorParams;
use crate::error::{GeoError, GeoResult};
use num_complex::Complex64;
use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;

// ============================================================================
// 系数表 (GeographicLib, 6 阶)
// ============================================================================

const MAX_ORDER: usize = 6;

/// alpha 系数 (正算)，每行最后一项为分母
const ALPHA_COEFFS: [&[f64]; MAX_ORDER] = [
    &[31564.0, -66675.0, 34440.0, 47250.0, -100800.0, 75600.0, 151200.0],
    &[-1983433.0, 863232.0, 748608.0, -1161216.0, 524160.0, 1935360.0],
    &[670412.0, 406647.0, -533952.0, 184464.0, 725760.0],
    &[6601661.0, -7732800.0, 2230245.0, 7257600.0],
    &[-13675556.0, 3438171.0, 7983360.0],
    &[212378941.0, 319334400.0],
];

/// beta 系数 (反算)
const BETA_COEFFS: [&[f64]; MAX_ORDER] = [
    &[384796.0, -382725.0, -6720.0, 932400.0, -1612800.0, 1209600.0, 2419200.0],
    &[-1118711.0, 1695744.0, -1174656.0, 258048.0, 80640.0, 3870720.0],
    &[22276.0, -16929.0, -15984.0, 12852.0, 362880.0],
    &[-830251.0, -158400.0, 197865.0, 7257600.0],
    &[-435388.0, 453717.0, 15966720.0],
    &[20648693.0, 638668800.0],
];

/// b1 系数 (rectifying radius)
const B1_COEFFS: [f64; 5] = [1.0, 4.0, 64.0, 256.0, 256.0];

// ============================================================================
// 投影器
// ============================================================================

/// 预计算的横轴墨卡托投影
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    params: TransverseMercatorParams,
    /// 椭球 e²
    e2: f64,
    /// 带符号偏心率
    es: f64,
    /// 1 - e²
    e2m: f64,
    b1: f64,
    /// a1 = a · b1
    a1: f64,
    alp: [f64; MAX_ORDER],
    bet: [f64; MAX_ORDER],
    /// 纬度原点在中央子午线上的北坐标（未加假北）
    origin_northing: f64,
}

/// 未加假东假北的正算结果
struct RawForward {
    x: f64,
    y: f64,
    k: f64,
}

impl TransverseMercator {
    /// 根据参数预计算系数
    #[must_use]
    pub fn new(params: TransverseMercatorParams) -> Self {
        let f = params.ellipsoid.f;
        let e2 = params.ellipsoid.e2();
        let es = f.signum() * e2.abs().sqrt();
        let n = params.ellipsoid.n();

        let b1 = horner(&B1_COEFFS[..4], n * n) / (B1_COEFFS[4] * (1.0 + n));
        let a1 = b1 * params.ellipsoid.a;

        let mut alp = [0.0; MAX_ORDER];
        let mut bet = [0.0; MAX_ORDER];
        let mut d = n;
        for l in 0..MAX_ORDER {
            let m = ALPHA_COEFFS[l].len() - 1;
            alp[l] = d * horner(&ALPHA_COEFFS[l][..m], n) / ALPHA_COEFFS[l][m];
            bet[l] = d * horner(&BETA_COEFFS[l][..m], n) / BETA_COEFFS[l][m];
            d *= n;
        }

        let mut tm = Self {
            params,
            e2,
            es,
            e2m: 1.0 - e2,
            b1,
            a1,
            alp,
            bet,
            origin_northing: 0.0,
        };
        if params.lat_origin != 0.0 {
            tm.origin_northing = tm.raw_forward(0.0, params.lat_origin).y;
        }
        tm
    }

    /// 投影参数
    #[must_use]
    pub fn params(&self) -> &TransverseMercatorParams {
        &self.params
    }

    /// 正算：(经度, 纬度) → (东坐标, 北坐标)
    pub fn forward(&self, lon: f64, lat: f64) -> GeoResult<(f64, f64)> {
        GeoError::check_coordinate("纬度", lat, -90.0, 90.0)?;
        GeoError::check_finite("经度", lon)?;

        let raw = self.raw_forward(lon_offset(self.params.central_meridian, lon), lat);
        Ok((
            raw.x + self.params.false_easting,
            raw.y - self.origin_northing + self.params.false_northing,
        ))
    }

    /// 反算：(东坐标, 北坐标) → (经度, 纬度)
    pub fn inverse(&self, x: f64, y: f64) -> GeoResult<(f64, f64)> {
        GeoError::check_finite("东坐标", x)?;
        GeoError::check_finite("北坐标", y)?;

        let scale = self.a1 * self.params.scale_factor;
        let xi = (y - self.params.false_northing + self.origin_northing) / scale;
        let eta = (x - self.params.false_easting) / scale;

        let xisign = xi.signum();
        let etasign = eta.signum();
        let (xi, eta) = (xi.abs(), eta.abs());
        let backside = xi > FRAC_PI_2;
        let xi = if backside { PI - xi } else { xi };

        let c0 = (2.0 * xi).cos();
        let ch0 = (2.0 * eta).cosh();
        let s0 = (2.0 * xi).sin();
        let sh0 = (2.0 * eta).sinh();
        let a = Complex64::new(2.0 * c0 * ch0, -2.0 * s0 * sh0);

        let mut y0 = Complex64::new(0.0, 0.0);
        let mut y1 = Complex64::new(0.0, 0.0);
        for j in (0..MAX_ORDER).rev() {
            let prev = y0;
            y0 = a * y0 - y1 - self.bet[j];
            y1 = prev;
        }
        let zeta = Complex64::new(xi, eta) + Complex64::new(s0 * ch0, c0 * sh0) * y0;
        let (xip, etap) = (zeta.re, zeta.im);

        let s = etap.sinh();
        let c = xip.cos().max(0.0);
        let r = s.hypot(c);

        let (mut lon, lat) = if r == 0.0 {
            (0.0, 90.0)
        } else {
            let tau = geodetic_tan(xip.sin() / r, self.es);
            (s.atan2(c).to_degrees(), tau.atan().to_degrees())
        };

        lon *= etasign;
        if backside {
            lon = 180.0 - lon;
        }
        let lon = wrap_lon(lon + self.params.central_meridian);
        let lat = lat * xisign;

        if lon.is_finite() && lat.is_finite() {
            Ok((lon, lat))
        } else {
            Err(GeoError::projection_failed(
                "逆向投影",
                format!("({x}, {y}) 得到非有限结果"),
            ))
        }
    }

    /// 点比例因子
    pub fn scale_factor_at(&self, lon: f64, lat: f64) -> GeoResult<f64> {
        GeoError::check_coordinate("纬度", lat, -90.0, 90.0)?;
        GeoError::check_finite("经度", lon)?;
        Ok(self.raw_forward(lon_offset(self.params.central_meridian, lon), lat).k)
    }

    fn raw_forward(&self, lon_diff: f64, lat: f64) -> RawForward {
        let latsign = if lat.is_sign_negative() { -1.0 } else { 1.0 };
        let lonsign = if lon_diff.is_sign_negative() { -1.0 } else { 1.0 };
        let lat = lat.abs();
        let lon_diff = lon_diff.abs();
        let backside = lon_diff > 90.0;
        let lon_diff = if backside { 180.0 - lon_diff } else { lon_diff };

        let (sphi, cphi) = sin_cos_deg(lat);
        let (slam, clam) = sin_cos_deg(lon_diff);

        let (xip, etap, mut k) = if lat == 90.0 {
            let e2m_sqrt = self.e2m.sqrt();
            (FRAC_PI_2, 0.0, (1.0 + e2m_sqrt) / 2.0 / e2m_sqrt.sqrt())
        } else {
            let tau = sphi / cphi;
            let taup = conformal_tan(tau, self.es);
            let denom = taup.hypot(clam);
            let k = (self.e2m + self.e2 * cphi * cphi).sqrt() * tau.hypot(1.0) / denom;
            (taup.atan2(clam), (slam / denom).asinh(), k)
        };

        let c0 = (2.0 * xip).cos();
        let ch0 = (2.0 * etap).cosh();
        let s0 = (2.0 * xip).sin();
        let sh0 = (2.0 * etap).sinh();
        let a = Complex64::new(2.0 * c0 * ch0, -2.0 * s0 * sh0);

        let mut y0 = Complex64::new(0.0, 0.0);
        let mut y1 = Complex64::new(0.0, 0.0);
        let mut z0 = Complex64::new(0.0, 0.0);
        let mut z1 = Complex64::new(0.0, 0.0);
        for j in (0..MAX_ORDER).rev() {
            let (py, pz) = (y0, z0);
            y0 = a * y0 - y1 + self.alp[j];
            z0 = a * z0 - z1 + (2 * (j + 1)) as f64 * self.alp[j];
            y1 = py;
            z1 = pz;
        }

        let zeta = Complex64::new(xip, etap) + Complex64::new(s0 * ch0, c0 * sh0) * y0;
        let dz = Complex64::new(1.0, 0.0) - z1 + (a / 2.0) * z0;

        let scale = self.a1 * self.params.scale_factor;
        let xi = if backside { PI - zeta.re } else { zeta.re };
        k = self.params.scale_factor * self.b1 * k * dz.norm();

        RawForward {
            x: scale * zeta.im * lonsign,
            y: scale * xi * latsign,
            k,
        }
    }
}

// ============================================================================
// 共形纬度与角度工具
// ============================================================================

/// 相对中央子午线的经差，归一化到 [-180, 180)
#[inline]
fn lon_offset(central_meridian: f64, lon: f64) -> f64 {
    wrap_lon(lon - central_meridian)
}

/// 经度归一化到 [-180, 180)
#[inline]
fn wrap_lon(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// 度数版本的 (sin, cos)，整象限角得到精确的 0 与 ±1
fn sin_cos_deg(deg: f64) -> (f64, f64) {
    let r = deg.rem_euclid(360.0);
    let quadrant = (r / 90.0).round();
    let (s, c) = (r - 90.0 * quadrant).to_radians().sin_cos();
    match (quadrant as i32) & 3 {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    }
}

/// Horner 求值，系数从高阶到低阶
#[inline]
fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// tan φ → tan χ（共形纬度），`es` 为第一偏心率
#[inline]
fn conformal_tan(tau: f64, es: f64) -> f64 {
    let sec = tau.hypot(1.0);
    let sig = (es * (es * tau / sec).atanh()).sinh();
    sig.hypot(1.0) * tau - sig * sec
}

/// tan χ → tan φ，Newton 迭代，通常 2~3 步收敛
fn geodetic_tan(taup: f64, es: f64) -> f64 {
    const MAX_ITER: usize = 8;
    let e2m = 1.0 - es * es;
    let tol = f64::EPSILON.sqrt() * taup.abs().max(1.0);

    let mut tau = taup / e2m.sqrt();
    for _ in 0..MAX_ITER {
        let taupa = conformal_tan(tau, es);
        let step = (taup - taupa) * (1.0 + e2m * tau * tau) / (e2m * tau.hypot(1.0) * taupa.hypot(1.0));
        tau += step;
        if step.abs() < tol {
            break;
        }
    }
    tau
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bng() -> TransverseMercator {
        TransverseMercator::new(TransverseMercatorParams::british_national_grid())
    }

    /// 英国地形测量局公布的算例（OSGB36 大地坐标输入）
    #[test]
    fn test_os_worked_example() {
        let (e, n) = bng()
            .forward(1.717_921_583_3, 52.657_570_305_6)
            .expect("forward");
        assert!((e - 651_409.903).abs() < 0.01, "E = {e}");
        assert!((n - 313_177.270).abs() < 0.01, "N = {n}");
    }

    #[test]
    fn test_true_origin() {
        let (e, n) = bng().forward(-2.0, 49.0).expect("forward");
        assert!((e - 400_000.0).abs() < 1e-6, "E = {e}");
        assert!((n + 100_000.0).abs() < 1e-6, "N = {n}");
    }

    #[test]
    fn test_roundtrip_bng() {
        let tm = bng();
        for (lon, lat) in [(-0.35, 51.41), (0.38, 51.52), (-5.7, 50.06), (1.75, 52.65), (-3.2, 58.6)] {
            let (x, y) = tm.forward(lon, lat).expect("forward");
            let (lon2, lat2) = tm.inverse(x, y).expect("inverse");
            assert!((lon - lon2).abs() < 1e-11, "lon {lon} -> {lon2}");
            assert!((lat - lat2).abs() < 1e-11, "lat {lat} -> {lat2}");
        }
    }

    #[test]
    fn test_utm_central_meridian() {
        let tm = TransverseMercator::new(TransverseMercatorParams::utm(31, true));
        let (x, _) = tm.forward(3.0, 51.0).expect("forward");
        assert!((x - 500_000.0).abs() < 1e-6, "x = {x}");
    }

    #[test]
    fn test_scale_factor_on_central_meridian() {
        let tm = bng();
        let k = tm.scale_factor_at(-2.0, 51.0).expect("k");
        assert!((k - 0.999_601_271_7).abs() < 1e-10, "k = {k}");
        let k_off = tm.scale_factor_at(1.0, 51.0).expect("k");
        assert!(k_off > k);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let tm = bng();
        assert!(matches!(
            tm.forward(0.0, 91.0),
            Err(GeoError::CoordinateOutOfRange { .. })
        ));
        assert!(matches!(
            tm.forward(f64::NAN, 51.0),
            Err(GeoError::NonFiniteCoordinate { .. })
        ));
        assert!(tm.inverse(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_conformal_latitude_roundtrip_airy() {
        let es = crate::ellipsoid::Ellipsoid::AIRY_1830.e2().sqrt();
        for lat in [-80.0_f64, -30.0, 0.0, 49.0, 51.5, 80.0] {
            let tau = lat.to_radians().tan();
            let back = geodetic_tan(conformal_tan(tau, es), es);
            assert!((tau - back).abs() < 1e-13, "lat={lat}: {tau} vs {back}");
        }
        // 球体上共形纬度即地理纬度
        assert_eq!(conformal_tan(0.75, 0.0), 0.75);
    }

    #[test]
    fn test_sin_cos_deg_exact_quadrants() {
        assert_eq!(sin_cos_deg(90.0), (1.0, 0.0));
        let (s, c) = sin_cos_deg(-180.0);
        assert_eq!(s.abs(), 0.0);
        assert_eq!(c, -1.0);
        let (s, c) = sin_cos_deg(30.0);
        assert!((s - 0.5).abs() < 1e-15);
        assert!((c - 3.0_f64.sqrt() / 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_longitude_wrapping() {
        assert!((lon_offset(-2.0, 0.38) - 2.38).abs() < 1e-12);
        assert_eq!(wrap_lon(-0.1), -0.1);
        assert!((wrap_lon(181.0) + 179.0).abs() < 1e-12);
        assert_eq!(wrap_lon(180.0), -180.0);
        assert_eq!(horner(&[2.0, 3.0, 4.0], 2.0), 18.0);
    }
}
