// crates/rd_geo/src/ellipsoid.rs
//! 椭球体定义
//!
//! 提供 WGS84、GRS80 与 Airy 1830 三个椭球体。
//! 英国国家格网 (OSGB36) 使用 Airy 1830，GPS 坐标使用 WGS84。
//!
//! # 示例
//!
//! ```
//! use rd_geo::ellipsoid::Ellipsoid;
//!
//! let airy = Ellipsoid::AIRY_1830;
//! assert!((airy.b() - 6_356_256.909).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

/// 地球椭球体
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// 长半轴 (m)
    pub a: f64,
    /// 扁率 (flattening)
    pub f: f64,
}

impl Ellipsoid {
    // ========================================================================
    // 预定义椭球体
    // ========================================================================

    /// WGS84 椭球体 (GPS 标准, EPSG:7030)
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// GRS80 椭球体 (EPSG:7019)
    pub const GRS80: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// Airy 1830 椭球体 (OSGB36, EPSG:7001)
    ///
    /// - 长半轴: 6377563.396 m
    /// - 短半轴: 6356256.909 m
    pub const AIRY_1830: Self = Self {
        a: 6_377_563.396,
        f: (6_377_563.396 - 6_356_256.909) / 6_377_563.396,
    };

    /// 从长半轴和扁率创建椭球体
    #[must_use]
    pub const fn new(a: f64, f: f64) -> Self {
        Self { a, f }
    }

    /// 从 EPSG 椭球体代码获取
    #[must_use]
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            7030 => Some(Self::WGS84),
            7019 => Some(Self::GRS80),
            7001 => Some(Self::AIRY_1830),
            _ => None,
        }
    }

    // ========================================================================
    // 派生参数
    // ========================================================================

    /// 短半轴 b = a(1-f)
    #[inline]
    #[must_use]
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// 第一偏心率的平方 e² = 2f - f²
    #[inline]
    #[must_use]
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// 第三扁率 n = f / (2 - f)
    #[inline]
    #[must_use]
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    /// 卯酉圈曲率半径 N(φ)
    #[inline]
    #[must_use]
    pub fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        let s = lat_rad.sin();
        self.a / (1.0 - self.e2() * s * s).sqrt()
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}
