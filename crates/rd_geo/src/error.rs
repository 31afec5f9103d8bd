// crates/rd_geo/src/error.rs
//! 地理空间处理错误类型
//!
//! 包含投影转换、坐标系统相关的错误。
//! 所有错误可转换为 `rd_foundation::RdError` 向上传播。
//!
//! # 错误分类
//!
//! - **配置错误**：EPSG代码不支持、UTM带号无效（构造投影器时即失败）
//! - **验证错误**：坐标为 NaN/Inf、纬度越界
//! - **计算错误**：投影结果非有限值

use rd_foundation::RdError;
use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 地理空间处理错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// 不支持的 EPSG 代码
    #[error("不支持的 EPSG 代码: {code} (支持: {supported})")]
    UnsupportedEpsg {
        /// 请求的 EPSG 代码
        code: u32,
        /// 支持的代码范围说明
        supported: &'static str,
    },

    /// UTM 带号无效
    #[error("无效的 UTM 带号: {zone} (允许范围: 1-60)")]
    InvalidUtmZone {
        /// 无效的带号
        zone: u8,
    },

    /// 坐标不是有限值
    #[error("{coord_type} 不是有限值: {value}")]
    NonFiniteCoordinate {
        /// 坐标类型（如"纬度"、"东坐标"）
        coord_type: &'static str,
        /// 实际值
        value: f64,
    },

    /// 坐标超出有效范围
    #[error("{coord_type} 超出范围: {value:.6} (允许范围: {min} 到 {max})")]
    CoordinateOutOfRange {
        /// 坐标类型
        coord_type: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 边界框退化（最大值不大于最小值）
    #[error("边界框无效: {axis} 方向 max={max} 不大于 min={min}")]
    InvalidBounds {
        /// 出错的轴（"经度"、"东坐标" 等）
        axis: &'static str,
        /// 最小值
        min: f64,
        /// 最大值
        max: f64,
    },

    /// 投影转换失败
    #[error("投影转换失败 [{operation}]: {message}")]
    ProjectionFailed {
        /// 操作类型（如"正向投影"、"逆向投影"）
        operation: &'static str,
        /// 错误详情
        message: String,
    },
}

impl From<GeoError> for RdError {
    fn from(err: GeoError) -> Self {
        match &err {
            GeoError::UnsupportedEpsg { code, supported } => {
                RdError::projection(format!("不支持的EPSG代码 {code}。支持的代码: {supported}"))
            }
            GeoError::InvalidUtmZone { zone } => {
                RdError::projection(format!("无效的UTM带号 {zone} (允许范围: 1-60)"))
            }
            GeoError::InvalidBounds { axis, .. } => {
                RdError::configuration(format!("bounds.{axis}"), err.to_string())
            }
            _ => RdError::projection(err.to_string()),
        }
    }
}

// ============================================================================
// 便捷构造函数
// ============================================================================

impl GeoError {
    /// 创建不支持的 EPSG 错误
    #[inline]
    pub fn unsupported_epsg(code: u32, supported: &'static str) -> Self {
        Self::UnsupportedEpsg { code, supported }
    }

    /// 创建投影转换失败错误
    #[inline]
    pub fn projection_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ProjectionFailed {
            operation,
            message: message.into(),
        }
    }

    /// 验证区间 `min < max`
    #[inline]
    pub fn check_interval(axis: &'static str, min: f64, max: f64) -> GeoResult<()> {
        Self::check_finite(axis, min)?;
        Self::check_finite(axis, max)?;
        if max > min {
            Ok(())
        } else {
            Err(Self::InvalidBounds { axis, min, max })
        }
    }

    /// 验证坐标为有限值
    #[inline]
    pub fn check_finite(coord_type: &'static str, value: f64) -> GeoResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::NonFiniteCoordinate { coord_type, value })
        }
    }

    /// 验证坐标范围
    #[inline]
    pub fn check_coordinate(
        coord_type: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> GeoResult<()> {
        Self::check_finite(coord_type, value)?;
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::CoordinateOutOfRange {
                coord_type,
                value,
                min,
                max,
            })
        }
    }

    /// 验证 UTM 带号
    #[inline]
    pub fn check_utm_zone(zone: u8) -> GeoResult<()> {
        if (1..=60).contains(&zone) {
            Ok(())
        } else {
            Err(Self::InvalidUtmZone { zone })
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(GeoError::check_finite("纬度", 51.5).is_ok());
        match GeoError::check_finite("纬度", f64::NAN) {
            Err(GeoError::NonFiniteCoordinate { coord_type, .. }) => assert_eq!(coord_type, "纬度"),
            other => panic!("错误的结果: {other:?}"),
        }
        assert!(GeoError::check_finite("经度", f64::INFINITY).is_err());
    }

    #[test]
    fn test_check_coordinate() {
        assert!(GeoError::check_coordinate("纬度", 51.5, -90.0, 90.0).is_ok());
        let err = GeoError::check_coordinate("纬度", 95.5, -90.0, 90.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("纬度"));
        assert!(msg.contains("95.5"));
    }

    #[test]
    fn test_check_utm_zone_boundary() {
        assert!(GeoError::check_utm_zone(1).is_ok());
        assert!(GeoError::check_utm_zone(60).is_ok());
        assert!(GeoError::check_utm_zone(0).is_err());
        assert!(GeoError::check_utm_zone(61).is_err());
    }

    #[test]
    fn test_geo_error_to_rd_error() {
        let rd: RdError = GeoError::unsupported_epsg(99999, "4326, 27700").into();
        match rd {
            RdError::Projection(msg) => {
                assert!(msg.contains("99999"));
                assert!(msg.contains("27700"));
            }
            other => panic!("应转换为 Projection: {other:?}"),
        }

        let rd: RdError = GeoError::projection_failed("正向投影", "结果为 NaN").into();
        assert!(matches!(rd, RdError::Projection(_)));

        let rd: RdError = GeoError::check_interval("东坐标", 10.0, 10.0)
            .unwrap_err()
            .into();
        assert!(rd.is_configuration());
    }
}
