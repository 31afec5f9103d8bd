// crates/rd_terrain/src/reference.rs

//! 泰晤士河参考剖面
//!
//! 40 个控制点，自里士满 (Richmond) 向东至蒂尔伯里 (Tilbury) 方向排列，
//! 附带历史测量高程。河道在伦敦城区多次折返，经度并不单调。

use crate::river::{RiverControlPoint, RiverProfile};

/// (纬度, 经度, 实测高程 m)，上游 → 下游
pub const THAMES_POINTS: [(f64, f64, f64); 40] = [
    (51.4573, -0.3073, 11.13),
    (51.46, -0.295, 10.86),
    (51.463, -0.28, 10.44),
    (51.466, -0.265, 10.01),
    (51.469, -0.25, 9.91),
    (51.472, -0.235, 9.04),
    (51.4883, -0.2303, 8.01),
    (51.475, -0.2214, 7.91),
    (51.46694, -0.21306, 7.81),
    (51.47, -0.198, 7.71),
    (51.473, -0.185, 7.61),
    (51.479134, -0.156838, 7.51),
    (51.482, -0.145, 7.41),
    (51.485, -0.135, 7.31),
    (51.49, -0.125, 7.21),
    (51.5005, -0.1198, 7.11),
    (51.503, -0.11, 7.01),
    (51.5052, -0.1168, 6.91),
    (51.507, -0.105, 6.81),
    (51.5097, -0.1044, 6.71),
    (51.51, -0.095, 6.61),
    (51.5079, -0.0878, 6.51),
    (51.505554, -0.075278, 6.41),
    (51.503, -0.065, 6.31),
    (51.5, -0.05, 6.21),
    (51.497, -0.035, 6.11),
    (51.494, -0.02, 6.01),
    (51.491, -0.005, 5.91),
    (51.488, 0.01, 5.81),
    (51.477928, -0.001545, 5.71),
    (51.475, 0.015, 5.61),
    (51.472, 0.03, 5.51),
    (51.4977, 0.0367, 5.41),
    (51.4765, 0.0539, 5.31),
    (51.47, 0.08, 5.21),
    (51.465, 0.12, 5.11),
    (51.46, 0.16, 5.01),
    (51.455, 0.2, 4.91),
    (51.4466, 0.2142, 4.81),
    (51.44, 0.3, 4.0),
];

fn points(with_survey: bool) -> Vec<RiverControlPoint> {
    THAMES_POINTS
        .iter()
        .enumerate()
        .map(|(i, &(lat, lon, z))| {
            let p = RiverControlPoint::new(i, lat, lon);
            if with_survey { p.with_elevation(z) } else { p }
        })
        .collect()
}

/// 泰晤士河剖面（不含预设高程）
#[must_use]
pub fn thames_profile() -> RiverProfile {
    RiverProfile::from_verified(points(false))
}

/// 泰晤士河剖面，携带实测高程作为预设值
#[must_use]
pub fn thames_profile_with_survey() -> RiverProfile {
    RiverProfile::from_verified(points(true))
}
