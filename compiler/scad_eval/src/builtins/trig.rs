//! Trigonometry in degrees, exact at multiples of 30 and 45.

use std::f64::consts::FRAC_1_SQRT_2;

use super::math::{binary, unary};
use super::{BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::errors::EvalResult;

/// Beyond this magnitude reduction to one revolution loses every bit of
/// the fraction, so the result is NaN.
const HUGE_ANGLE: f64 = 67_108_864.0 * 360.0 * 67_108_864.0;

const SQRT3: f64 = 1.732_050_807_568_877_2;
const SQRT3_4: f64 = 0.866_025_403_784_438_6;
const SQRT1_3: f64 = 0.577_350_269_189_625_8;

pub(super) fn register(registry: &mut BuiltinRegistry) {
    let enabled = BuiltinFlags::ENABLED;
    registry.register_function("sin", |call| unary(call, sin_degrees), enabled);
    registry.register_function("cos", |call| unary(call, cos_degrees), enabled);
    registry.register_function("tan", |call| unary(call, tan_degrees), enabled);
    registry.register_function("asin", |call| unary(call, asin_degrees), enabled);
    registry.register_function("acos", |call| unary(call, acos_degrees), enabled);
    registry.register_function("atan", |call| unary(call, atan_degrees), enabled);
    registry.register_function("atan2", atan2, enabled);
}

fn atan2(call: &BuiltinCall<'_>) -> EvalResult {
    binary(call, atan2_degrees)
}

/// Reduce `x` into `[0, period)`; `None` when that is meaningless.
fn reduce(x: f64, period: f64) -> Option<f64> {
    if (0.0..period).contains(&x) {
        return Some(x);
    }
    if x < HUGE_ANGLE && x > -HUGE_ANGLE {
        return Some(x - period * (x / period).floor());
    }
    None
}

pub fn sin_degrees(x: f64) -> f64 {
    let Some(mut x) = reduce(x, 360.0) else {
        return f64::NAN;
    };
    let oppose = x >= 180.0;
    if oppose {
        x -= 180.0;
    }
    if x > 90.0 {
        x = 180.0 - x;
    }
    #[allow(clippy::float_cmp)]
    let y = if x < 45.0 {
        if x == 30.0 {
            0.5
        } else {
            x.to_radians().sin()
        }
    } else if x == 45.0 {
        FRAC_1_SQRT_2
    } else if x == 60.0 {
        SQRT3_4
    } else {
        (90.0 - x).to_radians().cos()
    };
    if oppose {
        -y
    } else {
        y
    }
}

pub fn cos_degrees(x: f64) -> f64 {
    let Some(mut x) = reduce(x, 360.0) else {
        return f64::NAN;
    };
    let mut oppose = x >= 180.0;
    if oppose {
        x -= 180.0;
    }
    if x > 90.0 {
        x = 180.0 - x;
        oppose = !oppose;
    }
    #[allow(clippy::float_cmp)]
    let y = if x > 45.0 {
        if x == 60.0 {
            0.5
        } else {
            (90.0 - x).to_radians().sin()
        }
    } else if x == 45.0 {
        FRAC_1_SQRT_2
    } else if x == 30.0 {
        SQRT3_4
    } else {
        x.to_radians().cos()
    };
    if oppose {
        -y
    } else {
        y
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn tan_degrees(x: f64) -> f64 {
    let even_cycle = ((x / 180.0).floor() as i64) % 2 == 0;
    let Some(mut x) = reduce(x, 180.0) else {
        return f64::NAN;
    };
    let oppose = x > 90.0;
    if oppose {
        x = 180.0 - x;
    }
    let y = if x == 0.0 {
        if even_cycle {
            0.0
        } else {
            -0.0
        }
    } else if x == 30.0 {
        SQRT1_3
    } else if x == 45.0 {
        1.0
    } else if x == 60.0 {
        SQRT3
    } else if x == 90.0 {
        if even_cycle {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    } else {
        x.to_radians().tan()
    };
    if oppose {
        -y
    } else {
        y
    }
}

/// Snap `degrees` to the nearest whole degree when `forward` maps that
/// whole degree back onto `x` exactly.
#[allow(clippy::float_cmp)]
fn snap_inverse(degrees: f64, x: f64, forward: fn(f64) -> f64) -> f64 {
    let whole = degrees.round();
    if forward(whole) == x {
        whole
    } else {
        degrees
    }
}

pub fn asin_degrees(x: f64) -> f64 {
    snap_inverse(x.asin().to_degrees(), x, sin_degrees)
}

pub fn acos_degrees(x: f64) -> f64 {
    snap_inverse(x.acos().to_degrees(), x, cos_degrees)
}

pub fn atan_degrees(x: f64) -> f64 {
    snap_inverse(x.atan().to_degrees(), x, tan_degrees)
}

pub fn atan2_degrees(y: f64, x: f64) -> f64 {
    let degrees = y.atan2(x).to_degrees();
    let whole = degrees.round();
    if (degrees - whole).abs() < 3.0e-14 {
        whole
    } else {
        degrees
    }
}
