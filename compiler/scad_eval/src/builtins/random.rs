//! `rands`, drawing from the session's generator.

use rand::Rng;
use scad_ir::{format_number, Location};

use super::{check_types, count_mismatch, BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::diagnostics::MessageGroup;
use crate::errors::EvalResult;
use crate::value::{Value, ValueType, VectorBuilder};

/// Slots reserved up front; larger requests grow as they fill.
const MAX_RESERVE: usize = 1 << 16;

pub(super) fn register(registry: &mut BuiltinRegistry) {
    registry.register_function("rands", rands, BuiltinFlags::ENABLED);
}

/// `rands(min, max, count[, seed])`: `count` numbers uniform in
/// `[min, max)`. A seed restarts the session generator first.
fn rands(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if !(3..=4).contains(&args.len()) {
        count_mismatch(call, "3 or 4", args.len());
        return Ok(Value::undefined());
    }
    if !check_types(call, &args, &vec![ValueType::Number; args.len()]) {
        return Ok(Value::undefined());
    }
    let number = |index| args.number(index).unwrap_or_default();

    let mut min = bound(call, number(0), "min", -f64::MAX / 2.0);
    let mut max = bound(call, number(1), "max", f64::MAX / 2.0);
    if max < min {
        std::mem::swap(&mut min, &mut max);
    }

    let mut count = number(2).abs();
    if !count.is_finite() {
        call.warn("rands() cannot create an infinite number of results");
        call.session.log(
            MessageGroup::Warning,
            Location::NONE,
            "resetting number of results to 1",
        );
        count = 1.0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = count as usize;

    if let Some(seed) = args.number(3) {
        call.session.reseed_rng(seed_bits(seed));
    }

    let mut out = VectorBuilder::with_capacity(
        count.min(MAX_RESERVE),
        Some(call.session.accounting().clone()),
    );
    call.session.with_rng(|rng| {
        for _ in 0..count {
            let value = if min >= max { min } else { rng.gen_range(min..max) };
            out.push(Value::Number(value));
        }
    });
    Ok(Value::Vector(out.build()))
}

/// A range end, replaced by `fallback` with a warning when not finite.
fn bound(call: &BuiltinCall<'_>, value: f64, end: &str, fallback: f64) -> f64 {
    if value.is_finite() {
        return value;
    }
    call.warn(format!("rands() range {end} cannot be infinite"));
    call.session.log(
        MessageGroup::Warning,
        Location::NONE,
        format!("resetting to {}", format_number(fallback)),
    );
    fallback
}

/// Seeds that compare equal give the same sequence, so `-0` and `0` agree.
#[allow(clippy::float_cmp)]
fn seed_bits(seed: f64) -> u64 {
    if seed == 0.0 {
        0
    } else {
        seed.to_bits()
    }
}
