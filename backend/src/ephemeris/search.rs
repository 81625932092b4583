//! Coarse scan + bisection root finding over time.
//!
//! Steps forward from `start` until the sampled function changes sign, then
//! bisects the bracketing step down to one second. Angle-valued functions are
//! expected to be wrapped to [-180, +180]; a jump across the wrap is not a
//! crossing.

use chrono::{DateTime, Duration, Utc};

use super::EphemerisResult;

/// Bisection stops once the bracket is shorter than this.
const CONVERGENCE_MS: i64 = 1_000;

const MAX_ITERATIONS: u32 = 60;

/// Sign change to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// Negative to non-negative.
    Rising,
    /// Non-negative to negative.
    Falling,
    Either,
}

/// Normalize an angle to [-180, +180].
pub fn normalize_to_pm180(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// Duration of a fractional number of days, to the millisecond.
///
/// Saturates at the longest representable duration.
pub fn days(d: f64) -> Duration {
    let ms = (d * 86_400_000.0).round() as i64;
    Duration::milliseconds(ms.clamp(-i64::MAX, i64::MAX))
}

fn is_crossing(f_a: f64, f_b: f64, crossing: Crossing) -> bool {
    // A wrap from ~+180 to ~-180 changes sign without crossing zero.
    if (f_a - f_b).abs() >= 270.0 {
        return false;
    }
    match crossing {
        Crossing::Rising => f_a < 0.0 && f_b >= 0.0,
        Crossing::Falling => f_a >= 0.0 && f_b < 0.0,
        Crossing::Either => (f_a < 0.0) != (f_b < 0.0),
    }
}

/// First instant in `[start, start + limit_days]` where `f` crosses zero.
///
/// The window is cut short at the last representable instant.
pub fn find_crossing<F>(
    f: F,
    start: DateTime<Utc>,
    limit_days: f64,
    step: Duration,
    crossing: Crossing,
) -> EphemerisResult<Option<DateTime<Utc>>>
where
    F: Fn(DateTime<Utc>) -> EphemerisResult<f64>,
{
    if !(limit_days > 0.0) || step <= Duration::zero() {
        return Ok(None);
    }
    let end = start
        .checked_add_signed(days(limit_days))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut t_prev = start;
    let mut f_prev = f(start)?;
    while t_prev < end {
        let t_curr = t_prev.checked_add_signed(step).map_or(end, |t| t.min(end));
        let f_curr = f(t_curr)?;
        if is_crossing(f_prev, f_curr, crossing) {
            return bisect(&f, t_prev, f_prev, t_curr).map(Some);
        }
        t_prev = t_curr;
        f_prev = f_curr;
    }
    Ok(None)
}

fn bisect<F>(
    f: &F,
    mut t_a: DateTime<Utc>,
    mut f_a: f64,
    mut t_b: DateTime<Utc>,
) -> EphemerisResult<DateTime<Utc>>
where
    F: Fn(DateTime<Utc>) -> EphemerisResult<f64>,
{
    for _ in 0..MAX_ITERATIONS {
        if (t_b - t_a).num_milliseconds() < CONVERGENCE_MS {
            break;
        }
        let t_mid = t_a + (t_b - t_a) / 2;
        let f_mid = f(t_mid)?;
        if (f_a < 0.0) == (f_mid < 0.0) {
            t_a = t_mid;
            f_a = f_mid;
        } else {
            t_b = t_mid;
        }
    }
    Ok(t_a + (t_b - t_a) / 2)
}
