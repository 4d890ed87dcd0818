//! Terrain-response curve: grade (percent) to pace multiplier.
//!
//! A 4th-degree polynomial covers the common range of grades. Beyond the
//! breakpoints it continues along its own tangent lines, so value and first
//! derivative are continuous everywhere.
//!
//! A multiplier of 1.0 means flat-ground pace, above 1.0 is slower and below
//! 1.0 is faster.

const A4: f64 = -4.3145e-7;
const A3: f64 = -2.9303e-6;
const A2: f64 = 1.87385e-3;
const A1: f64 = 3.07635e-2;

/// Below this grade the curve is linear.
pub const LEFT_BREAKPOINT: f64 = -32.25;
/// Above this grade the curve is linear.
pub const RIGHT_BREAKPOINT: f64 = 32.1;

/// Lower sanity bound applied by the engine.
pub const MIN_FACTOR: f64 = 0.5;
/// Upper sanity bound applied by the engine.
pub const MAX_FACTOR: f64 = 3.0;

fn polynomial(g: f64) -> f64 {
    (((A4 * g + A3) * g + A2) * g + A1) * g + 1.0
}

fn polynomial_slope(g: f64) -> f64 {
    ((4.0 * A4 * g + 3.0 * A3) * g + 2.0 * A2) * g + A1
}

/// Slope and intercept of the tangent line at `breakpoint`.
fn tangent(breakpoint: f64) -> (f64, f64) {
    let slope = polynomial_slope(breakpoint);
    (slope, polynomial(breakpoint) - slope * breakpoint)
}

/// Tangent line continuing the curve below [`LEFT_BREAKPOINT`]
/// (slope ≈ -0.04136, intercept ≈ 0.25463).
pub fn left_tangent() -> (f64, f64) {
    tangent(LEFT_BREAKPOINT)
}

/// Tangent line continuing the curve above [`RIGHT_BREAKPOINT`]
/// (slope ≈ 0.08492, intercept ≈ 0.63727).
pub fn right_tangent() -> (f64, f64) {
    tangent(RIGHT_BREAKPOINT)
}

/// Unbounded pace multiplier for a grade in percent.
///
/// # Example
/// ```
/// use gradepace::pace_factor;
///
/// assert_eq!(pace_factor(0.0), 1.0);
/// assert!(pace_factor(10.0) > 1.0);
/// assert!(pace_factor(-5.0) < 1.0);
/// ```
pub fn pace_factor(grade: f64) -> f64 {
    if grade < LEFT_BREAKPOINT {
        let (slope, intercept) = left_tangent();
        slope * grade + intercept
    } else if grade > RIGHT_BREAKPOINT {
        let (slope, intercept) = right_tangent();
        slope * grade + intercept
    } else {
        polynomial(grade)
    }
}

/// Pace multiplier bounded to `[MIN_FACTOR, MAX_FACTOR]`. NaN grades count as flat.
pub fn clamped_factor(grade: f64) -> f64 {
    if grade.is_nan() {
        return 1.0;
    }
    pace_factor(grade).clamp(MIN_FACTOR, MAX_FACTOR)
}
