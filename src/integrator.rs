//! Fixed-step Runge-Kutta integrators and Simpson quadrature
//!
//! Classic 4-stage RK4 for scalar first-order ODEs dy/dx = f(x, y) and for
//! scalar second-order ODEs d²y/dx² = f(x, y, y'), plus composite Simpson's
//! rule. The free functions are pure and do not validate their inputs: NaN or
//! infinite values propagate silently to the caller.
//!
//! [`Integrator`] wraps the same steps with bookkeeping (evaluation counts and
//! a step cap) for the sweeps used by the cosmology model.

use thiserror::Error;

/// First-order scalar ODE: dy/dx = f(x, y)
pub trait FirstOrderOde {
    /// Evaluate the slope dy/dx at (x, y)
    fn slope(&self, x: f64, y: f64) -> f64;
}

impl<F> FirstOrderOde for F
where
    F: Fn(f64, f64) -> f64,
{
    fn slope(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Second-order scalar ODE: d²y/dx² = f(x, y, dy/dx)
pub trait SecondOrderOde {
    /// Evaluate the second derivative at (x, y, dy/dx)
    fn acceleration(&self, x: f64, y: f64, dy: f64) -> f64;
}

impl<F> SecondOrderOde for F
where
    F: Fn(f64, f64, f64) -> f64,
{
    fn acceleration(&self, x: f64, y: f64, dy: f64) -> f64 {
        self(x, y, dy)
    }
}

/// One RK4 step for dy/dx = f(x, y). Returns `(x1, y1)`.
///
/// `h` may be negative to integrate backward.
pub fn rk4_order1<S: FirstOrderOde + ?Sized>(sys: &S, x0: f64, y0: f64, h: f64) -> (f64, f64) {
    let (x1, y1, _) = rk4_order1_with_slope(sys, x0, y0, h);
    (x1, y1)
}

/// Same as [`rk4_order1`], also returning the slope k1 at (x0, y0)
fn rk4_order1_with_slope<S: FirstOrderOde + ?Sized>(
    sys: &S,
    x0: f64,
    y0: f64,
    h: f64,
) -> (f64, f64, f64) {
    let half = 0.5 * h;

    let k1 = sys.slope(x0, y0);
    let k2 = sys.slope(x0 + half, y0 + half * k1);
    let k3 = sys.slope(x0 + half, y0 + half * k2);
    let k4 = sys.slope(x0 + h, y0 + h * k3);

    let y1 = y0 + h * (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0;
    (x0 + h, y1, k1)
}

/// One RK4 step for d²y/dx² = f(x, y, y'), treated as the coupled pair (y, y').
/// Returns `(x1, y1, dy1)`.
///
/// A constant right-hand side c is integrated exactly:
/// y1 = y0 + h·dy0 + h²c/2, dy1 = dy0 + h·c.
pub fn rk4_order2<S: SecondOrderOde + ?Sized>(
    sys: &S,
    x0: f64,
    y0: f64,
    dy0: f64,
    h: f64,
) -> (f64, f64, f64) {
    let half = 0.5 * h;
    let h2 = h * h;

    let k1 = sys.acceleration(x0, y0, dy0);
    let k2 = sys.acceleration(x0 + half, y0 + half * dy0, dy0 + half * k1);
    let k3 = sys.acceleration(
        x0 + half,
        y0 + half * dy0 + 0.25 * h2 * k1,
        dy0 + half * k2,
    );
    let k4 = sys.acceleration(x0 + h, y0 + h * dy0 + 0.5 * h2 * k2, dy0 + h * k3);

    let y1 = y0 + h * dy0 + h2 * (k1 + k2 + k3) / 6.0;
    let dy1 = dy0 + h * (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0;
    (x0 + h, y1, dy1)
}

/// Composite Simpson's rule for ∫ f over [a, b] with `n` equal subintervals.
///
/// Nodes 0..=n are summed with weights 1, 4, 2, 4, ..., 1 and scaled by h/3.
/// For odd `n` the last node before b receives weight 2, so the final panel
/// is not a Simpson pair and the rule loses its fourth-order accuracy. `n = 0`
/// returns 0.
pub fn simpson<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h);
    }

    sum * h / 3.0
}

/// Errors raised by [`Integrator`] sweeps
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// The sweep did not leave its interval within the step cap
    #[error("maximum number of integration steps exceeded ({steps})")]
    MaxStepsExceeded {
        /// Steps taken when the cap was hit
        steps: u64,
    },
    /// Invalid input parameters
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input
        message: String,
    },
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Total number of right-hand side evaluations
    pub fn_evals: u64,
    /// Number of RK4 steps taken
    pub steps: u64,
}

/// Samples produced by a sweep, ordered by increasing step index
///
/// For first-order sweeps `dy` holds the slope dy/dx at each sample; for
/// second-order sweeps it holds the integrated first derivative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// Independent variable
    pub x: Vec<f64>,
    /// Solution
    pub y: Vec<f64>,
    /// First derivative of the solution
    pub dy: Vec<f64>,
}

impl Series {
    fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            dy: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, x: f64, y: f64, dy: f64) {
        self.x.push(x);
        self.y.push(y);
        self.dy.push(dy);
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// True if the series holds no samples
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Fixed-step RK4 driver with evaluation counting and a step cap
///
/// # Example
/// ```
/// use cosmograv::integrator::Integrator;
///
/// // y'' = -y from y = 1, y' = 0, sweeping both ways while |y| <= 1.5
/// let mut integrator = Integrator::new();
/// integrator.max_steps = 1000;
/// let err = integrator
///     .sweep_order2(
///         &|_x: f64, y: f64, _dy: f64| -y,
///         0.0,
///         1.0,
///         0.0,
///         0.01,
///         |_x, y, _dy| y.abs() <= 1.5,
///     )
///     .unwrap_err();
/// // a harmonic oscillator never leaves the band, so the cap is hit
/// assert!(matches!(err, cosmograv::IntegrationError::MaxStepsExceeded { .. }));
/// ```
#[derive(Debug, Clone)]
pub struct Integrator {
    /// Maximum number of steps per sweep before error
    pub max_steps: u64,
    /// Integration statistics
    pub stats: Stats,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Integrator {
    /// Create an integrator with the default step cap (10 million)
    pub fn new() -> Self {
        Self {
            max_steps: 10_000_000,
            stats: Stats::default(),
        }
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    /// One counted second-order step
    pub fn step_order2<S: SecondOrderOde + ?Sized>(
        &mut self,
        sys: &S,
        x: f64,
        y: f64,
        dy: f64,
        h: f64,
    ) -> (f64, f64, f64) {
        self.stats.fn_evals += 4;
        self.stats.steps += 1;
        rk4_order2(sys, x, y, dy, h)
    }

    /// Take exactly `steps` first-order steps of size `h` from (x0, y0).
    ///
    /// The returned series has `steps + 1` samples, the first one being the
    /// initial point.
    pub fn march_order1<S: FirstOrderOde + ?Sized>(
        &mut self,
        sys: &S,
        x0: f64,
        y0: f64,
        h: f64,
        steps: usize,
    ) -> Result<Series, IntegrationError> {
        validate_start(x0, y0, 0.0, h)?;
        if steps as u64 > self.max_steps {
            return Err(IntegrationError::MaxStepsExceeded {
                steps: steps as u64,
            });
        }

        let mut series = Series::with_capacity(steps + 1);
        let (mut x, mut y) = (x0, y0);
        for _ in 0..steps {
            let (x1, y1, slope) = rk4_order1_with_slope(sys, x, y, h);
            self.stats.fn_evals += 4;
            self.stats.steps += 1;
            series.push(x, y, slope);
            x = x1;
            y = y1;
        }
        self.stats.fn_evals += 1;
        series.push(x, y, sys.slope(x, y));

        Ok(series)
    }

    /// Sweep d²y/dx² = f outward from (x0, y0, dy0) in both directions.
    ///
    /// Steps of `+h` are taken while `inside(x, y, dy)` holds for the last
    /// sample, then steps of `-h` from the first sample while `inside` holds
    /// for it. The first sample outside is kept in each direction, so the
    /// series brackets the boundary. Samples are returned in increasing x
    /// for positive `h`.
    pub fn sweep_order2<S, P>(
        &mut self,
        sys: &S,
        x0: f64,
        y0: f64,
        dy0: f64,
        h: f64,
        mut inside: P,
    ) -> Result<Series, IntegrationError>
    where
        S: SecondOrderOde + ?Sized,
        P: FnMut(f64, f64, f64) -> bool,
    {
        validate_start(x0, y0, dy0, h)?;

        let mut forward = Series::with_capacity(1024);
        let mut backward = Series::with_capacity(1024);
        let mut step_count = 0u64;

        for (direction, series) in [(h, &mut forward), (-h, &mut backward)] {
            let (mut x, mut y, mut dy) = (x0, y0, dy0);
            while inside(x, y, dy) {
                (x, y, dy) = self.step_order2(sys, x, y, dy, direction);
                series.push(x, y, dy);

                step_count += 1;
                if step_count > self.max_steps {
                    log::warn!(
                        "sweep stopped after {} steps at x = {:e}, y = {:e}",
                        step_count,
                        x,
                        y
                    );
                    return Err(IntegrationError::MaxStepsExceeded { steps: step_count });
                }
            }
        }

        let mut series = Series::with_capacity(backward.len() + forward.len() + 1);
        for i in (0..backward.len()).rev() {
            series.push(backward.x[i], backward.y[i], backward.dy[i]);
        }
        series.push(x0, y0, dy0);
        series.x.extend_from_slice(&forward.x);
        series.y.extend_from_slice(&forward.y);
        series.dy.extend_from_slice(&forward.dy);

        log::debug!(
            "bidirectional sweep: {} samples ({} backward, {} forward)",
            series.len(),
            backward.len(),
            forward.len()
        );
        Ok(series)
    }
}

fn validate_start(x0: f64, y0: f64, dy0: f64, h: f64) -> Result<(), IntegrationError> {
    if !h.is_finite() || h == 0.0 {
        return Err(IntegrationError::InvalidInput {
            message: format!("step must be finite and non-zero, got {}", h),
        });
    }
    if !x0.is_finite() || !y0.is_finite() || !dy0.is_finite() {
        return Err(IntegrationError::InvalidInput {
            message: "initial state must be finite".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_rk4_order2_constant_rhs_is_exact() {
        let c = 3.5;
        let f = |_x: f64, _y: f64, _dy: f64| c;
        let (y0, dy0) = (2.0, -1.25);

        for &h in &[0.1, 0.5, 1.0, -0.75] {
            let (x1, y1, dy1) = rk4_order2(&f, 1.0, y0, dy0, h);
            assert_eq!(x1, 1.0 + h);
            assert_relative_eq!(y1, y0 + h * dy0 + 0.5 * h * h * c, max_relative = 1e-15);
            assert_relative_eq!(dy1, dy0 + h * c, max_relative = 1e-15);
        }
    }

    #[test]
    fn test_rk4_order1_exponential() {
        // y' = y, y(0) = 1
        let f = |_x: f64, y: f64| y;
        let mut x = 0.0;
        let mut y = 1.0;
        for _ in 0..100 {
            (x, y) = rk4_order1(&f, x, y, 0.01);
        }
        assert_relative_eq!(x, 1.0, max_relative = 1e-12);
        assert_relative_eq!(y, std::f64::consts::E, max_relative = 1e-9);
    }

    #[test]
    fn test_rk4_order1_backward() {
        // y' = 2x, y(1) = 1  =>  y(0) = 0; exact for polynomials of degree <= 4
        let f = |x: f64, _y: f64| 2.0 * x;
        let (x0, y0) = rk4_order1(&f, 1.0, 1.0, -1.0);
        assert_eq!(x0, 0.0);
        assert_abs_diff_eq!(y0, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_rk4_order2_harmonic_oscillator() {
        let f = |_x: f64, y: f64, _dy: f64| -y;
        let n = 1000;
        let h = 2.0 * std::f64::consts::PI / n as f64;
        let (mut x, mut y, mut dy) = (0.0, 1.0, 0.0);
        for _ in 0..n {
            (x, y, dy) = rk4_order2(&f, x, y, dy, h);
        }
        assert_relative_eq!(x, 2.0 * std::f64::consts::PI, max_relative = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dy, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rk4_order2_convergence() {
        // Global error of RK4 should drop by ~16 when h is halved
        let f = |_x: f64, y: f64, _dy: f64| -y;
        let error_for = |n: usize| {
            let h = 1.0 / n as f64;
            let (mut x, mut y, mut dy) = (0.0, 1.0, 0.0);
            for _ in 0..n {
                (x, y, dy) = rk4_order2(&f, x, y, dy, h);
            }
            (y - x.cos()).abs()
        };
        let ratio = error_for(10) / error_for(20);
        assert!(ratio > 12.0 && ratio < 20.0, "error ratio {}", ratio);
    }

    #[test]
    fn test_simpson_cubic_exact() {
        for &n in &[2, 4, 10, 100, 1000] {
            let value = simpson(|x| x * x * x, 0.0, 1.0, n);
            assert_abs_diff_eq!(value, 0.25, epsilon = 1e-14);
        }
        // General cubic on a shifted interval
        let p = |x: f64| 2.0 * x.powi(3) - x * x + 3.0 * x - 5.0;
        let exact = |x: f64| 0.5 * x.powi(4) - x.powi(3) / 3.0 + 1.5 * x * x - 5.0 * x;
        assert_relative_eq!(
            simpson(p, -1.5, 2.0, 6),
            exact(2.0) - exact(-1.5),
            max_relative = 1e-13
        );
    }

    #[test]
    fn test_simpson_zero_width_and_reversed() {
        assert_eq!(simpson(|x| x.exp(), 0.7, 0.7, 100), 0.0);
        assert_eq!(simpson(|x| x, 0.0, 1.0, 0), 0.0);
        let forward = simpson(|x| x.sin(), 0.0, 1.0, 100);
        let reverse = simpson(|x| x.sin(), 1.0, 0.0, 100);
        assert_relative_eq!(forward, -reverse, max_relative = 1e-14);
    }

    #[test]
    fn test_simpson_odd_n_loses_accuracy() {
        let even = (simpson(|x| x * x, 0.0, 1.0, 10) - 1.0 / 3.0).abs();
        let odd = (simpson(|x| x * x, 0.0, 1.0, 11) - 1.0 / 3.0).abs();
        assert!(even < 1e-15);
        assert!(odd > 1e-3, "odd-n error {}", odd);
    }

    #[test]
    fn test_nan_propagates_silently() {
        let f = |_x: f64, _y: f64, _dy: f64| f64::NAN;
        let (_, y1, dy1) = rk4_order2(&f, 0.0, 1.0, 0.0, 0.1);
        assert!(y1.is_nan());
        assert!(dy1.is_nan());
        assert!(simpson(|x| 1.0 / (x - 0.5), 0.0, 1.0, 2).is_infinite());
    }

    #[test]
    fn test_march_order1_counts_and_samples() {
        let mut integrator = Integrator::new();
        let series = integrator
            .march_order1(&|_x: f64, _y: f64| 2.0, 0.0, 1.0, 0.5, 4)
            .unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.x, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_relative_eq!(series.y[4], 5.0);
        assert!(series.dy.iter().all(|&s| s == 2.0));
        assert_eq!(integrator.stats.steps, 4);
        assert_eq!(integrator.stats.fn_evals, 17);
    }

    #[test]
    fn test_sweep_order2_brackets_interval() {
        // y'' = 0, y' = 1: y = 1 + x, sweep while 0.5 <= y < 2
        let mut integrator = Integrator::new();
        let series = integrator
            .sweep_order2(
                &|_x: f64, _y: f64, _dy: f64| 0.0,
                0.0,
                1.0,
                1.0,
                0.1,
                |_x, y, _dy| (0.5..2.0).contains(&y),
            )
            .unwrap();

        assert!(series.x.windows(2).all(|w| w[1] > w[0]));
        let first = series.y[0];
        let last = series.y[series.len() - 1];
        assert!(first < 0.5 && first > 0.35, "first = {}", first);
        assert!(last >= 2.0 && last < 2.15, "last = {}", last);

        let origin = series.x.iter().position(|&x| x == 0.0).unwrap();
        assert_eq!(series.y[origin], 1.0);
        assert_eq!(integrator.stats.steps as usize, series.len() - 1);
    }

    #[test]
    fn test_sweep_rejects_bad_step() {
        let mut integrator = Integrator::new();
        let f = |_x: f64, _y: f64, _dy: f64| 0.0;
        let zero = integrator.sweep_order2(&f, 0.0, 1.0, 0.0, 0.0, |_, _, _| true);
        assert!(matches!(zero, Err(IntegrationError::InvalidInput { .. })));
        let nan = integrator.sweep_order2(&f, 0.0, f64::NAN, 0.0, 0.1, |_, _, _| true);
        assert!(matches!(nan, Err(IntegrationError::InvalidInput { .. })));
    }

    #[test]
    fn test_sweep_max_steps_exceeded() {
        let mut integrator = Integrator::new();
        integrator.max_steps = 5;
        let result = integrator.sweep_order2(
            &|_x: f64, _y: f64, _dy: f64| 0.0,
            0.0,
            1.0,
            0.0,
            0.1,
            |_, _, _| true,
        );
        assert_eq!(result, Err(IntegrationError::MaxStepsExceeded { steps: 6 }));
    }
}
