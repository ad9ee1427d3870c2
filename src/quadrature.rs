//! One-dimensional functions and Riemann-sum integration.

use std::fmt::Debug;

use tracing::trace;

use crate::error::{ModelError, Result};

/// A real function of one variable that carries its own domain.
///
/// The domain may be unbounded on either side. Integrators never evaluate the
/// function outside `[lower_bound, upper_bound]`. Evaluation is fallible so
/// that integrands built from partially supported laws can report it.
pub trait UnivariateFunction {
    fn evaluate(&self, argument: f64) -> Result<f64>;

    fn lower_bound(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn upper_bound(&self) -> f64 {
        f64::INFINITY
    }
}

/// A function that knows how to compute its own definite integral.
pub trait IntegrableUnivariateFunction: UnivariateFunction {
    fn evaluate_integral(&self, lower: f64, upper: f64) -> Result<f64>;
}

impl<F: Fn(f64) -> f64> UnivariateFunction for F {
    fn evaluate(&self, argument: f64) -> Result<f64> {
        Ok(self(argument))
    }
}

/// A one-dimensional quadrature rule.
pub trait Integrator: Debug {
    fn integrate(&self, function: &dyn UnivariateFunction, lower: f64, upper: f64)
        -> Result<f64>;
}

/// Attach a domain to a plain closure.
#[derive(Debug, Clone, Copy)]
pub struct Bounded<F> {
    pub function: F,
    pub lower: f64,
    pub upper: f64,
}

impl<F: Fn(f64) -> f64> UnivariateFunction for Bounded<F> {
    fn evaluate(&self, argument: f64) -> Result<f64> {
        Ok((self.function)(argument))
    }

    fn lower_bound(&self) -> f64 {
        self.lower
    }

    fn upper_bound(&self) -> f64 {
        self.upper
    }
}

/// Settings for the Riemann-sum integrator
#[derive(Debug, Clone, Copy)]
pub struct RiemannSettings {
    /// Number of equal-width subintervals per integral. Evaluation cost is
    /// linear in this, and quadratic for nested integrals.
    pub subdivisions: usize,
}

impl Default for RiemannSettings {
    fn default() -> RiemannSettings {
        RiemannSettings { subdivisions: 1000 }
    }
}

/// Composite midpoint rule with a fixed number of subdivisions.
#[derive(Debug, Clone, Copy)]
pub struct RiemannApproximation {
    subdivisions: usize,
}

impl RiemannApproximation {
    pub fn new(settings: RiemannSettings) -> Result<Self> {
        if settings.subdivisions == 0 {
            return Err(ModelError::InvalidSubdivisions);
        }
        Ok(RiemannApproximation {
            subdivisions: settings.subdivisions,
        })
    }

    pub fn with_subdivisions(subdivisions: usize) -> Result<Self> {
        Self::new(RiemannSettings { subdivisions })
    }

    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    /// Integrate `function` from `lower` to `upper`.
    ///
    /// The interval is first clipped to the function's own bounds, so an
    /// infinite limit is fine as long as the function is bounded on that
    /// side. Swapped limits give the negated integral.
    pub fn integrate<F: UnivariateFunction + ?Sized>(
        &self,
        function: &F,
        lower: f64,
        upper: f64,
    ) -> Result<f64> {
        if upper < lower {
            return Ok(-self.integrate(function, upper, lower)?);
        }

        let lower = lower.max(function.lower_bound());
        let upper = upper.min(function.upper_bound());
        if !(lower < upper) {
            return Ok(0.);
        }
        if !lower.is_finite() | !upper.is_finite() {
            return Err(ModelError::UnboundedInterval { lower, upper });
        }

        let width = (upper - lower) / self.subdivisions as f64;
        let sum = (0..self.subdivisions)
            .map(|i| function.evaluate(lower + (i as f64 + 0.5) * width))
            .sum::<Result<f64>>()?;
        trace!(lower, upper, subdivisions = self.subdivisions, "riemann sum");
        Ok(sum * width)
    }
}

impl Integrator for RiemannApproximation {
    fn integrate(
        &self,
        function: &dyn UnivariateFunction,
        lower: f64,
        upper: f64,
    ) -> Result<f64> {
        RiemannApproximation::integrate(self, function, lower, upper)
    }
}

impl Default for RiemannApproximation {
    fn default() -> Self {
        RiemannApproximation {
            subdivisions: RiemannSettings::default().subdivisions,
        }
    }
}
