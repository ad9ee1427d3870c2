use statrs::distribution::{Continuous, ContinuousCDF, Gamma, Normal};

use crate::{
    distribution::Density,
    error::{ModelError, Result},
};

/// statrs panics on an inverse cdf outside the unit interval.
fn check_probability(probability: f64) -> Result<f64> {
    if (0. ..=1.).contains(&probability) {
        Ok(probability)
    } else {
        Err(ModelError::InvalidDistribution(format!(
            "probability {probability} is outside [0, 1]"
        )))
    }
}

/// Gamma law parameterized by shape and scale.
#[derive(Debug, Clone)]
pub struct GammaDensity {
    shape: f64,
    scale: f64,
    inner: Gamma,
}

impl GammaDensity {
    pub fn new(shape: f64, scale: f64) -> Result<Self> {
        let inner = Gamma::new(shape, scale.recip())
            .map_err(|err| ModelError::InvalidDistribution(format!("gamma: {err}")))?;
        Ok(GammaDensity {
            shape,
            scale,
            inner,
        })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Density for GammaDensity {
    fn pdf(&self, x: f64) -> f64 {
        if x < 0. {
            return 0.;
        }
        self.inner.pdf(x)
    }

    fn log_pdf(&self, x: f64) -> f64 {
        if x < 0. {
            return f64::NEG_INFINITY;
        }
        self.inner.ln_pdf(x)
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        if x <= 0. {
            return Ok(0.);
        }
        Ok(self.inner.cdf(x))
    }

    fn quantile(&self, probability: f64) -> Result<f64> {
        Ok(self.inner.inverse_cdf(check_probability(probability)?))
    }

    fn mean(&self) -> f64 {
        self.shape * self.scale
    }

    fn variance(&self) -> f64 {
        self.shape * self.scale * self.scale
    }
}

/// Normal law restricted to `[lower, upper]` and renormalized.
#[derive(Debug, Clone)]
pub struct TruncatedNormalDensity {
    mean: f64,
    sd: f64,
    lower: f64,
    upper: f64,
    normal: Normal,
    cdf_lower: f64,
    log_mass: f64,
}

impl TruncatedNormalDensity {
    pub fn new(mean: f64, sd: f64, lower: f64, upper: f64) -> Result<Self> {
        let normal = Normal::new(mean, sd)
            .map_err(|err| ModelError::InvalidDistribution(format!("normal: {err}")))?;
        let cdf_lower = normal.cdf(lower);
        let mass = normal.cdf(upper) - cdf_lower;
        if !(lower < upper) | !(mass > 0.) {
            return Err(ModelError::InvalidDistribution(format!(
                "truncation [{lower}, {upper}] leaves no mass"
            )));
        }
        Ok(TruncatedNormalDensity {
            mean,
            sd,
            lower,
            upper,
            normal,
            cdf_lower,
            log_mass: mass.ln(),
        })
    }

    /// Truncated only from above, the usual shape for a date that cannot be
    /// later than some observation.
    pub fn bounded_above(mean: f64, sd: f64, upper: f64) -> Result<Self> {
        Self::new(mean, sd, f64::NEG_INFINITY, upper)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    fn mass(&self) -> f64 {
        self.log_mass.exp()
    }

    fn standardize(&self, x: f64) -> f64 {
        (x - self.mean) / self.sd
    }
}

impl Density for TruncatedNormalDensity {
    fn pdf(&self, x: f64) -> f64 {
        if !(self.lower..=self.upper).contains(&x) {
            return 0.;
        }
        (self.normal.ln_pdf(x) - self.log_mass).exp()
    }

    fn log_pdf(&self, x: f64) -> f64 {
        if !(self.lower..=self.upper).contains(&x) {
            return f64::NEG_INFINITY;
        }
        self.normal.ln_pdf(x) - self.log_mass
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        if x <= self.lower {
            return Ok(0.);
        }
        if x >= self.upper {
            return Ok(1.);
        }
        Ok((self.normal.cdf(x) - self.cdf_lower) / self.mass())
    }

    fn quantile(&self, probability: f64) -> Result<f64> {
        let target = self.cdf_lower + check_probability(probability)? * self.mass();
        Ok(self.normal.inverse_cdf(target).clamp(self.lower, self.upper))
    }

    fn mean(&self) -> f64 {
        let phi = |z: f64| (-0.5 * z * z).exp() / (2. * std::f64::consts::PI).sqrt();
        let alpha = self.standardize(self.lower);
        let beta = self.standardize(self.upper);
        self.mean + self.sd * (phi(alpha) - phi(beta)) / self.mass()
    }

    fn variance(&self) -> f64 {
        let phi = |z: f64| (-0.5 * z * z).exp() / (2. * std::f64::consts::PI).sqrt();
        // z * phi(z) vanishes at infinite truncation points
        let z_phi = |z: f64| if z.is_finite() { z * phi(z) } else { 0. };
        let alpha = self.standardize(self.lower);
        let beta = self.standardize(self.upper);
        let mass = self.mass();
        let shift = (phi(alpha) - phi(beta)) / mass;
        self.sd * self.sd * (1. + (z_phi(alpha) - z_phi(beta)) / mass - shift * shift)
    }
}
