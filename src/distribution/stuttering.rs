use statrs::function::gamma::ln_gamma;

use crate::{
    distribution::Density,
    error::{ModelError, Result},
};

/// Total size of a transmission cluster under a subcritical branching process
/// with negative-binomial offspring.
///
/// `mean` is the reproduction number R0 and `omega` the dispersion of the
/// offspring distribution. The law lives on `x >= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StutteringChain {
    mean: f64,
    omega: f64,
}

impl StutteringChain {
    pub fn new(mean: f64, omega: f64) -> Self {
        StutteringChain { mean, omega }
    }

    pub fn r0(&self) -> f64 {
        self.mean
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }
}

impl Density for StutteringChain {
    fn pdf(&self, x: f64) -> f64 {
        if x < 1. {
            return 0.;
        }
        self.log_pdf(x).exp()
    }

    fn log_pdf(&self, x: f64) -> f64 {
        if x < 1. {
            return f64::NEG_INFINITY;
        }
        let Self { mean, omega } = *self;
        let size = omega * x + x - 1.;
        let log_const = ln_gamma(size) - (ln_gamma(omega * x) + ln_gamma(x + 1.));
        let log_dens = (x - 1.) * (mean / omega).ln() - size * (mean / omega).ln_1p();
        log_const + log_dens
    }

    // TODO: derive from the negative-binomial offspring law, checked
    // numerically against the partial sums of `pdf`.
    fn cdf(&self, _x: f64) -> Result<f64> {
        Err(ModelError::Unsupported("cdf of the stuttering chain"))
    }

    fn quantile(&self, _probability: f64) -> Result<f64> {
        Err(ModelError::Unsupported("quantile of the stuttering chain"))
    }

    fn mean(&self) -> f64 {
        1. + self.mean / (1. - self.mean)
    }

    fn variance(&self) -> f64 {
        (self.mean * (1. + self.mean / self.omega)) / (1. - self.mean).powi(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn moments(dist: &StutteringChain, cutoff: u32) -> (f64, f64, f64) {
        let pmf = (1..=cutoff).map(|x| (x as f64, dist.pdf(x as f64)));
        let (mass, first, second) = pmf.fold((0., 0., 0.), |(m, s1, s2), (x, p)| {
            (m + p, s1 + x * p, s2 + x * x * p)
        });
        (mass, first, second - first * first)
    }

    #[test]
    fn single_case_cluster() {
        // A cluster of one means the index case infected nobody.
        let dist = StutteringChain::new(0.5, 0.5);
        let no_offspring = (1. + 0.5 / 0.5f64).powf(-0.5);
        assert_relative_eq!(dist.pdf(1.), no_offspring, max_relative = 1e-12);
    }

    #[test]
    fn below_support() {
        let dist = StutteringChain::new(0.5, 0.5);
        assert_eq!(dist.pdf(0.5), 0.);
        assert_eq!(dist.pdf(-3.), 0.);
        assert_eq!(dist.log_pdf(0.99), f64::NEG_INFINITY);
    }

    #[test]
    fn pmf_sums_to_one_and_matches_moments() {
        for (r0, omega) in [(0.5, 0.5), (0.3, 0.8), (0.7, 0.2)] {
            let dist = StutteringChain::new(r0, omega);
            let (mass, mean, variance) = moments(&dist, 20_000);
            assert_relative_eq!(mass, 1., max_relative = 1e-9);
            assert_relative_eq!(mean, dist.mean(), max_relative = 1e-9);
            assert_relative_eq!(variance, dist.variance(), max_relative = 1e-6);
        }
    }

    #[test]
    fn unsupported() {
        let dist = StutteringChain::new(0.5, 0.5);
        assert!(matches!(dist.cdf(3.), Err(ModelError::Unsupported(_))));
        assert!(matches!(dist.quantile(0.5), Err(ModelError::Unsupported(_))));
    }

    proptest! {
        #[test]
        fn log_pdf_is_log_of_pdf(x in 1f64..60f64, r0 in 0.05f64..0.95, omega in 0.05f64..0.95) {
            let dist = StutteringChain::new(r0, omega);
            let log_pdf = dist.log_pdf(x);
            prop_assert!(log_pdf.is_finite());
            prop_assert!((dist.pdf(x).ln() - log_pdf).abs() < 1e-9 * log_pdf.abs().max(1.));
        }
    }
}
