use itertools::izip;
use tracing::{debug, trace};

use crate::{
    distribution::{Density, StutteringChain},
    error::Result,
    likelihood::{Likelihood, LikelihoodCache},
    parameter::{Bounds, DirtyFlag, Parameter},
};

/// Likelihood of latent cluster sizes under the stuttering-chain law.
///
/// Only the entries whose indicator is active contribute. The value is cached
/// and recomputed after any of the four bound parameters changes.
#[derive(Debug)]
pub struct StutteringChainLikelihood {
    name: String,
    r0: Parameter,
    omega: Parameter,
    latent: Parameter,
    indicators: Parameter,
    changed: DirtyFlag,
    cache: LikelihoodCache,
    stored: LikelihoodCache,
}

impl StutteringChainLikelihood {
    pub fn new(
        r0: Parameter,
        omega: Parameter,
        latent: Parameter,
        indicators: Parameter,
    ) -> Result<Self> {
        Self::with_name("stutteringChainLikelihood", r0, omega, latent, indicators)
    }

    pub fn with_name(
        name: impl Into<String>,
        r0: Parameter,
        omega: Parameter,
        latent: Parameter,
        indicators: Parameter,
    ) -> Result<Self> {
        indicators.expect_dim("indicators", latent.dim())?;
        r0.expect_dim("r0", 1)?;
        omega.expect_dim("omega", 1)?;

        let changed = DirtyFlag::new();
        for param in [&r0, &omega, &latent, &indicators] {
            param.add_listener(&changed);
        }
        r0.add_bounds(Bounds::non_negative());
        omega.add_bounds(Bounds::non_negative());
        indicators.add_bounds(Bounds::unit());

        let name = name.into();
        debug!(%name, clusters = latent.dim(), "stuttering chain likelihood");
        Ok(StutteringChainLikelihood {
            name,
            r0,
            omega,
            latent,
            indicators,
            changed,
            cache: LikelihoodCache::default(),
            stored: LikelihoodCache::default(),
        })
    }

    /// Cache state as it would be seen by the next `log_likelihood` call.
    pub fn is_known(&self) -> bool {
        self.cache.known & !self.changed.is_marked()
    }

    fn compute(&self) -> f64 {
        let latent = self.latent.values();
        let indicators = self.indicators.values();
        let mut active = izip!(&*latent, &*indicators)
            .filter(|(_, indicator)| **indicator > 0.)
            .map(|(&size, _)| size)
            .peekable();
        if active.peek().is_none() {
            return 0.;
        }

        let r0 = self.r0.value(0);
        let omega = self.omega.value(0);
        if !(r0 > 0.) | !(omega > 0.) | !r0.is_finite() | !omega.is_finite() {
            return f64::NEG_INFINITY;
        }

        let dist = StutteringChain::new(r0, omega);
        let log_likelihood: f64 = active.map(|size| dist.log_pdf(size)).sum();
        if log_likelihood.is_nan() {
            return f64::NEG_INFINITY;
        }
        log_likelihood
    }
}

impl Likelihood for StutteringChainLikelihood {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn log_likelihood(&mut self) -> Result<f64> {
        if self.changed.take() {
            self.cache.invalidate();
        }
        if let Some(value) = self.cache.get() {
            return Ok(value);
        }
        let value = self.compute();
        trace!(value, "stuttering chain log likelihood recomputed");
        self.cache.set(value);
        Ok(value)
    }

    fn make_dirty(&mut self) {
        self.cache.invalidate();
    }

    fn store_state(&mut self) {
        if self.changed.take() {
            self.cache.invalidate();
        }
        self.stored = self.cache;
    }

    fn restore_state(&mut self) {
        self.changed.clear();
        self.cache = self.stored;
    }
}
