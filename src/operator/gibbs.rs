use std::{cell::RefCell, rc::Rc};

use rand::Rng;
use rand_distr::{Beta, Distribution};
use tracing::{debug, trace};

use crate::{
    error::{ModelError, Result},
    operator::{validate_weight, Operator, OperatorTally},
    parameter::Parameter,
};

/// Per-site success and failure counts maintained by another part of the
/// model, typically a clustering prior that tracks which sites are causal.
pub trait SiteCounts {
    fn num_sites(&self) -> usize;
    fn causal_count(&self, site: usize) -> u64;
    fn non_causal_count(&self, site: usize) -> u64;
}

impl<T: SiteCounts + ?Sized> SiteCounts for Rc<RefCell<T>> {
    fn num_sites(&self) -> usize {
        self.borrow().num_sites()
    }

    fn causal_count(&self, site: usize) -> u64 {
        self.borrow().causal_count(site)
    }

    fn non_causal_count(&self, site: usize) -> u64 {
        self.borrow().non_causal_count(site)
    }
}

/// Plain in-memory site counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteTally {
    pub causal: Vec<u64>,
    pub non_causal: Vec<u64>,
}

impl SiteTally {
    pub fn new(causal: Vec<u64>, non_causal: Vec<u64>) -> Result<Self> {
        if causal.len() != non_causal.len() {
            return Err(ModelError::DimensionMismatch {
                what: "non-causal counts",
                expected: causal.len(),
                found: non_causal.len(),
            });
        }
        Ok(SiteTally { causal, non_causal })
    }
}

impl SiteCounts for SiteTally {
    fn num_sites(&self) -> usize {
        self.causal.len()
    }

    fn causal_count(&self, site: usize) -> u64 {
        self.causal[site]
    }

    fn non_causal_count(&self, site: usize) -> u64 {
        self.non_causal[site]
    }
}

/// Gibbs update of one coordinate of a per-site probability vector.
///
/// With a uniform prior and binomial counts the full conditional of a site
/// probability is `Beta(causal + 1, non_causal + 1)`, so each call replaces a
/// uniformly chosen coordinate with an exact draw from it.
pub struct SiteProbabilityGibbs<C: SiteCounts> {
    probabilities: Parameter,
    counts: C,
    weight: f64,
    tally: OperatorTally,
}

impl<C: SiteCounts> SiteProbabilityGibbs<C> {
    pub fn new(probabilities: Parameter, counts: C, weight: f64) -> Result<Self> {
        let weight = validate_weight(weight)?;
        probabilities.expect_dim("site probabilities", counts.num_sites())?;
        debug!(
            parameter = %probabilities.name(),
            sites = counts.num_sites(),
            "site probability gibbs operator"
        );
        Ok(SiteProbabilityGibbs {
            probabilities,
            counts,
            weight,
            tally: OperatorTally::default(),
        })
    }

    pub fn counts(&self) -> &C {
        &self.counts
    }
}

impl<C: SiteCounts> Operator for SiteProbabilityGibbs<C> {
    fn name(&self) -> String {
        format!("siteProbabilityGibbs({})", self.probabilities.name())
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn propose<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64> {
        let num_sites = self.counts.num_sites();
        self.probabilities.expect_dim("site probabilities", num_sites)?;
        if num_sites == 0 {
            return Ok(0.);
        }

        let site = rng.random_range(0..num_sites);
        let alpha = self.counts.causal_count(site) as f64 + 1.;
        let beta = self.counts.non_causal_count(site) as f64 + 1.;
        let posterior = Beta::new(alpha, beta)
            .map_err(|err| ModelError::InvalidDistribution(format!("beta: {err}")))?;
        let value = posterior.sample(rng);

        trace!(site, alpha, beta, value, "gibbs draw");
        self.probabilities.set_value(site, value);
        Ok(0.)
    }

    fn tally(&self) -> &OperatorTally {
        &self.tally
    }

    fn tally_mut(&mut self) -> &mut OperatorTally {
        &mut self.tally
    }

    fn is_gibbs(&self) -> bool {
        true
    }
}
