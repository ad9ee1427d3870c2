//! Log-likelihood terms evaluated by the outer sampler.
//!
//! A sampler step looks like `store_state`, an operator proposal,
//! `log_likelihood`, then `accept_state` or `restore_state`. Likelihoods
//! that cache their value use the store/restore pair to roll back a rejected
//! proposal without recomputing.

mod binomial;
mod stuttering;

pub use binomial::ChainSamplingLikelihood;
pub use stuttering::StutteringChainLikelihood;

use crate::error::{ModelError, Result};

pub trait Likelihood {
    fn name(&self) -> String;

    /// Log likelihood of the current state of the bound parameters.
    fn log_likelihood(&mut self) -> Result<f64>;

    /// Forget any cached value.
    fn make_dirty(&mut self);

    fn store_state(&mut self) {}

    fn restore_state(&mut self) {}

    fn accept_state(&mut self) {}

    /// Render the current state as a structured document.
    fn to_document(&self) -> Result<String> {
        Err(ModelError::Unsupported("document serialization"))
    }
}

/// Last computed value and whether it is still current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikelihoodCache {
    pub log_likelihood: f64,
    pub known: bool,
}

impl Default for LikelihoodCache {
    fn default() -> Self {
        LikelihoodCache {
            log_likelihood: f64::NAN,
            known: false,
        }
    }
}

impl LikelihoodCache {
    /// Cached value, if still current.
    pub fn get(&self) -> Option<f64> {
        self.known.then_some(self.log_likelihood)
    }

    pub fn set(&mut self, log_likelihood: f64) {
        self.log_likelihood = log_likelihood;
        self.known = true;
    }

    pub fn invalidate(&mut self) {
        self.known = false;
    }
}
