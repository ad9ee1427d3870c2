//! MCMC update operators.
//!
//! The outer sampler picks an operator, calls [`Operator::propose`] once and
//! then reports the outcome through [`Operator::accept`] or
//! [`Operator::reject`]. The value returned by `propose` is the log
//! Hastings-ratio contribution of the move.

mod block;
mod gibbs;

pub use block::BlockToggleOperator;
pub use gibbs::{SiteCounts, SiteProbabilityGibbs, SiteTally};

use rand::Rng;

use crate::error::{ModelError, Result};

/// Running acceptance statistics of one operator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OperatorTally {
    pub accepted: u64,
    pub rejected: u64,
    pub sum_deviation: f64,
}

impl OperatorTally {
    pub fn count(&self) -> u64 {
        self.accepted + self.rejected
    }

    /// Fraction of accepted proposals, `None` before the first outcome.
    pub fn acceptance_probability(&self) -> Option<f64> {
        match self.count() {
            0 => None,
            n => Some(self.accepted as f64 / n as f64),
        }
    }

    pub fn mean_deviation(&self) -> Option<f64> {
        match self.accepted {
            0 => None,
            n => Some(self.sum_deviation / n as f64),
        }
    }
}

pub trait Operator {
    /// A stable identifier, usually derived from the target parameter.
    fn name(&self) -> String;

    /// Relative frequency with which the scheduler should pick this operator.
    fn weight(&self) -> f64;

    /// Change the target parameter in place and return the log Hastings
    /// ratio of the move.
    fn propose<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64>;

    fn tally(&self) -> &OperatorTally;
    fn tally_mut(&mut self) -> &mut OperatorTally;

    /// Gibbs moves sample from the full conditional and are always accepted.
    fn is_gibbs(&self) -> bool {
        false
    }

    fn accept(&mut self, deviation: f64) {
        let tally = self.tally_mut();
        tally.accepted += 1;
        tally.sum_deviation += deviation;
    }

    fn reject(&mut self) {
        self.tally_mut().rejected += 1;
    }
}

pub(crate) fn validate_weight(weight: f64) -> Result<f64> {
    if !weight.is_finite() | (weight <= 0.) {
        return Err(ModelError::InvalidWeight(weight));
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tally() {
        let mut tally = OperatorTally::default();
        assert_eq!(tally.acceptance_probability(), None);
        tally.accepted = 3;
        tally.rejected = 1;
        tally.sum_deviation = 1.5;
        assert_eq!(tally.acceptance_probability(), Some(0.75));
        assert_eq!(tally.mean_deviation(), Some(0.5));
    }

    #[test]
    fn weights() {
        assert_eq!(validate_weight(2.), Ok(2.));
        assert_eq!(validate_weight(0.), Err(ModelError::InvalidWeight(0.)));
        assert!(validate_weight(f64::NAN).is_err());
    }
}
