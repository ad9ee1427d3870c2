use std::f64::consts::LN_2;

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::{
    error::{ModelError, Result},
    operator::{validate_weight, Operator, OperatorTally},
    parameter::Parameter,
};

/// Shift the number of active indicators by a fixed block size.
///
/// With `N` indicators of which `K` are active, the move proposes
/// `K' = K ± block_size`, reflecting at `0` and `N`, and then rewrites the
/// indicators as a prefix block: the first `K'` entries are set to one and
/// the rest to zero. Which entries were active before the move is discarded,
/// so the move is symmetric in the active count only.
///
/// Example: `K = 5`, `N = 8` gives `[1 1 1 1 1 0 0 0]`.
pub struct BlockToggleOperator {
    indicators: Parameter,
    block_size: usize,
    weight: f64,
    tally: OperatorTally,
}

/// Where a proposal lands relative to the current active count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
    Either,
    /// Neither direction stays inside `[0, N]`.
    Blocked,
}

impl BlockToggleOperator {
    pub fn new(indicators: Parameter, block_size: usize, weight: f64) -> Result<Self> {
        let weight = validate_weight(weight)?;
        let dim = indicators.dim();
        if block_size > dim {
            return Err(ModelError::BlockSizeTooLarge { block_size, dim });
        }
        if block_size == 0 {
            return Err(ModelError::EmptyBlock);
        }
        debug!(parameter = %indicators.name(), block_size, dim, "block toggle operator");
        Ok(BlockToggleOperator {
            indicators,
            block_size,
            weight,
            tally: OperatorTally::default(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of indicators above zero. Negative or NaN entries are corrupt.
    fn active_count(&self) -> Result<usize> {
        let values = self.indicators.values();
        for (index, &value) in values.iter().enumerate() {
            if !(value >= 0.) {
                let name = self.indicators.name();
                warn!(parameter = %name, index, value, "corrupt indicator");
                return Err(ModelError::MalformedIndicators { name, index, value });
            }
        }
        Ok(values.iter().filter(|&&value| value > 0.).count())
    }

    fn step(&self, active: usize, dim: usize) -> Step {
        let below = active < self.block_size;
        let above = active + self.block_size > dim;
        match (below, above) {
            (true, true) => Step::Blocked,
            (true, false) => Step::Up,
            (false, true) => Step::Down,
            (false, false) => Step::Either,
        }
    }
}

impl Operator for BlockToggleOperator {
    fn name(&self) -> String {
        format!("bitBlock({})", self.indicators.name())
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn propose<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64> {
        let dim = self.indicators.dim();
        let active = self.active_count()?;

        let (proposed, log_hastings) = match self.step(active, dim) {
            Step::Blocked => {
                trace!(active, dim, block_size = self.block_size, "no room for a block move");
                return Ok(0.);
            }
            Step::Up => (active + self.block_size, 0.),
            Step::Down => (active - self.block_size, 0.),
            Step::Either => {
                let proposed = if rng.random_bool(0.5) {
                    active + self.block_size
                } else {
                    active - self.block_size
                };
                (proposed, -LN_2)
            }
        };

        trace!(active, proposed, log_hastings, "block move");
        self.indicators
            .set_values((0..dim).map(|i| if i < proposed { 1. } else { 0. }));
        Ok(log_hastings)
    }

    fn tally(&self) -> &OperatorTally {
        &self.tally
    }

    fn tally_mut(&mut self) -> &mut OperatorTally {
        &mut self.tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn indicators(dim: usize, active: usize) -> Parameter {
        Parameter::new(
            "indicators",
            (0..dim)
                .map(|i| if i < active { 1. } else { 0. })
                .collect::<Vec<_>>(),
        )
    }

    fn count(param: &Parameter) -> usize {
        param.values().iter().filter(|&&v| v > 0.).count()
    }

    #[test]
    fn example_layout() {
        let param = indicators(8, 2);
        let mut op = BlockToggleOperator::new(param.clone(), 3, 1.).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let hastings = op.propose(&mut rng).unwrap();
        assert_eq!(hastings, 0.);
        assert_eq!(&*param.values(), &[1., 1., 1., 1., 1., 0., 0., 0.]);
        assert_eq!(op.name(), "bitBlock(indicators)");
    }

    #[test]
    fn normalizes_to_prefix() {
        let param = Parameter::new("indicators", vec![0., 1., 0., 1., 1., 0.]);
        let mut op = BlockToggleOperator::new(param.clone(), 1, 1.).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        op.propose(&mut rng).unwrap();
        let values = param.values().to_vec();
        let k = count(&param);
        assert!(k == 2 || k == 4);
        assert!(values[..k].iter().all(|&v| v == 1.));
        assert!(values[k..].iter().all(|&v| v == 0.));
    }

    #[test]
    fn reflects_at_boundaries() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let empty = indicators(5, 0);
        let mut op = BlockToggleOperator::new(empty.clone(), 2, 1.).unwrap();
        assert_eq!(op.propose(&mut rng).unwrap(), 0.);
        assert_eq!(count(&empty), 2);

        let full = indicators(5, 5);
        let mut op = BlockToggleOperator::new(full.clone(), 2, 1.).unwrap();
        assert_eq!(op.propose(&mut rng).unwrap(), 0.);
        assert_eq!(count(&full), 3);

        // K = block_size reflects only when the upward step overshoots.
        let param = indicators(5, 3);
        let mut op = BlockToggleOperator::new(param.clone(), 3, 1.).unwrap();
        assert_eq!(op.propose(&mut rng).unwrap(), 0.);
        assert_eq!(count(&param), 0);
    }

    #[test]
    fn blocked_move_leaves_state_alone() {
        // 2 * block_size > N: from K = 2 neither 2 - 3 nor 2 + 3 fits in [0, 4].
        let param = Parameter::new("indicators", vec![0., 1., 1., 0.]);
        let mut op = BlockToggleOperator::new(param.clone(), 3, 1.).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(op.propose(&mut rng).unwrap(), 0.);
        assert_eq!(&*param.values(), &[0., 1., 1., 0.]);
    }

    #[test]
    fn construction_errors() {
        let param = indicators(3, 1);
        assert_eq!(
            BlockToggleOperator::new(param.clone(), 4, 1.).err(),
            Some(ModelError::BlockSizeTooLarge {
                block_size: 4,
                dim: 3
            })
        );
        assert_eq!(
            BlockToggleOperator::new(param.clone(), 0, 1.).err(),
            Some(ModelError::EmptyBlock)
        );
        assert_eq!(
            BlockToggleOperator::new(param, 1, -1.).err(),
            Some(ModelError::InvalidWeight(-1.))
        );
    }

    #[test]
    fn positive_entries_count_as_active() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for value in [2., 0.5] {
            let param = Parameter::new("indicators", vec![value, 0., 0., 0.]);
            let mut op = BlockToggleOperator::new(param.clone(), 1, 1.).unwrap();
            let hastings = op.propose(&mut rng).unwrap();
            assert_eq!(hastings, -LN_2);
            let k = count(&param);
            assert!(k == 0 || k == 2);
            assert!(param.values().iter().all(|&v| (v == 0.) | (v == 1.)));
        }
    }

    #[test]
    fn corrupt_indicators() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let param = Parameter::new("indicators", vec![1., -0.5, 0.]);
        let mut op = BlockToggleOperator::new(param, 1, 1.).unwrap();
        assert_eq!(
            op.propose(&mut rng).unwrap_err(),
            ModelError::MalformedIndicators {
                name: "indicators".into(),
                index: 1,
                value: -0.5
            }
        );

        let param = Parameter::new("indicators", vec![1., 0., f64::NAN]);
        let mut op = BlockToggleOperator::new(param, 1, 1.).unwrap();
        assert!(matches!(
            op.propose(&mut rng),
            Err(ModelError::MalformedIndicators { index: 2, .. })
        ));
    }

    #[test]
    fn interior_moves_go_both_ways() {
        let param = indicators(10, 5);
        let mut op = BlockToggleOperator::new(param.clone(), 2, 1.).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = [false; 11];
        for _ in 0..200 {
            param.set_values(indicators(10, 5).values().iter().copied());
            assert_eq!(op.propose(&mut rng).unwrap(), -LN_2);
            seen[count(&param)] = true;
        }
        assert!(seen[3] && seen[7]);
    }

    proptest! {
        #[test]
        fn stays_in_range(dim in 1usize..40, block in 1usize..40, start in 0usize..40, seed in any::<u64>()) {
            let block_size = block.min(dim);
            let active = start.min(dim);
            let param = indicators(dim, active);
            let mut op = BlockToggleOperator::new(param.clone(), block_size, 1.).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let hastings = op.propose(&mut rng).unwrap();
            let proposed = count(&param);
            prop_assert!(proposed <= dim);

            let down = active >= block_size;
            let up = active + block_size <= dim;
            if down & up {
                prop_assert_eq!(hastings, -LN_2);
                prop_assert!(proposed + block_size == active || proposed == active + block_size);
            } else if down | up {
                prop_assert_eq!(hastings, 0.);
                prop_assert!(proposed + block_size == active || proposed == active + block_size);
            } else {
                prop_assert_eq!(hastings, 0.);
                prop_assert_eq!(proposed, active);
            }
        }
    }
}
