use itertools::izip;
use statrs::function::factorial::ln_binomial;
use tracing::{debug, trace, warn};

use crate::{
    error::{ModelError, Result},
    likelihood::Likelihood,
    parameter::Parameter,
};

/// Binomial likelihood of observed counts, restricted to the items whose
/// indicator is active.
///
/// Item `i` contributes `ln C(n, k) + k ln p + (n - k) ln(1 - p)` with
/// `n = trials[i]`, `k = counts[i]` and `p` either a shared proportion or
/// `proportion[i]`. Inactive items contribute nothing and are not inspected.
/// Nothing is cached, so every call recomputes from the current parameter
/// values.
#[derive(Debug)]
pub struct ChainSamplingLikelihood {
    trials: Parameter,
    indicators: Parameter,
    proportion: Parameter,
    counts: Parameter,
    on_logit_scale: bool,
}

/// `ln p` and `ln(1 - p)` for one proportion, `None` if `p` is outside `(0, 1)`.
fn log_proportions(theta: f64, on_logit_scale: bool) -> Option<(f64, f64)> {
    if on_logit_scale {
        if theta.is_nan() {
            return None;
        }
        // ln(1 + e^theta) without overflow
        let softplus = theta.max(0.) + (-theta.abs()).exp().ln_1p();
        Some((theta - softplus, -softplus))
    } else if (theta > 0.) & (theta < 1.) {
        Some((theta.ln(), (-theta).ln_1p()))
    } else {
        None
    }
}

/// Round a trial or count to the nearest integer, rejecting anything that
/// cannot be a count.
fn as_count(param: &Parameter, index: usize, value: f64) -> Result<u64> {
    if !value.is_finite() | (value < -0.5) {
        let name = param.name();
        warn!(parameter = %name, index, value, "corrupt count");
        return Err(ModelError::CorruptValue { name, index, value });
    }
    Ok(value.round() as u64)
}

impl ChainSamplingLikelihood {
    pub fn new(
        trials: Parameter,
        indicators: Parameter,
        proportion: Parameter,
        counts: Parameter,
        on_logit_scale: bool,
    ) -> Result<Self> {
        let dim = indicators.dim();
        trials.broadcast("trials", dim)?;
        counts.expect_dim("counts", dim)?;
        if proportion.dim() != 1 {
            proportion.expect_dim("proportion", dim)?;
        }
        debug!(
            items = dim,
            proportions = proportion.dim(),
            on_logit_scale,
            "chain sampling likelihood"
        );
        Ok(ChainSamplingLikelihood {
            trials,
            indicators,
            proportion,
            counts,
            on_logit_scale,
        })
    }

    pub fn on_logit_scale(&self) -> bool {
        self.on_logit_scale
    }

    fn compute(&self) -> Result<f64> {
        let trials = self.trials.values();
        let indicators = self.indicators.values();
        let proportion = self.proportion.values();
        let counts = self.counts.values();
        let shared = proportion.len() == 1;

        let mut log_likelihood = 0.;
        for (i, (&indicator, &n, &k)) in izip!(&*indicators, &*trials, &*counts).enumerate() {
            if !(indicator > 0.) {
                continue;
            }
            let n = as_count(&self.trials, i, n)?;
            let k = as_count(&self.counts, i, k)?;
            if k > n {
                return Ok(f64::NEG_INFINITY);
            }
            let theta = if shared { proportion[0] } else { proportion[i] };
            let Some((log_p, log_1m_p)) = log_proportions(theta, self.on_logit_scale) else {
                return Ok(f64::NEG_INFINITY);
            };
            log_likelihood += ln_binomial(n, k) + k as f64 * log_p + (n - k) as f64 * log_1m_p;
        }
        Ok(log_likelihood)
    }
}

impl Likelihood for ChainSamplingLikelihood {
    fn name(&self) -> String {
        "ChainSamplingLikelihood".to_string()
    }

    fn log_likelihood(&mut self) -> Result<f64> {
        let value = self.compute()?;
        trace!(value, "chain sampling log likelihood");
        Ok(value)
    }

    fn make_dirty(&mut self) {}
}
