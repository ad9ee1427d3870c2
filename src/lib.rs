//! Update operators and likelihood terms for latent-cluster and
//! outbreak-size MCMC models.
//!
//! The crate does not drive a chain itself. A sampler owns a set of
//! [`Parameter`]s, binds operators and likelihoods to them, and runs the usual
//! store / propose / evaluate / accept-or-restore cycle:
//!
//! ```
//! use outbreak_mcmc::{
//!     BlockToggleOperator, Likelihood, Operator, Parameter, StutteringChainLikelihood,
//! };
//! use rand::SeedableRng;
//!
//! let indicators = Parameter::new("indicators", vec![1., 1., 0., 0.]);
//! let mut likelihood = StutteringChainLikelihood::new(
//!     Parameter::scalar("R0", 0.5),
//!     Parameter::scalar("omega", 0.5),
//!     Parameter::new("latent", vec![1., 2., 3., 1.]),
//!     indicators.clone(),
//! )?;
//! let mut op = BlockToggleOperator::new(indicators, 1, 1.)?;
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
//!
//! let current = likelihood.log_likelihood()?;
//! likelihood.store_state();
//! let log_hastings = op.propose(&mut rng)?;
//! let proposed = likelihood.log_likelihood()?;
//! if proposed - current + log_hastings >= 0. {
//!     likelihood.accept_state();
//!     op.accept(proposed - current);
//! } else {
//!     likelihood.restore_state();
//!     op.reject();
//! }
//! # Ok::<(), outbreak_mcmc::ModelError>(())
//! ```

pub(crate) mod distribution;
pub(crate) mod error;
pub(crate) mod infection;
pub(crate) mod likelihood;
pub(crate) mod operator;
pub(crate) mod parameter;
pub(crate) mod quadrature;

pub use distribution::{Density, GammaDensity, PdfFunction, StutteringChain, TruncatedNormalDensity};
pub use error::{ModelError, Result};
pub use infection::{InfectionDateModel, JointDistribution};
pub use likelihood::{ChainSamplingLikelihood, Likelihood, LikelihoodCache, StutteringChainLikelihood};
pub use operator::{
    BlockToggleOperator, Operator, OperatorTally, SiteCounts, SiteProbabilityGibbs, SiteTally,
};
pub use parameter::{Bounds, DirtyFlag, Parameter};
pub use quadrature::{
    Bounded, IntegrableUnivariateFunction, Integrator, RiemannApproximation, RiemannSettings,
    UnivariateFunction,
};
