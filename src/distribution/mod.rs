mod continuous;
mod stuttering;

pub use continuous::{GammaDensity, TruncatedNormalDensity};
pub use stuttering::StutteringChain;

use crate::{error::Result, quadrature::UnivariateFunction};

/// A univariate probability law.
///
/// `cdf` and `quantile` are fallible because not every law used by the
/// models has them in closed form; those return
/// [`ModelError::Unsupported`](crate::ModelError::Unsupported) instead of a
/// placeholder number.
pub trait Density {
    fn pdf(&self, x: f64) -> f64;
    fn log_pdf(&self, x: f64) -> f64;
    fn cdf(&self, x: f64) -> Result<f64>;
    fn quantile(&self, probability: f64) -> Result<f64>;
    fn mean(&self) -> f64;
    fn variance(&self) -> f64;
}

/// The pdf of a [`Density`] as an integrable function.
#[derive(Debug, Clone, Copy)]
pub struct PdfFunction<'a, D: ?Sized> {
    pub density: &'a D,
}

impl<D: Density + ?Sized> UnivariateFunction for PdfFunction<'_, D> {
    fn evaluate(&self, argument: f64) -> Result<f64> {
        Ok(self.density.pdf(argument))
    }
}
