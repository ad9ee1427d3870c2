//! Infection-date model for a case dated by lesion age.
//!
//! The date a case became infectious has its own distribution, bounded above
//! by the end of the examination day. Subtracting an incubation period gives
//! the infection date, whose density is the convolution
//!
//! ```text
//! f(t) = ∫_t^{exam+1} incubation(s - t) · infectious(s) ds
//! ```
//!
//! evaluated by quadrature. Dates are days since a common origin; a day `d`
//! ends at time `d + 1`.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    distribution::Density,
    error::{ModelError, Result},
    quadrature::{IntegrableUnivariateFunction, Integrator, UnivariateFunction},
};

#[derive(Debug, Clone)]
pub struct InfectionDateModel<I: Density, P: Density> {
    name: String,
    exam_date: f64,
    cull_date: f64,
    oldest_lesion_age: f64,
    infectious_date: I,
    incubation_period: P,
    integrator: Option<Rc<dyn Integrator>>,
}

/// Integrand of the infection-date density at infection time `t`.
struct LesionKernel<'a, I, P> {
    infection_time: f64,
    end_of_exam: f64,
    infectious_date: &'a I,
    incubation_period: &'a P,
}

impl<I: Density, P: Density> UnivariateFunction for LesionKernel<'_, I, P> {
    fn evaluate(&self, argument: f64) -> Result<f64> {
        if (argument < self.infection_time) | (argument > self.end_of_exam) {
            return Ok(0.);
        }
        Ok(self.incubation_period.pdf(argument - self.infection_time)
            * self.infectious_date.pdf(argument))
    }

    fn lower_bound(&self) -> f64 {
        self.infection_time
    }

    fn upper_bound(&self) -> f64 {
        self.end_of_exam
    }
}

/// Density of the infection date, with the integrator already resolved.
struct InfectionDatePdf<'a, I: Density, P: Density> {
    model: &'a InfectionDateModel<I, P>,
    integrator: &'a dyn Integrator,
}

impl<I: Density, P: Density> UnivariateFunction for InfectionDatePdf<'_, I, P> {
    fn evaluate(&self, argument: f64) -> Result<f64> {
        // No density at an infinite infection time.
        if !argument.is_finite() {
            return Ok(0.);
        }
        let kernel = LesionKernel {
            infection_time: argument,
            end_of_exam: self.model.end_of_exam(),
            infectious_date: &self.model.infectious_date,
            incubation_period: &self.model.incubation_period,
        };
        self.integrator
            .integrate(&kernel, argument, self.model.end_of_exam())
    }
}

/// Density of being infected at `a` and infectious by `t2`:
/// `f(a) · P(incubation <= t2 - a)`.
pub struct JointDistribution<'a, I: Density, P: Density> {
    infection_date: InfectionDatePdf<'a, I, P>,
    infectious_by: f64,
}

impl<I: Density, P: Density> UnivariateFunction for JointDistribution<'_, I, P> {
    fn evaluate(&self, argument: f64) -> Result<f64> {
        let incubated = self
            .infection_date
            .model
            .incubation_period
            .cdf(self.infectious_by - argument)?;
        Ok(self.infection_date.evaluate(argument)? * incubated)
    }

    fn upper_bound(&self) -> f64 {
        self.infectious_by
    }
}

impl<I: Density, P: Density> IntegrableUnivariateFunction for JointDistribution<'_, I, P> {
    fn evaluate_integral(&self, lower: f64, upper: f64) -> Result<f64> {
        self.infection_date.integrator.integrate(self, lower, upper)
    }
}

impl<I: Density, P: Density> InfectionDateModel<I, P> {
    pub fn new(
        name: impl Into<String>,
        exam_date: f64,
        cull_date: f64,
        oldest_lesion_age: f64,
        infectious_date: I,
        incubation_period: P,
    ) -> Self {
        let name = name.into();
        debug!(%name, exam_date, cull_date, "infection date model");
        InfectionDateModel {
            name,
            exam_date,
            cull_date,
            oldest_lesion_age,
            infectious_date,
            incubation_period,
            integrator: None,
        }
    }

    pub fn install_numerical_integrator<Q: Integrator + 'static>(&mut self, integrator: Q) {
        debug!(case = %self.name, ?integrator, "numerical integrator installed");
        self.integrator = Some(Rc::new(integrator));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exam_date(&self) -> f64 {
        self.exam_date
    }

    pub fn cull_date(&self) -> f64 {
        self.cull_date
    }

    pub fn oldest_lesion_age(&self) -> f64 {
        self.oldest_lesion_age
    }

    pub fn infectious_date(&self) -> &I {
        &self.infectious_date
    }

    pub fn incubation_period(&self) -> &P {
        &self.incubation_period
    }

    /// The case cannot have been infected after it was examined.
    pub fn latest_possible_infection_date(&self) -> f64 {
        self.exam_date
    }

    /// Whether the case had been culled before `day` started.
    pub fn culled_yet(&self, day: i64) -> bool {
        day as f64 > self.cull_date + 1.
    }

    pub fn infectious_cdf(&self, time: f64) -> Result<f64> {
        self.infectious_date.cdf(time)
    }

    fn end_of_exam(&self) -> f64 {
        self.exam_date + 1.
    }

    fn pdf(&self) -> Result<InfectionDatePdf<'_, I, P>> {
        let integrator = self
            .integrator
            .as_deref()
            .ok_or(ModelError::MissingIntegrator)?;
        Ok(InfectionDatePdf {
            model: self,
            integrator,
        })
    }

    /// Joint density of infection at `a` and being infectious by `infectious_by`.
    pub fn joint_distribution(&self, infectious_by: f64) -> Result<JointDistribution<'_, I, P>> {
        Ok(JointDistribution {
            infection_date: self.pdf()?,
            infectious_by,
        })
    }

    /// Density of the infection date at `time`.
    pub fn infection_date_pdf(&self, time: f64) -> Result<f64> {
        self.pdf()?.evaluate(time)
    }

    /// Density of being infected at `time` and infectious by `infectious_by`.
    pub fn infection_distribution(&self, time: f64, infectious_by: f64) -> Result<f64> {
        self.joint_distribution(infectious_by)?.evaluate(time)
    }

    /// Probability of infection in `[earliest, latest]` and being infectious
    /// by `infectious_by`.
    pub fn period_infection_distribution(
        &self,
        earliest: f64,
        latest: f64,
        infectious_by: f64,
    ) -> Result<f64> {
        let value = self
            .joint_distribution(infectious_by)?
            .evaluate_integral(earliest, latest)?;
        trace!(case = %self.name, earliest, latest, infectious_by, value, "period infection");
        Ok(value)
    }
}
