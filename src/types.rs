use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Convergence criterion forwarded verbatim to the fitting engine's refit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceCriterion {
    Gradient,
    Lange,
    Mittal,
    ZhangOles,
}

/// Which nested regularization level a search dimension controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionTag {
    /// Element-level (per-covariate) prior variance.
    Element,
    /// Class-level prior variance of the hierarchy.
    Class,
}

/// One 1-D search dimension: current trial value plus convergence flag.
#[derive(Debug, Clone, Copy)]
pub struct SearchDimension {
    pub tag: DimensionTag,
    pub trial_value: f64,
    pub finished: bool,
}

impl SearchDimension {
    pub fn new(tag: DimensionTag, initial_value: f64) -> Self {
        Self {
            tag,
            trial_value: initial_value,
            finished: false,
        }
    }
}

/// Mean and sample standard deviation of one iteration's held-out
/// predictive log-likelihoods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistic {
    pub mean: f64,
    pub std_dev: f64,
}

/// Optional per-example exclusion flags. A flag of exactly 1.0 forces the
/// weight at that index to zero in both training and held-out vectors,
/// overriding whatever the fold selector produced there.
#[derive(Debug, Clone)]
pub struct ExclusionMask(Array1<f64>);

impl ExclusionMask {
    pub fn new(flags: Array1<f64>) -> Self {
        Self(flags)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zeroes every masked index of `weights`. The mask must have the same
    /// length as the weight vector.
    pub fn apply(&self, weights: &mut Array1<f64>) -> Result<(), SearchError> {
        if weights.len() != self.0.len() {
            return Err(SearchError::InvalidInput(format!(
                "exclusion mask length {} does not match weight vector length {}",
                self.0.len(),
                weights.len()
            )));
        }
        for (w, flag) in weights.iter_mut().zip(self.0.iter()) {
            if *flag == 1.0 {
                *w = 0.0;
            }
        }
        Ok(())
    }
}

/// Cross-validation schedule and the refit budget handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationConfig {
    /// Number of folds in one complete cross-validation pass.
    pub fold_count: usize,
    /// Total (fold, repeat) evaluations per hyperprior trial. Values beyond
    /// `fold_count` repeat the pass under a fresh fold permutation.
    pub folds_to_compute: usize,
    /// Refit budget forwarded to the engine on every fold.
    pub max_iterations: usize,
    pub tolerance: f64,
    pub convergence: ConvergenceCriterion,
    /// Seeds both dimensions' initial trial value; callers take this from
    /// the model data's normal-based default variance.
    pub default_variance: f64,
}

impl CrossValidationConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.fold_count < 1 {
            return Err(SearchError::InvalidInput(
                "fold_count must be at least 1".to_string(),
            ));
        }
        if self.folds_to_compute < 1 {
            return Err(SearchError::InvalidInput(
                "folds_to_compute must be at least 1".to_string(),
            ));
        }
        if !(self.default_variance > 0.0) {
            return Err(SearchError::InvalidInput(format!(
                "default_variance must be positive, got {}",
                self.default_variance
            )));
        }
        Ok(())
    }
}

/// How the search loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationStatus {
    /// Both dimensions' heuristics signalled convergence.
    Converged,
    /// The step bound fired first; trial values are best-so-far, not
    /// converged optima.
    StepLimit,
}

/// Final output of one hierarchical search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Element-level variance at the maximum predicted log-likelihood.
    pub max_point: f64,
    /// Class-level variance.
    pub class_point: f64,
    /// Engine-converted prior hyperparameter, present for non-normal priors.
    pub lambda: Option<f64>,
    pub status: TerminationStatus,
    /// Iterations performed before termination.
    pub steps: usize,
}
