//! Contracts of the external subsystems the search coordinates.
//!
//! The fitting engine and the fold selector are stateful collaborators: the
//! engine holds mutable coefficient state that may be warm-started across
//! refits, and the selector holds the current fold permutation. The driver
//! borrows each exclusively (`&mut`) for the duration of one search, so the
//! ordering of calls in [`crate::evaluate::FoldEvaluator`] is load-bearing.

use ndarray::Array1;

use crate::types::ConvergenceCriterion;

/// Penalized-regression fitting engine consumed by the search.
pub trait FittingEngine {
    /// Installs per-example weights for the next refit; `None` restores
    /// uniform weighting over all examples.
    fn set_weights(&mut self, weights: Option<&Array1<f64>>);

    /// Element-level prior variance for the next refit.
    fn set_hyperprior(&mut self, variance: f64);

    /// Class-level prior variance for the next refit.
    fn set_class_hyperprior(&mut self, variance: f64);

    /// Cold-start: resets coefficients to their defaults.
    fn reset_beta(&mut self);

    /// Refits under the current weights and hyperpriors. Non-convergence is
    /// the engine's own concern; the search does not detect or retry it.
    fn update(&mut self, max_iterations: usize, convergence: ConvergenceCriterion, tolerance: f64);

    /// Held-out predictive log-likelihood under the given weights.
    fn predictive_log_likelihood(&self, weights: &Array1<f64>) -> f64;

    /// Human-readable description of the current prior, for diagnostics.
    fn prior_info(&self) -> String;

    /// Monotonic variance-to-hyperparameter conversion used when reporting
    /// the optimum under a non-normal prior family.
    fn convert_variance_to_hyperparameter(&self, variance: f64) -> f64;

    /// Whether the prior family is normal; normal priors need no converted
    /// hyperparameter in the final report.
    fn is_normal_prior(&self) -> bool;
}

/// Fold-partition selector consumed by the search.
///
/// `weights` and `complement` refer to the same permutation state:
/// `complement` returns the held-out counterpart of the most recently
/// requested fold.
pub trait FoldSelector {
    /// Draws a fresh fold permutation; called exactly once per completed
    /// cross-validation pass.
    fn permute(&mut self);

    /// Training weight vector for `fold` under the current permutation.
    fn weights(&mut self, fold: usize) -> Array1<f64>;

    /// Held-out complement of the most recently requested fold.
    fn complement(&mut self) -> Array1<f64>;
}
