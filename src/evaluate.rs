//! One full cross-validation pass at fixed hyperprior values.

use crate::engine::{FittingEngine, FoldSelector};
use crate::error::SearchError;
use crate::types::{AggregateStatistic, CrossValidationConfig, ExclusionMask};

/// Runs the fold/repeat schedule for one hyperprior trial and collects the
/// held-out predictive log-likelihoods. Aggregation is kept separate (see
/// [`aggregate`]) so the raw sequence stays testable.
pub struct FoldEvaluator<'a> {
    config: &'a CrossValidationConfig,
    mask: Option<&'a ExclusionMask>,
}

impl<'a> FoldEvaluator<'a> {
    pub fn new(config: &'a CrossValidationConfig, mask: Option<&'a ExclusionMask>) -> Self {
        Self { config, mask }
    }

    /// Held-out predictive log-likelihoods for every requested (fold, repeat)
    /// pair, in evaluation order.
    ///
    /// The fold index wraps modulo `fold_count`; a fresh permutation is drawn
    /// from the selector exactly when it wraps to 0, i.e. once per completed
    /// pass over all folds. Engine non-convergence is not detected here:
    /// whatever likelihood the engine reports is passed through unchanged.
    pub fn evaluate<E: FittingEngine, S: FoldSelector>(
        &self,
        engine: &mut E,
        selector: &mut S,
        element_var: f64,
        class_var: f64,
    ) -> Result<Vec<f64>, SearchError> {
        let mut likelihoods = Vec::with_capacity(self.config.folds_to_compute);
        for i in 0..self.config.folds_to_compute {
            let fold = i % self.config.fold_count;
            if fold == 0 {
                selector.permute();
            }

            let mut training = selector.weights(fold);
            if let Some(mask) = self.mask {
                mask.apply(&mut training)?;
            }
            engine.set_hyperprior(element_var);
            engine.set_class_hyperprior(class_var);
            engine.set_weights(Some(&training));
            log::debug!("[CV] running at {}", engine.prior_info());
            engine.update(
                self.config.max_iterations,
                self.config.convergence,
                self.config.tolerance,
            );

            let mut held_out = selector.complement();
            if let Some(mask) = self.mask {
                mask.apply(&mut held_out)?;
            }
            let log_likelihood = engine.predictive_log_likelihood(&held_out);
            log::info!(
                "[CV] fold {} rep {} pred log like = {:.6e}",
                fold + 1,
                i / self.config.fold_count + 1,
                log_likelihood
            );
            likelihoods.push(log_likelihood);
        }
        Ok(likelihoods)
    }
}

/// Mean and sample standard deviation of an evaluation sequence.
///
/// The standard deviation uses the n−1 denominator and is defined as exactly
/// 0.0 for a single sample.
pub fn aggregate(samples: &[f64]) -> Result<AggregateStatistic, SearchError> {
    if samples.is_empty() {
        return Err(SearchError::InvalidInput(
            "cannot aggregate an empty likelihood sequence".to_string(),
        ));
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let std_dev = if samples.len() > 1 {
        let sum_sq: f64 = samples.iter().map(|v| (v - mean) * (v - mean)).sum();
        (sum_sq / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    Ok(AggregateStatistic { mean, std_dev })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConvergenceCriterion;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    fn config(fold_count: usize, folds_to_compute: usize) -> CrossValidationConfig {
        CrossValidationConfig {
            fold_count,
            folds_to_compute,
            max_iterations: 100,
            tolerance: 1e-6,
            convergence: ConvergenceCriterion::Lange,
            default_variance: 1.0,
        }
    }

    /// Engine stub that scores folds from a canned list and records calls.
    struct StubEngine {
        likelihoods: Vec<f64>,
        updates: usize,
        last_training: Option<Array1<f64>>,
    }

    impl StubEngine {
        fn new(likelihoods: Vec<f64>) -> Self {
            Self {
                likelihoods,
                updates: 0,
                last_training: None,
            }
        }
    }

    impl FittingEngine for StubEngine {
        fn set_weights(&mut self, weights: Option<&Array1<f64>>) {
            self.last_training = weights.cloned();
        }
        fn set_hyperprior(&mut self, _variance: f64) {}
        fn set_class_hyperprior(&mut self, _variance: f64) {}
        fn reset_beta(&mut self) {}
        fn update(
            &mut self,
            _max_iterations: usize,
            _convergence: ConvergenceCriterion,
            _tolerance: f64,
        ) {
            self.updates += 1;
        }
        fn predictive_log_likelihood(&self, _weights: &Array1<f64>) -> f64 {
            self.likelihoods[(self.updates - 1) % self.likelihoods.len()]
        }
        fn prior_info(&self) -> String {
            "stub prior".to_string()
        }
        fn convert_variance_to_hyperparameter(&self, variance: f64) -> f64 {
            (2.0 / variance).sqrt()
        }
        fn is_normal_prior(&self) -> bool {
            true
        }
    }

    /// Selector stub over `n` examples with a permutation counter.
    struct StubSelector {
        n: usize,
        permutes: usize,
        last_fold: Option<usize>,
    }

    impl StubSelector {
        fn new(n: usize) -> Self {
            Self {
                n,
                permutes: 0,
                last_fold: None,
            }
        }
    }

    impl FoldSelector for StubSelector {
        fn permute(&mut self) {
            self.permutes += 1;
        }
        fn weights(&mut self, fold: usize) -> Array1<f64> {
            self.last_fold = Some(fold);
            // Held-in everywhere except the fold's own index.
            Array1::from_shape_fn(self.n, |j| if j == fold { 0.0 } else { 1.0 })
        }
        fn complement(&mut self) -> Array1<f64> {
            let fold = self.last_fold.unwrap();
            Array1::from_shape_fn(self.n, |j| if j == fold { 1.0 } else { 0.0 })
        }
    }

    #[test]
    fn permutes_once_per_completed_pass() {
        let config = config(3, 7);
        let evaluator = FoldEvaluator::new(&config, None);
        let mut engine = StubEngine::new(vec![-1.0]);
        let mut selector = StubSelector::new(4);
        let out = evaluator
            .evaluate(&mut engine, &mut selector, 1.0, 1.0)
            .unwrap();
        assert_eq!(out.len(), 7);
        // 7 evaluations over 3 folds: permutation fires at i = 0, 3, 6.
        assert_eq!(selector.permutes, 3);
        assert_eq!(engine.updates, 7);
    }

    #[test]
    fn exact_quotient_pass_count() {
        let config = config(3, 6);
        let evaluator = FoldEvaluator::new(&config, None);
        let mut engine = StubEngine::new(vec![-1.0]);
        let mut selector = StubSelector::new(4);
        evaluator
            .evaluate(&mut engine, &mut selector, 1.0, 1.0)
            .unwrap();
        assert_eq!(selector.permutes, 2);
    }

    #[test]
    fn mask_wins_over_selector_weights_on_both_vectors() {
        let config = config(2, 2);
        // Index 2 is excluded outright.
        let mask = ExclusionMask::new(ndarray::array![0.0, 0.0, 1.0, 0.0]);
        let evaluator = FoldEvaluator::new(&config, Some(&mask));
        let mut engine = StubEngine::new(vec![-1.0]);
        let mut selector = StubSelector::new(4);
        evaluator
            .evaluate(&mut engine, &mut selector, 1.0, 1.0)
            .unwrap();
        // Last fold was 1: training is 1 everywhere but index 1, then masked
        // at index 2.
        let training = engine.last_training.unwrap();
        assert_eq!(training, ndarray::array![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn mask_length_mismatch_propagates() {
        let config = config(2, 2);
        let mask = ExclusionMask::new(ndarray::array![0.0, 1.0]);
        let evaluator = FoldEvaluator::new(&config, Some(&mask));
        let mut engine = StubEngine::new(vec![-1.0]);
        let mut selector = StubSelector::new(4);
        assert!(
            evaluator
                .evaluate(&mut engine, &mut selector, 1.0, 1.0)
                .is_err()
        );
    }

    #[test]
    fn likelihoods_are_returned_in_evaluation_order() {
        let config = config(2, 4);
        let evaluator = FoldEvaluator::new(&config, None);
        let mut engine = StubEngine::new(vec![-1.0, -2.0, -3.0, -4.0]);
        let mut selector = StubSelector::new(4);
        let out = evaluator
            .evaluate(&mut engine, &mut selector, 1.0, 1.0)
            .unwrap();
        assert_eq!(out, vec![-1.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn aggregate_of_a_constant_sequence() {
        let stat = aggregate(&[3.25, 3.25, 3.25, 3.25]).unwrap();
        assert_eq!(stat.mean, 3.25);
        assert_eq!(stat.std_dev, 0.0);
    }

    #[test]
    fn aggregate_uses_the_sample_denominator() {
        let stat = aggregate(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(stat.mean, 2.5, max_relative = 1e-12);
        // Sum of squared deviations 5, over n-1 = 3.
        assert_relative_eq!(stat.std_dev, (5.0_f64 / 3.0).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn single_sample_std_dev_is_zero() {
        let stat = aggregate(&[-17.5]).unwrap();
        assert_eq!(stat.mean, -17.5);
        assert_eq!(stat.std_dev, 0.0);
    }

    #[test]
    fn empty_sequence_is_an_error() {
        assert!(aggregate(&[]).is_err());
    }
}
