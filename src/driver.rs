//! Hierarchical two-level adaptive search over cross-validated predictive
//! likelihood.
//!
//! The driver alternates advancing the element-level and class-level search
//! dimensions. Every iteration runs a full cross-validation pass at the
//! current pair of trial variances, aggregates the held-out likelihoods, and
//! feeds the statistic to exactly one dimension's heuristic. Once a
//! dimension's heuristic declines to continue, that dimension is frozen at
//! its final value and every remaining step goes to the other one.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::engine::{FittingEngine, FoldSelector};
use crate::error::SearchError;
use crate::evaluate::{FoldEvaluator, aggregate};
use crate::search::{AdaptiveSearchState, UnimodalSearch};
use crate::types::{
    CrossValidationConfig, DimensionTag, ExclusionMask, SearchResult, TerminationStatus,
};

/// Hard bound on search iterations across both dimensions combined.
pub const MAX_STEPS: usize = 50;

/// Which dimension the current step advances. Even steps belong to the
/// element level and odd steps to the class level, except that a finished
/// dimension cedes all of its remaining steps to the other one.
fn dimension_to_advance(
    step: usize,
    element_finished: bool,
    class_finished: bool,
) -> DimensionTag {
    if (step % 2 == 0 && !element_finished) || class_finished {
        DimensionTag::Element
    } else {
        DimensionTag::Class
    }
}

/// Runs the hierarchical search to termination.
///
/// Both dimensions start at `config.default_variance`. The loop ends when
/// both heuristics have signalled convergence, or after [`MAX_STEPS`]
/// iterations, whichever comes first; the step limit is logged as a warning
/// and still yields the best trial values found so far.
///
/// The engine and selector are borrowed exclusively for the whole search:
/// the engine's coefficient state may be warm-started from fold to fold, and
/// each heuristic's proposal depends on its complete observation history, so
/// the iteration order here is part of the contract.
pub fn run_hierarchical_search<E, S, U, V>(
    config: &CrossValidationConfig,
    mask: Option<&ExclusionMask>,
    engine: &mut E,
    selector: &mut S,
    element_search: U,
    class_search: V,
) -> Result<SearchResult, SearchError>
where
    E: FittingEngine,
    S: FoldSelector,
    U: UnimodalSearch,
    V: UnimodalSearch,
{
    config.validate()?;

    log::info!("[CV] default variance = {:.6e}", config.default_variance);
    let mut element =
        AdaptiveSearchState::new(DimensionTag::Element, config.default_variance, element_search);
    let mut class =
        AdaptiveSearchState::new(DimensionTag::Class, config.default_variance, class_search);
    let evaluator = FoldEvaluator::new(config, mask);

    let mut step = 0usize;
    let status = loop {
        engine.set_hyperprior(element.trial_value());
        engine.set_class_hyperprior(class.trial_value());

        let likelihoods = evaluator.evaluate(
            engine,
            selector,
            element.trial_value(),
            class.trial_value(),
        )?;
        let stat = aggregate(&likelihoods)?;
        log::info!(
            "[CV] step {} avg pred = {:.6e} with stdev = {:.6e}",
            step + 1,
            stat.mean,
            stat.std_dev
        );

        match dimension_to_advance(step, element.finished(), class.finished()) {
            DimensionTag::Element => {
                element.advance(stat);
            }
            DimensionTag::Class => {
                class.advance(stat);
            }
        }

        step += 1;
        if element.finished() && class.finished() {
            break TerminationStatus::Converged;
        }
        if step >= MAX_STEPS {
            log::warn!(
                "[CV] max steps ({MAX_STEPS}) reached before both levels converged; \
                 keeping best trial values"
            );
            break TerminationStatus::StepLimit;
        }
    };

    let max_point = element.trial_value();
    let class_point = class.trial_value();
    let lambda = if engine.is_normal_prior() {
        None
    } else {
        Some(engine.convert_variance_to_hyperparameter(max_point))
    };

    log::info!(
        "[CV] maximum predicted log likelihood estimated at {:.6e} (variance), class level {:.6e}",
        max_point,
        class_point
    );
    if let Some(lambda) = lambda {
        log::info!("[CV] {:.6e} (lambda)", lambda);
    }

    Ok(SearchResult {
        max_point,
        class_point,
        lambda,
        status,
        steps: step,
    })
}

/// Prepares the engine for a final full-data refit at the winning
/// hyperprior: uniform weights, the optimal element-level variance, and a
/// cold-started coefficient vector.
pub fn reset_for_optimal<E: FittingEngine>(engine: &mut E, result: &SearchResult) {
    engine.set_weights(None);
    engine.set_hyperprior(result.max_point);
    engine.reset_beta();
}

/// Writes the result artifact: a single line with the element-level optimum
/// in scientific notation. Failure to open or write the path is the search's
/// one fatal configuration error.
pub fn write_result(result: &SearchResult, path: &Path) -> Result<(), SearchError> {
    let map_io = |source: std::io::Error| SearchError::ResultFile {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(map_io)?;
    writeln!(file, "{:e}", result.max_point).map_err(map_io)?;
    Ok(())
}
