#![deny(dead_code)]
#![deny(unused_imports)]

pub mod driver;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod grid;
pub mod search;
pub mod types;

pub use driver::{MAX_STEPS, reset_for_optimal, run_hierarchical_search, write_result};
pub use engine::{FittingEngine, FoldSelector};
pub use error::SearchError;
pub use evaluate::{FoldEvaluator, aggregate};
pub use grid::compute_grid_point;
pub use search::{
    AdaptiveSearchState, LogBracketSearch, Observation, SearchStep, UnimodalSearch,
};
pub use types::{
    AggregateStatistic, ConvergenceCriterion, CrossValidationConfig, DimensionTag, ExclusionMask,
    SearchDimension, SearchResult, TerminationStatus,
};
