use crate::error::SearchError;

/// Log-uniform grid point for the fixed-grid search mode.
///
/// With `grid_size == 1` the single point is always `upper`, which also
/// avoids the zero division in the log-spacing formula. Otherwise the points
/// interpolate `[lower, upper]` uniformly in log space, with `step == 0`
/// landing on `lower` and `step == grid_size - 1` on `upper`.
pub fn compute_grid_point(
    step: usize,
    grid_size: usize,
    lower: f64,
    upper: f64,
) -> Result<f64, SearchError> {
    if !(lower > 0.0) {
        return Err(SearchError::InvalidInput(format!(
            "grid lower limit must be positive, got {lower}"
        )));
    }
    if !(upper >= lower) {
        return Err(SearchError::InvalidInput(format!(
            "grid upper limit {upper} must not be below lower limit {lower}"
        )));
    }
    if grid_size == 0 {
        return Err(SearchError::InvalidInput(
            "grid size must be at least 1".to_string(),
        ));
    }
    // The singleton grid ignores the step entirely.
    if grid_size == 1 {
        return Ok(upper);
    }
    if step >= grid_size {
        return Err(SearchError::InvalidInput(format!(
            "grid step {step} out of range for grid size {grid_size}"
        )));
    }
    let step_size = (upper.ln() - lower.ln()) / (grid_size - 1) as f64;
    Ok((lower.ln() + step as f64 * step_size).exp())
}
