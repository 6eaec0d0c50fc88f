use chrono::NaiveDate;
use greenpath_core::IncentiveTable;

use crate::commands::CommandResult;

const COMMAND: &str = "incentives";

/// Prices the federal and state programs a project category qualifies for on `as_of`.
pub fn run(
    category: &str,
    implementation_cost: f64,
    location: &str,
    as_of: NaiveDate,
) -> CommandResult {
    if category.trim().is_empty() {
        return CommandResult::failure(COMMAND, "validation", "category must not be empty", 2);
    }
    if !implementation_cost.is_finite() || implementation_cost < 0.0 {
        return CommandResult::failure(
            COMMAND,
            "validation",
            format!("cost must be a non-negative number (got {implementation_cost})"),
            2,
        );
    }

    let optimization =
        IncentiveTable::default().optimize(category, implementation_cost, location, as_of);
    let message = format!(
        "{} incentives worth ${:.2}; post-incentive cost ${:.2}",
        optimization.applicable.len(),
        optimization.total_incentive_value,
        optimization.post_incentive_cost
    );
    match serde_json::to_value(&optimization) {
        Ok(data) => CommandResult::success_with_data(COMMAND, message, Some(data)),
        Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 1),
    }
}
