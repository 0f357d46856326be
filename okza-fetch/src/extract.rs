//! Defensive navigation of provider responses.
//!
//! Every response is walked along `tasks[0].result[0]`. Nothing here
//! panics on a missing, null, or mistyped node.

use okza_core::{Item, JobStatus};
use serde_json::Value;

use crate::error::ExtractionError;

/// Returns `tasks[0]` as an object.
fn first_task(response: &Value) -> Result<&Value, ExtractionError> {
    response
        .get("tasks")
        .and_then(Value::as_array)
        .and_then(|tasks| tasks.first())
        .filter(|task| task.is_object())
        .ok_or(ExtractionError::NoTasks)
}

/// Returns `tasks[0].result[0]` as an object.
fn first_result(response: &Value) -> Result<&Value, ExtractionError> {
    first_task(response)?
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .filter(|result| result.is_object())
        .ok_or(ExtractionError::NoResult)
}

/// Reads the job status from a status response.
///
/// Any break in the path, or an `items_count` that is not a non-negative
/// integer, counts as zero items.
pub fn job_status(response: &Value) -> JobStatus {
    let count = first_result(response)
        .ok()
        .and_then(|result| result.get("items_count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    JobStatus::new(count)
}

/// Extracts the product items from a ready status response.
///
/// Entries of `items` that are not objects are skipped.
///
/// # Errors
///
/// Returns the [`ExtractionError`] naming the first node that was missing,
/// or [`ExtractionError::EmptyItems`] when no entry is left.
pub fn extract_items(response: &Value) -> Result<Vec<Item>, ExtractionError> {
    let items: Vec<Item> = first_result(response)?
        .get("items")
        .and_then(Value::as_array)
        .ok_or(ExtractionError::NoItems)?
        .iter()
        .filter_map(Item::from_json)
        .collect();

    if items.is_empty() {
        return Err(ExtractionError::EmptyItems);
    }
    Ok(items)
}

/// Returns the provider's `status_message` for the first task, if any.
pub fn task_message(response: &Value) -> Option<&str> {
    first_task(response)
        .ok()
        .and_then(|task| task.get("status_message"))
        .and_then(Value::as_str)
}
