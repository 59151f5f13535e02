//! Response compilation: the pure merge of an aggregation outcome map and
//! the derived summary into the response contract. No I/O and no
//! recoverable failure modes — malformed input here is a programmer error.

use chrono::{DateTime, Utc};

use crate::scoring::summarize;
use crate::types::{AggregationResult, DigitalFootprintResponse};

/// Assemble the final response from one aggregation.
///
/// The outcome map iterates in canonical platform order, so `platforms`,
/// `platform_data`, and `platform_errors` are all canonically ordered
/// regardless of adapter completion order. Display rounding of the
/// aggregate score happens here, once, at the boundary.
#[must_use]
pub fn compile_response(
    username: &str,
    outcomes: AggregationResult,
    timestamp: DateTime<Utc>,
) -> DigitalFootprintResponse {
    let platforms: Vec<_> = outcomes.keys().copied().collect();

    let mut platform_data = Vec::new();
    let mut platform_errors = std::collections::BTreeMap::new();
    for (platform, outcome) in outcomes {
        match outcome {
            Ok(data) => platform_data.push(data),
            Err(err) => {
                platform_errors.insert(platform, err.to_string());
            }
        }
    }

    let mut summary = summarize(&platform_data);
    summary.exposure_score = (summary.exposure_score * 10.0).round() / 10.0;

    let no_data_message = platform_data.is_empty().then(|| {
        format!("No public data was found for '{username}' on the requested platforms.")
    });

    DigitalFootprintResponse {
        username: username.to_owned(),
        timestamp,
        platforms,
        platform_data,
        summary,
        platform_errors,
        no_data_message,
    }
}
