//! Fixed-policy arguments used while recording

use apiloom::{ArgMap, ArgValue, Param, ParamType, END_KEY, START_KEY};
use chrono::{DateTime, Duration, Utc};

/// Parameter name that gets [`DEFAULT_LIMIT`] instead of zero
pub const LIMIT_PARAM: &str = "limit";

pub const DEFAULT_LIMIT: i64 = 10;

/// Length of the synthesized date range, ending at the reference date
pub const RANGE_LOOKBACK_DAYS: i64 = 7;

/// Synthesize an argument for every declared parameter
///
/// Dates use `reference`, date ranges span the week before it, `limit` is
/// 10 and every other value is its zero value.
pub fn default_args(params: &[Param], reference: DateTime<Utc>) -> ArgMap {
    let mut args = ArgMap::new();

    for param in params {
        match param.kind {
            ParamType::Date => {
                args.insert(param.name.clone(), ArgValue::Date(reference));
            }
            ParamType::DateRange => {
                let start = reference - Duration::days(RANGE_LOOKBACK_DAYS);
                args.insert(START_KEY.to_string(), ArgValue::Date(start));
                args.insert(END_KEY.to_string(), ArgValue::Date(reference));
            }
            ParamType::Int => {
                let value = if param.name == LIMIT_PARAM {
                    DEFAULT_LIMIT
                } else {
                    0
                };
                args.insert(param.name.clone(), ArgValue::Int(value));
            }
            ParamType::String => {
                args.insert(param.name.clone(), ArgValue::String(String::new()));
            }
            ParamType::Bool => {
                args.insert(param.name.clone(), ArgValue::Bool(false));
            }
        }
    }

    args
}
