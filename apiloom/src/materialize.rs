//! Turning surface input into [`ArgMap`] values
//!
//! Every surface feeds parameters through [`materialize`], so the rules for
//! required values, integer sentinels, date defaults and date ranges live in
//! one place. A surface only decides where a value comes from by
//! implementing [`ArgSource`].

use crate::args::{ArgMap, ArgValue};
use crate::error::{ArgsError, ArgsResult};
use crate::param::{Param, ParamType, END_KEY, START_KEY};
use crate::parse::{parse_date, parse_int};
use chrono::Utc;

/// A value as a surface supplied it, before typing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArg {
    Text(String),
    Int(i64),
    Bool(bool),
}

/// Where a surface finds parameter values
pub trait ArgSource {
    /// The value supplied for `param`, if any
    fn value(&mut self, param: &Param) -> Option<RawArg>;

    /// The `start` or `end` bound of a date range, if supplied
    fn range_bound(&mut self, key: &str) -> Option<String>;
}

/// Build typed arguments for `params` from `source`
pub fn materialize(params: &[Param], source: &mut dyn ArgSource) -> ArgsResult<ArgMap> {
    let mut args = ArgMap::new();

    for param in params {
        match param.kind {
            ParamType::String => match source.value(param) {
                Some(raw) => {
                    let text = match raw {
                        RawArg::Text(text) => text,
                        RawArg::Int(value) => value.to_string(),
                        RawArg::Bool(value) => value.to_string(),
                    };
                    if param.required || !text.is_empty() {
                        args.insert(param.name.clone(), ArgValue::String(text));
                    }
                }
                None if param.required => return Err(missing(param)),
                None => {}
            },
            ParamType::Int => match source.value(param) {
                Some(raw) => {
                    let value = match raw {
                        RawArg::Text(text) => parse_int(&param.name, &text)?,
                        RawArg::Int(value) => value,
                        RawArg::Bool(_) => return Err(mismatch(param, "an integer")),
                    };
                    // zero is indistinguishable from unset for optional integers
                    if param.required || value != 0 {
                        args.insert(param.name.clone(), ArgValue::Int(value));
                    }
                }
                None if param.required => return Err(missing(param)),
                None => {}
            },
            ParamType::Date => {
                let value = match source.value(param) {
                    Some(RawArg::Text(text)) if !text.trim().is_empty() => {
                        parse_date(&param.name, &text)?
                    }
                    Some(RawArg::Text(_)) | None => Utc::now(),
                    Some(_) => return Err(mismatch(param, "a YYYY-MM-DD date")),
                };
                args.insert(param.name.clone(), ArgValue::Date(value));
            }
            ParamType::DateRange => {
                for key in [START_KEY, END_KEY] {
                    match source.range_bound(key) {
                        Some(raw) if !raw.trim().is_empty() => {
                            args.insert(key.to_string(), ArgValue::Date(parse_date(key, &raw)?));
                        }
                        _ => {}
                    }
                }
            }
            ParamType::Bool => match source.value(param) {
                Some(RawArg::Bool(value)) => {
                    args.insert(param.name.clone(), ArgValue::Bool(value));
                }
                Some(RawArg::Text(text)) => {
                    let value = text
                        .parse::<bool>()
                        .map_err(|_| mismatch(param, "true or false"))?;
                    args.insert(param.name.clone(), ArgValue::Bool(value));
                }
                Some(RawArg::Int(_)) => return Err(mismatch(param, "true or false")),
                None => {}
            },
        }
    }

    Ok(args)
}

fn missing(param: &Param) -> ArgsError {
    ArgsError::MissingRequired {
        name: param.name.clone(),
    }
}

fn mismatch(param: &Param, expected: &'static str) -> ArgsError {
    ArgsError::TypeMismatch {
        name: param.name.clone(),
        expected,
    }
}
