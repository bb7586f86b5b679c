//! Usage lines and positional help for generated commands

use apiloom::{Endpoint, Param, ParamType};

/// The command's use line: its name followed by positional tokens
///
/// Required parameters render as `<name>`. Dates render as `<name>` or
/// `[name]` by requiredness. Date ranges and bools are flags and never appear.
pub fn use_line<C>(command: &str, endpoint: &Endpoint<C>) -> String {
    let tokens: Vec<String> = endpoint.params.iter().filter_map(usage_token).collect();

    if tokens.is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", tokens.join(" "))
    }
}

fn usage_token(param: &Param) -> Option<String> {
    match param.kind {
        ParamType::DateRange | ParamType::Bool => None,
        ParamType::Date if !param.required => Some(format!("[{}]", param.name)),
        _ if param.required => Some(format!("<{}>", param.name)),
        _ => None,
    }
}

/// Parameters read from positional tokens, in declaration order
pub fn positional_params<C>(endpoint: &Endpoint<C>) -> Vec<&Param> {
    endpoint.params.iter().filter(|p| p.is_positional()).collect()
}

/// Help section describing positional tokens, since they are not clap args
pub fn positional_help<C>(endpoint: &Endpoint<C>) -> Option<String> {
    let params = positional_params(endpoint);
    if params.is_empty() {
        return None;
    }

    let labels: Vec<String> = params
        .iter()
        .map(|p| usage_token(p).unwrap_or_else(|| format!("[{}]", p.name)))
        .collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut help = String::from("Arguments:");
    for (label, param) in labels.iter().zip(params) {
        help.push_str(&format!("\n  {label:<width$}  {}", param.description));
    }
    Some(help)
}
