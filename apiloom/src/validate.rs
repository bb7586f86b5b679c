//! Static completeness checks for endpoint metadata
//!
//! Findings are returned as data; nothing here fails.

use crate::param::ParamType;
use crate::registry::{Registry, NO_CASSETTE};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixture that every cassette directory may hold without a matching endpoint
pub const AUTH_FIXTURE: &str = "auth";

/// Extension of cassette fixture files
pub const FIXTURE_EXTENSION: &str = "yaml";

/// Cross-check a registry against the cassette directory
///
/// Returns one human-readable line per violation, endpoint findings first in
/// registration order, then unreferenced fixture files sorted by name.
pub fn validate<C>(registry: &Registry<C>, cassette_dir: &Path) -> Vec<String> {
    let mut findings = Vec::new();
    let mut seen = HashSet::new();

    for endpoint in registry.all() {
        let name = endpoint.name.as_str();

        if !seen.insert(name) {
            findings.push(format!("{name}: registered more than once"));
        }

        if endpoint.handler.is_none() {
            findings.push(format!("{name}: handler is not set"));
        }

        if endpoint.cassette.is_empty() {
            findings.push(format!("{name}: cassette is not set"));
        } else if endpoint.cassette != NO_CASSETTE {
            let fixture = fixture_path(cassette_dir, &endpoint.cassette);
            if !fixture.is_file() {
                findings.push(format!(
                    "{name}: cassette file {} does not exist",
                    fixture.display()
                ));
            }
        }

        if endpoint.cli_command.is_none() && endpoint.tool_name.is_none() {
            findings.push(format!("{name}: neither a CLI command nor a tool name is set"));
        }

        if endpoint.short.trim().is_empty() {
            findings.push(format!("{name}: short description is empty"));
        }
        if endpoint.long.trim().is_empty() {
            findings.push(format!("{name}: long description is empty"));
        }
        if endpoint.path.trim().is_empty() {
            findings.push(format!("{name}: path is empty"));
        }

        if endpoint.method.expects_body() && endpoint.body.is_none() {
            findings.push(format!(
                "{name}: {} endpoint should declare a body",
                endpoint.method
            ));
        }

        let reserved = endpoint.reserved_names();
        let mut param_names = HashSet::new();
        for param in &endpoint.params {
            if param.description.trim().is_empty() {
                findings.push(format!("{name}: param {} has no description", param.name));
            }
            if param.kind == ParamType::DateRange {
                continue;
            }
            if reserved.contains(&param.name.as_str()) {
                findings.push(format!("{name}: param {} uses a reserved name", param.name));
            }
            if !param_names.insert(param.name.as_str()) {
                findings.push(format!("{name}: param {} is declared more than once", param.name));
            }
        }

        if let Some(upstream) = &endpoint.depends_on {
            if registry.by_name(upstream).is_none() {
                findings.push(format!("{name}: depends on unknown endpoint {upstream}"));
            }
            if endpoint.arg_provider.is_none() {
                findings.push(format!(
                    "{name}: depends on {upstream} but has no arg provider"
                ));
            }
        }
    }

    findings.extend(orphan_fixtures(registry, cassette_dir));
    findings
}

/// `<dir>/<cassette>.yaml`
pub fn fixture_path(cassette_dir: &Path, cassette: &str) -> PathBuf {
    cassette_dir.join(format!("{cassette}.{FIXTURE_EXTENSION}"))
}

fn orphan_fixtures<C>(registry: &Registry<C>, cassette_dir: &Path) -> Vec<String> {
    let referenced: HashSet<&str> = registry
        .all()
        .iter()
        .map(|e| e.cassette.as_str())
        .collect();

    let entries = match std::fs::read_dir(cassette_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(
                "Skipping orphan fixture scan of {}: {}",
                cassette_dir.display(),
                e
            );
            return Vec::new();
        }
    };

    let mut orphans: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == FIXTURE_EXTENSION)
        })
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            if stem == AUTH_FIXTURE || referenced.contains(stem.as_str()) {
                None
            } else {
                Some(stem)
            }
        })
        .collect();
    orphans.sort();

    orphans
        .into_iter()
        .map(|stem| format!("fixture {stem}.{FIXTURE_EXTENSION} is not referenced by any endpoint"))
        .collect()
}
