//! Projection of an endpoint registry onto clap commands
//!
//! Endpoints bound to a CLI command become either a top-level command or a
//! child of a group command. Groups are formed by every endpoint sharing a
//! command name and declaring a subcommand:
//!
//! ```text
//! app
//! ├── workouts          # group
//! │   ├── list          # endpoint workout_list
//! │   └── get <id>      # endpoint workout_get
//! └── exercise <name>   # endpoint exercise_lookup
//! ```
//!
//! Positional tokens are collected by one hidden argument and consumed in
//! parameter order during execution, so the command's help shows the
//! endpoint's use line instead of clap's own.

use crate::body::{read_body, StdinSource};
use crate::error::{CliError, CliResult};
use crate::usage::{positional_help, positional_params, use_line};
use apiloom::{
    materialize, ArgSource, ArgsError, CallContext, Endpoint, HandlerArgs, HandlerOutput, Param,
    ParamType, RawArg, Registry, END_KEY, FILE_FLAG, JSON_FLAG, OUTPUT_FLAG, START_KEY,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Id of the hidden argument collecting positional tokens
pub const POSITIONAL_ID: &str = "positional_args";

enum CommandEntry {
    Simple {
        name: String,
        endpoint: usize,
    },
    Group {
        name: String,
        children: Vec<(String, usize)>,
    },
}

impl CommandEntry {
    fn name(&self) -> &str {
        match self {
            CommandEntry::Simple { name, .. } | CommandEntry::Group { name, .. } => name,
        }
    }
}

/// Builds and executes clap commands for a registry
pub struct CliGenerator<'a, C> {
    registry: &'a Registry<C>,
    client: Arc<C>,
    layout: Vec<CommandEntry>,
}

impl<'a, C> CliGenerator<'a, C> {
    /// Lay out commands in order of first appearance
    ///
    /// A command name used both as a simple command and as a group, or a
    /// repeated simple command or group child, keeps its first endpoint;
    /// later ones are skipped with a warning.
    pub fn new(registry: &'a Registry<C>, client: Arc<C>) -> Self {
        let mut layout: Vec<CommandEntry> = Vec::new();

        for (index, endpoint) in registry.all().iter().enumerate() {
            let Some(command) = endpoint.cli_command.as_deref() else {
                continue;
            };
            let existing = layout.iter().position(|entry| entry.name() == command);

            match (endpoint.cli_subcommand.as_deref(), existing) {
                (None, None) => layout.push(CommandEntry::Simple {
                    name: command.to_string(),
                    endpoint: index,
                }),
                (Some(sub), None) => layout.push(CommandEntry::Group {
                    name: command.to_string(),
                    children: vec![(sub.to_string(), index)],
                }),
                (Some(sub), Some(position)) => match &mut layout[position] {
                    CommandEntry::Group { children, .. }
                        if !children.iter().any(|(child, _)| child == sub) =>
                    {
                        children.push((sub.to_string(), index));
                    }
                    _ => warn!(
                        "Command '{} {}' is already bound; skipping endpoint {}",
                        command, sub, endpoint.name
                    ),
                },
                (None, Some(_)) => warn!(
                    "Command '{}' is already bound; skipping endpoint {}",
                    command, endpoint.name
                ),
            }
        }

        Self {
            registry,
            client,
            layout,
        }
    }

    /// One clap command per top-level name, in layout order
    pub fn generate_commands(&self) -> Vec<Command> {
        self.layout
            .iter()
            .map(|entry| match entry {
                CommandEntry::Simple { name, endpoint } => {
                    endpoint_command(name, &self.registry.all()[*endpoint])
                }
                CommandEntry::Group { name, children } => {
                    let mut group = Command::new(name.clone())
                        .about(format!("{} management commands", capitalize(name)))
                        .subcommand_required(true)
                        .arg_required_else_help(true);
                    for (child, endpoint) in children {
                        let endpoint = &self.registry.all()[*endpoint];
                        group = group.subcommand(endpoint_command(child, endpoint));
                    }
                    group
                }
            })
            .collect()
    }

    /// Add the generated commands to `root`
    pub fn attach(&self, root: Command) -> Command {
        root.subcommands(self.generate_commands())
    }

    /// Whether `name` is a generated top-level command
    pub fn handles(&self, name: &str) -> bool {
        self.layout.iter().any(|entry| entry.name() == name)
    }

    /// The endpoint and leaf matches for a top-level subcommand
    pub fn resolve<'m>(
        &self,
        name: &str,
        matches: &'m ArgMatches,
    ) -> Option<(&'a Endpoint<C>, &'m ArgMatches)> {
        let endpoints = self.registry.all();
        match self.layout.iter().find(|entry| entry.name() == name)? {
            CommandEntry::Simple { endpoint, .. } => Some((&endpoints[*endpoint], matches)),
            CommandEntry::Group { children, .. } => {
                let (child, leaf) = matches.subcommand()?;
                children
                    .iter()
                    .find(|(candidate, _)| candidate == child)
                    .map(|(_, endpoint)| (&endpoints[*endpoint], leaf))
            }
        }
    }

    /// Run the endpoint behind top-level command `name`
    pub async fn dispatch<W: Write>(
        &self,
        ctx: CallContext,
        name: &str,
        matches: &ArgMatches,
        stdin: StdinSource,
        out: &mut W,
    ) -> CliResult<()> {
        let (endpoint, leaf) = self
            .resolve(name, matches)
            .ok_or_else(|| CliError::UnknownCommand {
                name: name.to_string(),
            })?;
        self.execute(ctx, endpoint, leaf, stdin, out).await
    }

    /// Parse `argv` against `root` with the generated commands attached
    ///
    /// Nothing is written to `out` unless the handler succeeds.
    pub async fn run<I, T, W>(
        &self,
        ctx: CallContext,
        root: Command,
        argv: I,
        stdin: StdinSource,
        out: &mut W,
    ) -> CliResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
        W: Write,
    {
        let matches = self.attach(root).try_get_matches_from(argv)?;
        let Some((name, sub)) = matches.subcommand() else {
            return Err(CliError::UnknownCommand {
                name: String::new(),
            });
        };
        self.dispatch(ctx, name, sub, stdin, out).await
    }

    /// Materialize arguments, resolve the body, invoke and print
    pub async fn execute<W: Write>(
        &self,
        ctx: CallContext,
        endpoint: &Endpoint<C>,
        matches: &ArgMatches,
        stdin: StdinSource,
        out: &mut W,
    ) -> CliResult<()> {
        debug!("Executing endpoint {} from the command line", endpoint.name);
        let mut args = parse_arguments(endpoint, matches)?;

        if let Some(body) = &endpoint.body {
            args = args.with_body(read_body(body, matches, stdin)?);
        }

        let output = endpoint
            .invoke(ctx, self.client.clone(), args)
            .await
            .map_err(|source| CliError::Handler {
                endpoint: endpoint.name.clone(),
                source,
            })?;

        match output {
            HandlerOutput::Raw(bytes) => {
                match matches.try_get_one::<PathBuf>(OUTPUT_FLAG).ok().flatten() {
                    Some(path) => std::fs::write(path, &bytes).map_err(|source| CliError::Output {
                        path: path.clone(),
                        source,
                    })?,
                    None => out.write_all(&bytes)?,
                }
            }
            HandlerOutput::Json(value) => {
                let text = serde_json::to_string_pretty(&value)?;
                writeln!(out, "{text}")?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Materialize an endpoint's parameters from parsed command-line matches
pub fn parse_arguments<C>(endpoint: &Endpoint<C>, matches: &ArgMatches) -> CliResult<HandlerArgs> {
    let mut source = ClapArgSource::new(matches);
    let params = materialize(&endpoint.params, &mut source)?;

    if let Some(extra) = source.positional.pop_front() {
        return Err(ArgsError::UnexpectedArgument { value: extra }.into());
    }
    Ok(HandlerArgs::from_params(params))
}

fn endpoint_command<C>(name: &str, endpoint: &Endpoint<C>) -> Command {
    let mut command = Command::new(name.to_string())
        .about(endpoint.short.clone())
        .override_usage(use_line(name, endpoint))
        .visible_aliases(endpoint.cli_aliases.clone());

    if !endpoint.long.trim().is_empty() {
        command = command.long_about(endpoint.long.clone());
    }
    if let Some(help) = positional_help(endpoint) {
        command = command.before_help(help);
    }

    if !positional_params(endpoint).is_empty() {
        command = command.arg(
            Arg::new(POSITIONAL_ID)
                .num_args(0..)
                .action(ArgAction::Append)
                .allow_negative_numbers(true)
                .hide(true),
        );
    }

    // Flags generated for the body, raw output and date range own their names
    let mut taken: HashSet<&str> = endpoint.reserved_names().into_iter().collect();
    taken.insert(POSITIONAL_ID);
    let mut range_added = false;

    for param in endpoint.params.iter().filter(|p| !p.is_positional()) {
        let clashes = match param.kind {
            ParamType::DateRange => std::mem::replace(&mut range_added, true),
            _ => !taken.insert(param.name.as_str()),
        };
        if clashes {
            warn!(
                "Param {} of endpoint {} clashes with another flag; it gets no flag of its own",
                param.name, endpoint.name
            );
            continue;
        }

        command = match param.kind {
            ParamType::DateRange => command
                .arg(
                    Arg::new(START_KEY)
                        .long(START_KEY)
                        .value_name("YYYY-MM-DD")
                        .help("Start date (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new(END_KEY)
                        .long(END_KEY)
                        .value_name("YYYY-MM-DD")
                        .help("End date (YYYY-MM-DD)"),
                ),
            ParamType::Bool => command.arg(
                Arg::new(param.name.clone())
                    .long(param.name.clone())
                    .action(ArgAction::SetTrue)
                    .help(param.description.clone()),
            ),
            _ => command.arg(
                Arg::new(param.name.clone())
                    .long(param.name.clone())
                    .allow_negative_numbers(true)
                    .help(param.description.clone()),
            ),
        };
    }

    if endpoint.body.is_some() {
        command = command
            .arg(
                Arg::new(JSON_FLAG)
                    .long(JSON_FLAG)
                    .value_name("JSON")
                    .help("Request body as a JSON string"),
            )
            .arg(
                Arg::new(FILE_FLAG)
                    .long(FILE_FLAG)
                    .short('f')
                    .value_name("PATH")
                    .value_parser(value_parser!(PathBuf))
                    .help("Read the request body from a JSON file"),
            );
    }

    if endpoint.raw_output {
        command = command.arg(
            Arg::new(OUTPUT_FLAG)
                .long(OUTPUT_FLAG)
                .short('o')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Write the output to a file instead of stdout"),
        );
    }

    command
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reads parameter values from clap matches
struct ClapArgSource<'m> {
    matches: &'m ArgMatches,
    positional: VecDeque<String>,
}

impl<'m> ClapArgSource<'m> {
    fn new(matches: &'m ArgMatches) -> Self {
        let positional = matches
            .try_get_many::<String>(POSITIONAL_ID)
            .ok()
            .flatten()
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        Self {
            matches,
            positional,
        }
    }

    fn option(&self, id: &str) -> Option<String> {
        self.matches.try_get_one::<String>(id).ok().flatten().cloned()
    }
}

impl ArgSource for ClapArgSource<'_> {
    fn value(&mut self, param: &Param) -> Option<RawArg> {
        if param.is_positional() {
            return self.positional.pop_front().map(RawArg::Text);
        }
        match param.kind {
            ParamType::Bool => {
                let set = self
                    .matches
                    .try_get_one::<bool>(&param.name)
                    .ok()
                    .flatten()
                    .copied()
                    .unwrap_or(false);
                Some(RawArg::Bool(set))
            }
            _ => self.option(&param.name).map(RawArg::Text),
        }
    }

    fn range_bound(&mut self, key: &str) -> Option<String> {
        self.option(key)
    }
}
