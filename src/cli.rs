//! Defines the command-line interface, generated from the module schema.

use crate::arguments::{ArgValue, ParsedArguments};
use crate::schema::{Constraints, ModuleSchema, Parameter, ParameterKind};
use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsStr;

const XML_ARG_ID: &str = "print-module-xml";

/// True when the first argument is `--xml`, the Slicer discovery request.
pub fn requests_xml<I, T>(argv: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    argv.into_iter()
        .nth(1)
        .is_some_and(|arg| arg.as_ref() == OsStr::new("--xml"))
}

/// Builds the clap command for `schema`. Argument ids are parameter names.
pub fn build_command(schema: &ModuleSchema) -> Command {
    let mut about = schema.title.clone().unwrap_or_default();
    if let Some(description) = &schema.description {
        if !about.is_empty() {
            about.push_str(": ");
        }
        about.push_str(description);
    }

    let mut command = Command::new(env!("CARGO_PKG_NAME"))
        .about(about)
        .version(
            schema
                .version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        )
        .arg(
            Arg::new(XML_ARG_ID)
                .long("xml")
                .action(ArgAction::SetTrue)
                .exclusive(true)
                .help("Print the XML description of this module and exit"),
        );

    // clap positions are 1-based and contiguous; schema indices need neither.
    let mut indices: Vec<usize> = schema.parameters().filter_map(|p| p.index).collect();
    indices.sort_unstable();

    for group in &schema.groups {
        let mut heading = group
            .label
            .clone()
            .unwrap_or_else(|| "Parameters".to_string());
        if group.advanced {
            heading.push_str(" (advanced)");
        }

        for parameter in &group.parameters {
            let mut arg = build_arg(parameter).help_heading(heading.clone());
            if let Some(index) = parameter.index {
                let position = indices.partition_point(|&other| other < index) + 1;
                arg = arg.index(position);
            }
            command = command.arg(arg);
        }
    }

    command
}

fn build_arg(parameter: &Parameter) -> Arg {
    let mut arg = Arg::new(parameter.name.clone());

    if let Some(help) = parameter.description.as_ref().or(parameter.label.as_ref()) {
        arg = arg.help(help.clone());
    }
    if let Some(flag) = parameter.effective_flag() {
        arg = arg.short(flag);
    }
    if let Some(long) = parameter.effective_longflag() {
        arg = arg.long(long.to_string());
    }
    if parameter.is_positional() {
        arg = arg.required(true);
    }

    if parameter.kind == ParameterKind::Boolean {
        let default_on = parameter
            .default
            .as_deref()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
        return arg
            .action(ArgAction::SetTrue)
            .default_value(if default_on { "true" } else { "false" });
    }

    arg = arg
        .action(ArgAction::Set)
        .value_name(parameter.kind.tag().to_uppercase());
    if let Some(default) = &parameter.default {
        arg = arg.default_value(default.clone());
    }

    let constraints = parameter.constraints;
    match parameter.kind {
        ParameterKind::IntegerEnumeration
        | ParameterKind::FloatEnumeration
        | ParameterKind::DoubleEnumeration
        | ParameterKind::StringEnumeration => {
            arg.value_parser(PossibleValuesParser::new(parameter.elements.clone()))
        }
        ParameterKind::Integer => {
            arg.value_parser(move |raw: &str| parse_integer(raw, constraints))
        }
        ParameterKind::Float | ParameterKind::Double => {
            arg.value_parser(move |raw: &str| parse_float(raw, constraints))
        }
        ParameterKind::IntegerVector => arg.value_parser(|raw: &str| {
            parse_vector(raw, |item| parse_integer(item, Constraints::default()))
        }),
        ParameterKind::FloatVector
        | ParameterKind::DoubleVector
        | ParameterKind::Point
        | ParameterKind::Region => arg.value_parser(|raw: &str| {
            parse_vector(raw, |item| parse_float(item, Constraints::default()))
        }),
        ParameterKind::Boolean
        | ParameterKind::String
        | ParameterKind::StringVector
        | ParameterKind::File
        | ParameterKind::Directory
        | ParameterKind::Image
        | ParameterKind::Geometry
        | ParameterKind::Transform
        | ParameterKind::Table
        | ParameterKind::Measurement => arg.value_parser(value_parser!(String)),
    }
}

fn parse_integer(raw: &str, constraints: Constraints) -> Result<String, String> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not an integer"))?;
    check_bounds(value as f64, constraints)?;
    Ok(raw.to_string())
}

fn parse_float(raw: &str, constraints: Constraints) -> Result<String, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    check_bounds(value, constraints)?;
    Ok(raw.to_string())
}

fn parse_vector<F>(raw: &str, item: F) -> Result<String, String>
where
    F: Fn(&str) -> Result<String, String>,
{
    for part in raw.split(',') {
        item(part)?;
    }
    Ok(raw.to_string())
}

fn check_bounds(value: f64, constraints: Constraints) -> Result<(), String> {
    if let Some(minimum) = constraints.minimum {
        if value < minimum {
            return Err(format!("must be at least {minimum}"));
        }
    }
    if let Some(maximum) = constraints.maximum {
        if value > maximum {
            return Err(format!("must be at most {maximum}"));
        }
    }
    Ok(())
}

/// Reads every schema parameter out of `matches`, in document order.
pub fn collect_arguments(schema: &ModuleSchema, matches: &ArgMatches) -> ParsedArguments {
    let mut arguments = ParsedArguments::new();
    for parameter in schema.parameters() {
        let value = if parameter.kind == ParameterKind::Boolean {
            Some(ArgValue::Bool(matches.get_flag(&parameter.name)))
        } else {
            matches
                .get_one::<String>(&parameter.name)
                .map(|value| ArgValue::Text(value.clone()))
        };
        arguments.push(parameter.name.clone(), value);
    }
    arguments
}

/// Parses `argv` (program name first) against `schema`.
pub fn parse_from<I, T>(schema: &ModuleSchema, argv: I) -> Result<ParsedArguments, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_command(schema).try_get_matches_from(argv)?;
    Ok(collect_arguments(schema, &matches))
}
