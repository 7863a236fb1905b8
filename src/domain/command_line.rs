//! Command-line serialization for the packaging tool
//!
//! Produces the single argument string the tool expects:
//!
//! ```text
//! create "<out>/<name>-<version>.xam" [--name="..."] ... [--icon="..."]...
//!        [--library="<platform>":"<path>"]... [--sample="<name>":"<solution>"]...
//! validate "<out>/<name>-<version>.xam"
//! ```
//!
//! Values are wrapped in double quotes once and never escaped.

use std::fmt::Display;

use crate::domain::entities::{Operation, PackageParameters};
use crate::domain::error::DomainResult;

/// Build the argument string for `operation`.
///
/// # Errors
/// `InvalidConfiguration` if the package file name cannot be derived.
pub fn build_command_line(params: &PackageParameters, operation: Operation) -> DomainResult<String> {
    let output_file = params.output_file()?;

    let mut args = String::from(operation.verb());
    push_quoted(&mut args, output_file.display());

    if operation == Operation::Validate {
        return Ok(args);
    }

    let options = [
        ("--name=", &params.project_name),
        ("--summary=", &params.summary),
        ("--publisher=", &params.publisher),
        ("--website=", &params.website),
        ("--details=", &params.details),
        ("--license=", &params.license),
        ("--getting-started=", &params.getting_started),
    ];
    for (flag, value) in options {
        if let Some(value) = value {
            push_option(&mut args, flag, value);
        }
    }

    for icon in &params.icons {
        push_option(&mut args, "--icon=", icon.display());
    }

    for library in &params.libraries {
        push_pair(&mut args, "--library=", &library.platform, library.path.display());
    }

    for sample in &params.samples {
        push_pair(&mut args, "--sample=", &sample.name, sample.solution.display());
    }

    Ok(args)
}

fn push_quoted(args: &mut String, value: impl Display) {
    args.push_str(&format!(" \"{}\"", value));
}

fn push_option(args: &mut String, flag: &str, value: impl Display) {
    args.push_str(&format!(" {}\"{}\"", flag, value));
}

fn push_pair(args: &mut String, flag: &str, key: impl Display, value: impl Display) {
    args.push_str(&format!(" {}\"{}\":\"{}\"", flag, key, value));
}
