//! Command-line packer for the indexed-array encoding.
//!
//! ```text
//! array-repr pack classes.json < objects.json > packed.json
//! array-repr unpack < packed.json > objects.json
//! ```
//!
//! Log verbosity comes from `RUST_LOG` (default `warn`); logs go to stderr.

use std::error::Error;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use array_repr::{ArrayRepr, IndexedCollection};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: array-repr pack <classes.json> [--pretty]
       array-repr unpack [--pretty]";

#[derive(Debug, PartialEq)]
enum Command {
    Pack { classes: PathBuf },
    Unpack,
}

#[derive(Debug, PartialEq)]
struct Options {
    command: Command,
    pretty: bool,
}

fn parse_args<I>(args: I) -> Option<Options>
where
    I: IntoIterator<Item = String>,
{
    let mut pretty = false;
    let mut positional = Vec::new();
    for arg in args {
        if arg == "--pretty" {
            pretty = true;
        } else if arg.starts_with("--") {
            return None;
        } else {
            positional.push(arg);
        }
    }
    let mut positional = positional.into_iter();
    let command = match positional.next()?.as_str() {
        "pack" => Command::Pack {
            classes: PathBuf::from(positional.next()?),
        },
        "unpack" => Command::Unpack,
        _ => return None,
    };
    if positional.next().is_some() {
        return None;
    }
    Some(Options { command, pretty })
}

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Transforms `input` as the command asks and returns the rendered JSON.
fn run(options: &Options, input: &str) -> Result<String, Box<dyn Error>> {
    let output = match &options.command {
        Command::Pack { classes } => {
            let schema: ArrayRepr = serde_json::from_str(&std::fs::read_to_string(classes)?)?;
            let objects: Vec<Map<String, Value>> = serde_json::from_str(input)?;
            serde_json::to_value(IndexedCollection::pack(schema, &objects)?)?
        }
        Command::Unpack => {
            let payload: IndexedCollection = serde_json::from_str(input)?;
            Value::Array(payload.unpack()?.into_iter().map(Value::Object).collect())
        }
    };

    let text = if options.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(text)
}

/// Runs one invocation against the given streams and returns the exit code.
fn execute<I, R, W, E>(args: I, input: &mut R, out: &mut W, err: &mut E) -> u8
where
    I: IntoIterator<Item = String>,
    R: Read,
    W: Write,
    E: Write,
{
    let Some(options) = parse_args(args) else {
        let _ = writeln!(err, "{USAGE}");
        return EXIT_USAGE;
    };
    let mut text = String::new();
    let result = input
        .read_to_string(&mut text)
        .map_err(Box::<dyn Error>::from)
        .and_then(|_| run(&options, &text))
        .and_then(|output| writeln!(out, "{output}").map_err(Box::<dyn Error>::from));
    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            let _ = writeln!(err, "array-repr: {e}");
            EXIT_FAILURE
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let code = execute(
        std::env::args().skip(1),
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
    ExitCode::from(code)
}
