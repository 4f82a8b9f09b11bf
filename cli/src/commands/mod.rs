mod debug;
mod quote;
mod search;
mod split;

#[cfg(feature = "debug-cmd")]
pub use debug::*;
pub use quote::*;
pub use search::*;
pub use split::*;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{arg, command, crate_authors, ArgMatches, Command};
use crossterm::tty::IsTty;

use linre::{Error, Regex, RegexBuilder};

use crate::config::RegexConfig;
use crate::report::syntax_error_report;
use crate::{commands, help, APP_HELP_TEMPLATE};

pub fn command(name: &'static str) -> Command {
    Command::new(name).help_template(
        r#"{about-with-newline}
{usage-heading}
  {usage}

{all-args}
"#,
    )
}

pub fn cli() -> Command {
    command!()
        .author(crate_authors!("\n")) // requires `cargo` feature
        .arg_required_else_help(true)
        .arg(
            arg!(-C --config <CONFIG_FILE> "Config file")
                .value_parser(existing_path_parser)
                .long_help(help::CONFIG_FILE),
        )
        .help_template(APP_HELP_TEMPLATE)
        .subcommand_required(true)
        .subcommands(vec![
            commands::search(),
            commands::split(),
            commands::quote(),
            #[cfg(feature = "debug-cmd")]
            commands::debug(),
        ])
}

/// Adds the options that control how a pattern is interpreted.
fn with_regex_args(command: Command) -> Command {
    // Keep options sorted alphabetically by their long name.
    command
        .arg(arg!(-i --"case-insensitive" "Ignore case when matching"))
        .arg(arg!(-s --"dot-all" "Allow `.` to match new lines"))
        .arg(
            arg!(--longest "Prefer the longest match")
                .long_help(help::LONGEST_LONG_HELP),
        )
        .arg(arg!(-m --"multi-line" "Allow `^` and `$` to match at new lines"))
}

/// Compiles `pattern` with the options given in the command line, which are
/// added to the ones in the config file.
///
/// Syntax errors are printed to stderr pointing into the pattern.
fn build_regex(
    pattern: &str,
    args: &ArgMatches,
    config: &RegexConfig,
) -> anyhow::Result<Regex> {
    let flag = |name: &str| {
        args.try_get_one::<bool>(name)
            .ok()
            .flatten()
            .cloned()
            .unwrap_or_default()
    };

    let result = RegexBuilder::new(pattern)
        .case_insensitive(config.case_insensitive || flag("case-insensitive"))
        .dot_all(config.dot_all || flag("dot-all"))
        .multi_line(config.multi_line || flag("multi-line"))
        .longest_match(config.longest_match || flag("longest"))
        .size_limit(config.size_limit)
        .nest_limit(config.nest_limit)
        .build();

    match result {
        Ok(re) => Ok(re),
        Err(Error::Syntax(err)) => {
            eprintln!(
                "{}",
                syntax_error_report(pattern, &err, stderr().is_tty())
            );
            bail!("invalid pattern `{}`", pattern)
        }
        Err(err) => Err(err.into()),
    }
}

/// Parses a path and makes sure that it exists.
fn existing_path_parser(input: &str) -> Result<PathBuf, anyhow::Error> {
    let path = PathBuf::from(input);
    if path.try_exists()? {
        Ok(path)
    } else {
        Err(anyhow!("file not found"))
    }
}

/// Truncates `s` to `max_chars` characters, adding an ellipsis when
/// something is removed.
fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
