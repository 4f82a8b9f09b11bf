use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{arg, value_parser, ArgAction, ArgMatches, Command};
use log::*;
use yansi::Color::{Green, Magenta, Red};
use yansi::Paint;

use linre::re::engine::{Cache, Input};
use linre::Regex;

use crate::commands::{build_regex, truncate_with_ellipsis, with_regex_args};
use crate::config::Config;
use crate::help;

pub fn search() -> Command {
    with_regex_args(
        super::command("search")
            .about("Search for a pattern in files")
            .long_about(help::SEARCH_LONG_HELP)
            .arg(arg!(<PATTERN>).help("Regular expression to search for"))
            .arg(
                arg!([FILE])
                    .help("Files to search, stdin is used if none is given")
                    .value_parser(value_parser!(PathBuf))
                    .action(ArgAction::Append),
            )
            .arg(arg!(-c --count "Print only the number of matches"))
            .arg(arg!(-o --"only-matching" "Print only the matched text")),
    )
}

pub fn exec_search(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let files = args.get_many::<PathBuf>("FILE");

    let re = build_regex(pattern, args, &config.regex)?;

    let output = Output {
        count_only: args.get_flag("count"),
        only_matching: args.get_flag("only-matching"),
        max_match_len: config.search.max_match_len,
    };

    match files {
        Some(files) => {
            for path in files {
                let data = fs::read(path).with_context(|| {
                    format!("can not read `{}`", path.display())
                })?;
                output.search(&re, Some(path), &data);
            }
        }
        None => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .context("can not read from stdin")?;
            output.search(&re, None, &data);
        }
    }

    Ok(())
}

struct Output {
    count_only: bool,
    only_matching: bool,
    max_match_len: usize,
}

impl Output {
    /// Prints the matches of `re` in `data`. Lines are prefixed with `path`
    /// when the data comes from a file. Offsets are byte offsets in `data`,
    /// which doesn't need to be valid UTF-8.
    fn search(&self, re: &Regex, path: Option<&Path>, data: &[u8]) {
        let prefix = match path {
            Some(path) => format!("{}:", path.display().paint(Magenta)),
            None => String::new(),
        };

        let mut cache = Cache::new();
        let mut start = 0;
        let mut count = 0_usize;

        while start <= data.len() {
            let input = Input::new(data).start_at(start).captures(false);
            let span = match re.search_with_cache(&mut cache, &input) {
                Some(captures) => captures.span(),
                None => break,
            };

            // After an empty match the search resumes one byte later, the
            // engines never start a match in the middle of a character.
            start = if span.is_empty() { span.end + 1 } else { span.end };
            count += 1;

            if self.count_only {
                continue;
            }

            let matched = truncate_with_ellipsis(
                &String::from_utf8_lossy(&data[span.clone()])
                    .escape_debug()
                    .to_string(),
                self.max_match_len,
            );

            if self.only_matching {
                println!("{}{}", prefix, matched);
            } else {
                println!(
                    "{}{}: {}",
                    prefix,
                    format!("{}..{}", span.start, span.end).paint(Green),
                    matched.paint(Red).bold(),
                );
            }
        }

        if self.count_only {
            println!("{}{}", prefix, count);
        }

        debug!("{} matches for `{}`", count, re.pattern());
    }
}
