use clap::{arg, value_parser, ArgMatches, Command};

use crate::commands::{build_regex, with_regex_args};
use crate::config::Config;
use crate::help;

pub fn split() -> Command {
    with_regex_args(
        super::command("split")
            .about("Split a text around the matches of a pattern")
            .long_about(help::SPLIT_LONG_HELP)
            .arg(arg!(<PATTERN>).help("Regular expression used as separator"))
            .arg(arg!(<TEXT>).help("Text to split"))
            .arg(
                arg!(-l --limit <LIMIT>)
                    .help("Maximum number of pieces")
                    .value_parser(value_parser!(i32))
                    .allow_negative_numbers(true)
                    .default_value("0"),
            ),
    )
}

pub fn exec_split(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let text = args.get_one::<String>("TEXT").unwrap();
    let limit = args.get_one::<i32>("limit").unwrap();

    let re = build_regex(pattern, args, &config.regex)?;

    for piece in re.splitn(text, *limit) {
        println!("{:?}", piece);
    }

    Ok(())
}
