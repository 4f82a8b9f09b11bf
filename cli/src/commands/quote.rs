use clap::{arg, ArgMatches, Command};

use linre::Regex;

use crate::help;

pub fn quote() -> Command {
    super::command("quote")
        .about("Quote a text so that it can be used as a pattern")
        .long_about(help::QUOTE_LONG_HELP)
        .arg(arg!(<TEXT>).help("Text to quote"))
}

pub fn exec_quote(args: &ArgMatches) -> anyhow::Result<()> {
    let text = args.get_one::<String>("TEXT").unwrap();
    println!("{}", Regex::quote(text));
    Ok(())
}
