#![cfg(feature = "debug-cmd")]
use std::io::stderr;

use anyhow::bail;
use clap::{arg, ArgMatches, Command};
use crossterm::tty::IsTty;

use linre::re::parser::Parser;

use crate::commands::{build_regex, with_regex_args};
use crate::config::Config;
use crate::report::syntax_error_report;

pub fn ast() -> Command {
    with_regex_args(
        super::command("ast")
            .about("Print the Abstract Syntax Tree (AST) for a pattern")
            .arg(arg!(<PATTERN>).help("Regular expression")),
    )
}

pub fn program() -> Command {
    with_regex_args(
        super::command("program")
            .about("Print the compiled program for a pattern")
            .arg(arg!(<PATTERN>).help("Regular expression")),
    )
}

pub fn debug() -> Command {
    super::command("debug")
        .about("Debug utilities")
        .arg_required_else_help(true)
        .subcommand(ast())
        .subcommand(program())
}

pub fn exec_debug(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    match args.subcommand() {
        Some(("ast", args)) => exec_ast(args, config),
        Some(("program", args)) => exec_program(args, config),
        _ => unreachable!(),
    }
}

pub fn exec_ast(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();

    let ast = match Parser::new()
        .case_insensitive(
            config.regex.case_insensitive || args.get_flag("case-insensitive"),
        )
        .dot_matches_new_line(config.regex.dot_all || args.get_flag("dot-all"))
        .multi_line(config.regex.multi_line || args.get_flag("multi-line"))
        .nest_limit(config.regex.nest_limit)
        .parse(pattern)
    {
        Ok(ast) => ast,
        Err(err) => {
            eprintln!(
                "{}",
                syntax_error_report(pattern, &err, stderr().is_tty())
            );
            bail!("invalid pattern `{}`", pattern)
        }
    };

    let mut output = String::new();
    ascii_tree::write_tree(&mut output, &ast.ascii_tree())?;

    print!("{output}");
    Ok(())
}

pub fn exec_program(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let re = build_regex(pattern, args, &config.regex)?;
    let program = re.program();

    print!("{program}");
    println!();
    println!("instructions: {}", program.len());
    println!("groups: {}", program.group_count());
    println!("one-pass: {}", program.is_one_pass());
    println!("anchored: {}", program.is_anchored_start());

    if let Some(prefix) = program.prefix() {
        println!(
            "prefix: {:?}{}",
            String::from_utf8_lossy(prefix.as_bytes()),
            if prefix.is_complete() { " (complete)" } else { "" }
        );
    }

    Ok(())
}
