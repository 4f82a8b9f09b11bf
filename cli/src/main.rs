mod commands;
mod config;
mod help;
mod report;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::{io, process};

use config::{load_config_from_file, Config};
use crossterm::tty::IsTty;
use yansi::Color::Red;
use yansi::Paint;

use crate::commands::cli;

const APP_HELP_TEMPLATE: &str = r#"lre {version}, linear-time regular expressions.

{author-with-newline}
{before-help}{usage-heading}
  {usage}

{all-args}{after-help}
"#;

const EXIT_ERROR: i32 = 1;
const CONFIG_FILE: &str = ".lre.toml";

fn main() -> anyhow::Result<()> {
    // Colors in Windows consoles need ANSI support to be turned on.
    if let Err(err) = enable_ansi_support::enable_ansi_support() {
        println!("could not enable ANSI support: {}", err)
    }

    #[cfg(feature = "logging")]
    env_logger::init();

    // No colors when the output goes to a file or a pipe.
    if !io::stdout().is_tty() {
        yansi::disable();
    }

    let args = cli().get_matches();

    // A config file given explicitly must be valid, the one in the home
    // directory is ignored if it can't be loaded.
    let config: Config = match args.get_one::<PathBuf>("config") {
        Some(config_file) => match load_config_from_file(config_file) {
            Ok(config) => config,
            Err(err) => {
                eprintln!(
                    "{} invalid config file `{}`: {}",
                    "error:".paint(Red).bold(),
                    config_file.display(),
                    err
                );
                process::exit(EXIT_ERROR);
            }
        },
        None => match home::home_dir() {
            Some(home_path) if !home_path.as_os_str().is_empty() => {
                load_config_from_file(&home_path.join(CONFIG_FILE))
                    .unwrap_or_default()
            }
            _ => Config::default(),
        },
    };

    let result = match args.subcommand() {
        #[cfg(feature = "debug-cmd")]
        Some(("debug", args)) => commands::exec_debug(args, &config),
        Some(("search", args)) => commands::exec_search(args, &config),
        Some(("split", args)) => commands::exec_split(args, &config),
        Some(("quote", args)) => commands::exec_quote(args),
        _ => unreachable!(),
    };

    if let Err(err) = result {
        if let Some(source) = err.source() {
            eprintln!("{} {}: {}", "error:".paint(Red).bold(), err, source);
        } else {
            eprintln!("{} {}", "error:".paint(Red).bold(), err);
        }
        process::exit(EXIT_ERROR);
    }

    Ok(())
}
