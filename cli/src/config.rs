use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use linre::re::{DEFAULT_NEST_LIMIT, DEFAULT_SIZE_LIMIT};

/// Configuration for the CLI.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Options used when compiling patterns.
    pub regex: RegexConfig,
    /// Configuration for the `search` command.
    pub search: SearchConfig,
}

/// Options used when compiling patterns. The flags are the default values,
/// flags passed in the command line are added to them.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct RegexConfig {
    pub case_insensitive: bool,
    pub dot_all: bool,
    pub multi_line: bool,
    pub longest_match: bool,
    /// Maximum number of instructions in a compiled pattern.
    pub size_limit: usize,
    /// Maximum nesting depth of groups and classes.
    pub nest_limit: u32,
}

/// Configuration for the `search` command.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Matches longer than this number of characters are truncated when
    /// printed.
    pub max_match_len: usize,
}

impl Default for RegexConfig {
    fn default() -> RegexConfig {
        RegexConfig {
            case_insensitive: false,
            dot_all: false,
            multi_line: false,
            longest_match: false,
            size_limit: DEFAULT_SIZE_LIMIT,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig { max_match_len: 120 }
    }
}

/// Load a config file from a given path. Path must contain a valid TOML file
/// or this function will propagate the error. Missing keys take their
/// default values.
pub fn load_config_from_file(
    config_file: &Path,
) -> Result<Config, Box<figment::Error>> {
    let config: Config =
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file_exact(config_file))
            .extract()?;
    Ok(config)
}
