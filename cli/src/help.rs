pub const CONFIG_FILE: &str = r#"Config file for lre

Specifies a config file which controls the behavior of lre. If config file is not
specified, ${HOME}/.lre.toml is used. If it does not exist the default options are
applied.

Example:

[regex]
case_insensitive = true
size_limit = 50000

[search]
max_match_len = 80"#;

pub const SEARCH_LONG_HELP: &str = r#"Search for a pattern in files

Prints every non-overlapping match of <PATTERN>, with the byte offsets where it
starts and ends. If no files are given the input is read from stdin. The input
doesn't need to be valid UTF-8, invalid sequences never match and offsets refer
to the original bytes. Invalid sequences in the printed text are shown as U+FFFD.

Examples:

lre search 'fo+' file.txt
lre search -i --count '\bfoo\b' file1.txt file2.txt
cat file.txt | lre search -o '\d+'"#;

pub const LONGEST_LONG_HELP: &str = r#"Prefer the longest match

By default, when more than one match starts at the same position, the one chosen
is the first one in priority order, as in Perl. For instance, `a|ab` matches only
the `a` in `ab`. With this option the longest match is chosen, as in POSIX."#;

pub const SPLIT_LONG_HELP: &str = r#"Split a text around the matches of a pattern

Prints each piece in its own line, between quotes.

With a positive <LIMIT> at most <LIMIT> pieces are produced, the last one contains
the rest of the text. With a limit of zero, which is the default, trailing empty
pieces are removed. With a negative limit all pieces are kept.

Examples:

lre split ',' 'a,b,,c,,'
lre split --limit=-1 ',' 'a,b,,c,,'"#;

pub const QUOTE_LONG_HELP: &str = r#"Quote a text so that it can be used as a pattern

The resulting pattern matches <TEXT> literally.

Example:

lre quote '1+1=2?'"#;
