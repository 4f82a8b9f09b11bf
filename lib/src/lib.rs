/*! A regular expression engine that guarantees matching in time linear in
the size of the input.

The syntax is the one used by [RE2][1], which is very similar to the syntax
used by Perl, with the exception of features like backreferences and
look-around assertions, which can't be implemented without backtracking.

There are two main types in this crate: [`Regex`] and [`Matcher`]. A regex
is compiled once from a pattern and some [`Flags`], and can be used for any
number of searches, from any number of threads. A matcher finds the
successive matches of a regex in some input, and gives access to the text
matched by each capture group.

# Example

```rust
# use linre::Regex;
let re = Regex::new(r"(?P<key>\w+)=(?P<value>\w+)").unwrap();

let mut matcher = re.matcher("a=1, b=2");
let mut pairs = Vec::new();

while matcher.find().is_some() {
    pairs.push((
        matcher.group_by_name("key").unwrap(),
        matcher.group_by_name("value").unwrap(),
    ));
}

assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
```

The building blocks used by [`Regex`] are available in the [`re`] module,
for programs that need more control over parsing, compilation or the
choice of engine.

[1]: https://github.com/google/re2/wiki/Syntax
*/

pub use matcher::Matcher;
pub use regex::Flags;
pub use regex::Regex;
pub use regex::RegexBuilder;

pub use re::Captures;
pub use re::Error;
pub use re::SyntaxError;

mod matcher;
mod regex;

pub mod re;

#[cfg(test)]
mod tests;
