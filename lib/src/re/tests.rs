use pretty_assertions::assert_eq;

use crate::re::engine::{search, search_with, Cache, EngineKind, Input};
use crate::re::parser::Parser;
use crate::re::thompson::{Compiler, Program, ProgramFlagSet, ProgramFlags};
use crate::re::Captures;

fn compile(pattern: &str, longest: bool) -> Program {
    let mut flags = ProgramFlagSet::none();
    if longest {
        flags.set(ProgramFlags::LongestMatch);
    }
    Compiler::new()
        .flags(flags)
        .compile(&Parser::new().parse(pattern).unwrap())
        .unwrap()
}

fn find(pattern: &str, haystack: &str) -> Option<Captures> {
    let program = compile(pattern, false);
    search(&program, &mut Cache::new(), &Input::new(haystack))
}

fn find_longest(pattern: &str, haystack: &str) -> Option<Captures> {
    let program = compile(pattern, true);
    search(&program, &mut Cache::new(), &Input::new(haystack))
}

fn spans(captures: Option<Captures>) -> Option<Vec<Option<(usize, usize)>>> {
    captures.map(|c| c.iter().map(|g| g.map(|r| (r.start, r.end))).collect())
}

const PATTERNS: &[&str] = &[
    "",
    "a",
    "abc",
    "a|ab",
    "ab|a",
    "(a|ab)(c|bcd)(d*)",
    "a*",
    "a+?",
    "(a*)+",
    "(a*)*",
    "(a|b)*c",
    "x*",
    "^abc$",
    "(?m)^b$",
    r"\bfoo\b",
    r"\Bo",
    "[a-c]+",
    "(?i)STRASSE",
    "ñ+",
    r"(\d+)-(\d+)",
    ".*",
    "(?s).*",
    "(a)?(b)?",
    "(?:a?){5}a{5}",
    "(foo|foobar)(baz)?",
    "a{2,4}",
    "(?U)a+",
    "[^a]",
    r"\p{Greek}+",
    r"(?P<user>\w+)@(?P<host>\w+)",
    "(?i)σ",
    "b$",
    r"(?:\b|a)+",
];

const HAYSTACKS: &[&str] = &[
    "",
    "a",
    "ab",
    "abc",
    "aaaaa",
    "abcbcd",
    "xaxbxc",
    "foo bar",
    "foobarbaz",
    "12-345",
    "ñandú",
    "aab\nb\n",
    "αβγ abc",
    "ΣΑΣ ς",
    "me@host",
    "strasse STRASSE",
];

/// Checks that every engine gives the same answer for every pattern and
/// haystack in the corpus.
#[test]
fn engine_equivalence() {
    let mut cache = Cache::new();

    for pattern in PATTERNS {
        for longest in [false, true] {
            let program = compile(pattern, longest);
            for haystack in HAYSTACKS {
                let starts = (0..=haystack.len())
                    .filter(|i| haystack.is_char_boundary(*i))
                    .take(3);
                for start in starts {
                    for (anchored_start, anchored_end) in [
                        (false, false),
                        (true, false),
                        (false, true),
                        (true, true),
                    ] {
                        for captures in [true, false] {
                            let input = Input::new(haystack)
                                .start_at(start)
                                .anchored_start(anchored_start)
                                .anchored_end(anchored_end)
                                .captures(captures);

                            let expected = search_with(
                                EngineKind::PikeVM,
                                &program,
                                &mut cache,
                                &input,
                            );

                            for kind in [
                                EngineKind::Literal,
                                EngineKind::OnePass,
                                EngineKind::Backtrack,
                            ] {
                                let result = search_with(
                                    kind,
                                    &program,
                                    &mut cache,
                                    &input,
                                );
                                assert_eq!(
                                    expected, result,
                                    "engine {:?}, pattern {:?}, \
                                     haystack {:?}, {:?}, longest: {}",
                                    kind,
                                    pattern,
                                    haystack,
                                    input,
                                    longest
                                );
                            }

                            assert_eq!(
                                expected,
                                search(&program, &mut cache, &input),
                                "selector, pattern {:?}, haystack {:?}, {:?}",
                                pattern,
                                haystack,
                                input,
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn one_pass_and_pike_vm_agree_on_captures() {
    let program = compile(r"(\d+)-(\d+)", false);
    assert!(program.is_one_pass());

    let input = Input::new("12-345").anchored_start(true);
    let mut cache = Cache::new();

    let result =
        search_with(EngineKind::OnePass, &program, &mut cache, &input);

    assert_eq!(
        spans(result.clone()),
        Some(vec![Some((0, 6)), Some((0, 2)), Some((3, 6))])
    );
    assert_eq!(
        result,
        search_with(EngineKind::PikeVM, &program, &mut cache, &input)
    );
}

#[test]
fn linear_time() {
    let program = compile("(?:a?){30}a{30}", false);
    let haystack = "a".repeat(30);
    let mut cache = Cache::new();

    let result = search_with(
        EngineKind::PikeVM,
        &program,
        &mut cache,
        &Input::new(&haystack),
    );

    assert_eq!(result.map(|c| c.span()), Some(0..30));

    // Each position processes every thread once, and computes at most two
    // epsilon closures over the program.
    let bound = 3 * program.len() * (haystack.len() + 1);
    assert!(
        cache.pikevm_steps() <= bound,
        "{} steps, expected at most {}",
        cache.pikevm_steps(),
        bound
    );

    // The backtracker visits each (instruction, position) pair only once.
    let result = search_with(
        EngineKind::Backtrack,
        &program,
        &mut cache,
        &Input::new(&haystack),
    );

    assert_eq!(result.map(|c| c.span()), Some(0..30));
}

#[test]
fn leftmost_first_vs_longest() {
    assert_eq!(find("a|ab", "ab").map(|c| c.span()), Some(0..1));
    assert_eq!(find_longest("a|ab", "ab").map(|c| c.span()), Some(0..2));
    assert_eq!(find("a+?", "aaa").map(|c| c.span()), Some(0..1));
    assert_eq!(find_longest("a+?", "aaa").map(|c| c.span()), Some(0..3));
    // The leftmost match wins even if a later one is longer.
    assert_eq!(find_longest("b|aaa", "baaa").map(|c| c.span()), Some(0..1));
}

#[test]
fn empty_matches() {
    assert_eq!(find("a*", "").map(|c| c.span()), Some(0..0));
    assert_eq!(find("", "abc").map(|c| c.span()), Some(0..0));
    assert_eq!(find("x*", "abc").map(|c| c.span()), Some(0..0));

    // Empty matches are never reported in the middle of a character.
    let program = compile("x*", false);
    let result = search(
        &program,
        &mut Cache::new(),
        &Input::new("ñ").start_at(1),
    );
    assert_eq!(result.map(|c| c.span()), Some(2..2));
}

#[test]
fn captures() {
    assert_eq!(
        spans(find("(a)(b)?", "a")),
        Some(vec![Some((0, 1)), Some((0, 1)), None])
    );
    assert_eq!(
        spans(find("(a)(b)?", "xab")),
        Some(vec![Some((1, 3)), Some((1, 2)), Some((2, 3))])
    );
    // The last iteration of a repetition is the one reported.
    assert_eq!(
        spans(find("(a|b)+", "abba")),
        Some(vec![Some((0, 4)), Some((3, 4))])
    );
    assert_eq!(
        spans(find("(a*)+", "b")),
        Some(vec![Some((0, 0)), Some((0, 0))])
    );
}

#[test]
fn captures_not_wanted() {
    let program = compile("(a)(b)", false);
    let result = search(
        &program,
        &mut Cache::new(),
        &Input::new("ab").captures(false),
    );
    assert_eq!(
        spans(result),
        Some(vec![Some((0, 2)), None, None])
    );
}

#[test]
fn case_folding() {
    assert_eq!(find("(?i)ABC", "xabc").map(|c| c.span()), Some(1..4));
    assert_eq!(find("(?i)ABC", "AbC").map(|c| c.span()), Some(0..3));
    assert!(find("(?i)ABC", "abd").is_none());
    // `K` folds to KELVIN SIGN.
    assert_eq!(find("(?i)k", "\u{212A}").map(|c| c.span()), Some(0..3));
    assert_eq!(find("(?i)[a-c]+", "xAbC").map(|c| c.span()), Some(1..4));
}

#[test]
fn anchors() {
    assert!(find("^abc", "xabc").is_none());
    assert_eq!(find("abc$", "abcabc").map(|c| c.span()), Some(3..6));
    assert_eq!(find("(?m)^b$", "a\nb\nc").map(|c| c.span()), Some(2..3));
    assert!(find("^b$", "a\nb\nc").is_none());
    assert_eq!(find(r"\bbar", "foobar bar").map(|c| c.span()), Some(7..10));
    assert_eq!(find(r"\Bbar", "foobar bar").map(|c| c.span()), Some(3..6));
    assert_eq!(find(r"\Aa\z", "a").map(|c| c.span()), Some(0..1));

    // A search that starts after the beginning of the input can't match
    // `\A`, but it still sees the bytes before the start.
    let program = compile(r"^a|\bb", false);
    let mut cache = Cache::new();
    assert!(search(&program, &mut cache, &Input::new("aab").start_at(1))
        .is_none());
    assert_eq!(
        search(&program, &mut cache, &Input::new("a b").start_at(1))
            .map(|c| c.span()),
        Some(2..3)
    );
}

#[test]
fn anchored_end() {
    let program = compile("a+", false);
    let mut cache = Cache::new();

    assert!(search(&program, &mut cache, &Input::new("aab").anchored_end(true))
        .is_none());
    assert_eq!(
        search(&program, &mut cache, &Input::new("baa").anchored_end(true))
            .map(|c| c.span()),
        Some(1..3)
    );
    assert_eq!(
        search(
            &program,
            &mut cache,
            &Input::new("aa").anchored_start(true).anchored_end(true)
        )
        .map(|c| c.span()),
        Some(0..2)
    );
}

#[test]
fn unicode() {
    assert_eq!(find(r"\p{Greek}+", "abc αβγ").map(|c| c.span()), Some(4..10));
    assert_eq!(find(r"\P{Greek}+", "αβγ abc").map(|c| c.span()), Some(6..10));
    assert_eq!(find(".", "ñ").map(|c| c.span()), Some(0..2));
    assert_eq!(find("[^a]", "ñ").map(|c| c.span()), Some(0..2));
    assert_eq!(find("😀+", "x😀😀").map(|c| c.span()), Some(1..9));
}
