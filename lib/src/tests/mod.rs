/*! End-to-end tests. */
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;

use crate::re::ErrorKind;
use crate::{Error, Flags, Regex, RegexBuilder};

macro_rules! test_find {
    ($pattern:expr, $flags:expr, $haystack:expr, $expected:expr) => {{
        let re = Regex::with_flags($pattern, $flags).unwrap();
        let expected: Option<&str> = $expected;
        let found = re.find($haystack).map(|span| &$haystack[span]);
        assert_eq!(
            found, expected,
            "\n\n`{}` in {:?} should be {:?}, but it is {:?}",
            $pattern, $haystack, expected, found
        );
    }};
}

macro_rules! match_true {
    ($pattern:expr, $haystack:expr) => {{
        assert!(
            Regex::new($pattern).unwrap().is_match($haystack),
            "\n\n`{}` should match {:?}",
            $pattern,
            $haystack
        );
    }};
}

macro_rules! match_false {
    ($pattern:expr, $haystack:expr) => {{
        assert!(
            !Regex::new($pattern).unwrap().is_match($haystack),
            "\n\n`{}` should not match {:?}",
            $pattern,
            $haystack
        );
    }};
}

#[test]
fn find() {
    test_find!("a|ab", Flags::empty(), "ab", Some("a"));
    test_find!("a|ab", Flags::LONGEST_MATCH, "ab", Some("ab"));
    test_find!("a*", Flags::empty(), "", Some(""));
    test_find!("(?i)ABC", Flags::empty(), "abc", Some("abc"));
    test_find!("ABC", Flags::CASE_INSENSITIVE, "xAbC", Some("AbC"));
    test_find!("a.c", Flags::empty(), "a\nc", None);
    test_find!("a.c", Flags::DOTALL, "a\nc", Some("a\nc"));
    test_find!("^b$", Flags::empty(), "a\nb\nc", None);
    test_find!("^b$", Flags::MULTILINE, "a\nb\nc", Some("b"));
    test_find!(r"\w+", Flags::empty(), "¡hola!", Some("hola"));
    test_find!(r"\bé", Flags::empty(), "cé", Some("é"));
    test_find!(r"\bé", Flags::UNICODE_WORD_BOUNDARY, "cé", None);
    test_find!(r"\p{Han}+", Flags::empty(), "abc 漢字", Some("漢字"));
    test_find!("(foo|foob)ar", Flags::empty(), "foobar", Some("foobar"));
    test_find!("x{2,3}", Flags::empty(), "xxxxx", Some("xxx"));
    test_find!("x{2,3}?", Flags::empty(), "xxxxx", Some("xx"));
}

#[test]
fn is_match() {
    match_true!("abc", "xxabcxx");
    match_true!("^$", "");
    match_true!("[[:digit:]]+", "abc123");
    match_true!(r"\d{3}-\d{4}", "call 555-1234 now");
    match_true!("(?i)straße", "STRAßE");
    match_true!("x[[:]+", "x:[");
    match_true!("(?:ab)+$", "xabab");
    match_true!("^(?:a?){30}a{30}$", &"a".repeat(30));
    match_false!("abc", "ab");
    match_false!(r"^\d+$", "12a");
    match_false!("[^[:ascii:]]", "plain ascii");
}

#[test]
fn matches() {
    let re = Regex::new("a+b").unwrap();
    assert!(re.matches("aab"));
    assert!(!re.matches("aabc"));
    assert!(!re.matches("caab"));

    // `matches` requires the whole input, even if the first match found
    // by priority is shorter.
    let re = Regex::new("a|ab").unwrap();
    assert!(re.matches("ab"));
}

#[test]
fn captures() {
    let re = Regex::new("(a)(b)?").unwrap();

    let captures = re.captures("a").unwrap();
    assert_eq!(captures.len(), 3);
    assert_eq!(captures.get(1), Some(0..1));
    assert_eq!(captures.get(2), None);

    let captures = re.captures("ab").unwrap();
    assert_eq!(captures.get(1), Some(0..1));
    assert_eq!(captures.get(2), Some(1..2));

    assert_eq!(
        captures.iter().collect::<Vec<_>>(),
        vec![Some(0..2), Some(0..1), Some(1..2)]
    );
}

#[test]
fn matcher() {
    let re = Regex::new(r"(?P<word>\w+)").unwrap();
    let mut m = re.matcher("one two  three");

    assert_eq!(m.group_count(), 1);
    assert_eq!(m.start(), None);
    assert_eq!(m.group(0), None);

    assert_eq!(m.find(), Some(0..3));
    assert_eq!(m.group_by_name("word"), Some("one"));
    assert_eq!(m.find(), Some(4..7));
    assert_eq!((m.start(), m.end()), (Some(4), Some(7)));
    assert_eq!(m.find(), Some(9..14));
    assert_eq!(m.group(1), Some("three"));
    assert_eq!(m.group_by_name("nope"), None);
    assert_eq!(m.find(), None);
    assert_eq!(m.find(), None);

    m.reset();
    assert_eq!(m.find(), Some(0..3));

    assert_eq!(m.find_from(5), Some(5..7));
    assert_eq!(m.find_from(100), None);

    assert!(m.looking_at());
    assert_eq!(m.group(0), Some("one"));
    assert!(!m.matches());

    m.reset_with("single");
    assert!(m.matches());
}

#[test]
fn matcher_empty_matches() {
    let re = Regex::new("x*").unwrap();

    let mut m = re.matcher("");
    assert_eq!(m.find(), Some(0..0));
    assert_eq!(m.find(), None);

    // Empty matches advance one whole character at a time.
    let mut m = re.matcher("añ");
    assert_eq!(m.find(), Some(0..0));
    assert_eq!(m.find(), Some(1..1));
    assert_eq!(m.find(), Some(3..3));
    assert_eq!(m.find(), None);

    let re = Regex::new("a*").unwrap();
    let mut m = re.matcher("baaa");
    assert_eq!(m.find(), Some(0..0));
    assert_eq!(m.find(), Some(1..4));
    assert_eq!(m.find(), Some(4..4));
    assert_eq!(m.find(), None);
}

#[test]
fn split() {
    let re = Regex::new(",").unwrap();
    assert_eq!(re.split("a,b,,c,,"), vec!["a", "b", "", "c"]);
    assert_eq!(re.splitn("a,b,,c,,", -1), vec!["a", "b", "", "c", "", ""]);
    assert_eq!(re.splitn("a,b,,c,,", 2), vec!["a", "b,,c,,"]);
    assert_eq!(re.splitn("a,b,,c,,", 1), vec!["a,b,,c,,"]);
    assert_eq!(re.split(""), vec![""]);
    assert_eq!(re.split(",,,"), vec![""]);
    assert_eq!(re.split("abc"), vec!["abc"]);

    // An empty match at the start doesn't produce a leading empty string.
    let re = Regex::new("").unwrap();
    assert_eq!(re.split("abc"), vec!["a", "b", "c"]);

    // The empty match right after `xx` counts as a separator too.
    let re = Regex::new("x*").unwrap();
    assert_eq!(re.split("axxb"), vec!["a", "", "b"]);

    let re = Regex::new(r"\s+").unwrap();
    assert_eq!(re.split("  one two "), vec!["", "one", "two"]);
}

#[test]
fn quote() {
    assert_eq!(Regex::quote(r"a.b*c"), r"a\.b\*c");
    assert_eq!(
        Regex::quote(r"\.+*?()|[]{}^$"),
        r"\\\.\+\*\?\(\)\|\[\]\{\}\^\$"
    );
    assert_eq!(Regex::quote("ñ-_"), "ñ-_");

    for text in
        ["", "a.b", "(x)", r"\d+", "[^]", "{1,2}", "$^", "a|b", "ü*ñ?"]
    {
        let re = Regex::new(&Regex::quote(text)).unwrap();
        assert!(re.matches(text), "quote({:?}) doesn't match itself", text);
        assert_eq!(re.find(text), Some(0..text.len()));
    }
}

#[test]
fn flags() {
    assert_eq!(
        Flags::try_from(0x1F),
        Ok(Flags::CASE_INSENSITIVE
            | Flags::DOTALL
            | Flags::MULTILINE
            | Flags::DISABLE_UNICODE_GROUPS
            | Flags::LONGEST_MATCH)
    );
    assert_eq!(Flags::try_from(0x40), Err(Error::InvalidFlags(0x40)));

    let re = Regex::with_flags(r"\pL", Flags::DISABLE_UNICODE_GROUPS);
    match re {
        Err(Error::Syntax(err)) => {
            assert_eq!(err.kind(), ErrorKind::InvalidEscape)
        }
        _ => panic!("expecting a syntax error"),
    }
}

#[test]
fn errors() {
    let err = Regex::new("a(b").unwrap_err();
    assert_eq!(
        err.to_string(),
        "error parsing regexp: missing closing ): `(b`"
    );

    let err = Regex::new("abc)").unwrap_err();
    match err {
        Error::Syntax(err) => assert_eq!(err.position(), 3),
        _ => panic!("expecting a syntax error"),
    }

    let err =
        RegexBuilder::new("a{1000}").size_limit(100).build().unwrap_err();
    assert_eq!(err, Error::TooLarge { limit: 100 });
}

#[test]
fn introspection() {
    let re = Regex::new(r"(?P<year>\d{4})-(\d{2})-(?P<day>\d{2})").unwrap();

    assert_eq!(re.group_count(), 3);
    assert_eq!(
        re.named_groups().collect::<Vec<_>>(),
        vec![("year", 1), ("day", 3)]
    );
    assert!(re.program_size() > 0);
    assert_eq!(re.pattern(), r"(?P<year>\d{4})-(\d{2})-(?P<day>\d{2})");
    assert_eq!(re.to_string(), re.pattern());
}

#[test]
fn equality() {
    let hash = |re: &Regex| {
        let mut hasher = DefaultHasher::new();
        re.hash(&mut hasher);
        hasher.finish()
    };

    let a = Regex::new("abc").unwrap();
    let b = Regex::new("abc").unwrap();
    let c = Regex::with_flags("abc", Flags::CASE_INSENSITIVE).unwrap();

    assert_eq!(a, b);
    assert_eq!(hash(&a), hash(&b));
    assert_ne!(a, c);
    assert_ne!(a, Regex::new("abd").unwrap());
}

#[test]
fn serialization() {
    let re = Regex::with_flags("a+b", Flags::LONGEST_MATCH).unwrap();
    let json = serde_json::to_string(&re).unwrap();

    assert_eq!(json, r#"{"pattern":"a+b","flags":16}"#);

    let deserialized: Regex = serde_json::from_str(&json).unwrap();

    assert_eq!(re, deserialized);
    assert!(deserialized.is_match("xaab"));

    assert!(serde_json::from_str::<Regex>(r#"{"pattern":"a(","flags":0}"#)
        .is_err());
    assert!(serde_json::from_str::<Regex>(r#"{"pattern":"a","flags":128}"#)
        .is_err());
}

#[test]
fn concurrent_searches() {
    let re = Arc::new(Regex::new(r"(\d+)-(\d+)").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let re = re.clone();
            thread::spawn(move || {
                let haystack = format!("x {}-{} y", i, i * 10);
                let captures = re.captures(&haystack).unwrap();
                haystack[captures.get(2).unwrap()].to_string()
            })
        })
        .collect();

    let results: Vec<_> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(
        results,
        (0..8).map(|i| (i * 10).to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn regex_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Regex>();
}
