use pretty_assertions::assert_eq;

use super::{ErrorKind, Parser};
use crate::re::ast::{Ast, Capture, Class, ClassItem, Literal, Repetition};
use crate::re::Look;

fn lit(s: &str) -> Ast {
    Ast::Literal(Literal { chars: s.chars().collect(), fold: false })
}

fn lit_i(s: &str) -> Ast {
    Ast::Literal(Literal { chars: s.chars().collect(), fold: true })
}

fn rep(min: u32, max: Option<u32>, greedy: bool, sub: Ast) -> Ast {
    Ast::Repetition(Repetition { min, max, greedy, sub: Box::new(sub) })
}

fn cap(index: u32, name: Option<&str>, sub: Ast) -> Ast {
    Ast::Capture(Capture {
        index,
        name: name.map(|n| n.to_string()),
        sub: Box::new(sub),
    })
}

fn range(start: char, end: char) -> ClassItem {
    ClassItem::Range { start, end, fold: false }
}

fn parse(pattern: &str) -> Ast {
    Parser::new().parse(pattern).unwrap()
}

#[test]
fn literals() {
    assert_eq!(parse(""), Ast::Empty);
    assert_eq!(parse("abc"), lit("abc"));
    assert_eq!(parse(r"a\.b\*"), lit("a.b*"));
    assert_eq!(parse(r"\x41\x{1F600}"), lit("A😀"));
    assert_eq!(parse(r"\0\101\12"), lit("\0A\n"));
    assert_eq!(parse(r"\a\f\t\n\r\v"), lit("\x07\x0C\t\n\r\x0B"));
    assert_eq!(parse("a{"), lit("a{"));
    assert_eq!(parse("a{,3}"), lit("a{,3}"));
    assert_eq!(parse("a{x}"), lit("a{x}"));
    assert_eq!(parse("ñandú"), lit("ñandú"));
}

#[test]
fn case_folding() {
    assert_eq!(parse("(?i)ab"), lit_i("ab"));
    assert_eq!(
        parse("(?i)ab1c"),
        Ast::Concat(vec![lit_i("ab"), lit("1"), lit_i("c")])
    );
    assert_eq!(parse("a(?i)b"), Ast::Concat(vec![lit("a"), lit_i("b")]));
    assert_eq!(
        parse("(?i:a)b"),
        Ast::Concat(vec![lit_i("a"), lit("b")])
    );
    assert_eq!(
        parse("(?i)a(?-i)b"),
        Ast::Concat(vec![lit_i("a"), lit("b")])
    );
    assert_eq!(Parser::new().case_insensitive(true).parse("x").unwrap(), lit_i("x"));
}

#[test]
fn flags_are_scoped_to_groups() {
    assert_eq!(
        parse("((?i)a)b"),
        Ast::Concat(vec![cap(1, None, lit_i("a")), lit("b")])
    );
    // Flags set with `(?i)` persist across alternatives of the same group.
    assert_eq!(
        parse("a(?i)b|c"),
        Ast::Alternation(vec![
            Ast::Concat(vec![lit("a"), lit_i("b")]),
            lit_i("c")
        ])
    );
}

#[test]
fn repetitions() {
    assert_eq!(parse("a*"), rep(0, None, true, lit("a")));
    assert_eq!(parse("a+?"), rep(1, None, false, lit("a")));
    assert_eq!(parse("a??"), rep(0, Some(1), false, lit("a")));
    assert_eq!(parse("a{3}"), rep(3, Some(3), true, lit("a")));
    assert_eq!(parse("a{3,}"), rep(3, None, true, lit("a")));
    assert_eq!(parse("a{2,5}?"), rep(2, Some(5), false, lit("a")));
    assert_eq!(parse("a{1000}"), rep(1000, Some(1000), true, lit("a")));
    assert_eq!(parse("(?U)a*"), rep(0, None, false, lit("a")));
    assert_eq!(parse("(?U)a*?"), rep(0, None, true, lit("a")));
    assert_eq!(
        parse("ab*"),
        Ast::Concat(vec![lit("a"), rep(0, None, true, lit("b"))])
    );
    assert_eq!(
        parse(r"\Qa.b\E*"),
        Ast::Concat(vec![lit("a."), rep(0, None, true, lit("b"))])
    );
    assert_eq!(parse(r"\Qa|b"), lit("a|b"));
    assert_eq!(parse(r"x\Q\E"), lit("x"));
}

#[test]
fn alternations() {
    assert_eq!(
        parse("a|b*?"),
        Ast::Alternation(vec![lit("a"), rep(0, None, false, lit("b"))])
    );
    assert_eq!(
        parse("a||b"),
        Ast::Alternation(vec![lit("a"), Ast::Empty, lit("b")])
    );
}

#[test]
fn groups() {
    assert_eq!(
        parse("(a)(?P<x>b)(?:c)(?<y>d)"),
        Ast::Concat(vec![
            cap(1, None, lit("a")),
            cap(2, Some("x"), lit("b")),
            lit("c"),
            cap(3, Some("y"), lit("d")),
        ])
    );
    assert_eq!(
        parse("((a)b)"),
        cap(1, None, Ast::Concat(vec![cap(2, None, lit("a")), lit("b")]))
    );
    assert_eq!(parse("(?:ab)+"), rep(1, None, true, lit("ab")));
    assert_eq!(
        parse("(?:a|b)(?i:c)"),
        Ast::Concat(vec![
            Ast::Alternation(vec![lit("a"), lit("b")]),
            lit_i("c"),
        ])
    );
    assert_eq!(parse("()"), cap(1, None, Ast::Empty));
    assert_eq!(parse("(a)(b)").capture_count(), 2);
}

#[test]
fn anchors() {
    assert_eq!(
        parse(r"^\A$\z"),
        Ast::Concat(vec![
            Ast::Look(Look::StartText),
            Ast::Look(Look::StartText),
            Ast::Look(Look::EndText),
            Ast::Look(Look::EndText),
        ])
    );
    assert_eq!(
        parse("(?m)^$"),
        Ast::Concat(vec![Ast::Look(Look::StartLine), Ast::Look(Look::EndLine)])
    );
    assert_eq!(
        parse(r"\b\B"),
        Ast::Concat(vec![
            Ast::Look(Look::WordAscii),
            Ast::Look(Look::WordAsciiNegate)
        ])
    );
    assert_eq!(
        Parser::new().unicode_word_boundary(true).parse(r"\b\B").unwrap(),
        Ast::Concat(vec![
            Ast::Look(Look::WordUnicode),
            Ast::Look(Look::WordUnicodeNegate)
        ])
    );
}

#[test]
fn classes() {
    assert_eq!(
        parse("[]a]"),
        Ast::Class(Class::new(false, vec![range(']', ']'), range('a', 'a')]))
    );
    assert_eq!(
        parse("[^-a-c-]"),
        Ast::Class(Class::new(
            true,
            vec![range('-', '-'), range('a', 'c'), range('-', '-')]
        ))
    );
    assert_eq!(
        parse(r"[\d\x41-\x{43}]"),
        Ast::Class(Class::new(
            false,
            vec![
                ClassItem::Class(Class::new(false, vec![range('0', '9')])),
                range('A', 'C')
            ]
        ))
    );
    assert_eq!(
        parse("[[:^alpha:]x]"),
        Ast::Class(Class::new(
            false,
            vec![
                ClassItem::Class(Class::new(
                    true,
                    vec![range('A', 'Z'), range('a', 'z')]
                )),
                range('x', 'x')
            ]
        ))
    );
    // `[:` without a closing `:]` is not a POSIX class.
    assert_eq!(
        parse("[[:a]"),
        Ast::Class(Class::new(
            false,
            vec![range('[', '['), range(':', ':'), range('a', 'a')]
        ))
    );
    // A `:]` overlapping the opening `[:` doesn't close a POSIX class.
    assert_eq!(
        parse("[[]"),
        Ast::Class(Class::new(false, vec![range('[', '[')]))
    );
    assert_eq!(
        parse("[[:]"),
        Ast::Class(Class::new(false, vec![range('[', '['), range(':', ':')]))
    );
    assert_eq!(
        parse("[[:]]"),
        Ast::Concat(vec![
            Ast::Class(Class::new(
                false,
                vec![range('[', '['), range(':', ':')]
            )),
            lit("]"),
        ])
    );
    assert_eq!(
        parse("[a[:]"),
        Ast::Class(Class::new(
            false,
            vec![range('a', 'a'), range('[', '['), range(':', ':')]
        ))
    );
    assert_eq!(
        parse("[x[:alpha]"),
        Ast::Class(Class::new(
            false,
            "x[:alpha".chars().map(|c| range(c, c)).collect()
        ))
    );
    assert_eq!(
        parse(r"\D"),
        Ast::Class(Class::new(true, vec![range('0', '9')]))
    );
    assert_eq!(
        parse("(?i)[k]"),
        Ast::Class(Class::new(
            false,
            vec![ClassItem::Range { start: 'k', end: 'k', fold: true }]
        ))
    );
}

#[test]
fn dot() {
    assert_eq!(
        parse("."),
        Ast::Class(Class::new(
            false,
            vec![range('\0', '\x09'), range('\x0B', char::MAX)]
        ))
    );
    assert_eq!(
        parse("(?s)."),
        Ast::Class(Class::new(false, vec![range('\0', char::MAX)]))
    );
}

#[test]
fn unicode_classes() {
    let greek = match parse(r"\p{Greek}") {
        Ast::Class(class) => class,
        ast => panic!("unexpected AST: {:?}", ast),
    };
    assert!(!greek.negated);
    assert!(greek
        .to_unicode_class()
        .ranges()
        .iter()
        .any(|r| r.start() <= 'α' && 'α' <= r.end()));

    match parse(r"\P{Greek}") {
        Ast::Class(class) => assert!(class.negated),
        ast => panic!("unexpected AST: {:?}", ast),
    }

    // `\P{^Greek}` is a double negation.
    match parse(r"\P{^Greek}") {
        Ast::Class(class) => assert!(!class.negated),
        ast => panic!("unexpected AST: {:?}", ast),
    }

    match parse(r"\pL") {
        Ast::Class(class) => assert!(!class.items.is_empty()),
        ast => panic!("unexpected AST: {:?}", ast),
    }
}

#[test]
fn errors() {
    let tests = [
        ("(abc", ErrorKind::MissingParen, 0),
        ("a(b(c)", ErrorKind::MissingParen, 1),
        ("abc)", ErrorKind::UnexpectedParen, 3),
        ("[abc", ErrorKind::MissingBracket, 0),
        ("[]", ErrorKind::MissingBracket, 0),
        ("[z-a]", ErrorKind::InvalidCharRange, 1),
        (r"[a-\d]", ErrorKind::InvalidCharRange, 1),
        ("a**", ErrorKind::InvalidRepeatOp, 1),
        ("a*??", ErrorKind::InvalidRepeatOp, 1),
        ("a{2}*", ErrorKind::InvalidRepeatOp, 1),
        ("*a", ErrorKind::MissingRepeatArgument, 0),
        ("a|*", ErrorKind::MissingRepeatArgument, 2),
        ("(*)", ErrorKind::MissingRepeatArgument, 1),
        ("(?i)*", ErrorKind::MissingRepeatArgument, 4),
        ("{2}", ErrorKind::MissingRepeatArgument, 0),
        ("a{1001}", ErrorKind::InvalidRepeatSize, 1),
        ("a{2,1001}", ErrorKind::InvalidRepeatSize, 1),
        ("a{5,2}", ErrorKind::InvalidRepeatSize, 1),
        ("a{99999999999}", ErrorKind::InvalidRepeatSize, 1),
        (r"\8", ErrorKind::InvalidEscape, 0),
        (r"\1", ErrorKind::InvalidEscape, 0),
        (r"a\Z", ErrorKind::InvalidEscape, 1),
        (r"\E", ErrorKind::InvalidEscape, 0),
        (r"\x{110000}", ErrorKind::InvalidEscape, 0),
        (r"\x{D800}", ErrorKind::InvalidEscape, 0),
        (r"\xZ1", ErrorKind::InvalidEscape, 0),
        (r"\x{41", ErrorKind::InvalidEscape, 0),
        (r"[\z]", ErrorKind::InvalidEscape, 1),
        ("a\\", ErrorKind::TrailingBackslash, 1),
        ("(?P<n>a)(?P<n>b)", ErrorKind::DuplicateCaptureName, 8),
        ("(?P<>a)", ErrorKind::InvalidNamedCapture, 0),
        ("(?P<a-b>x)", ErrorKind::InvalidNamedCapture, 0),
        ("(?P<name", ErrorKind::InvalidNamedCapture, 0),
        ("(?=a)", ErrorKind::InvalidPerlOp, 0),
        ("(?!a)", ErrorKind::InvalidPerlOp, 0),
        ("(?<=a)", ErrorKind::InvalidPerlOp, 0),
        ("(?<!a)", ErrorKind::InvalidPerlOp, 0),
        ("(?i-)", ErrorKind::InvalidPerlOp, 0),
        ("(?-)", ErrorKind::InvalidPerlOp, 0),
        ("(?)", ErrorKind::InvalidPerlOp, 0),
        ("(?i-s-m)", ErrorKind::InvalidPerlOp, 0),
        ("(?x)", ErrorKind::InvalidPerlOp, 0),
        ("(?-:a)", ErrorKind::InvalidPerlOp, 0),
        ("(?i-:a)", ErrorKind::InvalidPerlOp, 0),
        ("(?i", ErrorKind::MissingParen, 0),
        (r"\p{Foo}", ErrorKind::InvalidCharRange, 0),
        (r"\p{Greek", ErrorKind::InvalidCharRange, 0),
        (r"\p{greek}", ErrorKind::InvalidCharRange, 0),
        (r"\p{Letter}", ErrorKind::InvalidCharRange, 0),
        (r"\p{sc=Greek}", ErrorKind::InvalidCharRange, 0),
        ("[[:foo:]]", ErrorKind::InvalidCharRange, 1),
    ];

    for (pattern, kind, position) in tests {
        let err = Parser::new().parse(pattern).unwrap_err();
        assert_eq!(
            (kind, position),
            (err.kind(), err.position()),
            "pattern: {}",
            pattern
        );
    }
}

#[test]
fn error_messages() {
    let err = Parser::new().parse("(abc").unwrap_err();
    assert_eq!(err.to_string(), "error parsing regexp: missing closing ): `(abc`");

    let err = Parser::new().parse("a**").unwrap_err();
    assert_eq!(
        err.to_string(),
        "error parsing regexp: invalid nested repetition operator: `**`"
    );

    let err = Parser::new().parse(r"x\8").unwrap_err();
    assert_eq!(err.to_string(), r"error parsing regexp: invalid escape sequence: `\8`");
    assert_eq!(err.span(), 1..3);
    assert_eq!(err.fragment(), r"\8");
}

#[test]
fn unicode_groups_disabled() {
    let err = Parser::new().unicode_groups(false).parse(r"\pL").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidEscape);

    let err =
        Parser::new().unicode_groups(false).parse(r"[\p{Greek}]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidEscape);

    // Perl classes are not affected.
    assert!(Parser::new().unicode_groups(false).parse(r"\d\w\s").is_ok());
}

#[test]
fn nesting_limit() {
    assert!(Parser::new().nest_limit(4).parse("((((a))))").is_ok());

    let err = Parser::new().nest_limit(3).parse("((((a))))").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NestingDepth);
    assert_eq!(err.position(), 3);

    let err = Parser::new().nest_limit(1).parse("([a])").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NestingDepth);

    let deep = format!("{}a{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(Parser::new().parse(&deep).unwrap().capture_count(), 100);
}
