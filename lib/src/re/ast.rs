/*! Abstract syntax tree for regular expressions.

The tree produced by the [parser][`crate::re::parser::Parser`] is fairly
close to the surface syntax, with a few simplifications: the flags that
were active when each piece of the regexp was parsed are already applied
(e.g: a `.` is a class that includes or excludes the newline depending on
the `s` flag), and consecutive literal characters that share the same case
sensitivity are merged into a single [`Literal`].
*/

use regex_syntax::hir::{ClassUnicode, ClassUnicodeRange};

use crate::re::Look;

/// A node in the abstract syntax tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ast {
    /// Matches the empty string.
    Empty,
    /// A sequence of characters.
    Literal(Literal),
    /// A set of characters.
    Class(Class),
    /// A zero-width assertion.
    Look(Look),
    /// A repeated sub-expression.
    Repetition(Repetition),
    /// A capture group.
    Capture(Capture),
    /// A sequence of sub-expressions that must match one after the other.
    Concat(Vec<Ast>),
    /// A list of alternatives, in priority order.
    Alternation(Vec<Ast>),
}

/// A literal string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub chars: Vec<char>,
    /// If true the literal matches case-insensitively.
    pub fold: bool,
}

/// A set of characters, expressed as a list of items that are combined
/// by union and then optionally negated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Class {
    pub negated: bool,
    pub items: Vec<ClassItem>,
}

/// An item in a [`Class`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassItem {
    /// An inclusive range of characters. When `fold` is true the range also
    /// includes the case variants of every character in it.
    Range { start: char, end: char, fold: bool },
    /// A nested class, like `\d`, `[:alpha:]` or `\p{Greek}`, which has its
    /// own negation.
    Class(Class),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repetition {
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
    pub greedy: bool,
    pub sub: Box<Ast>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    /// Group number, starting at 1. Group 0 is the whole match and is never
    /// present in the tree.
    pub index: u32,
    pub name: Option<String>,
    pub sub: Box<Ast>,
}

impl Class {
    pub fn new(negated: bool, items: Vec<ClassItem>) -> Self {
        Self { negated, items }
    }

    /// Creates a non-negated class from a list of ranges.
    pub fn from_ranges<I>(ranges: I, fold: bool) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        Self {
            negated: false,
            items: ranges
                .into_iter()
                .map(|(start, end)| ClassItem::Range { start, end, fold })
                .collect(),
        }
    }

    /// Computes the set of characters matched by this class.
    ///
    /// Case folding is applied to the ranges marked with `fold` before
    /// nested classes are merged and before negation.
    pub fn to_unicode_class(&self) -> ClassUnicode {
        let mut set = ClassUnicode::empty();
        for item in &self.items {
            match item {
                ClassItem::Range { start, end, fold } => {
                    let mut range = ClassUnicode::new([
                        ClassUnicodeRange::new(*start, *end),
                    ]);
                    if *fold {
                        range.case_fold_simple();
                    }
                    set.union(&range);
                }
                ClassItem::Class(nested) => {
                    set.union(&nested.to_unicode_class());
                }
            }
        }
        if self.negated {
            set.negate();
        }
        set
    }
}

impl Ast {
    /// Returns the number of capture groups in the tree, not counting the
    /// implicit group 0.
    pub fn capture_count(&self) -> u32 {
        match self {
            Ast::Empty | Ast::Literal(_) | Ast::Class(_) | Ast::Look(_) => 0,
            Ast::Repetition(rep) => rep.sub.capture_count(),
            Ast::Capture(cap) => {
                cap.index.max(cap.sub.capture_count())
            }
            Ast::Concat(items) | Ast::Alternation(items) => items
                .iter()
                .map(|item| item.capture_count())
                .max()
                .unwrap_or(0),
        }
    }

    /// Calls `f` with the index and name of every named capture group.
    pub fn for_each_named_capture<F>(&self, f: &mut F)
    where
        F: FnMut(u32, &str),
    {
        match self {
            Ast::Empty | Ast::Literal(_) | Ast::Class(_) | Ast::Look(_) => {}
            Ast::Repetition(rep) => rep.sub.for_each_named_capture(f),
            Ast::Capture(cap) => {
                if let Some(name) = &cap.name {
                    f(cap.index, name);
                }
                cap.sub.for_each_named_capture(f);
            }
            Ast::Concat(items) | Ast::Alternation(items) => {
                for item in items {
                    item.for_each_named_capture(f)
                }
            }
        }
    }
}

#[cfg(feature = "ascii-tree")]
impl Ast {
    /// Returns a printable ASCII tree representing the AST.
    pub fn ascii_tree(&self) -> ::ascii_tree::Tree {
        use ::ascii_tree::Tree::{Leaf, Node};

        match self {
            Ast::Empty => Leaf(vec!["empty".to_string()]),
            Ast::Literal(lit) => Leaf(vec![format!(
                "literal {:?}{}",
                lit.chars.iter().collect::<String>(),
                if lit.fold { " (?i)" } else { "" }
            )]),
            Ast::Class(class) => class_ascii_tree(class),
            Ast::Look(look) => Leaf(vec![format!("look {}", look.as_str())]),
            Ast::Repetition(rep) => Node(
                format!(
                    "repeat {{{},{}}}{}",
                    rep.min,
                    rep.max.map(|max| max.to_string()).unwrap_or_default(),
                    if rep.greedy { "" } else { " lazy" }
                ),
                vec![rep.sub.ascii_tree()],
            ),
            Ast::Capture(cap) => Node(
                match &cap.name {
                    Some(name) => format!("capture {} <{}>", cap.index, name),
                    None => format!("capture {}", cap.index),
                },
                vec![cap.sub.ascii_tree()],
            ),
            Ast::Concat(items) => Node(
                "concat".to_string(),
                items.iter().map(|item| item.ascii_tree()).collect(),
            ),
            Ast::Alternation(items) => Node(
                "alternation".to_string(),
                items.iter().map(|item| item.ascii_tree()).collect(),
            ),
        }
    }
}

#[cfg(feature = "ascii-tree")]
fn class_ascii_tree(class: &Class) -> ::ascii_tree::Tree {
    use ::ascii_tree::Tree::{Leaf, Node};

    let title = if class.negated { "class ^" } else { "class" };
    // Large classes like `\p{L}` have hundreds of ranges, only the first
    // ones are shown.
    const MAX_ITEMS: usize = 16;

    let mut children: Vec<_> = class
        .items
        .iter()
        .take(MAX_ITEMS)
        .map(|item| match item {
            ClassItem::Range { start, end, fold } => Leaf(vec![format!(
                "{:?}-{:?}{}",
                start,
                end,
                if *fold { " (?i)" } else { "" }
            )]),
            ClassItem::Class(nested) => class_ascii_tree(nested),
        })
        .collect();

    if class.items.len() > MAX_ITEMS {
        children.push(Leaf(vec![format!(
            "... {} more",
            class.items.len() - MAX_ITEMS
        )]));
    }

    Node(title.to_string(), children)
}
