//! CSS selector parsing and matching
//!
//! Supported grammar:
//!
//! ```text
//! list      := complex ( "," complex )*
//! complex   := compound ( combinator compound )*
//! combinator:= " " | ">" | "+" | "~"
//! compound  := ( "*" | type )? ( "#id" | ".class" | "[attr op value flag?]" | ":pseudo" )*
//! ```
//!
//! Pseudo-classes: `first-child`, `last-child`, `only-child`, `empty`, `root`,
//! `checked`, `disabled`, `enabled`, `nth-child(an+b)`, `not(list)`.
//!
//! Matching runs right to left from the candidate element, with backtracking
//! on descendant and general-sibling combinators.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
    value: String,
    case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Checked,
    Disabled,
    Enabled,
    NthChild { a: i64, b: i64 },
    Not(SelectorList),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudo_classes: Vec<PseudoClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    compound: Compound,
    // Relation to previous (left) selector part.
    combinator: Option<Combinator>,
}

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Vec<SelectorPart>>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self> {
        let mut parser = Parser {
            source: selector,
            chars: selector.chars().collect(),
            pos: 0,
        };
        let list = parser.parse_list()?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(list)
    }

    /// Whether the node matches any selector in the list
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|parts| matches_from(arena, parts, parts.len() - 1, node_id))
    }
}

fn matches_from(arena: &DomArena, parts: &[SelectorPart], idx: usize, node_id: NodeId) -> bool {
    let Ok(node) = arena.get(node_id) else {
        return false;
    };
    if !matches_compound(arena, &parts[idx].compound, node) {
        return false;
    }
    if idx == 0 {
        return true;
    }

    match parts[idx].combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => {
            parent_element(arena, node).is_some_and(|parent| matches_from(arena, parts, idx - 1, parent))
        }
        Combinator::Descendant => {
            let mut cursor = parent_element(arena, node);
            while let Some(ancestor) = cursor {
                if matches_from(arena, parts, idx - 1, ancestor) {
                    return true;
                }
                cursor = arena.get(ancestor).ok().and_then(|n| parent_element(arena, n));
            }
            false
        }
        Combinator::AdjacentSibling => arena
            .previous_element_sibling(node_id)
            .is_some_and(|sibling| matches_from(arena, parts, idx - 1, sibling)),
        Combinator::GeneralSibling => {
            let mut cursor = arena.previous_element_sibling(node_id);
            while let Some(sibling) = cursor {
                if matches_from(arena, parts, idx - 1, sibling) {
                    return true;
                }
                cursor = arena.previous_element_sibling(sibling);
            }
            false
        }
    }
}

fn parent_element(arena: &DomArena, node: &DomNode) -> Option<NodeId> {
    let parent_id = node.parent_id?;
    arena
        .get(parent_id)
        .ok()
        .filter(|p| p.is_element())
        .map(|p| p.node_id)
}

fn matches_compound(arena: &DomArena, compound: &Compound, node: &DomNode) -> bool {
    if !node.is_element() {
        return false;
    }

    if let Some(tag) = &compound.tag {
        if !node.node_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }

    if compound.ids.iter().any(|id| node.attr("id") != Some(id.as_str())) {
        return false;
    }

    if compound.classes.iter().any(|class| !node.has_class(class)) {
        return false;
    }

    if !compound.attrs.iter().all(|attr| matches_attr(attr, node)) {
        return false;
    }

    compound
        .pseudo_classes
        .iter()
        .all(|pseudo| matches_pseudo(arena, pseudo, node))
}

fn matches_attr(selector: &AttrSelector, node: &DomNode) -> bool {
    let Some(actual) = node.attr(&selector.name) else {
        return false;
    };

    let (actual, expected) = if selector.case_insensitive {
        (actual.to_ascii_lowercase(), selector.value.to_ascii_lowercase())
    } else {
        (actual.to_string(), selector.value.clone())
    };

    match selector.op {
        AttrOp::Exists => true,
        AttrOp::Equals => actual == expected,
        AttrOp::Includes => {
            !expected.is_empty() && actual.split_ascii_whitespace().any(|t| t == expected)
        }
        AttrOp::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttrOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttrOp::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}

const FORM_CONTROLS: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

fn matches_pseudo(arena: &DomArena, pseudo: &PseudoClass, node: &DomNode) -> bool {
    let siblings = || -> Vec<NodeId> {
        node.parent_id
            .and_then(|parent| arena.element_children(parent).ok())
            .unwrap_or_else(|| vec![node.node_id])
    };

    match pseudo {
        PseudoClass::FirstChild => siblings().first() == Some(&node.node_id),
        PseudoClass::LastChild => siblings().last() == Some(&node.node_id),
        PseudoClass::OnlyChild => {
            let siblings = siblings();
            siblings.len() == 1 && siblings[0] == node.node_id
        }
        PseudoClass::Empty => node.children_ids.iter().all(|&id| {
            arena
                .get(id)
                .map(|child| match child.node_type {
                    NodeType::Element => false,
                    NodeType::Text => child.node_value.is_empty(),
                    _ => true,
                })
                .unwrap_or(true)
        }),
        PseudoClass::Root => node
            .parent_id
            .and_then(|parent| arena.get(parent).ok())
            .is_some_and(|parent| parent.node_type == NodeType::Document),
        PseudoClass::Checked => match node.node_name.as_str() {
            "input" => node.has_attr("checked"),
            "option" => node.has_attr("selected"),
            _ => false,
        },
        PseudoClass::Disabled => {
            FORM_CONTROLS.contains(&node.node_name.as_str()) && node.has_attr("disabled")
        }
        PseudoClass::Enabled => {
            FORM_CONTROLS.contains(&node.node_name.as_str()) && !node.has_attr("disabled")
        }
        PseudoClass::NthChild { a, b } => {
            let Some(position) = siblings().iter().position(|&id| id == node.node_id) else {
                return false;
            };
            let index = position as i64 + 1;
            if *a == 0 {
                return index == *b;
            }
            // Out-of-range steps or offsets can't select any position
            let Some(diff) = index.checked_sub(*b) else {
                return false;
            };
            matches!(
                (diff.checked_rem(*a), diff.checked_div(*a)),
                (Some(0), Some(n)) if n >= 0
            )
        }
        PseudoClass::Not(list) => !list.matches(arena, node.node_id),
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> DomError {
        DomError::invalid_selector(self.source, format!("{} at offset {}", reason, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn parse_list(&mut self) -> Result<SelectorList> {
        let mut selectors = vec![self.parse_complex()?];
        while self.eat(',') {
            selectors.push(self.parse_complex()?);
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<Vec<SelectorPart>> {
        self.skip_whitespace();
        let mut parts = vec![SelectorPart {
            compound: self.parse_compound()?,
            combinator: None,
        }];

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::AdjacentSibling,
                Some('~') => Combinator::GeneralSibling,
                None | Some(',') | Some(')') => break,
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.error("unexpected character")),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            parts.push(SelectorPart {
                compound: self.parse_compound()?,
                combinator: Some(combinator),
            });
        }

        Ok(parts)
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let start = self.pos;

        if self.eat('*') {
            // Universal selector matches any element, nothing to record
        } else if self.peek().is_some_and(is_ident_start) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.ids.push(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudo_classes.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.error("expected selector"));
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                let escaped = self.peek().ok_or_else(|| self.error("dangling escape"))?;
                ident.push(escaped);
                self.pos += 1;
            } else if is_ident_char(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => AttrOp::Exists,
            Some('=') => AttrOp::Equals,
            Some(c) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return Err(self.error("unknown attribute operator")),
                };
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.error("expected '='"));
                }
                op
            }
            None => return Err(self.error("unterminated attribute selector")),
        };

        if op == AttrOp::Exists {
            self.pos += 1;
            return Ok(AttrSelector {
                name,
                op,
                value: String::new(),
                case_insensitive: false,
            });
        }

        // Skip the '='
        self.pos += 1;
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_quoted(quote)?,
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some(flag) = self.peek().filter(|c| matches!(c, 'i' | 'I' | 's' | 'S')) {
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.pos += 1;
            self.skip_whitespace();
        }

        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(AttrSelector {
            name,
            op,
            value,
            case_insensitive,
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    if let Some(c) = self.peek() {
                        value.push(c);
                        self.pos += 1;
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass> {
        let name = self.parse_ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "empty" => PseudoClass::Empty,
            "root" => PseudoClass::Root,
            "checked" => PseudoClass::Checked,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "nth-child" => {
                let argument = self.parse_parenthesized_raw()?;
                let (a, b) = parse_nth(&argument).ok_or_else(|| self.error("invalid nth-child argument"))?;
                PseudoClass::NthChild { a, b }
            }
            "not" => {
                if !self.eat('(') {
                    return Err(self.error("expected '('"));
                }
                let inner = self.parse_list()?;
                self.skip_whitespace();
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                PseudoClass::Not(inner)
            }
            _ => return Err(self.error("unsupported pseudo-class")),
        };
        Ok(pseudo)
    }

    fn parse_parenthesized_raw(&mut self) -> Result<String> {
        if !self.eat('(') {
            return Err(self.error("expected '('"));
        }
        let mut raw = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("expected ')'")),
                Some(')') => {
                    self.pos += 1;
                    return Ok(raw);
                }
                Some(c) => {
                    raw.push(c);
                    self.pos += 1;
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Parse the `an+b` micro-syntax
fn parse_nth(argument: &str) -> Option<(i64, i64)> {
    let compact: String = argument
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        "" => return None,
        _ => {}
    }

    let Some((a_part, b_part)) = compact.split_once('n') else {
        return compact.parse().ok().map(|b| (0, b));
    };

    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        other => other.parse().ok()?,
    };
    let b = match b_part {
        "" => 0,
        other => other.strip_prefix('+').unwrap_or(other).parse().ok()?,
    };
    Some((a, b))
}
