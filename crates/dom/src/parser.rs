//! HTML fragment parser
//!
//! Tokenization is done by html5ever (character references, attribute quoting,
//! raw-text states). Tree construction is a small stack machine on top of the
//! arena that covers what fragments need: void elements, implied end tags for
//! the common auto-closing elements, stray end tags, and unclosed elements.
//! There is no implicit `<html>`/`<body>` and no table fostering.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::*;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tracing::trace;

/// Elements that close an open `<p>`
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "main", "menu", "nav", "ol", "p", "pre", "section", "summary", "table", "ul",
];

/// Parse `markup` into new, detached nodes and return the top-level ones in order.
pub fn parse_fragment(arena: &mut DomArena, markup: &str, max_depth: usize) -> Result<Vec<NodeId>> {
    let sink = FragmentSink {
        arena,
        roots: Vec::new(),
        open: Vec::new(),
        max_depth,
        error: None,
    };

    let mut tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(markup));
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    if let Some(err) = tokenizer.sink.error.take() {
        return Err(err);
    }
    Ok(std::mem::take(&mut tokenizer.sink.roots))
}

struct FragmentSink<'a> {
    arena: &'a mut DomArena,
    roots: Vec<NodeId>,
    /// Stack of open elements, innermost last
    open: Vec<NodeId>,
    max_depth: usize,
    /// First failure; later tokens are ignored once set
    error: Option<DomError>,
}

impl FragmentSink<'_> {
    fn handle(&mut self, token: Token) -> Result<TokenSinkResult<()>> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(tag),
                TagKind::EndTag => self.end_tag(&tag.name),
            },
            Token::CharacterTokens(text) => self.push_text(&text)?,
            Token::CommentToken(text) => {
                let id = self.arena.create_node(NodeType::Comment, "#comment");
                self.arena.get_mut(id)?.node_value = text.to_string();
                self.attach(id)?;
            }
            Token::ParseError(msg) => trace!("fragment parse error: {}", msg),
            Token::DoctypeToken(_) | Token::NullCharacterToken | Token::EOFToken => {}
        }
        Ok(TokenSinkResult::Continue)
    }

    fn start_tag(&mut self, tag: Tag) -> Result<TokenSinkResult<()>> {
        let name = tag.name.to_string();
        self.close_implied(&name)?;

        if self.open.len() >= self.max_depth {
            return Err(DomError::MaxDepthExceeded {
                current: self.open.len() + 1,
                max: self.max_depth,
            });
        }

        let id = self.arena.create_node(NodeType::Element, &name);
        {
            let node = self.arena.get_mut(id)?;
            for attr in &tag.attrs {
                let key = &*attr.name.local;
                // First occurrence wins, as in browsers
                if !node.has_attr(key) {
                    node.set_attr(key, &attr.value);
                }
            }
        }
        self.attach(id)?;

        if is_void_element(&name) || (tag.self_closing && self.in_foreign_content(&name)?) {
            return Ok(TokenSinkResult::Continue);
        }
        self.open.push(id);

        Ok(match name.as_str() {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" => TokenSinkResult::RawData(RawKind::Rawtext),
            "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
            _ => TokenSinkResult::Continue,
        })
    }

    fn end_tag(&mut self, name: &str) {
        let position = self.open.iter().rposition(|&id| {
            self.arena
                .get(id)
                .map(|n| n.node_name == name)
                .unwrap_or(false)
        });

        match position {
            Some(index) => self.open.truncate(index),
            None => trace!("ignoring stray end tag </{}>", name),
        }
    }

    fn close_implied(&mut self, incoming: &str) -> Result<()> {
        while let Some(&top) = self.open.last() {
            let open_name = self.arena.get(top)?.node_name.as_str();
            let closes = match open_name {
                "p" => CLOSES_P.contains(&incoming),
                "li" => incoming == "li",
                "dt" | "dd" => matches!(incoming, "dt" | "dd"),
                "option" => matches!(incoming, "option" | "optgroup"),
                "td" | "th" => matches!(incoming, "td" | "th" | "tr"),
                "tr" => incoming == "tr",
                _ => false,
            };
            if !closes {
                break;
            }
            self.open.pop();
        }
        Ok(())
    }

    fn in_foreign_content(&self, name: &str) -> Result<bool> {
        if matches!(name, "svg" | "math") {
            return Ok(true);
        }
        for &id in &self.open {
            if matches!(self.arena.get(id)?.node_name.as_str(), "svg" | "math") {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn push_text(&mut self, text: &str) -> Result<()> {
        let parent = self.open.last().copied();

        let mut text = text;
        if let Some(parent_id) = parent {
            let parent_node = self.arena.get(parent_id)?;
            // A newline right after <textarea>/<pre> is not content
            if matches!(parent_node.node_name.as_str(), "textarea" | "pre" | "listing")
                && parent_node.children_ids.is_empty()
            {
                text = text.strip_prefix('\n').unwrap_or(text);
            }
        }
        if text.is_empty() {
            return Ok(());
        }

        let last = match parent {
            Some(parent_id) => self.arena.get(parent_id)?.children_ids.last().copied(),
            None => self.roots.last().copied(),
        };
        if let Some(last_id) = last {
            let last_node = self.arena.get_mut(last_id)?;
            if last_node.is_text() {
                last_node.node_value.push_str(text);
                return Ok(());
            }
        }

        let id = self.arena.create_node(NodeType::Text, "#text");
        self.arena.get_mut(id)?.node_value = text.to_string();
        self.attach(id)
    }

    fn attach(&mut self, id: NodeId) -> Result<()> {
        match self.open.last() {
            Some(&parent_id) => self.arena.insert_child(parent_id, id, None),
            None => {
                self.roots.push(id);
                Ok(())
            }
        }
    }
}

impl TokenSink for FragmentSink<'_> {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        if self.error.is_some() {
            return TokenSinkResult::Continue;
        }
        match self.handle(token) {
            Ok(result) => result,
            Err(err) => {
                self.error = Some(err);
                TokenSinkResult::Continue
            }
        }
    }
}
