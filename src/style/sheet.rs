//! Class stylesheet and cascade resolution
//!
//! Styles live in an arena; selector keys map to arena slots. A dotted
//! selector `parent.child` also registers `child` as an alias of the same
//! slot, so writes through either key are seen through both.
//!
//! Lookups never touch the sheet. The "unknown class gets an empty style"
//! fallback is kept in a separate [`StyleResolver`] cache.

use std::collections::HashMap;

use chumsky::error::{Rich, RichPattern};
use thiserror::Error;

use super::css::{self, describe, CssToken, SkippedRule, Span};
use super::StyleAttributes;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StylesheetError {
    #[error("stylesheet syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl StylesheetError {
    pub fn span(&self) -> Span {
        match self {
            StylesheetError::Syntax { span, .. } => span.clone(),
        }
    }
}

impl<'a> From<Rich<'a, CssToken>> for StylesheetError {
    fn from(err: Rich<'a, CssToken>) -> Self {
        let message = match err.found() {
            Some(tok) => format!("unexpected {}", describe(tok)),
            None => "unexpected end of stylesheet".to_string(),
        };
        let expected = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(describe(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();
        StylesheetError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// How a key came to point at its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOrigin {
    /// The key was itself a selector
    Selector,
    /// Shorthand for a dotted selector; lower rank wins
    Alias(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    index: usize,
    origin: KeyOrigin,
}

/// Selector -> style mapping with shared dotted-selector aliases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    styles: Vec<StyleAttributes>,
    keys: HashMap<String, Slot>,
    skipped: Vec<SkippedRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sheet from several stylesheet texts, in order
    pub fn parse<S: AsRef<str>>(blocks: &[S]) -> Result<Self, StylesheetError> {
        let mut sheet = Self::new();
        for block in blocks {
            sheet.add_stylesheet(block.as_ref())?;
        }
        Ok(sheet)
    }

    /// Parse one stylesheet text and merge its rules into the sheet.
    ///
    /// Statements that are not plain rules are skipped and kept in
    /// [`skipped`](Self::skipped).
    pub fn add_stylesheet(&mut self, css: &str) -> Result<(), StylesheetError> {
        let parsed = css::parse_rules(css)?;
        for rule in &parsed.rules {
            let style = self.entry(&rule.selector);
            for (key, value) in &rule.declarations {
                style.set(key, value);
            }
        }
        for skipped in parsed.skipped {
            tracing::warn!(text = %skipped.text, "skipping unreadable stylesheet statement");
            self.skipped.push(skipped);
        }
        Ok(())
    }

    /// Statements dropped while reading stylesheet texts, in order
    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    /// Merge a style into the entry for `selector`, creating it if needed
    pub fn insert(&mut self, selector: &str, style: &StyleAttributes) {
        self.entry(selector).extend(style);
    }

    /// Existing entry for `selector`, or a new empty one registered under it
    fn entry(&mut self, selector: &str) -> &mut StyleAttributes {
        let existing = self.keys.get(selector).map(|slot| slot.index);
        let index = match existing {
            Some(index) => index,
            None => {
                let index = self.styles.len();
                self.styles.push(StyleAttributes::new());
                self.keys.insert(
                    selector.to_string(),
                    Slot {
                        index,
                        origin: KeyOrigin::Selector,
                    },
                );
                self.register_alias(selector, index);
                index
            }
        };
        &mut self.styles[index]
    }

    fn register_alias(&mut self, selector: &str, index: usize) {
        let Some((parent, child)) = selector.rsplit_once('.') else {
            return;
        };
        if child.is_empty() {
            return;
        }
        let rank = match parent {
            "" => 0,
            "*" => 1,
            _ => 2,
        };
        let replace = match self.keys.get(child) {
            None => true,
            Some(Slot {
                origin: KeyOrigin::Alias(existing),
                ..
            }) => rank < *existing,
            Some(Slot {
                origin: KeyOrigin::Selector,
                ..
            }) => false,
        };
        if replace {
            self.keys.insert(
                child.to_string(),
                Slot {
                    index,
                    origin: KeyOrigin::Alias(rank),
                },
            );
        }
    }

    fn lookup(&self, key: &str) -> Option<&StyleAttributes> {
        self.keys.get(key).map(|slot| &self.styles[slot.index])
    }

    /// Cascade lookup: exact key, then `*.class`, then `text.class`
    pub fn get(&self, class: &str) -> Option<&StyleAttributes> {
        self.lookup(class)
            .or_else(|| self.lookup(&format!("*.{}", class)))
            .or_else(|| self.lookup(&format!("text.{}", class)))
    }

    /// Mutable access through an exact key or alias
    pub fn get_mut(&mut self, key: &str) -> Option<&mut StyleAttributes> {
        let index = self.keys.get(key)?.index;
        Some(&mut self.styles[index])
    }

    /// Every registered key, aliases included
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(|k| k.as_str())
    }

    /// Number of distinct style entries
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Per-pass resolution cache over a read-only [`StyleSheet`].
///
/// A class with no entry resolves to an empty style, which is cached so
/// repeated misses are cheap.
#[derive(Debug)]
pub struct StyleResolver<'a> {
    sheet: &'a StyleSheet,
    cache: HashMap<String, StyleAttributes>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(sheet: &'a StyleSheet) -> Self {
        Self {
            sheet,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, class: &str) -> &StyleAttributes {
        let sheet = self.sheet;
        self.cache.entry(class.to_string()).or_insert_with(|| {
            sheet.get(class).cloned().unwrap_or_else(|| {
                tracing::trace!(class, "no style for class, using defaults");
                StyleAttributes::new()
            })
        })
    }

    /// Number of classes resolved so far
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn sheet(&self) -> &'a StyleSheet {
        self.sheet
    }
}
