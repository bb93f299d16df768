//! Flat stylesheet parser: `selector { prop: value; ... }` blocks
//!
//! Tokenised with logos, parsed with chumsky. Selectors and values are kept
//! as plain strings; multi-word values are re-joined with single spaces.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use logos::Logos;

use super::sheet::StylesheetError;

/// Byte range in the stylesheet text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum CssToken {
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip, priority = 3)]
    Comment,

    #[regex(r"[^ \t\n\r\f{}:;]+", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),
}

/// One `selector { ... }` block
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
    pub span: Span,
}

/// A statement that is not a plain rule, such as an at-rule or a block
/// with unreadable declarations. It is dropped as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRule {
    pub text: String,
    pub span: Span,
}

/// Result of reading one stylesheet text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRules {
    pub rules: Vec<Rule>,
    pub skipped: Vec<SkippedRule>,
}

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    Rule(Rule),
    Skipped(Span),
}

fn lex(input: &str) -> impl Iterator<Item = (CssToken, Span)> + '_ {
    CssToken::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

/// Parse every rule of a stylesheet text.
///
/// Statements that are not `selector { prop: value; ... }` are skipped and
/// reported in [`ParsedRules::skipped`]. Only text that cannot be split into
/// statements at all, such as an unclosed block, is an error.
pub fn parse_rules(input: &str) -> Result<ParsedRules, StylesheetError> {
    let len = input.len();
    let token_iter = lex(input).map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    let statements = rules_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(StylesheetError::from)
                .unwrap_or_else(|| StylesheetError::Syntax {
                    span: 0..len,
                    message: "invalid stylesheet".to_string(),
                    expected: Vec::new(),
                })
        })?;

    let mut parsed = ParsedRules::default();
    for statement in statements {
        match statement {
            Statement::Rule(rule) => parsed.rules.push(rule),
            Statement::Skipped(span) => parsed.skipped.push(SkippedRule {
                text: input.get(span.clone()).unwrap_or_default().trim().to_string(),
                span,
            }),
        }
    }
    Ok(parsed)
}

fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> Span {
    e.start()..e.end()
}

/// Re-join value pieces: words are separated by one space, colons attach
/// to their neighbours (`url(data:image/png)`).
fn join_value(pieces: Vec<String>) -> String {
    let mut value = String::new();
    let mut previous_colon = true;
    for piece in pieces {
        let colon = piece == ":";
        if !value.is_empty() && !colon && !previous_colon {
            value.push(' ');
        }
        value.push_str(&piece);
        previous_colon = colon;
    }
    value
}

fn rules_parser<'a, I>() -> impl Parser<'a, I, Vec<Statement>, extra::Err<Rich<'a, CssToken>>> + Clone
where
    I: ValueInput<'a, Token = CssToken, Span = SimpleSpan>,
{
    let word = select! {
        CssToken::Word(w) => w,
    };

    let selector = word
        .clone()
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|words| words.join(" "));

    let value = word
        .clone()
        .or(just(CssToken::Colon).to(":".to_string()))
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .map(join_value);

    let declaration = word
        .clone()
        .then_ignore(just(CssToken::Colon))
        .then(value);

    // Empty slots between semicolons are allowed: `{ ; a: b;; }`
    let body = declaration
        .or_not()
        .separated_by(just(CssToken::Semicolon))
        .collect::<Vec<_>>()
        .map(|slots| slots.into_iter().flatten().collect::<Vec<_>>())
        .delimited_by(just(CssToken::BraceOpen), just(CssToken::BraceClose));

    let rule = selector
        .then(body)
        .map_with(|(selector, declarations), e| Rule {
            selector,
            declarations,
            span: span_range(&e.span()),
        });

    // Anything else runs to the next `;`, over one `{ ... }` block, or to
    // the end of the text.
    let prelude = none_of([
        CssToken::Semicolon,
        CssToken::BraceOpen,
        CssToken::BraceClose,
    ])
    .repeated();
    let skipped_block = none_of([CssToken::BraceClose])
        .repeated()
        .delimited_by(just(CssToken::BraceOpen), just(CssToken::BraceClose));
    let unreadable = choice((
        prelude.clone().then(just(CssToken::Semicolon)).ignored(),
        prelude.clone().then(skipped_block).ignored(),
        prelude.at_least(1).then(end()).ignored(),
        just(CssToken::BraceClose).ignored(),
    ))
    .map_with(|_, e| span_range(&e.span()));

    rule.map(Statement::Rule)
        .or(unreadable.map(Statement::Skipped))
        .repeated()
        .collect::<Vec<_>>()
}

/// Human-readable token name for error messages
pub(crate) fn describe(tok: &CssToken) -> String {
    match tok {
        CssToken::BraceOpen => "'{'".to_string(),
        CssToken::BraceClose => "'}'".to_string(),
        CssToken::Colon => "':'".to_string(),
        CssToken::Semicolon => "';'".to_string(),
        CssToken::Comment => "comment".to_string(),
        CssToken::Word(w) => format!("'{}'", w),
    }
}
