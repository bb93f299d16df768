//! Any-position numeric scanners
//!
//! Attribute values such as `matrix(1,0,0,2,10,20)`, `4,2` or `-33%` carry
//! numbers embedded in arbitrary text. These lexers pick the numbers out and
//! skip everything else.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
enum Decimal {
    #[regex(r"-?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][-+]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum SignedInteger {
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum DigitRun {
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

/// Signed decimal literals (`-12`, `3.5`, `-.5`, `1e-3`) anywhere in the input
pub fn decimals(input: &str) -> impl Iterator<Item = f64> + '_ {
    Decimal::lexer(input).filter_map(|tok| match tok {
        Ok(Decimal::Number(n)) => Some(n),
        Err(_) => None,
    })
}

/// Signed integer literals anywhere in the input
pub fn integers(input: &str) -> impl Iterator<Item = f64> + '_ {
    SignedInteger::lexer(input).filter_map(|tok| match tok {
        Ok(SignedInteger::Number(n)) => Some(n),
        Err(_) => None,
    })
}

/// Unsigned runs of digits anywhere in the input
pub fn digit_runs(input: &str) -> impl Iterator<Item = f64> + '_ {
    DigitRun::lexer(input).filter_map(|tok| match tok {
        Ok(DigitRun::Number(n)) => Some(n),
        Err(_) => None,
    })
}
