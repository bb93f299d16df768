//! Path-data (`d` attribute) parser
//!
//! Supports the moveto, lineto and cubic Bézier commands in absolute and
//! relative form. Parsing runs in three steps:
//!
//! 1. a logos lexer splits the string into command letters and argument
//!    fields (so compact forms such as `100L200,230` work),
//! 2. a small state machine ([`PathState`]) groups arguments into segments,
//!    including implicit repetition of the previous command,
//! 3. [`absolutize`] rewrites relative segments against a running cursor.

use logos::Logos;

use crate::error::{PathError, Span};
use crate::geometry::Point;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f,]+")]
pub enum PathToken {
    #[regex("[MmLlCc]", |lex| lex.slice().chars().next())]
    Command(char),

    #[regex("[zZ]")]
    Close,

    #[regex(r"[^ \t\n\r\f,MmLlCcZz]+", |lex| lex.slice().to_string())]
    Field(String),
}

/// Drawing command of a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathCommand {
    /// `M x y`
    MoveTo,
    /// `m dx dy`
    MoveToRel,
    /// `L x y`
    LineTo,
    /// `l dx dy`
    LineToRel,
    /// `C x1 y1 x2 y2 x y`
    CurveTo,
    /// `c dx1 dy1 dx2 dy2 dx dy`
    CurveToRel,
}

impl PathCommand {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'M' => Some(PathCommand::MoveTo),
            'm' => Some(PathCommand::MoveToRel),
            'L' => Some(PathCommand::LineTo),
            'l' => Some(PathCommand::LineToRel),
            'C' => Some(PathCommand::CurveTo),
            'c' => Some(PathCommand::CurveToRel),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PathCommand::MoveTo => 'M',
            PathCommand::MoveToRel => 'm',
            PathCommand::LineTo => 'L',
            PathCommand::LineToRel => 'l',
            PathCommand::CurveTo => 'C',
            PathCommand::CurveToRel => 'c',
        }
    }

    /// Number of numeric arguments the command consumes
    pub fn arity(self) -> usize {
        match self {
            PathCommand::CurveTo | PathCommand::CurveToRel => 6,
            _ => 2,
        }
    }

    pub fn is_relative(self) -> bool {
        matches!(
            self,
            PathCommand::MoveToRel | PathCommand::LineToRel | PathCommand::CurveToRel
        )
    }

    /// Command used when bare arguments follow a completed segment.
    ///
    /// Only the first pair after a moveto moves; the rest are linetos.
    pub fn repeated(self) -> Self {
        match self {
            PathCommand::MoveTo => PathCommand::LineTo,
            PathCommand::MoveToRel => PathCommand::LineToRel,
            other => other,
        }
    }

    fn absolute(self) -> Self {
        match self {
            PathCommand::MoveToRel => PathCommand::MoveTo,
            PathCommand::LineToRel => PathCommand::LineTo,
            PathCommand::CurveToRel => PathCommand::CurveTo,
            other => other,
        }
    }
}

/// One decoded path segment
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub command: PathCommand,
    /// Arguments in order; unused slots are zero
    pub args: [f64; 6],
    /// `class` attribute of the source path
    pub class: String,
    /// Shared by all segments of a path: true when the data ends in `z`/`Z`
    pub polygon: bool,
}

impl PathSegment {
    pub fn new(command: PathCommand, args: [f64; 6], class: impl Into<String>) -> Self {
        Self {
            command,
            args,
            class: class.into(),
            polygon: false,
        }
    }

    /// The point the segment ends on
    pub fn end_point(&self) -> (f64, f64) {
        match self.command {
            PathCommand::CurveTo | PathCommand::CurveToRel => (self.args[4], self.args[5]),
            _ => (self.args[0], self.args[1]),
        }
    }

    /// The coordinate pairs of the segment, in argument order
    pub fn points(&self) -> Vec<Point> {
        self.args[..self.command.arity()]
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect()
    }
}

/// A completed command with its arguments
pub type RawSegment = (PathCommand, [f64; 6]);

/// Parser state between two tokens
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathState {
    /// Nothing read yet; a command letter is required
    Start,
    /// A segment was just completed; a command letter or a repeat of
    /// `previous` may follow
    ExpectCommand { previous: PathCommand },
    /// Collecting the arguments of `command`
    ConsumingArgs {
        command: PathCommand,
        args: [f64; 6],
        filled: usize,
    },
}

impl PathState {
    /// Arguments still owed by the current segment
    pub fn remaining(&self) -> usize {
        match self {
            PathState::ConsumingArgs {
                command, filled, ..
            } => command.arity() - filled,
            _ => 0,
        }
    }

    /// Feed one token; returns the next state and a completed segment, if any
    pub fn step(
        self,
        token: &PathToken,
        span: Span,
    ) -> Result<(PathState, Option<RawSegment>), PathError> {
        match (self, token) {
            (state, PathToken::Close) => Ok((state, None)),

            (PathState::Start | PathState::ExpectCommand { .. }, PathToken::Command(letter)) => {
                let command =
                    PathCommand::from_letter(*letter).ok_or_else(|| PathError::UnsupportedCommand {
                        found: letter.to_string(),
                        span: span.clone(),
                    })?;
                Ok((
                    PathState::ConsumingArgs {
                        command,
                        args: [0.0; 6],
                        filled: 0,
                    },
                    None,
                ))
            }

            (PathState::Start, PathToken::Field(field)) => {
                if looks_numeric(field) {
                    Err(PathError::MissingCommand {
                        found: field.clone(),
                        span,
                    })
                } else {
                    Err(PathError::UnsupportedCommand {
                        found: field.clone(),
                        span,
                    })
                }
            }

            (PathState::ExpectCommand { previous }, PathToken::Field(field)) => {
                if !looks_numeric(field) {
                    return Err(PathError::UnsupportedCommand {
                        found: field.clone(),
                        span,
                    });
                }
                consume(previous.repeated(), [0.0; 6], 0, field, span)
            }

            (state @ PathState::ConsumingArgs { .. }, PathToken::Command(_)) => {
                Err(PathError::MissingArguments {
                    missing: state.remaining(),
                    span,
                })
            }

            (
                PathState::ConsumingArgs {
                    command,
                    args,
                    filled,
                },
                PathToken::Field(field),
            ) => consume(command, args, filled, field, span),
        }
    }

    /// Check the state at the end of the data
    pub fn finish(self, end: usize) -> Result<(), PathError> {
        match self.remaining() {
            0 => Ok(()),
            missing => Err(PathError::MissingArguments {
                missing,
                span: end..end,
            }),
        }
    }
}

fn consume(
    command: PathCommand,
    mut args: [f64; 6],
    filled: usize,
    field: &str,
    span: Span,
) -> Result<(PathState, Option<RawSegment>), PathError> {
    args[filled] = field.parse::<f64>().map_err(|_| PathError::InvalidNumber {
        found: field.to_string(),
        span,
    })?;
    let filled = filled + 1;
    if filled == command.arity() {
        Ok((PathState::ExpectCommand { previous: command }, Some((command, args))))
    } else {
        Ok((
            PathState::ConsumingArgs {
                command,
                args,
                filled,
            },
            None,
        ))
    }
}

fn looks_numeric(field: &str) -> bool {
    field
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

/// Lex path data into tokens with spans
pub fn lex(data: &str) -> impl Iterator<Item = Result<(PathToken, Span), PathError>> + '_ {
    PathToken::lexer(data)
        .spanned()
        .map(move |(tok, span)| match tok {
            Ok(tok) => Ok((tok, span)),
            Err(()) => Err(PathError::UnsupportedCommand {
                found: data[span.clone()].to_string(),
                span,
            }),
        })
}

/// Parse a `d` attribute into absolute segments tagged with `class`
pub fn parse_path(data: &str, class: &str) -> Result<Vec<PathSegment>, PathError> {
    let polygon = data.trim_end().ends_with(|c: char| c == 'z' || c == 'Z');

    let mut state = PathState::Start;
    let mut segments = Vec::new();
    for item in lex(data) {
        let (token, span) = item?;
        let (next, completed) = state.step(&token, span)?;
        state = next;
        if let Some((command, args)) = completed {
            segments.push(PathSegment {
                command,
                args,
                class: class.to_string(),
                polygon,
            });
        }
    }
    state.finish(data.len())?;

    absolutize(&mut segments);
    Ok(segments)
}

/// Rewrite relative segments as absolute ones.
///
/// The cursor starts at the origin. All three points of a relative curve are
/// offset by the same pre-segment cursor. A leading relative moveto is taken
/// as absolute. Running it on an already absolute path changes nothing.
pub fn absolutize(segments: &mut [PathSegment]) {
    let (mut x, mut y) = (0.0, 0.0);
    for (i, seg) in segments.iter_mut().enumerate() {
        if i == 0 && seg.command == PathCommand::MoveToRel {
            seg.command = PathCommand::MoveTo;
        }
        if seg.command.is_relative() {
            for pair in 0..seg.command.arity() / 2 {
                seg.args[pair * 2] += x;
                seg.args[pair * 2 + 1] += y;
            }
            seg.command = seg.command.absolute();
        }
        (x, y) = seg.end_point();
    }
}
