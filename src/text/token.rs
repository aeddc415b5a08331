//! The token stream the typesetter works on.
//!
//! The surface lexer (an external collaborator) produces raw `Text`, `Space`
//! and `Macro` tokens. [`normalize_tokens`] rewrites that stream into
//! concrete layout tokens: macros become font/color/state changes or breaks,
//! whitespace becomes discretionary break points, and words are split at
//! hyphenation points supplied by a [`Hyphenator`].

use crate::graphics::Color;

/// The font slots a document can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
    Light,
}

/// A closed set of state mutations that tokens can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateAction {
    SmallCapsOn,
    SmallCapsOff,
    /// Remember the current baseline as the column top and narrow the
    /// column to 48% of the current width.
    BeginColumn,
}

/// One element of the input stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A run of printable characters without whitespace or backslashes.
    Text(String),
    /// A whitespace run; `raw` preserves the original characters so the
    /// newline count survives until normalization.
    Space { raw: String },
    /// A backslash command as produced by the lexer, before normalization.
    Macro(String),
    LineBreak,
    ParagraphBreak,
    ColumnBreak,
    /// A discretionary break point. Unbroken it renders (and measures) as
    /// `no_break`; when the line breaker chooses it, `before` is emitted and
    /// the token itself becomes a [`Token::LineBreak`]. `after` is reserved
    /// for break-side material on the following line.
    CanBreak {
        before: Option<Box<Token>>,
        no_break: Option<Box<Token>>,
        after: Option<Box<Token>>,
    },
    /// Switch font face and/or size.
    SetFont {
        font: Option<FontStyle>,
        size: Option<f64>,
    },
    SetTextColor(Color),
    Action(StateAction),
}

impl Token {
    /// A discretionary break that renders as `no_break` while unbroken.
    pub fn can_break(no_break: Token) -> Token {
        Token::CanBreak {
            before: None,
            no_break: Some(Box::new(no_break)),
            after: None,
        }
    }

    /// A hyphenation point: invisible while unbroken, a hyphen at a break.
    pub fn hyphen_point() -> Token {
        Token::CanBreak {
            before: Some(Box::new(Token::Text("-".to_string()))),
            no_break: None,
            after: None,
        }
    }
}

/// The hyphenation oracle. Implementations split a word into the parts
/// between its legal hyphenation points; a word without break points comes
/// back as a single part.
pub trait Hyphenator {
    fn hyphenate(&self, word: &str) -> Vec<String>;
}

/// A null oracle: no word is ever hyphenated.
pub struct NoHyphenation;

impl Hyphenator for NoHyphenation {
    fn hyphenate(&self, word: &str) -> Vec<String> {
        vec![word.to_string()]
    }
}

/// Rewrite lexer output into concrete layout tokens:
///
/// * macros become their tokens (unknown macros are dropped),
/// * a whitespace run with two or more newlines becomes a paragraph break,
///   any other whitespace a discretionary break around a space,
/// * each word is split at its hyphenation points, joined by discretionary
///   hyphens.
pub fn normalize_tokens(tokens: &mut Vec<Token>, hyphenator: &dyn Hyphenator) {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens.drain(..) {
        match token {
            Token::Macro(name) => {
                if let Some(t) = macro_token(&name) {
                    out.push(t);
                }
            }
            Token::Space { raw } => {
                if raw.matches('\n').count() >= 2 {
                    out.push(Token::ParagraphBreak);
                } else {
                    out.push(Token::can_break(Token::Space { raw }));
                }
            }
            Token::Text(text) => {
                let parts = hyphenator.hyphenate(&text);
                for (i, part) in parts.into_iter().enumerate() {
                    if i > 0 {
                        out.push(Token::hyphen_point());
                    }
                    out.push(Token::Text(part));
                }
            }
            other => out.push(other),
        }
    }
    *tokens = out;
}

/// The concrete token for a backslash macro, `None` for unknown names.
fn macro_token(name: &str) -> Option<Token> {
    let token = match name {
        "par" => Token::ParagraphBreak,
        "break" => Token::LineBreak,
        "bold" => set_font(FontStyle::Bold),
        "italic" => set_font(FontStyle::Italic),
        "normal" => set_font(FontStyle::Normal),
        "light" => set_font(FontStyle::Light),
        "Large" => set_size(24.0),
        "large" => set_size(14.0),
        "normalsize" => set_size(12.0),
        "blue" => Token::SetTextColor(Color::blue()),
        "black" => Token::SetTextColor(Color::black()),
        "smcpon" => Token::Action(StateAction::SmallCapsOn),
        "smcpoff" => Token::Action(StateAction::SmallCapsOff),
        "column" => Token::Action(StateAction::BeginColumn),
        "nextcolumn" => Token::ColumnBreak,
        _ => return None,
    };
    Some(token)
}

fn set_font(font: FontStyle) -> Token {
    Token::SetFont {
        font: Some(font),
        size: None,
    }
}

fn set_size(size: f64) -> Token {
    Token::SetFont {
        font: None,
        size: Some(size),
    }
}
