//! Greedy line breaking over the token stream.
//!
//! The breaker walks the tokens with a rolling [`State`]. From each line
//! start it scans ahead on a cloned state, measuring widths and remembering
//! the last legal break point, then commits: state changes are replayed onto
//! the real state, discretionary breaks inside the line collapse to their
//! unbroken form, and the chosen break point is overwritten with a hard
//! [`Token::LineBreak`]. Breaking never fails; a segment with no legal break
//! point is left untouched and renders overlong.

use crate::fonts::Font;
use crate::text::token::{StateAction, Token};
use crate::text::{FontBook, FontStyle};

/// Column narrowing factor applied by [`StateAction::BeginColumn`].
pub(crate) const COLUMN_WIDTH_FACTOR: f64 = 0.48;

/// The typesetting state carried across tokens. Plain value; cloning one is
/// how the breaker looks ahead speculatively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    /// Current font slot.
    pub font: FontStyle,
    /// Font size in points.
    pub size: f64,
    /// Render text in small capitals.
    pub small_caps: bool,
    /// Apply ligature substitution.
    pub ligatures: bool,
    /// Baseline distance as a multiple of the font size.
    pub line_height: f64,
    /// Extra paragraph skip as a multiple of the line height.
    pub par_skip: f64,
    /// Maximum line width in points.
    pub max_width: f64,
    /// Current baseline position.
    pub y: f64,
    /// Baseline the current column started at.
    pub col_start: f64,
}

impl State {
    /// The default state: normal face at 12 pt, ligatures on, 1.4 leading,
    /// 1.8 paragraph skip.
    pub fn new(max_width: f64) -> State {
        State {
            font: FontStyle::Normal,
            size: 12.0,
            small_caps: false,
            ligatures: true,
            line_height: 1.4,
            par_skip: 1.8,
            max_width,
            y: 0.0,
            col_start: 0.0,
        }
    }
}

/// Apply a state-mutating token. Layout-neutral tokens pass through.
pub(crate) fn apply_token(state: &mut State, token: &Token) {
    match token {
        Token::SetFont { font, size } => {
            if let Some(font) = font {
                state.font = *font;
            }
            if let Some(size) = size {
                state.size = *size;
            }
        }
        Token::Action(StateAction::SmallCapsOn) => state.small_caps = true,
        Token::Action(StateAction::SmallCapsOff) => state.small_caps = false,
        Token::Action(StateAction::BeginColumn) => {
            state.col_start = state.y;
            state.max_width *= COLUMN_WIDTH_FACTOR;
        }
        _ => {}
    }
}

/// Shape a text run for the current state: cmap lookup, then ligatures and
/// small caps as enabled.
pub(crate) fn shape_run(font: &Font, state: &State, text: &str) -> Vec<u16> {
    let mut glyphs = font.glyphs(text);
    if state.ligatures {
        font.apply_ligatures(&mut glyphs);
    }
    if state.small_caps {
        font.apply_small_caps(&mut glyphs);
    }
    glyphs
}

/// Width of a shaped text run in points, advances plus kerning.
pub(crate) fn text_width(book: &FontBook, state: &State, text: &str) -> f64 {
    let Some(font) = book.face(state.font) else {
        return 0.0;
    };
    let glyphs = shape_run(font, state, text);
    let mut units: i64 = 0;
    for (i, &g) in glyphs.iter().enumerate() {
        units += font.scale(font.h_metric(g).advance as i32, 1000) as i64;
        if i > 0 {
            units += font.scale(font.kerning(glyphs[i - 1], g), 1000) as i64;
        }
    }
    units as f64 / 1000.0 * state.size
}

/// Width of a single space in the current state.
pub(crate) fn space_width(book: &FontBook, state: &State) -> f64 {
    let Some(font) = book.face(state.font) else {
        return 0.0;
    };
    let glyph = font.glyph_index(' ');
    font.scale(font.h_metric(glyph).advance as i32, 1000) as f64 / 1000.0 * state.size
}

/// Width a token contributes to its line. Discretionary breaks count their
/// unbroken form; state changes and breaks are zero-width.
pub(crate) fn token_width(book: &FontBook, state: &State, token: &Token) -> f64 {
    match token {
        Token::Text(text) => text_width(book, state, text),
        Token::Space { .. } => space_width(book, state),
        Token::CanBreak { no_break, .. } => no_break
            .as_deref()
            .map(|t| token_width(book, state, t))
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Break the token stream into lines no wider than the state's maximum,
/// mutating it in place.
///
/// Explicit breaks always end a line. A [`Token::CanBreak`] is a candidate
/// only while the line including its `before` material still fits; among
/// candidates the last one wins. When a segment overflows without any
/// candidate the breaker stops and leaves the remainder untouched.
pub fn break_lines(tokens: &mut Vec<Token>, state: &mut State, book: &FontBook) {
    let mut pos = 0;
    while pos < tokens.len() {
        let mut probe = *state;
        let mut width = 0.0;
        let mut candidate: Option<usize> = None;
        let mut hard: Option<usize> = None;

        let mut i = pos;
        while i < tokens.len() {
            match &tokens[i] {
                Token::LineBreak | Token::ParagraphBreak | Token::ColumnBreak => {
                    hard = Some(i);
                    break;
                }
                Token::CanBreak { before, no_break, .. } => {
                    let before_width = before
                        .as_deref()
                        .map(|t| token_width(book, &probe, t))
                        .unwrap_or(0.0);
                    if width + before_width <= probe.max_width {
                        candidate = Some(i);
                    }
                    width += no_break
                        .as_deref()
                        .map(|t| token_width(book, &probe, t))
                        .unwrap_or(0.0);
                }
                token => {
                    width += token_width(book, &probe, token);
                    apply_token(&mut probe, token);
                }
            }
            if width > probe.max_width {
                break;
            }
            i += 1;
        }

        if let Some(h) = hard {
            let h = commit_line(tokens, state, pos, h);
            pos = h + 1;
        } else if i >= tokens.len() {
            // Everything left fits on one line.
            break;
        } else if let Some(c) = candidate {
            let c = commit_line(tokens, state, pos, c);
            let before = match &mut tokens[c] {
                Token::CanBreak { before, .. } => before.take(),
                _ => None,
            };
            tokens[c] = Token::LineBreak;
            pos = match before {
                Some(b) => {
                    tokens.insert(c, *b);
                    c + 2
                }
                None => c + 1,
            };
        } else {
            // Overflow with no legal break point: graceful overflow.
            break;
        }
    }
}

/// Commit the line `[pos, stop)`: replay state changes onto `state` and
/// demote discretionary breaks to their unbroken form. Returns `stop`
/// adjusted for removed tokens.
fn commit_line(tokens: &mut Vec<Token>, state: &mut State, pos: usize, stop: usize) -> usize {
    let mut stop = stop;
    let mut i = pos;
    while i < stop {
        if matches!(tokens[i], Token::CanBreak { .. }) {
            let no_break = match &mut tokens[i] {
                Token::CanBreak { no_break, .. } => no_break.take(),
                _ => None,
            };
            match no_break {
                Some(t) => {
                    tokens[i] = *t;
                    i += 1;
                }
                None => {
                    tokens.remove(i);
                    stop -= 1;
                }
            }
        } else {
            apply_token(state, &tokens[i]);
            i += 1;
        }
    }
    stop
}
