//! Module for parsing tokens into the value tree the evaluator walks
use std::{iter::Peekable, vec};

use im::{OrdMap, Vector};
use logos::Span;

use crate::types::{
    error::{Error, OryxResult},
    value::{Number, Position, Symbol, Value},
};

use super::lexer::{tokenize, LexError, Token};

/// Deepest nesting of `()`, `[]` and `{}` the reader accepts
pub const MAX_DEPTH: usize = 256;

/// Read every top-level form in `input` into an `Array`, in source order
pub fn read_str(input: &str) -> OryxResult<Value> {
    let mut parser = Parser::new(input);
    let mut forms = Vector::new();
    while let Some((token, span)) = parser.next_token()? {
        forms.push_back(parser.read_form(token, span, 0)?);
    }
    Ok(Value::Array(forms))
}

struct Parser<'src> {
    input: &'src str,
    tokens: Peekable<vec::IntoIter<(Result<Token<'src>, LexError>, Span)>>,
    /// Byte offset where each line begins
    line_starts: Vec<usize>,
}

impl<'src> Parser<'src> {
    fn new(input: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(input.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Parser {
            input,
            tokens: tokenize(input).into_iter().peekable(),
            line_starts,
        }
    }

    fn error(&self, message: impl Into<String>, span: &Span) -> Error {
        Error::syntax(message, self.input, span.start, span.len())
    }

    fn next_token(&mut self) -> OryxResult<Option<(Token<'src>, Span)>> {
        match self.tokens.next() {
            None => Ok(None),
            Some((Ok(token), span)) => Ok(Some((token, span))),
            Some((Err(_), span)) => {
                let text = &self.input[span.clone()];
                let message = if text.starts_with('"') {
                    "unterminated string".to_owned()
                } else {
                    format!("unexpected character `{text}`")
                };
                Err(self.error(message, &span))
            }
        }
    }

    fn position(&self, offset: usize) -> Position {
        let row = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[row - 1];
        Position {
            row,
            column: self.input[line_start..offset].chars().count() + 1,
            offset,
        }
    }

    fn read_form(&mut self, token: Token<'src>, span: Span, depth: usize) -> OryxResult<Value> {
        match token {
            Token::OpenParen | Token::OpenBracket | Token::OpenBrace if depth >= MAX_DEPTH => Err(
                self.error(format!("nested too deeply (max depth: {MAX_DEPTH})"), &span),
            ),
            Token::OpenParen => self
                .read_seq(Token::CloseParen, &span, depth)
                .map(Value::Expr),
            Token::OpenBracket => self
                .read_seq(Token::CloseBracket, &span, depth)
                .map(Value::Array),
            Token::OpenBrace => self.read_map(&span, depth),
            Token::CloseParen => Err(self.error("unexpected `)`", &span)),
            Token::CloseBracket => Err(self.error("unexpected `]`", &span)),
            Token::CloseBrace => Err(self.error("unexpected `}`", &span)),
            Token::Colon => Err(self.error("`:` only separates map keys from values", &span)),
            Token::Null => Ok(Value::Null),
            Token::True => Ok(Value::Boolean(true)),
            Token::False => Ok(Value::Boolean(false)),
            Token::StringTok(text) => self.unescape(text, &span).map(Value::String),
            Token::Number(text) => {
                let number = text
                    .parse::<Number>()
                    .map_err(|err| self.error(format!("invalid number: {err}"), &span))?;
                if i32::try_from(number.scale()).is_err() {
                    return Err(self.error("number exponent out of range", &span));
                }
                Ok(Value::Number(number))
            }
            Token::Symbol(name) => Ok(Value::Symbol(Symbol::at(name, self.position(span.start)))),
        }
    }

    fn read_seq(
        &mut self,
        close: Token<'src>,
        open: &Span,
        depth: usize,
    ) -> OryxResult<Vector<Value>> {
        let mut items = Vector::new();
        loop {
            match self.next_token()? {
                None => return Err(self.error("unclosed delimiter", open)),
                Some((token, _)) if token == close => return Ok(items),
                Some((token, span)) => items.push_back(self.read_form(token, span, depth + 1)?),
            }
        }
    }

    /// `{ "key" value .. }`, with an optional `:` after each key
    fn read_map(&mut self, open: &Span, depth: usize) -> OryxResult<Value> {
        let mut entries = OrdMap::new();
        loop {
            let key = match self.next_token()? {
                None => return Err(self.error("unclosed delimiter", open)),
                Some((Token::CloseBrace, _)) => return Ok(Value::Map(entries)),
                Some((Token::StringTok(text), span)) => self.unescape(text, &span)?,
                Some((_, span)) => return Err(self.error("map keys must be strings", &span)),
            };
            if matches!(self.tokens.peek(), Some((Ok(Token::Colon), _))) {
                self.tokens.next();
            }
            let item = match self.next_token()? {
                None => return Err(self.error("unclosed delimiter", open)),
                Some((Token::CloseBrace, span)) => {
                    return Err(self.error(format!("missing value for key {key:?}"), &span))
                }
                Some((token, span)) => self.read_form(token, span, depth + 1)?,
            };
            entries.insert(key, item);
        }
    }

    /// Strip the quotes and resolve escapes
    fn unescape(&self, quoted: &str, span: &Span) -> OryxResult<String> {
        let body = &quoted[1..quoted.len() - 1];
        let mut out = String::with_capacity(body.len());
        let mut chars = body.char_indices();
        while let Some((_, c)) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some((at, escaped)) = chars.next() else {
                break;
            };
            // the escape starts one byte before `at`, plus the opening quote
            let escape_span = span.start + at..span.start + at + 1 + escaped.len_utf8();
            match escaped {
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                '/' => out.push('/'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'u' => {
                    let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                    let code = u32::from_str_radix(&hex, 16)
                        .ok()
                        .filter(|_| hex.len() == 4)
                        .and_then(char::from_u32)
                        .ok_or_else(|| {
                            self.error(format!("invalid unicode escape `\\u{hex}`"), &escape_span)
                        })?;
                    out.push(code);
                }
                other => {
                    return Err(self.error(format!("unknown escape `\\{other}`"), &escape_span))
                }
            }
        }
        Ok(out)
    }
}
