//! This file contains all items related to the lexical phase of the program.
//! It takes the source text and converts it into a linear structure of spanned tokens.

use logos::{Logos, Span};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    #[default]
    InvalidCharacter,
}

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(error = LexError)]
// commas are whitespace; comments run from `;` to the end of the line
#[logos(skip r"([ \t\r\n\f,]+|;[^\n]*)")]
pub enum Token<'t> {
    #[token("(")]
    /// Open Parenthesis (
    OpenParen,
    #[token(")")]
    /// Close Parenthesis )
    CloseParen,
    #[token("[")]
    /// Open Bracket [
    OpenBracket,
    #[token("]")]
    /// Close Bracket ]
    CloseBracket,
    #[token("{")]
    /// Open Brace {
    OpenBrace,
    #[token("}")]
    /// Close Brace }
    CloseBrace,
    #[token(":")]
    /// Optional separator between a map key and its value
    Colon,

    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    /// String: Open Quote ... escaped contents ... Close Quote
    StringTok(&'t str),

    #[regex(r"[+-]?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice(), priority = 10)]
    /// Decimal number, optionally signed and with an exponent
    Number(&'t str),

    // a leading `:` is the map separator, so `"a":1` is not read as `"a" :1`
    #[regex(r#"[^\s\[\]{}()"',;:][^\s\[\]{}()"',;]*|:="#, |lex| lex.slice())]
    /// Symbol: anything else up to a delimiter
    Symbol(&'t str),
}

/// Take a source string and produce its tokens with their byte spans
pub fn tokenize(input: &str) -> Vec<(Result<Token<'_>, LexError>, Span)> {
    Token::lexer(input).spanned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .into_iter()
            .map(|(tok, _)| tok.expect("valid token"))
            .collect()
    }

    #[test_case("(+ 1 2)", vec![Token::OpenParen, Token::Symbol("+"), Token::Number("1"), Token::Number("2"), Token::CloseParen] ; "call")]
    #[test_case("-1.5 - -x", vec![Token::Number("-1.5"), Token::Symbol("-"), Token::Symbol("-x")] ; "signs")]
    #[test_case("null nullable true", vec![Token::Null, Token::Symbol("nullable"), Token::True] ; "keywords need delimiters")]
    #[test_case("def! := lt?", vec![Token::Symbol("def!"), Token::Symbol(":="), Token::Symbol("lt?")] ; "punctuated symbols")]
    #[test_case(r#"{"a": 1, "b" 2}"#, vec![Token::OpenBrace, Token::StringTok(r#""a""#), Token::Colon, Token::Number("1"), Token::StringTok(r#""b""#), Token::Number("2"), Token::CloseBrace] ; "map")]
    #[test_case(r#"{"a":1}"#, vec![Token::OpenBrace, Token::StringTok(r#""a""#), Token::Colon, Token::Number("1"), Token::CloseBrace] ; "separator hugs its value")]
    #[test_case("a:b", vec![Token::Symbol("a:b")] ; "colon inside a symbol")]
    #[test_case("1 ; the rest\n2", vec![Token::Number("1"), Token::Number("2")] ; "comment")]
    #[test_case(r#""say \"hi\"""#, vec![Token::StringTok(r#""say \"hi\"""#)] ; "escaped quote")]
    fn lexes(input: &str, expected: Vec<Token>) {
        assert_eq!(tokens(input), expected);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let spans: Vec<Span> = tokenize("(ab 1)").into_iter().map(|(_, span)| span).collect();
        assert_eq!(spans, vec![0..1, 1..3, 4..5, 5..6]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize(r#""open"#).iter().any(|(tok, _)| tok.is_err()));
    }
}
