//! Lexical pieces shared by the yacc and BNF readers.

use nom::{
    Finish, IResult,
    branch::alt,
    character::complete::{anychar, char, one_of, satisfy},
    combinator::{cut, peek, recognize},
    error::{VerboseError, VerboseErrorKind, context},
    multi::many0_count,
    sequence::{delimited, preceded},
};

use crate::error::GrammarError;

pub(crate) type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Quoted literal, returned with its quotes.
///
/// Both `'...'` and `"..."` are accepted; a backslash escapes the next
/// character, so `'\''` is a single literal. An opening quote without its
/// closing quote is a hard failure.
pub(crate) fn literal(input: &str) -> ParseResult<'_, &str> {
    preceded(
        peek(one_of("'\"")),
        cut(context("unterminated literal", alt((quoted('\''), quoted('"'))))),
    )(input)
}

fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> ParseResult<'a, &'a str> {
    recognize(delimited(
        char(quote),
        many0_count(alt((
            preceded(char('\\'), anychar),
            satisfy(move |c| c != '\\' && c != quote),
        ))),
        char(quote),
    ))
}

/// 1-based line of `rest` within `text`, where `rest` is a suffix of `text`.
pub(crate) fn line_of(text: &str, rest: &str) -> usize {
    let offset = text.len().saturating_sub(rest.len());
    text[..offset].matches('\n').count() + 1
}

/// Run `parser` over `text`, mapping nom errors to [`GrammarError::Syntax`].
///
/// The innermost context label becomes the message; without one the first
/// offending character is reported.
pub(crate) fn run<'a, T>(
    text: &'a str,
    mut parser: impl FnMut(&'a str) -> ParseResult<'a, T>,
) -> Result<(&'a str, T), GrammarError> {
    parser(text).finish().map_err(|err| syntax_error(text, &err))
}

fn syntax_error(text: &str, err: &VerboseError<&str>) -> GrammarError {
    let labelled = err.errors.iter().find_map(|(rest, kind)| match kind {
        VerboseErrorKind::Context(label) => Some((*rest, *label)),
        _ => None,
    });
    match labelled {
        Some((rest, label)) => GrammarError::syntax(line_of(text, rest), label),
        None => {
            let rest = err.errors.first().map_or("", |(rest, _)| *rest);
            unexpected(text, rest)
        }
    }
}

/// Error for input left over where a parser stopped.
fn unexpected(text: &str, rest: &str) -> GrammarError {
    let message = match rest.chars().next() {
        Some(c) => format!("unexpected {c:?}"),
        None => "unexpected end of input".to_owned(),
    };
    GrammarError::syntax(line_of(text, rest), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_with_escaped_quote() {
        let (rest, lit) = literal(r"'\'' IDENT").unwrap();
        assert_eq!(lit, r"'\''");
        assert_eq!(rest, " IDENT");
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(literal("'<=>' x").unwrap().1, "'<=>'");
        assert_eq!(literal(r#""a\"b" x"#).unwrap().1, r#""a\"b""#);
        assert_eq!(literal(r"'\\' x").unwrap().1, r"'\\'");
        assert_eq!(literal("'' x").unwrap().1, "''");
    }

    #[test]
    fn test_unterminated_literal_reports_its_line() {
        let text = "a\nb '\\'\n";
        let err = run(&text[4..], literal).unwrap_err();
        assert_eq!(err.to_string(), "syntax error on line 1: unterminated literal");
        assert_eq!(line_of(text, &text[4..]), 2);
    }

    #[test]
    fn test_non_literal_is_a_soft_error() {
        assert!(matches!(literal("abc"), Err(nom::Err::Error(_))));
    }
}
