//! Yacc rule-section reader.
//!
//! Turns `name: alt | alt ;` rules into BNF text. Semantic actions, comments
//! and `%prec` annotations are dropped; a `%%` line ends the rule section.
//! The closing `;` is optional: a rule also ends where the next `name:`
//! starts.

use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while, take_while1},
    character::complete::{char, multispace1, satisfy},
    combinator::{cut, map, not, opt, recognize, value},
    error::context,
    multi::{many0, many0_count, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
};
use tracing::debug;

use crate::error::GrammarError;
use crate::grammar::{Alternative, Grammar, Production, Symbol};
use crate::lex::{ParseResult, line_of, literal, run};

/// Read a yacc grammar file and render its rules as BNF text.
pub fn generate_bnf(path: &Path) -> Result<String, GrammarError> {
    let text = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    yacc_to_bnf(&text)
}

/// Render yacc rules as BNF text.
pub fn yacc_to_bnf(text: &str) -> Result<String, GrammarError> {
    let grammar = read_rules(text)?;
    debug!("Read {} yacc rules", grammar.productions().len());
    Ok(grammar.to_string())
}

fn read_rules(text: &str) -> Result<Grammar, GrammarError> {
    let section = rule_section(text);
    let (rest, productions) = run(section, preceded(trivia, many0(terminated(rule, trivia))))?;
    if !rest.is_empty() {
        return Err(GrammarError::syntax(
            line_of(section, rest),
            "expected rule name followed by ':'",
        ));
    }
    Ok(Grammar::new(productions))
}

/// Text up to the first line starting with `%%`.
fn rule_section(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with("%%") {
            return &text[..offset];
        }
        offset += line.len();
    }
    text
}

/// `name : alt | alt [;]`
fn rule(input: &str) -> ParseResult<'_, Production> {
    map(
        tuple((
            terminated(ident, preceded(trivia, char(':'))),
            separated_list1(preceded(trivia, char('|')), alternative),
            opt(preceded(trivia, char(';'))),
        )),
        |(name, alternatives, _)| Production {
            name: name.to_owned(),
            alternatives,
        },
    )(input)
}

fn alternative(input: &str) -> ParseResult<'_, Alternative> {
    many0(preceded(trivia, symbol))(input)
}

fn symbol(input: &str) -> ParseResult<'_, Symbol> {
    alt((
        map(literal, |lit| Symbol::Literal(lit.to_owned())),
        // a name followed by ':' starts the next rule
        map(terminated(ident, not(preceded(trivia, char(':')))), |name| {
            Symbol::Name(name.to_owned())
        }),
    ))(input)
}

fn ident(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_' || c == '.'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'),
    ))(input)
}

/// Whitespace, comments, action blocks and `%` directives between symbols.
fn trivia(input: &str) -> ParseResult<'_, ()> {
    value(
        (),
        many0_count(alt((
            value((), multispace1),
            block_comment,
            line_comment,
            action,
            directive,
        ))),
    )(input)
}

fn block_comment(input: &str) -> ParseResult<'_, ()> {
    value(
        (),
        preceded(
            tag("/*"),
            cut(context("unterminated comment", pair(take_until("*/"), tag("*/")))),
        ),
    )(input)
}

fn line_comment(input: &str) -> ParseResult<'_, ()> {
    value((), pair(tag("//"), opt(is_not("\n"))))(input)
}

/// `{ ... }` with nested braces; quoted text and comments may hold braces.
fn action(input: &str) -> ParseResult<'_, ()> {
    value(
        (),
        preceded(
            char('{'),
            cut(context(
                "unterminated action block",
                terminated(
                    many0_count(alt((
                        action,
                        value((), literal),
                        value((), delimited(char('`'), take_until("`"), char('`'))),
                        block_comment,
                        line_comment,
                        value((), is_not("{}'\"`/")),
                        value((), char('/')),
                    ))),
                    char('}'),
                ),
            )),
        ),
    )(input)
}

/// `%prec NAME` or any other `%name` marker.
fn directive(input: &str) -> ParseResult<'_, ()> {
    alt((
        value(
            (),
            tuple((
                tag("%prec"),
                multispace1,
                take_while1(|c: char| !c.is_whitespace() && !"|;{".contains(c)),
            )),
        ),
        value((), pair(char('%'), take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'))),
    ))(input)
}
