//! BNF text reader.
//!
//! Reads the format produced by [`Grammar`]'s `Display` impl:
//!
//! ```text
//! select_stmt ::=
//!     SELECT ( DISTINCT )? target_list
//!     | SELECT '*'
//! ```
//!
//! A production starts at `name ::=`; its body runs until the next header and
//! may span lines freely.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{char, multispace0, space0},
    combinator::{cut, map, not, opt},
    error::context,
    multi::{many0, separated_list1},
    sequence::{pair, preceded, terminated, tuple},
};

use crate::error::GrammarError;
use crate::grammar::{Alternative, Grammar, Production, Symbol};
use crate::lex::{ParseResult, line_of, literal, run};

/// Parse BNF text into a grammar.
pub fn parse_grammar(text: &str) -> Result<Grammar, GrammarError> {
    let (rest, productions) = run(
        text,
        preceded(multispace0, many0(terminated(production, multispace0))),
    )?;
    if !rest.is_empty() {
        return Err(GrammarError::syntax(
            line_of(text, rest),
            "expected production header",
        ));
    }
    Ok(Grammar::new(productions))
}

fn production(input: &str) -> ParseResult<'_, Production> {
    map(pair(header, alternatives), |(name, alternatives)| Production {
        name: name.to_owned(),
        alternatives,
    })(input)
}

fn header(input: &str) -> ParseResult<'_, &str> {
    terminated(word, pair(space0, tag("::=")))(input)
}

fn alternatives(input: &str) -> ParseResult<'_, Vec<Alternative>> {
    separated_list1(preceded(multispace0, char('|')), alternative)(input)
}

fn alternative(input: &str) -> ParseResult<'_, Alternative> {
    many0(preceded(multispace0, symbol))(input)
}

fn symbol(input: &str) -> ParseResult<'_, Symbol> {
    alt((
        group,
        map(literal, |lit| Symbol::Literal(lit.to_owned())),
        // a word followed by `::=` starts the next production
        map(terminated(word, not(pair(space0, tag("::=")))), |w| {
            Symbol::Name(w.to_owned())
        }),
    ))(input)
}

/// `( alt | alt )` with an optional trailing `?`.
fn group(input: &str) -> ParseResult<'_, Symbol> {
    map(
        preceded(
            char('('),
            cut(context(
                "unclosed '('",
                tuple((
                    alternatives,
                    preceded(multispace0, char(')')),
                    opt(char('?')),
                )),
            )),
        ),
        |(mut alts, _, optional)| {
            if optional.is_some() && !alts.iter().any(Vec::is_empty) {
                alts.push(Vec::new());
            }
            Symbol::Group(alts)
        },
    )(input)
}

fn word(input: &str) -> ParseResult<'_, &str> {
    is_not(" \t\r\n|()?'\"")(input)
}
