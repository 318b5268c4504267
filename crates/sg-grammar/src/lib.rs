//! Grammar handling for sqlgram.
//!
//! Provides the grammar operations the extraction pipeline builds on:
//! - [`generate_bnf`]: read a yacc rule section and render it as BNF text
//! - [`parse_grammar`]: read BNF text into a [`Grammar`]
//! - [`Grammar::inline`]: substitute productions into their references
//! - [`Grammar::extract_production`]: render one production, optionally with
//!   everything it references
//!
//! # Example
//!
//! ```
//! use sg_grammar::{ExtractOptions, parse_grammar, yacc_to_bnf};
//!
//! let bnf = yacc_to_bnf("Start: stmt ;\nstmt: SELECT opt_all ;\nopt_all: | ALL ;").unwrap();
//! let mut grammar = parse_grammar(&bnf).unwrap();
//! grammar.inline(&["opt_all"]).unwrap();
//!
//! let text = grammar.extract_production("stmt", ExtractOptions::default()).unwrap();
//! assert_eq!(text, "stmt ::=\n\tSELECT ( ALL )?\n");
//! ```

mod bnf;
mod error;
mod grammar;
mod lex;
mod yacc;

pub use bnf::parse_grammar;
pub use error::GrammarError;
pub use grammar::{Alternative, ExtractOptions, Grammar, Production, Symbol};
pub use yacc::{generate_bnf, yacc_to_bnf};
