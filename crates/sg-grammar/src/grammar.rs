//! Production graph with inlining and extraction.

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::error::GrammarError;

/// One element of an alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// Reference to a production or a bare token name.
    Name(String),
    /// Quoted literal, stored with its quotes.
    Literal(String),
    /// Parenthesized choice; an empty alternative makes the group optional.
    Group(Vec<Alternative>),
}

/// Ordered sequence of symbols.
pub type Alternative = Vec<Symbol>;

/// A named rule and its alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

/// Options for [`Grammar::extract_production`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions<'a> {
    /// Also emit every production referenced from the output.
    pub descend: bool,
    /// Keep each production body on its header line.
    pub nosplit: bool,
    /// When non-empty, keep only top-level alternatives matching one of these.
    pub matches: &'a [Regex],
    /// Drop top-level alternatives matching any of these.
    pub exclude: &'a [Regex],
}

/// Ordered set of productions, addressable by name.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    productions: Vec<Production>,
    index: HashMap<String, usize>,
}

impl Grammar {
    /// Build a grammar, merging alternatives of repeated rule names.
    #[must_use]
    pub fn new(productions: Vec<Production>) -> Self {
        let mut grammar = Self::default();
        for production in productions {
            grammar.push(production);
        }
        grammar
    }

    fn push(&mut self, production: Production) {
        if let Some(&i) = self.index.get(&production.name) {
            self.productions[i]
                .alternatives
                .extend(production.alternatives);
        } else {
            self.index
                .insert(production.name.clone(), self.productions.len());
            self.productions.push(production);
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .productions
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
    }

    /// Look up a production by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Production> {
        self.index.get(name).map(|&i| &self.productions[i])
    }

    /// Productions in definition order.
    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Substitute each named production into every reference to it.
    ///
    /// Inlined productions are removed from the grammar. Names are processed
    /// in order, so a later name may already contain earlier expansions.
    pub fn inline<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), GrammarError> {
        for name in names {
            let name = name.as_ref();
            let i = *self
                .index
                .get(name)
                .ok_or_else(|| GrammarError::UnknownProduction(name.to_owned()))?;
            let removed = self.productions.remove(i);
            self.reindex();
            debug!("Inlining {name}");

            for production in &mut self.productions {
                for alt in &mut production.alternatives {
                    substitute(alt, name, &removed.alternatives);
                }
            }
        }
        Ok(())
    }

    /// Render the named production as EBNF text.
    ///
    /// Alternatives of the named production are filtered by `matches` and
    /// `exclude`. With `descend`, every production referenced from the output
    /// follows, breadth-first in order of first reference.
    pub fn extract_production(
        &self,
        name: &str,
        options: ExtractOptions<'_>,
    ) -> Result<String, GrammarError> {
        let top = self
            .get(name)
            .ok_or_else(|| GrammarError::UnknownProduction(name.to_owned()))?;

        let top_alts = filtered_top(top, options);
        let mut out = render_production(name, &top_alts, options.nosplit);
        if !options.descend {
            return Ok(out);
        }

        let mut queue: Vec<&Production> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([top.name.as_str()]);
        self.enqueue_references(&top_alts, &mut seen, &mut queue);

        let mut pos = 0;
        while pos < queue.len() {
            let production = queue[pos];
            out.push('\n');
            out.push_str(&render_production(
                &production.name,
                &production.alternatives,
                options.nosplit,
            ));
            self.enqueue_references(&production.alternatives, &mut seen, &mut queue);
            pos += 1;
        }

        Ok(out)
    }

    fn enqueue_references<'g>(
        &'g self,
        alts: &[Alternative],
        seen: &mut HashSet<&'g str>,
        queue: &mut Vec<&'g Production>,
    ) {
        for alt in alts {
            collect_names(alt, &mut |n| {
                if let Some(p) = self.get(n)
                    && seen.insert(p.name.as_str())
                {
                    queue.push(p);
                }
            });
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, production) in self.productions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&render_production(
                &production.name,
                &production.alternatives,
                false,
            ))?;
        }
        Ok(())
    }
}

fn filtered_top(top: &Production, options: ExtractOptions<'_>) -> Vec<Alternative> {
    top.alternatives
        .iter()
        .filter(|alt| keep_alternative(&render_alternative(alt), options.matches, options.exclude))
        .cloned()
        .collect()
}

fn keep_alternative(text: &str, matches: &[Regex], exclude: &[Regex]) -> bool {
    if !matches.is_empty() && !matches.iter().any(|re| re.is_match(text)) {
        return false;
    }
    !exclude.iter().any(|re| re.is_match(text))
}

/// Replace references to `name` inside `alt` (recursively) with a group.
fn substitute(alt: &mut Alternative, name: &str, expansion: &[Alternative]) {
    for symbol in alt.iter_mut() {
        if matches!(symbol, Symbol::Name(n) if n == name) {
            *symbol = Symbol::Group(expansion.to_vec());
        } else if let Symbol::Group(alts) = symbol {
            for inner in alts {
                substitute(inner, name, expansion);
            }
        }
    }
}

fn collect_names<'a>(alt: &'a [Symbol], visit: &mut impl FnMut(&'a str)) {
    for symbol in alt {
        match symbol {
            Symbol::Name(n) => visit(n),
            Symbol::Group(alts) => {
                for inner in alts {
                    collect_names(inner, visit);
                }
            }
            Symbol::Literal(_) => {}
        }
    }
}

fn render_symbol(symbol: &Symbol) -> String {
    match symbol {
        Symbol::Name(s) | Symbol::Literal(s) => s.clone(),
        Symbol::Group(alts) => {
            let optional = alts.iter().any(|a| render_alternative(a).is_empty());
            let parts: Vec<String> = alts
                .iter()
                .map(|a| render_alternative(a))
                .filter(|s| !s.is_empty())
                .collect();
            match (parts.as_slice(), optional) {
                ([], _) => String::new(),
                ([single], false) => single.clone(),
                (_, false) => format!("( {} )", parts.join(" | ")),
                (_, true) => format!("( {} )?", parts.join(" | ")),
            }
        }
    }
}

/// Render an alternative as space-separated symbols.
fn render_alternative(alt: &[Symbol]) -> String {
    alt.iter()
        .map(render_symbol)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a production in split (one alternative per line) or nosplit form.
fn render_production(name: &str, alts: &[Alternative], nosplit: bool) -> String {
    let alts: Vec<String> = alts.iter().map(|a| render_alternative(a)).collect();
    if nosplit {
        let mut line = format!("{name} ::=");
        for (i, alt) in alts.iter().enumerate() {
            if i > 0 {
                line.push_str(" |");
            }
            if !alt.is_empty() {
                line.push(' ');
                line.push_str(alt);
            }
        }
        line.push('\n');
        return line;
    }
    let mut out = format!("{name} ::=\n");
    for (i, alt) in alts.iter().enumerate() {
        let line = if i == 0 {
            format!("\t{alt}")
        } else {
            format!("\t| {alt}")
        };
        let line = line.trim_end();
        // an empty first alternative is implied by the leading `|`
        if !line.is_empty() {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
