use crate::Grammar;

use super::EPSILON;

impl Grammar {
    /// Builds a grammar from (nonterminal, alternatives) pairs, preserving
    /// declaration order. Alternatives are split one symbol per character;
    /// the grammar description language only has single-character names. An
    /// alternative equal to the epsilon token becomes the empty derivation.
    /// A right-hand-side character that never appears on a left side is a
    /// terminal, not an error.
    pub fn build(spec: &[(&str, Vec<&str>)]) -> Result<Self, String> {
        let mut g = Self::new();

        for (left, _) in spec {
            if left.chars().count() != 1 {
                return Err(format!(
                    "nonterminal \"{}\" is not a single character",
                    left
                ));
            }
            if g.get_symbol_index(left).is_none() {
                g.add_non_terminal(left);
            }
        }

        for (left, alternatives) in spec {
            let left_idx = g.get_symbol_index(left).unwrap();
            for alt in alternatives {
                if alt.is_empty() {
                    return Err(format!("empty alternative for \"{}\"", left));
                }
                let symbols: Vec<usize> = if *alt == EPSILON || *alt == "ϵ" {
                    vec![super::grammar::EPSILON_IDX]
                } else {
                    let mut symbols = Vec::new();
                    for c in alt.chars() {
                        if c == '$' {
                            return Err("\"$\" is reserved for the end marker".to_string());
                        }
                        let name = c.to_string();
                        let idx = match g.get_symbol_index(&name) {
                            Some(idx) => idx,
                            None => g.add_terminal(name),
                        };
                        symbols.push(idx);
                    }
                    symbols
                };
                g.add_production(left_idx, symbols);
            }
        }

        for nt in g.non_terminal_iter() {
            if nt.productions.is_empty() {
                return Err(format!("nonterminal \"{}\" has no alternatives", nt.name));
            }
        }

        let start_symbol: Option<usize> = if let Some(nt) = g.non_terminal_iter().next() {
            Some(g.symbol_table[&nt.name])
        } else {
            None
        };
        g.start_symbol = start_symbol;

        Ok(g)
    }

    /// Parses the textual grammar description: one `N -> alt1 alt2 ...` line
    /// per nonterminal, alternatives separated by whitespace or `|`. A line
    /// without `->` continues the previous left side. A leading line holding
    /// just a production count is accepted and skipped.
    pub fn parse(grammar: &str) -> Result<Self, String> {
        let mut spec: Vec<(&str, Vec<&str>)> = Vec::new();

        let mut lines = grammar.lines().enumerate().peekable();
        if let Some((_, first)) = lines.peek() {
            if first.trim().parse::<usize>().is_ok() {
                lines.next();
            }
        }

        for (i, line) in lines {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(format!("Line {}: too many \"->\"", i + 1));
            }
            let rights: &str = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(format!("Line {}: empty left side", i + 1));
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(format!("Line {}: left side contains whitespace", i + 1));
                }
                spec.push((left_str, Vec::new()));
                parts[1]
            } else {
                if spec.is_empty() {
                    return Err(format!("Line {}: cannot find left side", i + 1));
                }
                parts[0].trim().trim_start_matches('|')
            };

            let alternatives = rights
                .split(|c: char| c.is_whitespace() || c == '|')
                .filter(|s| !s.is_empty());

            // A line without `->` extends the most recent left side.
            if let Some(entry) = spec.last_mut() {
                entry.1.extend(alternatives);
            }
        }

        Self::build(&spec)
    }
}
