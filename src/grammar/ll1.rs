use std::collections::{HashMap, HashSet};

use crate::Grammar;

use super::grammar::{Production, EPSILON_IDX};

/// Predictive parsing table: `(nonterminal, terminal-or-$) -> production`.
/// Entries refer into the owned production list by global index.
#[derive(Debug, Clone)]
pub struct Ll1Table {
    pub start: usize,
    pub end_mark: usize,
    pub entries: HashMap<(usize, usize), usize>,
    pub productions: Vec<Production>,
    /// Set if two productions ever competed for one cell. The pairwise
    /// conflict test should reject such grammars before the table is built;
    /// this flag catches any cell clash that slips past it, instead of
    /// letting the later production silently win.
    pub had_collision: bool,
}

impl Grammar {
    /// The pairwise LL(1) condition: for every nonterminal, the FIRST sets of
    /// any two alternatives are disjoint, and a nullable alternative's
    /// competitor must not predict anything in FOLLOW of the left side.
    pub fn is_ll1(&self) -> bool {
        for nt in self.non_terminal_iter() {
            let first: Vec<HashSet<usize>> = nt
                .productions
                .iter()
                .map(|p| self.calculate_first_for_production(p))
                .collect();
            let nullable: Vec<bool> = nt
                .productions
                .iter()
                .map(|p| self.sequence_nullable(p))
                .collect();

            for i in 0..nt.productions.len() {
                for j in (i + 1)..nt.productions.len() {
                    if !first[i].is_disjoint(&first[j]) {
                        return false;
                    }
                    if nullable[i] && nullable[j] {
                        return false;
                    }
                    if nullable[i] && !first[j].is_disjoint(&nt.follow) {
                        return false;
                    }
                    if nullable[j] && !first[i].is_disjoint(&nt.follow) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Builds the predictive table in declaration order. For `A -> α`: every
    /// terminal in FIRST(α) selects α; if α is nullable, so does every
    /// member of FOLLOW(A).
    pub fn to_ll1_table(&self) -> Result<Ll1Table, String> {
        let start = self
            .start_symbol
            .ok_or_else(|| "start symbol is not set".to_string())?;

        let productions = self.production_list();
        let mut entries: HashMap<(usize, usize), usize> = HashMap::new();
        let mut had_collision = false;

        for (p_idx, p) in productions.iter().enumerate() {
            if Some(p.left) == self.augmented_start {
                continue;
            }

            let mut selected: Vec<usize> =
                self.calculate_first_for_production(&p.rhs).into_iter().collect();
            if self.sequence_nullable(&p.rhs) {
                let follow = &self.symbols[p.left].non_terminal().unwrap().follow;
                selected.extend(follow.iter().cloned());
            }
            selected.sort_unstable();
            selected.dedup();

            for a in selected {
                if let Some(&previous) = entries.get(&(p.left, a)) {
                    if previous != p_idx {
                        had_collision = true;
                    }
                }
                entries.insert((p.left, a), p_idx);
            }
        }

        Ok(Ll1Table {
            start,
            end_mark: self.end_mark_index(),
            entries,
            productions,
            had_collision,
        })
    }
}

impl Ll1Table {
    /// Predictive stack simulation. The stack starts as `[$, start]`; a
    /// matching terminal consumes input, a nonterminal is replaced through
    /// the table, anything else rejects.
    pub fn accepts(&self, g: &Grammar, input: &str) -> bool {
        let mut input_syms = match g.tokenize(input) {
            Some(tokens) => tokens,
            None => return false,
        };
        input_syms.push(self.end_mark);

        let mut stack: Vec<usize> = vec![self.end_mark, self.start];
        let mut pos = 0;

        while let Some(&top) = stack.last() {
            let current = input_syms[pos];
            if top == current {
                stack.pop();
                pos += 1;
                if top == self.end_mark {
                    return true;
                }
                continue;
            }
            if g.symbols[top].is_terminal() {
                return false;
            }
            match self.entries.get(&(top, current)) {
                Some(&p_idx) => {
                    stack.pop();
                    for &s in self.productions[p_idx].rhs.iter().rev() {
                        if s != EPSILON_IDX {
                            stack.push(s);
                        }
                    }
                }
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::Grammar;

    fn prepared(text: &str) -> Grammar {
        let mut g = Grammar::parse(text).unwrap();
        g.augment().unwrap();
        g.calculate_nullable_first_follow();
        g
    }

    #[test]
    fn expression_grammar_is_ll1() {
        let g = prepared("E -> TA\nA -> +TA ε\nT -> FB\nB -> *FB ε\nF -> (E) i");
        assert!(g.is_ll1());

        let table = g.to_ll1_table().unwrap();
        assert!(!table.had_collision);
        assert!(table.accepts(&g, "i+i*i"));
        assert!(table.accepts(&g, "(i+i)*i"));
        assert!(table.accepts(&g, "i"));
        assert!(!table.accepts(&g, "i+"));
        assert!(!table.accepts(&g, "(i"));
        assert!(!table.accepts(&g, ""));
    }

    #[test]
    fn left_recursion_is_not_ll1() {
        let g = prepared("S -> Sa a");
        assert!(!g.is_ll1());
    }

    #[test]
    fn ambiguous_grammar_is_not_ll1() {
        let g = prepared("S -> SS a");
        assert!(!g.is_ll1());
    }

    #[test]
    fn nullable_alternative_against_follow() {
        // FOLLOW(A) contains a, so A -> a and A -> ε collide on lookahead a.
        let g = prepared("S -> Aa\nA -> a ε");
        assert!(!g.is_ll1());
    }

    #[test]
    fn epsilon_entries_use_follow() {
        let g = prepared("S -> aSb ε");
        assert!(g.is_ll1());
        let table = g.to_ll1_table().unwrap();
        assert!(table.accepts(&g, ""));
        assert!(table.accepts(&g, "aabb"));
        assert!(!table.accepts(&g, "abab"));
        assert!(!table.accepts(&g, "aab"));
    }
}
