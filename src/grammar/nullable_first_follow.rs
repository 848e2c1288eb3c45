use std::collections::HashSet;

use super::{
    grammar::{Symbol, EPSILON_IDX},
    Grammar,
};

impl Grammar {
    /// Runs the three fixed points in dependency order. FOLLOW of the
    /// (augmented, when present) start symbol is seeded with `$` first.
    pub fn calculate_nullable_first_follow(&mut self) {
        if let Some(start_idx) = self.augmented_start.or(self.start_symbol) {
            let end_mark = self.end_mark_index();
            self.symbols[start_idx]
                .mut_non_terminal()
                .unwrap()
                .follow
                .insert(end_mark);
            self.calculate_nullable();
            self.calculate_first();
            self.calculate_follow();
            self.sets_valid = true;
        }
    }

    pub fn ensure_nullable_first_follow(&mut self) {
        if !self.sets_valid {
            self.reset_nullable_first_follow();
            self.calculate_nullable_first_follow();
        }
    }

    pub fn reset_nullable_first_follow(&mut self) {
        for nt in self.non_terminal_iter_mut() {
            nt.nullable = false;
            nt.first = HashSet::new();
            nt.follow = HashSet::new();
        }
        self.sets_valid = false;
    }

    fn calculate_nullable(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..self.symbols.len() {
                let nullable: bool = match &self.symbols[i] {
                    Symbol::Terminal(_) => continue,
                    Symbol::NonTerminal(nt) => {
                        if nt.nullable {
                            continue;
                        }
                        nt.productions.iter().any(|production| {
                            production.iter().all(|s| match &self.symbols[*s] {
                                Symbol::Terminal(_) => false,
                                Symbol::NonTerminal(e) => e.nullable,
                            })
                        })
                    }
                };

                if nullable {
                    self.symbols[i].mut_non_terminal().unwrap().nullable = true;
                    changed = true;
                }
            }
        }
    }

    /// FIRST of a symbol sequence. Nullability of the whole sequence stands in
    /// for the epsilon member, so the returned set holds terminals only.
    pub fn calculate_first_for_production(&self, production: &[usize]) -> HashSet<usize> {
        let mut first: HashSet<usize> = HashSet::new();
        for (idx, symbol) in production.iter().map(|i| (*i, &self.symbols[*i])) {
            match symbol {
                Symbol::Terminal(_) => {
                    first.insert(idx);
                    break;
                }
                Symbol::NonTerminal(nt) => {
                    first.extend(nt.first.iter().cloned());
                    if !nt.nullable {
                        break;
                    }
                }
            }
        }
        first
    }

    /// Whether the sequence can derive the empty string.
    pub fn sequence_nullable(&self, production: &[usize]) -> bool {
        production.iter().all(|s| match &self.symbols[*s] {
            Symbol::Terminal(_) => false,
            Symbol::NonTerminal(nt) => nt.nullable,
        })
    }

    fn calculate_first(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..self.symbols.len() {
                let first: HashSet<usize> = match &self.symbols[i] {
                    Symbol::Terminal(_) => continue,
                    Symbol::NonTerminal(nt) => {
                        nt.productions
                            .iter()
                            .fold(HashSet::new(), |mut first, production| {
                                first.extend(
                                    self.calculate_first_for_production(production).into_iter(),
                                );
                                first
                            })
                    }
                };

                let nt = self.symbols[i].mut_non_terminal().unwrap();
                if nt.first.len() != first.len() {
                    changed = true;
                    nt.first = first;
                }
            }
        }
    }

    /// One pass collects every pending FOLLOW contribution into an owned
    /// list, then applies it; no set is extended while productions are still
    /// being scanned. Repeats until a full pass adds nothing.
    fn calculate_follow(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;

            let mut pending: Vec<(usize, HashSet<usize>)> = Vec::new();
            for left in self.non_terminal_iter() {
                for production in &left.productions {
                    // Scan right to left, carrying FIRST of the suffix after
                    // the current symbol and, while the suffix is nullable,
                    // FOLLOW of the production's left side.
                    let mut suffix_first: HashSet<usize> = HashSet::new();
                    let mut left_follow: Option<&HashSet<usize>> = Some(&left.follow);

                    for &idx in production.iter().rev() {
                        match &self.symbols[idx] {
                            Symbol::Terminal(_) => {
                                suffix_first.clear();
                                suffix_first.insert(idx);
                                left_follow = None;
                            }
                            Symbol::NonTerminal(nt) => {
                                if nt.index == EPSILON_IDX {
                                    continue;
                                }
                                let mut add = suffix_first.clone();
                                if let Some(follow) = left_follow {
                                    add.extend(follow.iter().cloned());
                                }
                                pending.push((nt.index, add));

                                if nt.nullable {
                                    suffix_first.extend(nt.first.iter().cloned());
                                } else {
                                    suffix_first = nt.first.clone();
                                    left_follow = None;
                                }
                            }
                        }
                    }
                }
            }

            for (idx, add) in pending {
                let nt = self.symbols[idx].mut_non_terminal().unwrap();
                for t in add {
                    if nt.follow.insert(t) {
                        changed = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Grammar;

    fn expression_grammar() -> Grammar {
        // E -> T A        A -> +TA | ε
        // T -> F B        B -> *FB | ε
        // F -> (E) | i
        let mut g = Grammar::parse(
            "E -> TA\nA -> +TA ε\nT -> FB\nB -> *FB ε\nF -> (E) i",
        )
        .unwrap();
        g.calculate_nullable_first_follow();
        g
    }

    fn names(g: &Grammar, set: &std::collections::HashSet<usize>) -> Vec<String> {
        let mut v: Vec<String> = set.iter().map(|&i| g.get_symbol_name(i).to_string()).collect();
        v.sort();
        v
    }

    #[test]
    fn nullable() {
        let g = expression_grammar();
        let nullable: Vec<(&str, bool)> = g
            .non_terminal_iter()
            .map(|nt| (nt.name.as_str(), nt.nullable))
            .collect();
        assert_eq!(
            nullable,
            vec![("E", false), ("A", true), ("T", false), ("B", true), ("F", false)]
        );
    }

    #[test]
    fn first() {
        let g = expression_grammar();
        let e = g.get_symbol_index("E").unwrap();
        let a = g.get_symbol_index("A").unwrap();
        let f = g.get_symbol_index("F").unwrap();
        assert_eq!(names(&g, &g.symbols[e].non_terminal().unwrap().first), ["(", "i"]);
        assert_eq!(names(&g, &g.symbols[a].non_terminal().unwrap().first), ["+"]);
        assert_eq!(names(&g, &g.symbols[f].non_terminal().unwrap().first), ["(", "i"]);
    }

    #[test]
    fn follow() {
        let g = expression_grammar();
        let e = g.get_symbol_index("E").unwrap();
        let a = g.get_symbol_index("A").unwrap();
        let t = g.get_symbol_index("T").unwrap();
        assert_eq!(names(&g, &g.symbols[e].non_terminal().unwrap().follow), ["$", ")"]);
        assert_eq!(names(&g, &g.symbols[a].non_terminal().unwrap().follow), ["$", ")"]);
        assert_eq!(
            names(&g, &g.symbols[t].non_terminal().unwrap().follow),
            ["$", ")", "+"]
        );
    }

    #[test]
    fn follow_through_nullable_gap() {
        // FOLLOW(B) must pick up FIRST(C) *and* FIRST(D), since C is nullable.
        let mut g = Grammar::parse("S -> BCd\nB -> b\nC -> c ε").unwrap();
        g.calculate_nullable_first_follow();
        let b = g.get_symbol_index("B").unwrap();
        assert_eq!(names(&g, &g.symbols[b].non_terminal().unwrap().follow), ["c", "d"]);
    }

    #[test]
    fn first_follow_grow_only() {
        let mut g = Grammar::parse("S -> Sa a").unwrap();
        g.calculate_nullable_first_follow();
        let s = g.get_symbol_index("S").unwrap();
        let first_once = g.symbols[s].non_terminal().unwrap().first.clone();
        g.reset_nullable_first_follow();
        g.calculate_nullable_first_follow();
        assert_eq!(g.symbols[s].non_terminal().unwrap().first, first_once);
    }
}
