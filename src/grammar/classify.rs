use std::collections::HashSet;

use crate::Grammar;

use super::{
    grammar::{Symbol, EPSILON_IDX},
    ll1::Ll1Table,
    lr_dfa::{LRFSM, SLRParsingTable},
};

/// Outcome of a classification run. The tables are present only for the
/// classes that apply; a negative verdict is data, not an error.
#[derive(Debug)]
pub struct Classification {
    pub is_ll1: bool,
    pub is_slr1: bool,
    pub ll1: Option<Ll1Table>,
    pub slr: Option<SLRParsingTable>,
    pub fsm: LRFSM,
}

impl Grammar {
    /// Whether the start symbol can derive some terminal string. Callers are
    /// expected to check this before classifying; an unproductive start is
    /// reported as neither LL(1) nor SLR(1) without building anything.
    pub fn start_is_productive(&self) -> bool {
        let start = match self.start_symbol {
            Some(s) => s,
            None => return false,
        };

        let mut productive: HashSet<usize> = HashSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for nt in self.non_terminal_iter() {
                if productive.contains(&nt.index) {
                    continue;
                }
                let ok = nt.productions.iter().any(|production| {
                    production.iter().all(|s| match &self.symbols[*s] {
                        Symbol::Terminal(_) => true,
                        Symbol::NonTerminal(e) => {
                            e.index == EPSILON_IDX || productive.contains(&e.index)
                        }
                    })
                });
                if ok {
                    productive.insert(nt.index);
                    changed = true;
                }
            }
        }
        productive.contains(&start)
    }

    /// Runs the whole pipeline: augmentation, FIRST/FOLLOW, the LL(1) test
    /// and table, the LR(0) automaton and the SLR(1) table. Deterministic:
    /// classifying the same grammar twice yields identical verdicts and
    /// tables.
    pub fn classify(&mut self) -> Result<Classification, String> {
        self.augment()?;
        self.ensure_nullable_first_follow();

        let mut is_ll1 = self.is_ll1();
        let ll1 = if is_ll1 {
            let table = self.to_ll1_table()?;
            if table.had_collision {
                is_ll1 = false;
                None
            } else {
                Some(table)
            }
        } else {
            None
        };

        let fsm = self.to_lr_fsm()?;
        let slr = fsm.to_slr_table(self);
        let is_slr1 = !slr.has_conflict();

        Ok(Classification {
            is_ll1,
            is_slr1,
            ll1,
            slr: if is_slr1 { Some(slr) } else { None },
            fsm,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Grammar;

    #[test]
    fn unproductive_start() {
        let g = Grammar::parse("S -> Sa").unwrap();
        assert!(!g.start_is_productive());
    }

    #[test]
    fn productive_through_epsilon() {
        let g = Grammar::parse("S -> AS ε\nA -> a").unwrap();
        assert!(g.start_is_productive());
    }

    #[test]
    fn productive_chain() {
        let g = Grammar::parse("S -> AB\nA -> a\nB -> Bb").unwrap();
        assert!(!g.start_is_productive());
    }
}
