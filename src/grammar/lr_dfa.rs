use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::Grammar;

use super::grammar::{Production, EPSILON_IDX};

/// An LR(0) item: a production (by global index) with a dot position. The dot
/// never rests on an epsilon entry; construction and advancement skip them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DotProduction {
    pub production: usize,
    pub position: usize,
}

fn skip_epsilon(rhs: &[usize], mut i: usize) -> usize {
    while i < rhs.len() && rhs[i] == EPSILON_IDX {
        i += 1;
    }
    i
}

impl DotProduction {
    pub fn new(production: usize, productions: &[Production]) -> Self {
        Self {
            production,
            position: skip_epsilon(&productions[production].rhs, 0),
        }
    }

    pub fn symbol_after_dot(&self, productions: &[Production]) -> Option<usize> {
        productions[self.production].rhs.get(self.position).copied()
    }

    pub fn generate_next(&self, productions: &[Production]) -> Self {
        Self {
            production: self.production,
            position: skip_epsilon(&productions[self.production].rhs, self.position + 1),
        }
    }
}

/// One automaton state: the kernel items it was discovered with, their
/// closure, and the outgoing transitions keyed by symbol index.
#[derive(Debug, PartialEq, Eq)]
pub struct LRState {
    pub kernel: BTreeSet<DotProduction>,
    pub extend: BTreeSet<DotProduction>,
    pub edges: BTreeMap<usize, usize>,
}

impl LRState {
    fn new(kernel: BTreeSet<DotProduction>) -> Self {
        Self {
            kernel,
            extend: BTreeSet::new(),
            edges: BTreeMap::new(),
        }
    }

    /// Closure: whenever the dot sits before a nonterminal, every production
    /// of that nonterminal joins the state. Worklist over nonterminals, so
    /// each one is expanded once.
    fn calculate_extend(&mut self, productions: &[Production], g: &Grammar) {
        let mut expanded: BTreeSet<usize> = BTreeSet::new();
        let mut q: VecDeque<usize> = VecDeque::new();

        let visit = |item: &DotProduction, expanded: &mut BTreeSet<usize>, q: &mut VecDeque<usize>| {
            if let Some(sym) = item.symbol_after_dot(productions) {
                if g.symbols[sym].non_terminal().is_some() && expanded.insert(sym) {
                    q.push_back(sym);
                }
            }
        };

        for item in &self.kernel {
            visit(item, &mut expanded, &mut q);
        }

        while let Some(nt_idx) = q.pop_front() {
            for (p_idx, _) in productions
                .iter()
                .enumerate()
                .filter(|(_, p)| p.left == nt_idx)
            {
                let item = DotProduction::new(p_idx, productions);
                visit(&item, &mut expanded, &mut q);
                self.extend.insert(item);
            }
        }
    }

    fn items(&self) -> impl Iterator<Item = &DotProduction> {
        self.kernel.iter().chain(self.extend.iter())
    }
}

/// The canonical LR(0) collection, plus the FOLLOW sets captured at build
/// time for the SLR(1) step.
#[derive(Debug)]
pub struct LRFSM {
    pub productions: Vec<Production>,
    pub states: Vec<LRState>,
    pub start: usize,
    pub augmented_start: usize,
    pub end_mark: usize,
    pub follow: HashMap<usize, Vec<usize>>,
}

impl Grammar {
    /// Builds the canonical LR(0) automaton. State 0 is the closure of
    /// `S' -> ·S`; discovery is a BFS that merges any freshly computed state
    /// equal (as an item set) to an existing one.
    pub fn to_lr_fsm(&mut self) -> Result<LRFSM, String> {
        self.augment()?;
        self.ensure_nullable_first_follow();

        let augmented_start = self.augmented_start.unwrap();
        let productions = self.production_list();
        let start_production = productions
            .iter()
            .position(|p| p.left == augmented_start)
            .unwrap();

        let mut start_state = LRState::new(BTreeSet::from([DotProduction::new(
            start_production,
            &productions,
        )]));
        start_state.calculate_extend(&productions, self);
        let mut states = vec![start_state];
        let mut q: VecDeque<usize> = VecDeque::new();
        q.push_back(0);

        while let Some(u) = q.pop_front() {
            let mut kernels: BTreeMap<usize, BTreeSet<DotProduction>> = BTreeMap::new();
            for item in states[u].items() {
                if let Some(sym) = item.symbol_after_dot(&productions) {
                    kernels
                        .entry(sym)
                        .or_default()
                        .insert(item.generate_next(&productions));
                }
            }

            for (sym, kernel) in kernels {
                let mut candidate = LRState::new(kernel);
                candidate.calculate_extend(&productions, self);

                let v = if let Some(existing) = states
                    .iter()
                    .position(|s| s.kernel == candidate.kernel && s.extend == candidate.extend)
                {
                    existing
                } else {
                    states.push(candidate);
                    q.push_back(states.len() - 1);
                    states.len() - 1
                };
                states[u].edges.insert(sym, v);
            }
        }

        let mut follow: HashMap<usize, Vec<usize>> = HashMap::new();
        for nt in self.non_terminal_iter() {
            let mut f: Vec<usize> = nt.follow.iter().cloned().collect();
            f.sort_unstable();
            follow.insert(nt.index, f);
        }

        Ok(LRFSM {
            productions,
            states,
            start: 0,
            augmented_start,
            end_mark: self.end_mark_index(),
            follow,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SLRAction {
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// SLR(1) table. Action cells keep every proposed action, so a cell with two
/// entries is a recorded conflict rather than a silent overwrite; such a
/// table classifies the grammar as not SLR(1) and is unusable for parsing.
#[derive(Debug)]
pub struct SLRParsingTable {
    pub action: Vec<HashMap<usize, Vec<SLRAction>>>,
    pub goto: Vec<HashMap<usize, usize>>,
    pub productions: Vec<Production>,
    pub end_mark: usize,
}

impl LRFSM {
    pub fn to_slr_table(&self, g: &Grammar) -> SLRParsingTable {
        let mut action: Vec<HashMap<usize, Vec<SLRAction>>> =
            vec![HashMap::new(); self.states.len()];
        let mut goto: Vec<HashMap<usize, usize>> = vec![HashMap::new(); self.states.len()];

        for (i, state) in self.states.iter().enumerate() {
            for (&sym, &j) in &state.edges {
                if g.symbols[sym].is_terminal() {
                    action[i].entry(sym).or_default().push(SLRAction::Shift(j));
                } else {
                    goto[i].insert(sym, j);
                }
            }

            for item in state.items() {
                if item.symbol_after_dot(&self.productions).is_none() {
                    let p = &self.productions[item.production];
                    if p.left == self.augmented_start {
                        action[i]
                            .entry(self.end_mark)
                            .or_default()
                            .push(SLRAction::Accept);
                    } else {
                        for &b in &self.follow[&p.left] {
                            action[i]
                                .entry(b)
                                .or_default()
                                .push(SLRAction::Reduce(item.production));
                        }
                    }
                }
            }
        }

        SLRParsingTable {
            action,
            goto,
            productions: self.productions.clone(),
            end_mark: self.end_mark,
        }
    }
}

impl SLRParsingTable {
    pub fn has_conflict(&self) -> bool {
        self.action
            .iter()
            .any(|row| row.values().any(|cell| cell.len() > 1))
    }

    /// Shift-reduce simulation over the state stack. A conflicted or missing
    /// cell rejects immediately.
    pub fn accepts(&self, g: &Grammar, input: &str) -> bool {
        let mut input_syms = match g.tokenize(input) {
            Some(tokens) => tokens,
            None => return false,
        };
        input_syms.push(self.end_mark);

        let mut stack: Vec<usize> = vec![0];
        let mut pos = 0;

        while let Some(&state) = stack.last() {
            let act = match self.action[state].get(&input_syms[pos]) {
                Some(cell) if cell.len() == 1 => &cell[0],
                _ => return false,
            };
            match act {
                SLRAction::Shift(j) => {
                    stack.push(*j);
                    pos += 1;
                }
                SLRAction::Reduce(p_idx) => {
                    let p = &self.productions[*p_idx];
                    for _ in 0..p.rhs_len() {
                        if stack.pop().is_none() {
                            return false;
                        }
                    }
                    let top = match stack.last() {
                        Some(&t) => t,
                        None => return false,
                    };
                    match self.goto[top].get(&p.left) {
                        Some(&j) => stack.push(j),
                        None => return false,
                    }
                }
                SLRAction::Accept => return true,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::Grammar;

    fn fsm_and_table(text: &str) -> (Grammar, super::LRFSM, super::SLRParsingTable) {
        let mut g = Grammar::parse(text).unwrap();
        let fsm = g.to_lr_fsm().unwrap();
        let table = fsm.to_slr_table(&g);
        (g, fsm, table)
    }

    #[test]
    fn left_recursive_automaton() {
        let (g, fsm, table) = fsm_and_table("S -> Sa a");
        // I0 {S'->.S, S->.Sa, S->.a}, I1 {S'->S., S->S.a}, I2 {S->a.},
        // I3 {S->Sa.}
        assert_eq!(fsm.states.len(), 4);
        assert_eq!(fsm.states[0].kernel.len(), 1);
        assert_eq!(fsm.states[0].extend.len(), 2);

        assert!(!table.has_conflict());
        assert!(table.accepts(&g, "a"));
        assert!(table.accepts(&g, "aaa"));
        assert!(!table.accepts(&g, ""));
        assert!(!table.accepts(&g, "b"));
    }

    #[test]
    fn merged_states_keep_automaton_finite() {
        let (_, fsm, _) = fsm_and_table("S -> Sa a");
        // Every edge must target an existing state; no duplicate item sets.
        for state in &fsm.states {
            for (_, &v) in &state.edges {
                assert!(v < fsm.states.len());
            }
        }
        for i in 0..fsm.states.len() {
            for j in (i + 1)..fsm.states.len() {
                assert!(
                    fsm.states[i].kernel != fsm.states[j].kernel
                        || fsm.states[i].extend != fsm.states[j].extend
                );
            }
        }
    }

    #[test]
    fn ambiguous_grammar_conflicts() {
        let (_, _, table) = fsm_and_table("S -> SS a");
        assert!(table.has_conflict());
    }

    #[test]
    fn reduce_reduce_conflict() {
        // LL(1) but not SLR(1): both epsilon reduces apply on a and b.
        let (_, _, table) = fsm_and_table("S -> AaAb BbBa\nA -> ε\nB -> ε");
        assert!(table.has_conflict());
    }

    #[test]
    fn epsilon_production_reduces_on_follow() {
        let (g, _, table) = fsm_and_table("S -> aSb ε");
        assert!(!table.has_conflict());
        assert!(table.accepts(&g, ""));
        assert!(table.accepts(&g, "ab"));
        assert!(table.accepts(&g, "aabb"));
        assert!(!table.accepts(&g, "abab"));
        assert!(!table.accepts(&g, "aab"));
    }

    #[test]
    fn expression_grammar_slr() {
        let (g, _, table) =
            fsm_and_table("E -> E+T T\nT -> T*F F\nF -> (E) i");
        assert!(!table.has_conflict());
        assert!(table.accepts(&g, "i+i*i"));
        assert!(table.accepts(&g, "(i+i)*i"));
        assert!(!table.accepts(&g, "i+"));
        assert!(!table.accepts(&g, ")i("));
    }
}
