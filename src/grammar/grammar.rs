use std::collections::{HashMap, HashSet};

use super::{END_MARK, EPSILON};

/// Symbol index of the reserved epsilon pseudo-symbol, fixed by `Grammar::new`.
pub const EPSILON_IDX: usize = 0;

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub first: HashSet<usize>,
    pub follow: HashSet<usize>,
    pub nullable: bool,
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            first: HashSet::new(),
            follow: HashSet::new(),
            nullable: false,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Symbol {
    NonTerminal(NonTerminal),
    Terminal(String),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

/// A production with its left-hand nonterminal, flattened out of the
/// per-nonterminal storage so reduce actions can refer to a stable index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub left: usize,
    pub rhs: Vec<usize>,
}

impl Production {
    /// Number of states a reduce pops: epsilon entries occupy no stack slot.
    pub fn rhs_len(&self) -> usize {
        self.rhs.iter().filter(|&&s| s != EPSILON_IDX).count()
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub symbols: Vec<Symbol>,
    pub symbol_table: HashMap<String, usize>,
    pub start_symbol: Option<usize>,
    pub augmented_start: Option<usize>,
    pub(super) sets_valid: bool,
}

impl Grammar {
    pub fn new() -> Self {
        let mut g = Self {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            start_symbol: None,
            augmented_start: None,
            sets_valid: false,
        };

        let e_idx = g.add_non_terminal(EPSILON);
        g.symbols[e_idx].mut_non_terminal().unwrap().nullable = true;
        g.symbol_table.insert("ϵ".to_string(), e_idx);

        g.add_terminal(END_MARK.to_string());

        g
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.symbols.iter().filter_map(|s| {
            if let Symbol::Terminal(name) = s {
                Some(name)
            } else {
                None
            }
        })
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal()).skip(1)
    }

    pub fn non_terminal_iter_mut(&mut self) -> impl Iterator<Item = &mut NonTerminal> {
        self.symbols
            .iter_mut()
            .filter_map(|s| s.mut_non_terminal())
            .skip(1)
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn end_mark_index(&self) -> usize {
        self.symbol_table[END_MARK]
    }

    pub fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    pub fn add_terminal(&mut self, name: String) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.clone()));
        self.symbol_table.insert(name, idx);
        idx
    }

    pub fn add_production(&mut self, left: usize, right: Vec<usize>) {
        self.sets_valid = false;
        self.symbols[left]
            .mut_non_terminal()
            .unwrap()
            .productions
            .push(right);
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
        }
    }

    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.symbol_table.contains_key(&name) {
            name.push('\'');
        }
        name
    }

    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        production.iter().map(|&i| self.get_symbol_name(i)).collect()
    }

    /// Adds the fresh start nonterminal `S' -> S`. Idempotent; every derived
    /// artifact (FOLLOW, LR(0) automaton, both tables) is built after this.
    pub fn augment(&mut self) -> Result<(), String> {
        if self.augmented_start.is_some() {
            return Ok(());
        }
        let start = self
            .start_symbol
            .ok_or_else(|| "start symbol is not set".to_string())?;
        let name = self.get_symbol_prime_name(self.get_symbol_name(start).to_string());
        let idx = self.add_non_terminal(&name);
        self.add_production(idx, vec![start]);
        self.augmented_start = Some(idx);
        Ok(())
    }

    /// All productions in symbol-declaration order, each at the global index
    /// used by LL(1) table entries and SLR reduce actions.
    pub fn production_list(&self) -> Vec<Production> {
        let mut list = Vec::new();
        for nt in self.non_terminal_iter() {
            for rhs in &nt.productions {
                list.push(Production {
                    left: nt.index,
                    rhs: rhs.clone(),
                });
            }
        }
        list
    }

    /// Maps a test string to terminal indices, one symbol per character.
    /// Whitespace is skipped; a character that is not a known terminal (or is
    /// the reserved end marker) makes the whole string untokenizable.
    pub fn tokenize(&self, input: &str) -> Option<Vec<usize>> {
        let mut out = Vec::new();
        for c in input.chars() {
            if c.is_whitespace() {
                continue;
            }
            let idx = self.get_symbol_index(&c.to_string())?;
            if !self.symbols[idx].is_terminal() || idx == self.end_mark_index() {
                return None;
            }
            out.push(idx);
        }
        Some(out)
    }
}
