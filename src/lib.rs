extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

mod grammar;
pub use grammar::{Classification, Grammar};

use grammar::pretty_print::ClassificationOutput;

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    let g = crate::Grammar::parse(grammar);
    match g {
        Ok(mut g) => {
            g.calculate_nullable_first_follow();
            g.to_non_terminal_output_vec().to_json()
        }
        Err(e) => format!("{{\"error\":\"{}\"}}", e),
    }
}

#[wasm_bindgen]
pub fn classify_to_json(grammar: &str) -> String {
    let g = crate::Grammar::parse(grammar);
    match g {
        Ok(mut g) => {
            if !g.start_is_productive() {
                let neither = ClassificationOutput {
                    is_ll1: false,
                    is_slr1: false,
                    ll1_table: None,
                    slr_table: None,
                };
                return serde_json::to_string(&neither).unwrap();
            }
            match g.classify() {
                Ok(c) => serde_json::to_string(&c.to_output(&g)).unwrap(),
                Err(e) => format!("{{\"error\":\"{}\"}}", e),
            }
        }
        Err(e) => format!("{{\"error\":\"{}\"}}", e),
    }
}

#[cfg(test)]
mod parse_tests {
    use crate::grammar::EPSILON;

    #[test]
    fn simple_parse() {
        let g = crate::Grammar::parse("S -> a").unwrap();

        let s = g.symbol_table.get("S").unwrap().clone();
        let a = g.symbol_table.get("a").unwrap().clone();
        let epsilon = g.symbol_table.get(EPSILON).unwrap().clone();

        assert_eq!(g.get_symbol_name(s), "S");
        assert_eq!(g.get_symbol_name(a), "a");

        assert_eq!(g.symbols[epsilon].non_terminal().unwrap().nullable, true);

        assert_eq!(g.symbols[s].non_terminal().unwrap().productions[0], vec![a]);
    }

    #[test]
    fn alternatives_split_per_character() {
        let g = crate::Grammar::parse("S -> AB aC\nA -> a\nB -> b\nC -> c").unwrap();

        let s = g.symbol_table["S"];
        let a_nt = g.symbol_table["A"];
        let b_nt = g.symbol_table["B"];
        let c_nt = g.symbol_table["C"];
        let a = g.symbol_table["a"];

        assert_eq!(
            g.symbols[s].non_terminal().unwrap().productions,
            vec![vec![a_nt, b_nt], vec![a, c_nt]]
        );
        assert!(g.symbols[a].is_terminal());
    }

    #[test]
    fn undeclared_symbol_is_a_terminal() {
        let g = crate::Grammar::parse("S -> xS y").unwrap();
        let x = g.symbol_table["x"];
        let y = g.symbol_table["y"];
        assert!(g.symbols[x].is_terminal());
        assert!(g.symbols[y].is_terminal());
    }

    #[test]
    fn leading_count_line_is_skipped() {
        let g = crate::Grammar::parse("3\nS -> AB\nA -> a\nB -> b").unwrap();
        assert_eq!(g.get_symbol_name(g.start_symbol.unwrap()), "S");
    }

    #[test]
    fn pipe_separated_alternatives() {
        let g = crate::Grammar::parse("S -> a | b").unwrap();
        let s = g.symbol_table["S"];
        assert_eq!(g.symbols[s].non_terminal().unwrap().productions.len(), 2);
    }

    #[test]
    fn continuation_line() {
        let g = crate::Grammar::parse("S -> a \n | bc").unwrap();
        let s = g.symbol_table["S"];
        assert_eq!(g.symbols[s].non_terminal().unwrap().productions.len(), 2);
    }

    #[test]
    fn empty_parse() {
        let _g = crate::Grammar::parse("  \n  ").unwrap();
    }

    #[test]
    #[should_panic]
    fn two_rightarrows_parse() {
        let _g = crate::Grammar::parse("S -> a -> b").unwrap();
    }

    #[test]
    #[should_panic]
    fn no_left_parse() {
        let _g = crate::Grammar::parse("-> a -> b").unwrap();
    }

    #[test]
    #[should_panic]
    fn no_previous_left_parse() {
        let _g = crate::Grammar::parse("| a b\n S -> a").unwrap();
    }

    #[test]
    #[should_panic]
    fn left_contain_space() {
        let _g = crate::Grammar::parse("S a S -> x").unwrap();
    }

    #[test]
    #[should_panic]
    fn multi_character_left() {
        let _g = crate::Grammar::parse("St -> a").unwrap();
    }
}

#[cfg(test)]
mod classify_tests {
    use crate::Grammar;

    fn classified(text: &str) -> (Grammar, crate::Classification) {
        let mut g = Grammar::parse(text).unwrap();
        assert!(g.start_is_productive());
        let c = g.classify().unwrap();
        (g, c)
    }

    #[test]
    fn both_classes() {
        let (g, c) = classified("S -> AB\nA -> a\nB -> b");
        assert!(c.is_ll1);
        assert!(c.is_slr1);

        let ll1 = c.ll1.as_ref().unwrap();
        let slr = c.slr.as_ref().unwrap();
        assert!(ll1.accepts(&g, "ab"));
        assert!(slr.accepts(&g, "ab"));
        assert!(!ll1.accepts(&g, "ba"));
        assert!(!slr.accepts(&g, "ba"));
    }

    #[test]
    fn left_recursive_is_slr_only() {
        let (g, c) = classified("S -> Sa a");
        assert!(!c.is_ll1);
        assert!(c.is_slr1);
        assert!(c.ll1.is_none());
        assert!(c.slr.as_ref().unwrap().accepts(&g, "aaa"));
    }

    #[test]
    fn ambiguous_is_neither() {
        let (_, c) = classified("S -> SS a");
        assert!(!c.is_ll1);
        assert!(!c.is_slr1);
        assert!(c.ll1.is_none());
        assert!(c.slr.is_none());
    }

    #[test]
    fn ll1_but_not_slr1() {
        let (g, c) = classified("S -> AaAb BbBa\nA -> ε\nB -> ε");
        assert!(c.is_ll1);
        assert!(!c.is_slr1);
        let ll1 = c.ll1.as_ref().unwrap();
        assert!(ll1.accepts(&g, "ab"));
        assert!(ll1.accepts(&g, "ba"));
        assert!(!ll1.accepts(&g, "aa"));
    }

    #[test]
    fn simulators_agree_when_both_apply() {
        let (g, c) = classified("E -> TA\nA -> +TA ε\nT -> FB\nB -> *FB ε\nF -> (E) i");
        assert!(c.is_ll1);
        assert!(c.is_slr1);
        let ll1 = c.ll1.as_ref().unwrap();
        let slr = c.slr.as_ref().unwrap();
        for input in ["i", "i+i", "i*i+i", "(i+i)*i", "", "i+", "*i", "(i", "ii"] {
            assert_eq!(ll1.accepts(&g, input), slr.accepts(&g, input), "on {:?}", input);
        }
    }

    #[test]
    fn classify_is_idempotent() {
        let mut g = Grammar::parse("E -> TA\nA -> +TA ε\nT -> FB\nB -> *FB ε\nF -> (E) i").unwrap();
        let first = g.classify().unwrap();
        let second = g.classify().unwrap();
        assert_eq!(first.is_ll1, second.is_ll1);
        assert_eq!(first.is_slr1, second.is_slr1);
        assert_eq!(
            serde_json::to_string(&first.to_output(&g)).unwrap(),
            serde_json::to_string(&second.to_output(&g)).unwrap()
        );
        assert_eq!(first.fsm.states.len(), second.fsm.states.len());
    }

    #[test]
    fn unproductive_start_reports_neither() {
        let out = crate::classify_to_json("S -> Sa");
        assert!(out.contains("\"is_ll1\":false"));
        assert!(out.contains("\"is_slr1\":false"));
    }

    #[test]
    fn classify_to_json_reports_both() {
        let out = crate::classify_to_json("S -> AB\nA -> a\nB -> b");
        assert!(out.contains("\"is_ll1\":true"));
        assert!(out.contains("\"is_slr1\":true"));
    }

    #[test]
    fn malformed_grammar_is_rejected_whole() {
        let out = crate::classify_to_json("S -> a -> b");
        assert!(out.contains("error"));
    }
}
