use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    classify::Classification,
    grammar::EPSILON_IDX,
    ll1::Ll1Table,
    lr_dfa::{DotProduction, LRState, SLRAction, SLRParsingTable, LRFSM},
    Grammar, EPSILON,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(""))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| escape::tex(*s))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        let output = left + &right;
        output.replace(EPSILON, "\\epsilon")
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.len())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let mut productions = Vec::new();
        for non_terminal in self.non_terminal_iter() {
            let mut rights = Vec::new();
            for production in &non_terminal.productions {
                rights.push(self.production_to_vec_str(production));
            }
            productions.push(ProductionOutput {
                left: non_terminal.name.as_str(),
                rights,
            });
        }
        ProductionOutputVec { productions }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &Vec<&str>) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let mut data = Vec::new();
        for non_terminal in self.non_terminal_iter() {
            let mut t = NonTerminalOutput {
                name: non_terminal.name.as_str(),
                nullable: non_terminal.nullable,
                first: non_terminal
                    .first
                    .iter()
                    .map(|idx| self.get_symbol_name(*idx))
                    .collect(),
                follow: non_terminal
                    .follow
                    .iter()
                    .map(|idx| self.get_symbol_name(*idx))
                    .collect(),
            };
            t.first.sort();
            t.follow.sort();

            if non_terminal.nullable {
                t.first.push(EPSILON);
            }
            data.push(t);
        }
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1TableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
}

impl Ll1Table {
    pub fn to_output<'a>(&'a self, g: &'a Grammar) -> LL1TableOutput<'a> {
        let terminals: Vec<(usize, &str)> = g
            .terminal_iter()
            .map(|t| (g.get_symbol_index(t).unwrap(), t.as_str()))
            .collect();

        let mut rows = Vec::new();
        for nt in g.non_terminal_iter() {
            if Some(nt.index) == g.augmented_start {
                continue;
            }
            let left = nt.name.as_str();
            let row: Vec<ProductionOutput> = terminals
                .iter()
                .map(|&(t_idx, _)| {
                    let rights = match self.entries.get(&(nt.index, t_idx)) {
                        Some(&p_idx) => {
                            vec![g.production_to_vec_str(&self.productions[p_idx].rhs)]
                        }
                        None => Vec::new(),
                    };
                    ProductionOutput { left, rights }
                })
                .collect();
            rows.push((left, row));
        }

        LL1TableOutput {
            terminals: terminals.iter().map(|&(_, name)| name).collect(),
            rows,
        }
    }
}

impl LL1TableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|production| production.to_plaintext(left.len(), false)),
            );
            output.push(line);
        }
        render_grid(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape::tex(*left).to_string()];
            line.extend(row.iter().map(|production| production.to_latex(false)));
            output.push(line.join(" & "));
        }
        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

fn render_grid(output: &[Vec<String>]) -> String {
    let width: Vec<usize> = (0..output[0].len())
        .map(|j| output.iter().map(|row| row[j].len()).max().unwrap())
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl LRFSM {
    pub fn item_to_plaintext(&self, item: &DotProduction, g: &Grammar) -> String {
        let p = &self.productions[item.production];
        let mut output = String::new();
        output.push_str(g.get_symbol_name(p.left));
        output.push_str(" -> ");
        for (i, &s) in p.rhs.iter().enumerate() {
            if i == item.position {
                output.push('.');
            }
            output.push_str(g.get_symbol_name(s));
        }
        if item.position >= p.rhs.len() {
            output.push('.');
        }
        output
    }

    fn item_to_latex(&self, item: &DotProduction, g: &Grammar) -> String {
        let p = &self.productions[item.production];
        let mut right: Vec<String> = Vec::new();
        for (i, &s) in p.rhs.iter().enumerate() {
            if i == item.position {
                right.push(".".to_string());
            }
            right.push(escape::tex(g.get_symbol_name(s)).to_string());
        }
        if item.position >= p.rhs.len() {
            right.push(".".to_string());
        }
        let right = right.join(" ").replace(EPSILON, "\\epsilon");
        format!(
            "${} \\rightarrow {}$",
            escape::tex(g.get_symbol_name(p.left)),
            right
        )
    }

    fn state_to_plaintext(&self, state: &LRState, g: &Grammar) -> String {
        let kernel = state
            .kernel
            .iter()
            .map(|c| self.item_to_plaintext(c, g))
            .collect::<Vec<_>>()
            .join("\n");

        let extend = if !state.extend.is_empty() {
            format!(
                "\n---\n{}",
                state
                    .extend
                    .iter()
                    .map(|c| self.item_to_plaintext(c, g))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        let edges = if !state.edges.is_empty() {
            format!(
                "\n===\n{}",
                state
                    .edges
                    .iter()
                    .map(|(&e, v)| format!("- {} -> {}", g.get_symbol_name(e), v))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        format!("{}{}{}", kernel, extend, edges)
    }

    pub fn to_plaintext(&self, g: &Grammar) -> String {
        let states = self
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| format!("I{}\n{}", i, self.state_to_plaintext(s, g)))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{}\n\nstart: {}", states, self.start)
    }

    fn node_to_latex(&self, state: &LRState, id: usize, g: &Grammar) -> String {
        let content = state
            .kernel
            .iter()
            .chain(state.extend.iter())
            .map(|e| self.item_to_latex(e, g))
            .collect::<Vec<_>>()
            .join(" \\\\ \n");
        format!(
            "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
            id,
            if id > 0 {
                if id % 2 == 0 {
                    format!(" [below of = I_{}] ", id - 2)
                } else {
                    format!(" [right of = I_{}] ", id - 1)
                }
            } else {
                String::new()
            },
            id,
            content
        )
    }

    fn edge_to_latex(&self, state: &LRState, id: usize, g: &Grammar) -> String {
        state
            .edges
            .iter()
            .map(|(&e, v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == *v { "[loop left]" } else { "[right]" },
                    g.get_symbol_name(e),
                    v
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self, g: &Grammar) -> String {
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            self.states
                .iter()
                .enumerate()
                .map(|(i, s)| self.node_to_latex(s, i, g))
                .chain(
                    self.states
                        .iter()
                        .enumerate()
                        .map(|(i, s)| self.edge_to_latex(s, i, g))
                )
                .collect::<Vec<_>>()
                .join("\n")
        )
    }

    pub fn to_output<'a>(&self, g: &'a Grammar) -> LRFSMOutput<'a> {
        LRFSMOutput {
            states: self
                .states
                .iter()
                .map(|s| LRStateOutput {
                    kernel: s.kernel.iter().map(|c| self.item_to_plaintext(c, g)).collect(),
                    extend: s.extend.iter().map(|c| self.item_to_plaintext(c, g)).collect(),
                    edges: s
                        .edges
                        .iter()
                        .map(|(&e, &v)| (g.get_symbol_name(e), v))
                        .collect(),
                })
                .collect(),
            start: self.start,
        }
    }
}

#[derive(Serialize)]
pub struct LRStateOutput<'a> {
    kernel: Vec<String>,
    extend: Vec<String>,
    edges: Vec<(&'a str, usize)>,
}

#[derive(Serialize)]
pub struct LRFSMOutput<'a> {
    states: Vec<LRStateOutput<'a>>,
    start: usize,
}

#[derive(Serialize)]
pub struct SLRTableOutput<'a> {
    terminals: Vec<&'a str>,
    non_terminals: Vec<&'a str>,
    action: Vec<Vec<Vec<String>>>,
    goto: Vec<Vec<Option<usize>>>,
}

impl SLRParsingTable {
    fn action_to_plaintext(&self, action: &SLRAction, g: &Grammar) -> String {
        match action {
            SLRAction::Reduce(p_idx) => {
                let p = &self.productions[*p_idx];
                format!(
                    "r({} -> {})",
                    g.get_symbol_name(p.left),
                    g.production_to_vec_str(&p.rhs).join("")
                )
            }
            SLRAction::Shift(s) => format!("s{}", s),
            SLRAction::Accept => "acc".to_string(),
        }
    }

    fn action_to_latex(&self, action: &SLRAction, g: &Grammar) -> String {
        match action {
            SLRAction::Reduce(p_idx) => {
                let p = &self.productions[*p_idx];
                format!(
                    "reduce ${} \\rightarrow {}$",
                    escape::tex(g.get_symbol_name(p.left)),
                    g.production_to_vec_str(&p.rhs)
                        .iter()
                        .map(|s| escape::tex(*s))
                        .collect::<Vec<_>>()
                        .join(" \\ ")
                        .replace(EPSILON, "\\epsilon")
                )
            }
            SLRAction::Shift(s) => format!("shift {}", s),
            SLRAction::Accept => "accept".to_string(),
        }
    }

    pub fn to_output<'a>(&self, g: &'a Grammar) -> SLRTableOutput<'a> {
        let terminals: Vec<(usize, &str)> = g
            .terminal_iter()
            .map(|t| (g.get_symbol_index(t).unwrap(), t.as_str()))
            .collect();
        let non_terminals: Vec<(usize, &str)> = g
            .non_terminal_iter()
            .filter(|nt| nt.index != EPSILON_IDX && Some(nt.index) != g.augmented_start)
            .map(|nt| (nt.index, nt.name.as_str()))
            .collect();

        let mut action: Vec<Vec<Vec<String>>> = Vec::new();
        let mut goto: Vec<Vec<Option<usize>>> = Vec::new();
        for (row, goto_row) in self.action.iter().zip(self.goto.iter()) {
            action.push(
                terminals
                    .iter()
                    .map(|&(t_idx, _)| {
                        row.get(&t_idx)
                            .map(|cell| {
                                cell.iter()
                                    .map(|a| self.action_to_plaintext(a, g))
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect(),
            );
            goto.push(
                non_terminals
                    .iter()
                    .map(|&(nt_idx, _)| goto_row.get(&nt_idx).copied())
                    .collect(),
            );
        }

        SLRTableOutput {
            terminals: terminals.iter().map(|&(_, name)| name).collect(),
            non_terminals: non_terminals.iter().map(|&(_, name)| name).collect(),
            action,
            goto,
        }
    }

    pub fn to_plaintext(&self, g: &Grammar) -> String {
        let out = self.to_output(g);
        let mut output: Vec<Vec<String>> = Vec::new();

        output.push(vec![String::new()]);
        for s in out.terminals.iter().chain(out.non_terminals.iter()) {
            output[0].push(s.to_string());
        }

        for (i, (r1, r2)) in out.action.iter().zip(out.goto.iter()).enumerate() {
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(r1.iter().map(|actions| actions.join("; ")))
                .chain(r2.iter().map(|goto| {
                    goto.map(|v| v.to_string()).unwrap_or_default()
                }))
                .collect();
            output.push(row);
        }

        render_grid(&output)
    }

    pub fn to_latex(&self, g: &Grammar) -> String {
        let terminals: Vec<(usize, &str)> = g
            .terminal_iter()
            .map(|t| (g.get_symbol_index(t).unwrap(), t.as_str()))
            .collect();
        let non_terminals: Vec<(usize, &str)> = g
            .non_terminal_iter()
            .filter(|nt| nt.index != EPSILON_IDX && Some(nt.index) != g.augmented_start)
            .map(|nt| (nt.index, nt.name.as_str()))
            .collect();

        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(terminals.len() + non_terminals.len()),
            terminals.len(),
            non_terminals.len(),
        );

        let mut first_row: Vec<String> = vec![String::new()];
        for (_, s) in terminals.iter().chain(non_terminals.iter()) {
            first_row.push(escape::tex(*s).to_string());
        }
        let first_row = first_row.join(" & ");

        let mut content: Vec<String> = Vec::new();
        for (i, (row, goto_row)) in self.action.iter().zip(self.goto.iter()).enumerate() {
            let line: Vec<String> = std::iter::once(i.to_string())
                .chain(terminals.iter().map(|&(t_idx, _)| {
                    let cell = match row.get(&t_idx) {
                        Some(cell) => cell,
                        None => return String::new(),
                    };
                    let r = cell
                        .iter()
                        .map(|a| self.action_to_latex(a, g))
                        .collect::<Vec<_>>()
                        .join("; ");
                    if cell.len() > 1 {
                        format!("{{\\color{{red}}{}}}", r)
                    } else {
                        r
                    }
                }))
                .chain(non_terminals.iter().map(|&(nt_idx, _)| {
                    goto_row
                        .get(&nt_idx)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                }))
                .collect();
            content.push(line.join(" & "));
        }
        let content = content.join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

#[derive(Serialize)]
pub struct ClassificationOutput {
    pub is_ll1: bool,
    pub is_slr1: bool,
    pub ll1_table: Option<String>,
    pub slr_table: Option<String>,
}

impl Classification {
    pub fn to_output(&self, g: &Grammar) -> ClassificationOutput {
        ClassificationOutput {
            is_ll1: self.is_ll1,
            is_slr1: self.is_slr1,
            ll1_table: self.ll1.as_ref().map(|t| t.to_output(g).to_plaintext()),
            slr_table: self.slr.as_ref().map(|t| t.to_plaintext(g)),
        }
    }

    pub fn to_plaintext(&self, g: &Grammar) -> String {
        let mut out = format!(
            "LL(1): {}\nSLR(1): {}",
            if self.is_ll1 { "yes" } else { "no" },
            if self.is_slr1 { "yes" } else { "no" }
        );
        if let Some(table) = &self.ll1 {
            out.push_str("\n\nLL(1) parsing table:\n");
            out.push_str(&table.to_output(g).to_plaintext());
        }
        if let Some(table) = &self.slr {
            out.push_str("\n\nSLR(1) parsing table:\n");
            out.push_str(&table.to_plaintext(g));
        }
        out
    }
}
