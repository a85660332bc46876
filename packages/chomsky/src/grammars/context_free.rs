use std::fmt::{self, Display};

use indexmap::{indexset, IndexMap, IndexSet};
use itertools::Itertools;

use crate::{
    grammars::{
        names::NameAllocator,
        notation,
        types::{NonTerminal, ProductionSymbol, Terminal},
    },
    language::{Symbol, Word},
};

/// A context-free grammar over tagged symbols. Every transformation pass
/// consumes the grammar and returns a rewritten copy; the input value is
/// never touched, so repeated application (e.g. running unit elimination to
/// a fixed point) is an explicit caller loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFreeGrammar {
    start_symbol: NonTerminal,
    non_terminals: IndexSet<NonTerminal>,
    terminals: IndexSet<Terminal>,
    productions: IndexMap<NonTerminal, IndexSet<Word<ProductionSymbol>>>,
}

impl ContextFreeGrammar {
    pub fn new(start_symbol: NonTerminal) -> Self {
        Self {
            non_terminals: IndexSet::from([start_symbol.clone()]),
            start_symbol,
            terminals: IndexSet::new(),
            productions: IndexMap::new(),
        }
    }

    /// Builds a grammar from production lines in the `S -> aAa | bBv`
    /// notation, where uppercase characters are non-terminals and everything
    /// else is a terminal.
    pub fn from_productions<S: AsRef<str>>(
        start_symbol: S,
        productions: &[impl AsRef<str>],
    ) -> Self {
        let start_symbol = NonTerminal(Symbol::new(start_symbol.as_ref()));
        let mut grammar = Self::new(start_symbol);

        for line in productions {
            let (lhs, words) = notation::parse_production(line.as_ref())
                .unwrap_or_else(|_| panic!("Invalid production format"));

            for word in words {
                grammar.add_production(lhs.clone(), word);
            }
        }

        grammar
    }

    pub fn add_production(&mut self, lhs: NonTerminal, rhs: Word<ProductionSymbol>) {
        for symbol in &rhs.0 {
            if let ProductionSymbol::Terminal(t) = symbol {
                self.terminals.insert(t.clone());
            }
        }

        self.non_terminals.insert(lhs.clone());
        self.productions
            .entry(lhs)
            .or_insert_with(IndexSet::new)
            .insert(rhs);
    }

    pub fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    pub fn non_terminals(&self) -> &IndexSet<NonTerminal> {
        &self.non_terminals
    }

    /// The terminal alphabet as collected at construction time. No pass
    /// refreshes this set, so it can keep symbols the rewritten productions
    /// no longer produce.
    pub fn terminals(&self) -> &IndexSet<Terminal> {
        &self.terminals
    }

    pub fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<Word<ProductionSymbol>>> {
        &self.productions
    }

    /// Drops every production entry whose key cannot be reached from the
    /// start symbol. Right-hand sides are kept as they are, so a surviving
    /// word can still mention a non-terminal whose entry was just removed.
    pub fn remove_unreachable_symbols(&self) -> Self {
        let mut reachable = IndexSet::new();
        let mut to_process = vec![self.start_symbol.clone()];

        while let Some(symbol) = to_process.pop() {
            if reachable.insert(symbol.clone()) {
                if let Some(rhs) = self.productions.get(&symbol) {
                    for word in rhs {
                        for s in &word.0 {
                            if let ProductionSymbol::NonTerminal(nt) = s {
                                if !reachable.contains(nt) {
                                    to_process.push(nt.clone());
                                }
                            }
                        }
                    }
                }
            }
        }

        let non_terminals = self
            .non_terminals
            .intersection(&reachable)
            .cloned()
            .collect::<IndexSet<_>>();

        let productions = self
            .productions
            .iter()
            .filter(|(lhs, _)| non_terminals.contains(*lhs))
            .map(|(lhs, rhs)| (lhs.clone(), rhs.clone()))
            .collect();

        Self {
            start_symbol: self.start_symbol.clone(),
            non_terminals,
            terminals: self.terminals.clone(),
            productions,
        }
    }

    /// Rewrites every production set so that no right-hand side is empty,
    /// expanding each word over the keep/drop choices of its nullable
    /// occurrences.
    ///
    /// The empty word is dropped for every non-terminal, the start symbol
    /// included: a grammar that could derive the empty string loses it.
    pub fn eliminate_erasing_productions(&self) -> Self {
        let mut nullable = IndexSet::new();

        for (lhs, rhs) in &self.productions {
            if rhs.iter().any(|word| word.0.is_empty()) {
                nullable.insert(lhs.clone());
            }
        }

        loop {
            let mut changed = false;

            'outer: for (lhs, rhs) in &self.productions {
                if nullable.contains(lhs) {
                    continue;
                }

                for word in rhs {
                    let is_lhs_nullable = word.0.iter().all(|symbol| {
                        if let ProductionSymbol::NonTerminal(nt) = symbol {
                            nullable.contains(nt)
                        } else {
                            false
                        }
                    });

                    if is_lhs_nullable {
                        nullable.insert(lhs.clone());

                        changed = true;
                        continue 'outer;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        let mut productions = IndexMap::new();

        for (lhs, rhs) in &self.productions {
            let mut next_productions = IndexSet::new();

            for word in rhs {
                let words = word
                    .0
                    .iter()
                    .cloned()
                    .map(|symbol| match &symbol {
                        ProductionSymbol::NonTerminal(nt) => {
                            if nullable.contains(nt) {
                                vec![Some(symbol), None]
                            } else {
                                vec![Some(symbol)]
                            }
                        }
                        ProductionSymbol::Terminal(_) => vec![Some(symbol)],
                    })
                    .multi_cartesian_product()
                    .filter_map(|choice| {
                        let symbols = choice.into_iter().flatten().collect::<Vec<_>>();
                        if symbols.is_empty() {
                            None
                        } else {
                            Some(Word::new(symbols))
                        }
                    });

                next_productions.extend(words);
            }

            productions.insert(lhs.clone(), next_productions);
        }

        Self {
            start_symbol: self.start_symbol.clone(),
            non_terminals: self.non_terminals.clone(),
            terminals: self.terminals.clone(),
            productions,
        }
    }

    /// Replaces every single-non-terminal right-hand side with a copy of the
    /// production set its target holds at call time. One call substitutes a
    /// single level: a chain such as `A → B → C` needs a further call before
    /// `A` stops pointing at a non-terminal.
    pub fn eliminate_unit_productions(&self) -> Self {
        let productions = self
            .productions
            .iter()
            .map(|(lhs, rhs)| {
                let next_productions = rhs
                    .iter()
                    .flat_map(|word| {
                        if let [ProductionSymbol::NonTerminal(nt)] = word.0.as_slice() {
                            if let Some(child_rhs) = self.productions.get(nt) {
                                return child_rhs.clone();
                            }
                        }

                        indexset! {word.clone()}
                    })
                    .collect::<IndexSet<_>>();

                (lhs.clone(), next_productions)
            })
            .collect();

        Self {
            start_symbol: self.start_symbol.clone(),
            non_terminals: self.non_terminals.clone(),
            terminals: self.terminals.clone(),
            productions,
        }
    }

    /// Converts towards Chomsky Normal Form: wraps the start symbol in a
    /// fresh one, eliminates erasing productions, runs a single unit
    /// elimination pass and splits every word longer than two symbols into a
    /// chain of freshly named helpers. Unreachable symbols are left alone;
    /// run [`Self::remove_unreachable_symbols`] separately if wanted.
    pub fn to_chomsky_normal_form(&self) -> Self {
        let mut names = NameAllocator::new(self.symbols_in_use());

        let mut grammar = self.clone();
        let wrapper = names.start_wrapper(&grammar.start_symbol);
        grammar.productions.insert(
            wrapper.clone(),
            indexset! {Word::new(vec![ProductionSymbol::NonTerminal(
                grammar.start_symbol.clone(),
            )])},
        );
        grammar.non_terminals.insert(wrapper.clone());
        grammar.start_symbol = wrapper;

        let grammar = grammar.eliminate_erasing_productions();
        let grammar = grammar.eliminate_unit_productions();

        grammar.binarize(&mut names)
    }

    /// Greibach Normal Form conversion is not implemented; returns the
    /// grammar unchanged.
    pub fn to_greibach_normal_form(&self) -> Self {
        self.clone()
    }

    /// Left factoring is not implemented; returns the grammar unchanged.
    pub fn left_factor(&self) -> Self {
        self.clone()
    }

    /// Left-recursion elimination is not implemented; returns the grammar
    /// unchanged.
    pub fn remove_left_recursion(&self) -> Self {
        self.clone()
    }

    fn binarize(&self, names: &mut NameAllocator) -> Self {
        let mut non_terminals = self.non_terminals.clone();
        let mut productions = self
            .productions
            .keys()
            .map(|nt| (nt.clone(), IndexSet::new()))
            .collect::<IndexMap<_, _>>();

        for (lhs, rhs) in &self.productions {
            for word in rhs {
                if word.0.len() <= 2 {
                    productions
                        .entry(lhs.clone())
                        .or_insert_with(IndexSet::new)
                        .insert(word.clone());
                    continue;
                }

                let mut working = lhs.clone();
                let mut remaining = word.0.as_slice();

                while remaining.len() > 2 {
                    let helper = names.helper(&working);
                    non_terminals.insert(helper.clone());

                    productions
                        .entry(working)
                        .or_insert_with(IndexSet::new)
                        .insert(Word::new(vec![
                            remaining[0].clone(),
                            ProductionSymbol::NonTerminal(helper.clone()),
                        ]));

                    working = helper;
                    remaining = &remaining[1..];
                }

                productions
                    .entry(working)
                    .or_insert_with(IndexSet::new)
                    .insert(Word::new(remaining.to_vec()));
            }
        }

        Self {
            start_symbol: self.start_symbol.clone(),
            non_terminals,
            terminals: self.terminals.clone(),
            productions,
        }
    }

    fn symbols_in_use(&self) -> IndexSet<Symbol> {
        let mut used = indexset! {self.start_symbol.0.clone()};

        for nt in &self.non_terminals {
            used.insert(nt.0.clone());
        }

        for (lhs, rhs) in &self.productions {
            used.insert(lhs.0.clone());

            for word in rhs {
                for symbol in &word.0 {
                    match symbol {
                        ProductionSymbol::Terminal(t) => used.insert(t.0.clone()),
                        ProductionSymbol::NonTerminal(nt) => used.insert(nt.0.clone()),
                    };
                }
            }
        }

        used
    }
}

impl Display for ContextFreeGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .productions
            .iter()
            .map(|(lhs, rhs)| {
                format!(
                    "{} -> {}",
                    lhs,
                    rhs.iter().map(ToString::to_string).join(" | ")
                )
            })
            .join("\n");

        write!(f, "{}", lines)
    }
}
