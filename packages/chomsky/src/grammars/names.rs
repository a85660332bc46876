use indexmap::{IndexMap, IndexSet};

use crate::{grammars::types::NonTerminal, language::Symbol};

/// Hands out non-terminal names guaranteed not to collide with any name seen
/// at construction or allocated earlier.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    used: IndexSet<Symbol>,
    counters: IndexMap<Symbol, usize>,
}

impl NameAllocator {
    pub fn new(used: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            used: used.into_iter().collect(),
            counters: IndexMap::new(),
        }
    }

    /// Next chain helper owned by `owner`: `{owner}_1`, `{owner}_2`, ...,
    /// skipping names already taken.
    pub fn helper(&mut self, owner: &NonTerminal) -> NonTerminal {
        let counter = self.counters.entry(owner.0.clone()).or_insert(0);

        loop {
            *counter += 1;
            let candidate = Symbol::new(format!("{}_{}", owner, counter));

            if self.used.insert(candidate.clone()) {
                return NonTerminal(candidate);
            }
        }
    }

    /// Fresh start wrapper: `{start}0`, with further `0`s appended while the
    /// name is taken.
    pub fn start_wrapper(&mut self, start: &NonTerminal) -> NonTerminal {
        let mut candidate = Symbol::new(format!("{}0", start));

        while self.used.contains(&candidate) {
            candidate = Symbol::new(format!("{}0", candidate));
        }

        self.used.insert(candidate.clone());

        NonTerminal(candidate)
    }
}
