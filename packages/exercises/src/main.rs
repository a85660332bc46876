use chomsky::grammars::context_free::ContextFreeGrammar;

fn main() {
    let grammar =
        ContextFreeGrammar::from_productions("S", &["S -> aAa | bBv", "A -> a | aA"]);

    let grammar = grammar.remove_unreachable_symbols();
    println!("After removing unreachable symbols:\n{}\n", grammar);

    let grammar = grammar.eliminate_erasing_productions();
    println!("After eliminating erasing productions:\n{}\n", grammar);

    let grammar = grammar.eliminate_unit_productions();
    println!("After eliminating unit productions:\n{}\n", grammar);

    let grammar = grammar.to_chomsky_normal_form();
    println!("In Chomsky Normal Form:\n{}", grammar);
}
