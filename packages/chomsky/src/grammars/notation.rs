use winnow::{
    ascii::space0,
    combinator::{alt, delimited, separated},
    prelude::*,
    token::{one_of, take_while},
};

use crate::{
    grammars::types::{NonTerminal, ProductionSymbol},
    language::{Symbol, Word, EPSILON},
};

/// Parses one production line, e.g. `S -> aAa | bBv` or `A → a | ε`.
pub fn parse_production(
    line: &str,
) -> Result<(NonTerminal, Vec<Word<ProductionSymbol>>), String> {
    production.parse(line.trim()).map_err(|error| error.to_string())
}

fn production(input: &mut &str) -> ModalResult<(NonTerminal, Vec<Word<ProductionSymbol>>)> {
    let lhs = delimited(space0, left_hand_side, space0).parse_next(input)?;
    alt(("->", "→")).parse_next(input)?;
    let alternatives: Vec<_> = separated(1.., alternative, '|').parse_next(input)?;

    Ok((lhs, alternatives))
}

fn left_hand_side(input: &mut &str) -> ModalResult<NonTerminal> {
    one_of(|c: char| c.is_ascii_uppercase())
        .map(|c: char| NonTerminal(Symbol::new(c)))
        .parse_next(input)
}

fn alternative(input: &mut &str) -> ModalResult<Word<ProductionSymbol>> {
    delimited(space0, alt((epsilon, symbols)), space0).parse_next(input)
}

fn epsilon(input: &mut &str) -> ModalResult<Word<ProductionSymbol>> {
    EPSILON.map(|_| Word::new(Vec::new())).parse_next(input)
}

fn symbols(input: &mut &str) -> ModalResult<Word<ProductionSymbol>> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric())
        .map(|run: &str| Word::new(run.chars().map(ProductionSymbol::from_char).collect()))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::types::Terminal;

    #[test]
    fn parses_alternatives_separated_by_pipes() {
        let (lhs, words) = parse_production("S -> aAa | bBv").unwrap();

        assert_eq!(lhs, NonTerminal(Symbol::new('S')));
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].to_string(), "aAa");
        assert_eq!(words[1].to_string(), "bBv");
    }

    #[test]
    fn accepts_the_unicode_arrow() {
        let (lhs, words) = parse_production("A → a").unwrap();

        assert_eq!(lhs, NonTerminal(Symbol::new('A')));
        assert_eq!(words[0].to_string(), "a");
    }

    #[test]
    fn classifies_symbols_by_case() {
        let (_, words) = parse_production("S -> aA").unwrap();

        assert_eq!(
            words[0].0,
            vec![
                ProductionSymbol::Terminal(Terminal(Symbol::new('a'))),
                ProductionSymbol::NonTerminal(NonTerminal(Symbol::new('A'))),
            ]
        );
    }

    #[test]
    fn epsilon_parses_to_the_empty_word() {
        let (_, words) = parse_production("S -> a | ε").unwrap();

        assert_eq!(words.len(), 2);
        assert!(words[1].0.is_empty());
    }

    #[test]
    fn rejects_lines_without_an_arrow() {
        assert!(parse_production("S a").is_err());
    }

    #[test]
    fn rejects_lowercase_left_hand_sides() {
        assert!(parse_production("s -> a").is_err());
    }
}
