use crate::token::TokenKind;
use std::collections::HashMap;
use std::rc::Rc;

/// An interned `(lexeme, kind)` pair. Equal lexemes always resolve to the
/// same `Rc<Symbol>`, so identity comparison via `Rc::ptr_eq` is available
/// wherever reference equality is cheaper than comparing the two fields.
#[derive(Debug, PartialEq, Eq)]
pub struct Symbol {
    pub lexeme: String,
    pub kind: TokenKind,
}

const RESERVED_WORDS: &[(&str, TokenKind)] = &[
    ("program", TokenKind::Program),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("in", TokenKind::In),
    ("do", TokenKind::Doloop),
    ("until", TokenKind::Until),
    ("return", TokenKind::Return),
    ("int", TokenKind::Int),
    ("boolean", TokenKind::BOOLean),
    ("number", TokenKind::Number),
    ("date", TokenKind::DateType),
];

const OPERATORS: &[(&str, TokenKind)] = &[
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
    (",", TokenKind::Comma),
    ("=", TokenKind::Assign),
    ("==", TokenKind::Equal),
    ("!=", TokenKind::NotEqual),
    ("<", TokenKind::Less),
    ("<=", TokenKind::LessEqual),
    (">", TokenKind::Greater),
    (">=", TokenKind::GreaterEqual),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("|", TokenKind::Or),
    ("*", TokenKind::Multiply),
    ("/", TokenKind::Divide),
    ("&", TokenKind::And),
];

/// Process-wide table of interned symbols, pre-seeded with keywords and
/// operators at construction, and growing as new identifiers and literals
/// are interned during scanning.
pub struct SymbolTable {
    table: HashMap<String, Rc<Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = HashMap::with_capacity(RESERVED_WORDS.len() + OPERATORS.len());
        for (lexeme, kind) in RESERVED_WORDS.iter().chain(OPERATORS) {
            table.insert(
                lexeme.to_string(),
                Rc::new(Symbol {
                    lexeme: lexeme.to_string(),
                    kind: *kind,
                }),
            );
        }
        Self { table }
    }

    /// Intern `lexeme`, returning its existing reserved-word symbol if one
    /// was pre-seeded, otherwise creating (or reusing) an `Identifier` or
    /// literal symbol for it.
    ///
    /// `default_kind` is only used the first time a given lexeme is seen;
    /// the lexeme shapes in this grammar never collide across kinds (an
    /// identifier cannot look like a number or date literal), so a later
    /// call with the same lexeme but a different `default_kind` simply
    /// returns the symbol created on the first call.
    pub fn intern(&mut self, lexeme: &str, default_kind: TokenKind) -> Rc<Symbol> {
        if let Some(symbol) = self.table.get(lexeme) {
            return symbol.clone();
        }
        let symbol = Rc::new(Symbol {
            lexeme: lexeme.to_string(),
            kind: default_kind,
        });
        self.table.insert(lexeme.to_string(), symbol.clone());
        symbol
    }

    /// Look up `lexeme` without creating a new symbol. Used to probe for a
    /// pre-seeded one- or two-character operator; a miss means the lexeme
    /// isn't reserved at all, rather than meaning anything on its own.
    pub fn lookup_reserved(&self, lexeme: &str) -> Option<Rc<Symbol>> {
        self.table.get(lexeme).cloned()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_preseeded() {
        let table = SymbolTable::new();
        assert_eq!(
            table.lookup_reserved("while").map(|s| s.kind),
            Some(TokenKind::While)
        );
    }

    #[test]
    fn identifiers_intern_to_one_instance() {
        let mut table = SymbolTable::new();
        let a = table.intern("x", TokenKind::Identifier);
        let b = table.intern("x", TokenKind::Identifier);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn two_char_operator_probe_does_not_create() {
        let table = SymbolTable::new();
        assert!(table.lookup_reserved("<=").is_some());
        assert!(table.lookup_reserved("<>").is_none());
    }

    #[test]
    fn keyword_lexeme_overrides_identifier_default() {
        let mut table = SymbolTable::new();
        let sym = table.intern("if", TokenKind::Identifier);
        assert_eq!(sym.kind, TokenKind::If);
    }
}
