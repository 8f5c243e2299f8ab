use crate::ast::{AstNode, NodeKind};
use crate::error::SyntaxError;
use crate::token::{Token, TokenKind};
use crate::util::Log;
use once_cell::unsync::OnceCell;

const STARTING_DECL: &[TokenKind] = &[
    TokenKind::Int,
    TokenKind::BOOLean,
    TokenKind::Number,
    TokenKind::DateType,
];

/// Includes `Else`, which can never legally start a statement. A stray
/// `else` is consumed into `Block`'s statement loop and then fails inside
/// `r_statement` itself, rather than being excluded one level up; either
/// way the result is the same syntax error.
const STARTING_STATEMENT: &[TokenKind] = &[
    TokenKind::If,
    TokenKind::Else,
    TokenKind::Doloop,
    TokenKind::For,
    TokenKind::While,
    TokenKind::Return,
    TokenKind::LeftBrace,
    TokenKind::Identifier,
];

const REL_OPS: &[TokenKind] = &[
    TokenKind::Equal,
    TokenKind::NotEqual,
    TokenKind::Less,
    TokenKind::LessEqual,
    TokenKind::Greater,
    TokenKind::GreaterEqual,
];

const ADD_OPS: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus, TokenKind::Or];
const MULT_OPS: &[TokenKind] = &[TokenKind::Multiply, TokenKind::Divide, TokenKind::And];

/// Strict LL(1) recursive-descent parser, one method per non-terminal. Does
/// not backtrack: the first mismatch between the next token's kind and the
/// required production aborts with a [`SyntaxError`].
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    debug: OnceCell<Log<&'static str>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            debug: OnceCell::new(),
        }
    }

    pub fn set_debug(&mut self, level: Log<&'static str>) {
        let _ = self.debug.set(level);
    }

    fn log(&self) -> Log<&'static str> {
        *self.debug.get().unwrap_or(&Log::None)
    }

    /// Parse the whole token stream as a `Program`.
    pub fn parse_program(mut self) -> Result<AstNode, SyntaxError> {
        self.log().emit(Log::Default(""), || "rProgram".to_string());
        self.r_program()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind())
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if present, regardless of its kind. Used
    /// where the caller has already committed to a production and just
    /// needs the token's data (e.g. its symbol); `expected` is only used to
    /// build the diagnostic if the stream is exhausted.
    fn require_next(&mut self, expected: TokenKind) -> Result<Token, SyntaxError> {
        self.advance().ok_or_else(|| self.eof_error(expected))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        match self.peek() {
            Some(t) if t.kind() == kind => Ok(self.advance().expect("peeked above")),
            Some(t) => Err(SyntaxError::new(
                t.lexeme().to_string(),
                t.kind(),
                t.line,
                t.left_column,
                kind,
            )),
            None => Err(self.eof_error(kind)),
        }
    }

    fn eof_error(&self, expected: TokenKind) -> SyntaxError {
        let (line, col) = self
            .tokens
            .last()
            .map(|t| (t.line, t.right_column))
            .unwrap_or((1, 1));
        SyntaxError::new("<eof>".to_string(), TokenKind::BogusToken, line, col, expected)
    }

    fn unexpected(&self, token: &Token, expected: TokenKind) -> SyntaxError {
        SyntaxError::new(
            token.lexeme().to_string(),
            token.kind(),
            token.line,
            token.left_column,
            expected,
        )
    }

    fn r_program(&mut self) -> Result<AstNode, SyntaxError> {
        self.expect(TokenKind::Program)?;
        let block = self.r_block()?;
        Ok(AstNode::new(NodeKind::Program, vec![block]))
    }

    fn r_block(&mut self) -> Result<AstNode, SyntaxError> {
        self.expect(TokenKind::LeftBrace)?;
        let mut children = Vec::new();
        while matches!(self.peek_kind(), Some(k) if STARTING_DECL.contains(&k)) {
            children.push(self.r_decl()?);
        }
        while matches!(self.peek_kind(), Some(k) if STARTING_STATEMENT.contains(&k)) {
            children.push(self.r_statement()?);
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(AstNode::new(NodeKind::Block, children))
    }

    /// `D → TYPE NAME | TYPE NAME FUNHEAD BLOCK`.
    fn r_decl(&mut self) -> Result<AstNode, SyntaxError> {
        let ty = self.r_type()?;
        let name = self.r_name()?;
        if self.peek_kind() == Some(TokenKind::LeftParen) {
            let formals = self.r_fun_head()?;
            let block = self.r_block()?;
            Ok(AstNode::new(
                NodeKind::FunctionDecl,
                vec![ty, name, formals, block],
            ))
        } else {
            Ok(AstNode::new(NodeKind::Decl, vec![ty, name]))
        }
    }

    fn r_type(&mut self) -> Result<AstNode, SyntaxError> {
        let token = self.require_next(TokenKind::Int)?;
        let kind = match token.kind() {
            TokenKind::Int => NodeKind::IntType,
            TokenKind::BOOLean => NodeKind::BoolType,
            TokenKind::Number => NodeKind::NumberType,
            TokenKind::DateType => NodeKind::DateType,
            _ => return Err(self.unexpected(&token, TokenKind::Int)),
        };
        Ok(AstNode::leaf(kind))
    }

    /// `FUNHEAD → '(' ( D ( ',' D )* )? ')'`.
    fn r_fun_head(&mut self) -> Result<AstNode, SyntaxError> {
        self.expect(TokenKind::LeftParen)?;
        let mut decls = Vec::new();
        if self.peek_kind() != Some(TokenKind::RightParen) {
            decls.push(self.r_decl()?);
            while self.peek_kind() == Some(TokenKind::Comma) {
                self.advance();
                decls.push(self.r_decl()?);
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(AstNode::new(NodeKind::Formals, decls))
    }

    fn r_statement(&mut self) -> Result<AstNode, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::If) => {
                self.advance();
                let condition = self.r_expr()?;
                self.expect(TokenKind::Then)?;
                let then_block = self.r_block()?;
                let mut children = vec![condition, then_block];
                if self.peek_kind() == Some(TokenKind::Else) {
                    self.advance();
                    children.push(self.r_block()?);
                }
                Ok(AstNode::new(NodeKind::If, children))
            }
            Some(TokenKind::While) => {
                self.advance();
                let condition = self.r_expr()?;
                let body = self.r_block()?;
                Ok(AstNode::new(NodeKind::While, vec![condition, body]))
            }
            Some(TokenKind::For) => {
                self.advance();
                let name = self.r_name()?;
                self.expect(TokenKind::In)?;
                let list = self.r_list()?;
                let body = self.r_block()?;
                self.expect(TokenKind::Else)?;
                let else_block = self.r_block()?;
                Ok(AstNode::new(
                    NodeKind::For,
                    vec![name, list, body, else_block],
                ))
            }
            Some(TokenKind::Doloop) => {
                self.advance();
                let body = self.r_block()?;
                self.expect(TokenKind::Until)?;
                let condition = self.r_expr()?;
                Ok(AstNode::new(NodeKind::Doloop, vec![body, condition]))
            }
            Some(TokenKind::Return) => {
                self.advance();
                let expr = self.r_expr()?;
                Ok(AstNode::new(NodeKind::Return, vec![expr]))
            }
            Some(TokenKind::LeftBrace) => self.r_block(),
            Some(TokenKind::Identifier) => {
                let name = self.r_name()?;
                self.expect(TokenKind::Assign)?;
                let expr = self.r_expr()?;
                Ok(AstNode::new(NodeKind::Assign, vec![name, expr]))
            }
            Some(_) => {
                let token = self.peek().expect("kind came from peek").clone();
                Err(self.unexpected(&token, TokenKind::LeftBrace))
            }
            None => Err(self.eof_error(TokenKind::LeftBrace)),
        }
    }

    /// `E → SE ( relop SE )?`; relational operators do not chain.
    fn r_expr(&mut self) -> Result<AstNode, SyntaxError> {
        let left = self.r_simple_expr()?;
        if matches!(self.peek_kind(), Some(k) if REL_OPS.contains(&k)) {
            let op = self.advance().expect("peeked above");
            let right = self.r_simple_expr()?;
            Ok(AstNode::new(NodeKind::RelOp(op.symbol), vec![left, right]))
        } else {
            Ok(left)
        }
    }

    /// `SE → T ( addop T )*`, left-associative.
    fn r_simple_expr(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.r_term()?;
        while matches!(self.peek_kind(), Some(k) if ADD_OPS.contains(&k)) {
            let op = self.advance().expect("peeked above");
            let right = self.r_term()?;
            left = AstNode::new(NodeKind::AddOp(op.symbol), vec![left, right]);
        }
        Ok(left)
    }

    /// `T → F ( multop F )*`, left-associative.
    fn r_term(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.r_factor()?;
        while matches!(self.peek_kind(), Some(k) if MULT_OPS.contains(&k)) {
            let op = self.advance().expect("peeked above");
            let right = self.r_factor()?;
            left = AstNode::new(NodeKind::MultOp(op.symbol), vec![left, right]);
        }
        Ok(left)
    }

    /// `F → '(' E ')' | NAME | INTEGER | NUMBERLIT | DATELIT | NAME '(' (E (',' E)*)? ')'`.
    fn r_factor(&mut self) -> Result<AstNode, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::LeftParen) => {
                self.advance();
                let expr = self.r_expr()?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            }
            Some(TokenKind::INTeger) => {
                let token = self.advance().expect("peeked above");
                Ok(AstNode::leaf(NodeKind::Int(token.symbol)))
            }
            Some(TokenKind::NumberLit) => {
                let token = self.advance().expect("peeked above");
                Ok(AstNode::leaf(NodeKind::Number(token.symbol)))
            }
            Some(TokenKind::DateLit) => {
                let token = self.advance().expect("peeked above");
                Ok(AstNode::leaf(NodeKind::Date(token.symbol)))
            }
            Some(TokenKind::Identifier) => {
                let token = self.advance().expect("peeked above");
                let name = AstNode::leaf(NodeKind::Id(token.symbol.clone()));
                if self.peek_kind() == Some(TokenKind::LeftParen) {
                    self.advance();
                    let mut children = vec![name];
                    if self.peek_kind() != Some(TokenKind::RightParen) {
                        children.push(self.r_expr()?);
                        while self.peek_kind() == Some(TokenKind::Comma) {
                            self.advance();
                            children.push(self.r_expr()?);
                        }
                    }
                    self.expect(TokenKind::RightParen)?;
                    Ok(AstNode::new(NodeKind::Call, children))
                } else {
                    Ok(name)
                }
            }
            Some(_) => {
                let token = self.peek().expect("kind came from peek").clone();
                Err(self.unexpected(&token, TokenKind::Identifier))
            }
            None => Err(self.eof_error(TokenKind::Identifier)),
        }
    }

    /// `LIST → '[' (F (',' F)*)? ']'`.
    fn r_list(&mut self) -> Result<AstNode, SyntaxError> {
        self.expect(TokenKind::LeftBracket)?;
        let mut items = Vec::new();
        if self.peek_kind() != Some(TokenKind::RightBracket) {
            items.push(self.r_factor()?);
            while self.peek_kind() == Some(TokenKind::Comma) {
                self.advance();
                items.push(self.r_factor()?);
            }
        }
        self.expect(TokenKind::RightBracket)?;
        Ok(AstNode::new(NodeKind::List, items))
    }

    fn r_name(&mut self) -> Result<AstNode, SyntaxError> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(AstNode::leaf(NodeKind::Id(token.symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::source::Source;
    use crate::symbol::SymbolTable;

    fn parse(text: &str) -> Result<AstNode, SyntaxError> {
        let source = Source::from_text(text);
        let mut symbols = SymbolTable::new();
        let tokens = Lexer::new(&source, &mut symbols).tokenize_all().unwrap();
        Parser::new(tokens).parse_program()
    }

    fn child_labels(node: &AstNode) -> Vec<String> {
        node.children.iter().map(|c| c.label()).collect()
    }

    #[test]
    fn empty_program_body() {
        let program = parse("program { }").unwrap();
        assert_eq!(program.label(), "Program");
        assert_eq!(program.children.len(), 1);
        assert_eq!(program.children[0].label(), "Block");
        assert!(program.children[0].children.is_empty());
    }

    #[test]
    fn decl_then_assign() {
        let program = parse("program { int x x = 3 }").unwrap();
        let block = &program.children[0];
        assert_eq!(block.children.len(), 2);
        assert_eq!(block.children[0].label(), "Decl");
        assert_eq!(block.children[1].label(), "Assign");
        assert_eq!(child_labels(&block.children[0]), vec!["IntType", "Id(x)"]);
    }

    #[test]
    fn if_with_else_has_three_children() {
        let program = parse(
            "program { boolean y if y then { return 1 } else { return 0 } }",
        )
        .unwrap();
        let block = &program.children[0];
        let if_node = &block.children[1];
        assert_eq!(if_node.label(), "If");
        assert_eq!(if_node.children.len(), 3);
    }

    #[test]
    fn function_decl_has_four_children() {
        let program = parse("program { int f(int a, int b) { return a + b } }").unwrap();
        let func = &program.children[0].children[0];
        assert_eq!(func.label(), "FunctionDecl");
        assert_eq!(func.children.len(), 4);
        assert_eq!(func.children[2].label(), "Formals");
        assert_eq!(func.children[2].children.len(), 2);
        let ret = &func.children[3].children[0];
        assert_eq!(ret.label(), "Return");
        assert_eq!(ret.children[0].label(), "AddOp(+)");
    }

    #[test]
    fn for_requires_trailing_else() {
        let err = parse("program { int x for x in [1, 2] { return x } }").unwrap_err();
        assert_eq!(err.expected, TokenKind::Else);
    }

    #[test]
    fn doloop_example() {
        let program = parse("program { do { x = x - 1 } until x == 0 }").unwrap();
        let doloop = &program.children[0].children[0];
        assert_eq!(doloop.label(), "Doloop");
        assert_eq!(doloop.children[1].label(), "RelOp(==)");
    }

    #[test]
    fn relational_operators_do_not_chain() {
        // `a == b == c` parses `a == b` as E, leaving `== c` unconsumed,
        // which then fails inside the block's closing-brace expectation.
        let err = parse("program { boolean a a = 1 == 1 == 1 }").unwrap_err();
        assert_eq!(err.expected, TokenKind::RightBrace);
    }

    #[test]
    fn syntax_error_names_expected_kind() {
        let err = parse("program { int x = 3 }").unwrap_err();
        assert_eq!(err.found_kind, TokenKind::Assign);
    }

    #[test]
    fn number_literal_assignment_produces_number_leaf() {
        let program = parse("program { number pi pi = 3.14 }").unwrap();
        let block = &program.children[0];
        let assign = &block.children[1];
        assert_eq!(assign.label(), "Assign");
        assert_eq!(assign.children[1].label(), "Number(3.14)");
    }

    #[test]
    fn date_literal_assignment_produces_date_leaf() {
        let program = parse("program { date d d = 12~31~2024 }").unwrap();
        let block = &program.children[0];
        let assign = &block.children[1];
        assert_eq!(assign.label(), "Assign");
        assert_eq!(assign.children[1].label(), "Date(12~31~2024)");
    }
}
