//! Front end of a teaching compiler for a small imperative language.
//!
//! A source file is read, scanned into a token stream by [`lexer::Lexer`],
//! parsed by recursive descent into an [`ast::AstNode`] tree by
//! [`parser::Parser`], and laid out on an integer lattice by
//! [`layout::Layout`]'s two-pass tidy-tree algorithm. The pipeline is a
//! straight line: characters → tokens → AST → (count, offset) → geometry
//! records. There is no semantic analysis, type checking, or code
//! generation; the rasterizer that turns a [`layout::Layout`] into pixels is
//! an external collaborator behind the [`layout::Rasterizer`] trait.

pub mod ast;
pub mod error;
pub mod layout;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod symbol;
pub mod token;
pub mod util;

use ast::AstNode;
use error::XError;
use lexer::Lexer;
use parser::Parser;
use source::Source;
use symbol::SymbolTable;

/// Run the lexer and parser over `source`, returning the parsed `Program`
/// node. A fresh symbol table is built for each call; nothing is shared
/// across invocations.
pub fn parse(source: &Source) -> Result<AstNode, XError> {
    let mut symbols = SymbolTable::new();
    let tokens = Lexer::new(source, &mut symbols).tokenize_all()?;
    let program = Parser::new(tokens).parse_program()?;
    Ok(program)
}
