//! Ground terms and their textual form.

mod parser;
pub use parser::parse_term;

mod symbol;
pub use symbol::Symbol;
pub use symbol::SymbolType;
