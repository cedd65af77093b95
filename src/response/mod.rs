mod parser;
mod types;

pub use parser::parse;
pub use types::*;
