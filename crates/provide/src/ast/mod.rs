pub mod error;
pub mod file;
pub mod js_ast;
pub mod utils;
