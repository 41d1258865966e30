pub mod ast;
pub mod build;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod features;
pub mod generate;
pub mod module;
pub mod module_graph;
pub mod resolve;
pub mod stats;
pub mod utils;
pub mod visitors;
