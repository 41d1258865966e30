pub mod dep_analyzer;
pub mod dep_replacer;
pub mod provide;
