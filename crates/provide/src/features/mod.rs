pub mod provide;
