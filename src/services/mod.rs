pub mod generation;
pub mod parser;
pub mod questions;
