//! Multi-keyword string search

mod aho_corasick;

pub use aho_corasick::{AhoCorasickTree, FindAll};
