//! Parser test suite.

mod parser;
