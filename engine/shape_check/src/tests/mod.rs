//! Validator and engine test suite.

mod engine;
mod validator;
