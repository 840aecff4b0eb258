//! Command-line contract tests

mod cli;
