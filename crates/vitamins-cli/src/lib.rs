//! Vitamins CLI library — command implementations shared by the `vitamins`
//! binary and its integration tests.

pub mod commands;
