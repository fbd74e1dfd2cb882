//! Backend bridge: command queue types, request orchestrators, and the worker runtime.

pub mod commands;
pub mod export;
pub mod generation;
pub mod health;
pub mod runtime;

#[cfg(test)]
#[path = "../tests/orchestrator_tests.rs"]
mod orchestrator_tests;
