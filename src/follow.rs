//! Main module for follow library functionality

pub mod ast;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod lexing;
pub mod parsing;
pub mod proof;
pub mod suggestion;
