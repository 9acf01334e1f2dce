//! Interactive call-graph slicer for JavaScript and TypeScript sources.
//!
//! A single file is parsed with tree-sitter, its declarations and call
//! edges are collected into a [`core::CallGraph`], and a two-radius
//! neighbourhood around operator-chosen seeds is projected into a nested
//! JSON (or literal-export) document.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod interaction;
pub mod session;
pub mod sink;
