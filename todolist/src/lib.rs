//! `todolist`: a local to-do list backed by a single JSON file.

pub mod app;
pub mod config;
pub mod tasks;
