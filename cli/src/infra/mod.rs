//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: HTTP calls, SSH sessions,
//! archive building, filesystem access, and terminal prompts.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod api;
pub mod archive;
pub mod config;
pub mod keys;
pub mod manifest;
pub mod prompt;
pub mod ssh;
pub mod state;
