//! Application layer driving one active sale session.
//!
//! The register sits between the pure cart aggregate and its collaborators:
//! it stamps wall-clock time into commands (keeping the domain
//! deterministic), runs the handle/apply cycle, and logs accepted and
//! rejected mutations. Rendering, confirmation prompts, and error display
//! stay outside this crate.

pub mod register;

pub use register::Register;
