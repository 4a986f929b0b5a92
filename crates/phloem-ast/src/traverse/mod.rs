//! Tree walkers: breadth-first and depth-first.
//!
//! Both walkers share the dispatch contract: `enter` for every visitor in
//! registration order, then the namespace stack is brought up to date, then
//! `visit`, then children in declared-field order, then `leave`. Neither
//! walker deduplicates visits into shared subtrees; breaking hard include
//! cycles is the dependency resolver's job.

pub mod bf;
pub mod df;

#[cfg(test)]
mod df_tests;

pub use bf::BfTraverser;
pub use df::DfTraverser;

/// Errors raised by visitor registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TraverseError {
    /// The same visitor instance was registered twice. Unreachable from
    /// safe Rust (the `&mut` registration already forbids aliasing); kept
    /// as a guard on the contract.
    #[error("visitor already registered with traverser")]
    DuplicateVisitor,
}
