use thiserror::Error;

use crate::entity::Entity;

/// Errors reported by fallible world operations.
///
/// Absence of a component is never an error; operations that tolerate it
/// return `bool` or `Option` instead.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle refers to a destroyed or never-allocated entity.
    #[error("invalid entity handle {0:?}")]
    InvalidEntity(Entity),

    /// A type-erased attach carried a value of the wrong component type.
    #[error("component type mismatch: table holds `{expected}`, value is `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
