//! Guarded status transitions.

use super::ValidationError;

/// A lifecycle status whose moves are checked against a transition table.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// The transition table.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns `target` when the table allows the move.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "status",
                format!("{:?} cannot move to {:?}", self, target),
            ));
        }
        Ok(target)
    }
}
