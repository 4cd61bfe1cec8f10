//! Contact events between entities

use maze_core::EntityId;
use serde::{Deserialize, Serialize};

/// Stage of a contact between two colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactPhase {
    /// Volumes started overlapping this step
    Enter,
    /// Volumes were already overlapping and still are
    Stay,
    /// Volumes stopped overlapping (or one side went away)
    Exit,
}

/// How the contact was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// At least one side is a sensor volume
    Trigger,
    /// Both sides are solid
    Collision,
}

/// A contact notification between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub a: EntityId,
    pub b: EntityId,
    pub phase: ContactPhase,
    pub kind: ContactKind,
}

impl ContactEvent {
    pub fn new(a: EntityId, b: EntityId, phase: ContactPhase, kind: ContactKind) -> Self {
        Self { a, b, phase, kind }
    }

    /// Check whether an entity takes part in this contact
    pub fn involves(&self, entity: EntityId) -> bool {
        self.a == entity || self.b == entity
    }

    /// The other side of the contact, seen from `entity`
    pub fn other(&self, entity: EntityId) -> Option<EntityId> {
        if self.a == entity {
            Some(self.b)
        } else if self.b == entity {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn is_enter(&self) -> bool {
        self.phase == ContactPhase::Enter
    }

    pub fn is_exit(&self) -> bool {
        self.phase == ContactPhase::Exit
    }
}
