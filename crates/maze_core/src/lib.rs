//! # maze_core - Shared Primitives
//!
//! Small building blocks every gameplay crate leans on:
//! - **Entity ids** with generation counters so a destroyed entity's id
//!   never aliases a newer one
//! - **Capabilities**: a typed replacement for string tags, resolved once
//!   when an entity is created
//! - **Clock**: one monotonically increasing time sample per step
//!
//! There is no scheduler here. The host loop calls `step(dt)` on each
//! system and every timer is a comparison against [`Clock::now`].

pub mod capability;
pub mod clock;
pub mod id;
pub mod math;

pub use capability::*;
pub use clock::*;
pub use id::*;
pub use math::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::capability::{Capabilities, Capability, CapabilityRegistry};
    pub use crate::clock::Clock;
    pub use crate::id::{EntityId, IdAllocator};
    pub use crate::math::{look_rotation, yaw_rotation};
}
