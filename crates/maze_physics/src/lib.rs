//! Maze Physics - Host Collaborator Boundary
//!
//! Physics simulation belongs to the host engine. Gameplay code only needs
//! three things from it, and this crate pins them down as types and traits:
//!
//! - **Spatial queries**: nearest blocking surface along a ray
//!   ([`SpatialQuery`])
//! - **Contact events**: enter / stay / exit notifications between two
//!   entities ([`ContactEvent`])
//! - **Collider toggles**: enabling and disabling an entity's collider
//!   ([`ColliderToggle`])
//!
//! [`ColliderWorld`] and [`ContactTracker`] are a small reference host made
//! of axis-aligned spheres and boxes. The headless simulation and the tests
//! run against it.
//!
//! # Example
//!
//! ```ignore
//! use maze_physics::prelude::*;
//!
//! let mut world = ColliderWorld::new();
//! world.insert(wall, ColliderDesc::cuboid(Vec3::new(1.0, 2.0, 0.2)).at(Vec3::Z * 5.0));
//!
//! let hit = world.raycast(&Ray::new(Vec3::ZERO, Vec3::Z), &RaycastOptions::default());
//! assert_eq!(hit.map(|h| h.entity), Some(wall));
//! ```

pub mod contacts;
pub mod events;
pub mod layers;
pub mod query;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::contacts::ContactTracker;
    pub use crate::events::{ContactEvent, ContactKind, ContactPhase};
    pub use crate::layers::{CollisionLayer, CollisionMask};
    pub use crate::query::{Ray, RaycastHit, RaycastOptions, SpatialQuery};
    pub use crate::world::{Collider, ColliderDesc, ColliderShape, ColliderToggle, ColliderWorld};
}

pub use prelude::*;
