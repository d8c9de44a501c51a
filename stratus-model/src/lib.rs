//! Entity model layer for Stratus.
//!
//! Sits between raw blob storage (`stratus-store`) and the session
//! layer (`stratus-orm`): the `Entity` contract, deterministic blob
//! path resolution, the per-context type registry and the model
//! validator that front-loads naming/serializability failures to
//! context build time.

mod entity;
mod error;
mod model;
mod resolver;
mod validator;

pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use model::{EntityDescriptor, EntityModel, ModelBuilder};
pub use resolver::BlobPathResolver;
pub use validator::ModelValidator;
