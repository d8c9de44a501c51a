//! Entity model registry.
//!
//! The compile-time replacement for the original's reflection-driven
//! metadata: each registered entity type contributes a descriptor built
//! from closures captured at registration, keyed by its `TypeId`. The
//! registry is instance-scoped and owned by one context — no global
//! caches, no cross-session leakage.

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::resolver::BlobPathResolver;
use std::any::TypeId;
use std::collections::HashMap;

/// Metadata for one registered entity type.
pub struct EntityDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    blob_name: String,
    round_trip: Box<dyn Fn() -> Result<(), serde_json::Error> + Send + Sync>,
}

impl EntityDescriptor {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The effective collection blob name (override or derived).
    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }

    /// Default-constructs an instance, serializes it and deserializes
    /// it back. Used by the model validator to front-load
    /// serializability failures.
    pub fn check_round_trip(&self) -> Result<(), serde_json::Error> {
        (self.round_trip)()
    }
}

impl std::fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("blob_name", &self.blob_name)
            .finish()
    }
}

type DescriptorFactory = Box<dyn Fn(&BlobPathResolver) -> EntityDescriptor + Send + Sync>;

/// Collects entity registrations before the storage provider exists.
///
/// Blob names depend on the provider's sanitizer, so descriptors are
/// materialized in `build` once the resolver is available.
#[derive(Default)]
pub struct ModelBuilder {
    factories: Vec<(TypeId, DescriptorFactory)>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type. Registering the same type twice is a
    /// no-op. `Default` is required so the validator can probe
    /// serializability on a real instance.
    pub fn register<T: Entity + Default>(mut self) -> Self {
        let type_id = TypeId::of::<T>();
        if self.factories.iter().any(|(id, _)| *id == type_id) {
            return self;
        }
        self.factories.push((
            type_id,
            Box::new(|resolver: &BlobPathResolver| EntityDescriptor {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                blob_name: resolver.blob_name::<T>(),
                round_trip: Box::new(|| {
                    let probe = T::default();
                    let json = serde_json::to_string(&probe)?;
                    let _: T = serde_json::from_str(&json)?;
                    Ok(())
                }),
            }),
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Materializes descriptors against the active resolver.
    pub fn build(self, resolver: &BlobPathResolver) -> EntityModel {
        let mut descriptors = Vec::with_capacity(self.factories.len());
        let mut index = HashMap::with_capacity(self.factories.len());
        for (type_id, factory) in self.factories {
            index.insert(type_id, descriptors.len());
            descriptors.push(factory(resolver));
        }
        EntityModel { descriptors, index }
    }
}

/// The built, immutable entity model of one context.
#[derive(Debug)]
pub struct EntityModel {
    descriptors: Vec<EntityDescriptor>,
    index: HashMap<TypeId, usize>,
}

impl EntityModel {
    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains<T: Entity>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Descriptor for `T`, failing when the type was never registered.
    pub fn descriptor_of<T: Entity>(&self) -> ModelResult<&EntityDescriptor> {
        self.index
            .get(&TypeId::of::<T>())
            .map(|&i| &self.descriptors[i])
            .ok_or(ModelError::NotRegistered {
                type_name: std::any::type_name::<T>(),
            })
    }
}
