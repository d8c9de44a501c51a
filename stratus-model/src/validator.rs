//! Model validation.
//!
//! Runs once at context build, never per operation. A failing model
//! prevents the context from becoming usable, so naming and
//! serialization mistakes surface at startup instead of on the first
//! save or query.

use crate::error::{ModelError, ModelResult};
use crate::model::EntityModel;
use stratus_store::{naming, CloudProviderKind};
use tracing::debug;

/// Validates every registered entity type against the active provider's
/// naming rules and the document serializer.
pub struct ModelValidator {
    kind: CloudProviderKind,
}

impl ModelValidator {
    pub fn new(kind: CloudProviderKind) -> Self {
        Self { kind }
    }

    pub fn validate(&self, model: &EntityModel) -> ModelResult<()> {
        for descriptor in model.iter() {
            if !naming::is_blob_name_valid(self.kind, descriptor.blob_name()) {
                return Err(ModelError::InvalidBlobName {
                    type_name: descriptor.type_name(),
                    blob_name: descriptor.blob_name().to_string(),
                });
            }

            descriptor
                .check_round_trip()
                .map_err(|source| ModelError::NotSerializable {
                    type_name: descriptor.type_name(),
                    source,
                })?;

            debug!(
                type_name = descriptor.type_name(),
                blob_name = descriptor.blob_name(),
                "entity type validated"
            );
        }
        Ok(())
    }
}
