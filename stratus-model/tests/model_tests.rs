use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stratus_model::{BlobPathResolver, Entity, ModelBuilder, ModelError, ModelValidator};
use stratus_store::{CloudProviderKind, MemoryStorageProvider, StorageProvider};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct User {
    id: String,
    name: String,
}

impl Entity for User {
    fn key(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Order {
    id: String,
    total: i64,
}

impl Entity for Order {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Override with an uppercase letter: passes registration, must fail
/// validation under the reference naming rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BadName {
    id: String,
}

impl Entity for BadName {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn blob_name() -> Option<&'static str> {
        Some("Uppercase")
    }
}

/// Default-constructs to NaN, which the JSON serializer rejects.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Unserializable {
    id: String,
    score: f64,
}

impl Default for Unserializable {
    fn default() -> Self {
        Self {
            id: String::new(),
            score: f64::NAN,
        }
    }
}

impl Entity for Unserializable {
    fn key(&self) -> String {
        self.id.clone()
    }
}

fn make_resolver() -> BlobPathResolver {
    let provider: Arc<dyn StorageProvider> = Arc::new(MemoryStorageProvider::new("c"));
    BlobPathResolver::new(provider)
}

// ── Registry ─────────────────────────────────────────────────────

#[test]
fn registration_order_is_preserved() {
    let model = ModelBuilder::new()
        .register::<User>()
        .register::<Order>()
        .build(&make_resolver());

    let names: Vec<_> = model.iter().map(|d| d.type_name()).collect();
    assert_eq!(model.len(), 2);
    assert!(names[0].ends_with("User"));
    assert!(names[1].ends_with("Order"));
}

#[test]
fn duplicate_registration_is_noop() {
    let model = ModelBuilder::new()
        .register::<User>()
        .register::<User>()
        .build(&make_resolver());
    assert_eq!(model.len(), 1);
}

#[test]
fn descriptor_lookup() {
    let model = ModelBuilder::new().register::<User>().build(&make_resolver());

    assert!(model.contains::<User>());
    assert!(!model.contains::<Order>());

    let descriptor = model.descriptor_of::<User>().unwrap();
    assert!(descriptor.blob_name().ends_with("-user"));

    let err = model.descriptor_of::<Order>().unwrap_err();
    assert!(matches!(err, ModelError::NotRegistered { .. }));
}

// ── Validator ────────────────────────────────────────────────────

#[test]
fn valid_model_passes() {
    let model = ModelBuilder::new()
        .register::<User>()
        .register::<Order>()
        .build(&make_resolver());

    let validator = ModelValidator::new(CloudProviderKind::Memory);
    validator.validate(&model).unwrap();
}

#[test]
fn invalid_blob_name_fails_at_build_time() {
    let model = ModelBuilder::new().register::<BadName>().build(&make_resolver());

    let validator = ModelValidator::new(CloudProviderKind::Memory);
    let err = validator.validate(&model).unwrap_err();
    match err {
        ModelError::InvalidBlobName { blob_name, .. } => assert_eq!(blob_name, "Uppercase"),
        other => panic!("expected InvalidBlobName, got: {other}"),
    }
}

#[test]
fn unserializable_entity_fails_with_cause() {
    let model = ModelBuilder::new()
        .register::<Unserializable>()
        .build(&make_resolver());

    let validator = ModelValidator::new(CloudProviderKind::Memory);
    let err = validator.validate(&model).unwrap_err();
    match &err {
        ModelError::NotSerializable { type_name, .. } => {
            assert!(type_name.ends_with("Unserializable"));
            // The serde cause is preserved.
            assert!(std::error::Error::source(&err).is_some());
        }
        other => panic!("expected NotSerializable, got: {other}"),
    }
}

#[test]
fn empty_model_is_valid() {
    let model = ModelBuilder::new().build(&make_resolver());
    assert!(model.is_empty());
    ModelValidator::new(CloudProviderKind::Memory)
        .validate(&model)
        .unwrap();
}
