//! Composition root helpers: register the shared dependencies in order.

use std::sync::Arc;

use thiserror::Error;

use armature_observability::{DiagnosticsLogger, TracingLogger};
use armature_registry::{bind_role, ModuleManifest, Registry, RegistryError};

use crate::engine::{Mapper, MapperBuilder, MappingError};

/// Role suffixes the registrar scans for, in this order.
pub const SERVICE_SUFFIX: &str = "Service";
pub const REPOSITORY_SUFFIX: &str = "Repository";

/// Static manifest of a module's mapping profiles.
pub struct MappingModule {
    pub module: &'static str,
    pub profiles: &'static [fn(&mut MapperBuilder) -> Result<(), MappingError>],
}

/// Startup composition failure; fatal, the process does not come up.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("mapping configuration failed: {0}")]
    Mapping(#[from] MappingError),
}

/// Register the shared dependencies: store bindings first, then service and
/// repository role registration, then the mapping engine (stored in the
/// registry for handler retrieval), then the diagnostics logger binding.
pub fn register(
    registry: &mut Registry,
    stores: &[fn(&mut Registry) -> Result<(), RegistryError>],
    modules: &[&ModuleManifest],
    mappings: &[&MappingModule],
) -> Result<Arc<Mapper>, ComposeError> {
    for bind in stores {
        bind(registry)?;
    }

    bind_role(SERVICE_SUFFIX, registry, modules)?;
    bind_role(REPOSITORY_SUFFIX, registry, modules)?;

    let mapper = Arc::new(build_mapper(mappings)?);
    registry.bind_instance("Mapper", Arc::clone(&mapper))?;

    let logger: Arc<dyn DiagnosticsLogger> = Arc::new(TracingLogger::default());
    registry.bind_instance("DiagnosticsLogger", logger)?;

    tracing::debug!(bindings = registry.len(), "composition complete");
    Ok(mapper)
}

/// Compile every profile of the given modules into one shared engine, with
/// the expression-mapping extension enabled.
pub fn build_mapper(mappings: &[&MappingModule]) -> Result<Mapper, MappingError> {
    let mut builder = MapperBuilder::new().with_expression_mapping();
    for module in mappings {
        for profile in module.profiles {
            profile(&mut builder)?;
        }
    }
    Ok(builder.build())
}
