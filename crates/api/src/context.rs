//! Per-request context types and shared handler dependencies.

use std::sync::Arc;

use uuid::Uuid;

use armature_core::{DomainError, DomainResult, UserId};
use armature_mapping::Mapper;
use armature_observability::DiagnosticsLogger;

/// Dependencies every request handler shares: a logger and the mapping
/// engine. An explicit struct passed by extension instead of a handler base
/// class; both dependencies are required and their absence fails immediately,
/// naming the parameter.
pub struct HandlerDeps {
    logger: Arc<dyn DiagnosticsLogger>,
    mapper: Arc<Mapper>,
}

impl HandlerDeps {
    pub fn new(
        logger: Option<Arc<dyn DiagnosticsLogger>>,
        mapper: Option<Arc<Mapper>>,
    ) -> DomainResult<Self> {
        let logger = logger.ok_or(DomainError::missing_argument("logger"))?;
        let mapper = mapper.ok_or(DomainError::missing_argument("mapper"))?;
        Ok(Self { logger, mapper })
    }

    pub fn logger(&self) -> &Arc<dyn DiagnosticsLogger> {
        &self.logger
    }

    pub fn mapper(&self) -> &Arc<Mapper> {
        &self.mapper
    }
}

impl core::fmt::Debug for HandlerDeps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerDeps").finish_non_exhaustive()
    }
}

/// Trace identifier assigned to every request; echoed as `x-trace-id` and
/// embedded in validation problem bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TraceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Principal context for a request. The scaffold configures no policies, so
/// requests without credentials proceed anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: Option<String>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self { subject: None }
    }

    pub fn bearer(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject.is_none()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Actor identity for audit stamps. Subjects that are not UUIDs (and
    /// anonymous requests) stamp as the nil user.
    pub fn user_id(&self) -> UserId {
        self.subject
            .as_deref()
            .and_then(|s| s.parse::<UserId>().ok())
            .unwrap_or(UserId::from_uuid(Uuid::nil()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armature_mapping::MapperBuilder;
    use armature_observability::{CaptureLogger, LogLevel};

    fn logger() -> Arc<dyn DiagnosticsLogger> {
        Arc::new(CaptureLogger::new(|_| {}, LogLevel::Critical))
    }

    fn mapper() -> Arc<Mapper> {
        Arc::new(MapperBuilder::new().build())
    }

    #[test]
    fn missing_logger_is_named() {
        let err = HandlerDeps::new(None, Some(mapper())).unwrap_err();
        assert_eq!(err, DomainError::MissingArgument("logger"));
    }

    #[test]
    fn missing_mapper_is_named() {
        let err = HandlerDeps::new(Some(logger()), None).unwrap_err();
        assert_eq!(err, DomainError::MissingArgument("mapper"));
    }

    #[test]
    fn both_dependencies_are_stored() {
        let deps = HandlerDeps::new(Some(logger()), Some(mapper())).unwrap();
        assert_eq!(deps.mapper().rule_count(), 0);
        assert!(deps.logger().enabled(LogLevel::Critical));
    }

    #[test]
    fn principal_actor_identity() {
        let id = UserId::new();
        assert_eq!(Principal::bearer(id.to_string()).user_id(), id);
        assert_eq!(
            Principal::anonymous().user_id(),
            UserId::from_uuid(Uuid::nil())
        );
        assert_eq!(
            Principal::bearer("not-a-uuid").user_id(),
            UserId::from_uuid(Uuid::nil())
        );
    }
}
