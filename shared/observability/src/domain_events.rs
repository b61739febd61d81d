//! Domain event logging for the discovery service.
//!
//! Provides structured logging for business domain events with consistent schema.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Result of a domain operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    Success,
    Failure,
    Partial,
    Skipped,
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Partial => write!(f, "partial"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Categories of domain events for filtering and routing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Query,
    Governor,
    Cache,
    Platform,
    Session,
    Ingestion,
    Api,
    System,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Governor => write!(f, "governor"),
            Self::Cache => write!(f, "cache"),
            Self::Platform => write!(f, "platform"),
            Self::Session => write!(f, "session"),
            Self::Ingestion => write!(f, "ingestion"),
            Self::Api => write!(f, "api"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A structured domain event for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    /// Specific event type (e.g., "session_materialized", "cache_hit")
    pub event_type: String,
    /// Entity type being operated on (e.g., "session", "creator")
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub result: OperationResult,
    pub duration_ms: Option<u64>,
    pub attempt: Option<u32>,
    pub error: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    /// Service that emitted the event
    pub service: String,
    /// Additional structured metadata
    pub metadata: Option<serde_json::Value>,
}

impl DomainEvent {
    pub fn new(service: impl Into<String>, category: EventCategory, event_type: impl Into<String>) -> DomainEventBuilder {
        DomainEventBuilder {
            service: service.into(),
            category,
            event_type: event_type.into(),
            entity_type: None,
            entity_id: None,
            result: OperationResult::Success,
            duration_ms: None,
            attempt: None,
            error: None,
            trace_id: None,
            span_id: None,
            metadata: None,
        }
    }
}

/// Builder for constructing domain events
pub struct DomainEventBuilder {
    service: String,
    category: EventCategory,
    event_type: String,
    entity_type: Option<String>,
    entity_id: Option<String>,
    result: OperationResult,
    duration_ms: Option<u64>,
    attempt: Option<u32>,
    error: Option<String>,
    trace_id: Option<String>,
    span_id: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl DomainEventBuilder {
    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn result(mut self, result: OperationResult) -> Self {
        self.result = result;
        self
    }

    pub fn success(mut self) -> Self {
        self.result = OperationResult::Success;
        self
    }

    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.result = OperationResult::Failure;
        self.error = Some(error.into());
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn trace(mut self, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self.span_id = Some(span_id.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Build and emit the event as a log
    pub fn emit(self) {
        let event = self.build();
        let json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());

        match event.result {
            OperationResult::Success => tracing::info!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "success",
                "DomainEvent: {}", json
            ),
            OperationResult::Failure => tracing::error!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "failure",
                error = ?event.error,
                "DomainEvent: {}", json
            ),
            OperationResult::Partial => tracing::warn!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "partial",
                "DomainEvent: {}", json
            ),
            OperationResult::Skipped => tracing::debug!(
                target: "domain_event",
                category = %event.category,
                event_type = %event.event_type,
                result = "skipped",
                "DomainEvent: {}", json
            ),
        }
    }

    pub fn build(self) -> DomainEvent {
        DomainEvent {
            timestamp: Utc::now(),
            category: self.category,
            event_type: self.event_type,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            result: self.result,
            duration_ms: self.duration_ms,
            attempt: self.attempt,
            error: self.error,
            trace_id: self.trace_id,
            span_id: self.span_id,
            service: self.service,
            metadata: self.metadata,
        }
    }
}

// ============================================================================
// Convenience functions for common domain events
// ============================================================================

/// Log a query normalization + digest computation
pub fn log_query_normalized(service: &str, digest_key: &str, normalized: &str) {
    DomainEvent::new(service, EventCategory::Query, "normalized")
        .entity("digest", digest_key)
        .metadata(serde_json::json!({ "normalized": normalized }))
        .success()
        .emit();
}

/// Log a governor decision (token or quota)
pub fn log_governor_decision(service: &str, governor: &str, decision: &str, used: u64, budget: u64) {
    DomainEvent::new(service, EventCategory::Governor, "decision")
        .entity("governor", governor)
        .metadata(serde_json::json!({ "decision": decision, "used": used, "budget": budget }))
        .success()
        .emit();
}

/// Log a cache hit or miss on the query-digest or channel metadata cache
pub fn log_cache_lookup(service: &str, cache: &str, key: &str, hit: bool, tier: &str) {
    DomainEvent::new(service, EventCategory::Cache, if hit { "hit" } else { "miss" })
        .entity(cache, key)
        .metadata(serde_json::json!({ "tier": tier }))
        .success()
        .emit();
}

/// Log a platform search adapter call
pub fn log_platform_search(service: &str, platform: &str, query_count: usize, units_spent: u64, duration_ms: u64) {
    DomainEvent::new(service, EventCategory::Platform, "search_executed")
        .entity("platform", platform)
        .duration_ms(duration_ms)
        .metadata(serde_json::json!({ "query_count": query_count, "units_spent": units_spent }))
        .success()
        .emit();
}

/// Log session materialization
pub fn log_session_materialized(service: &str, session_id: &str, result_count: usize, duration_ms: u64) {
    DomainEvent::new(service, EventCategory::Session, "materialized")
        .entity("session", session_id)
        .duration_ms(duration_ms)
        .metadata(serde_json::json!({ "result_count": result_count }))
        .success()
        .emit();
}

/// Log creator ingestion outcome
pub fn log_ingestion_outcome(service: &str, channel_id: &str, status: &str, error: Option<&str>) {
    let mut builder = DomainEvent::new(service, EventCategory::Ingestion, "ingested")
        .entity("creator", channel_id)
        .metadata(serde_json::json!({ "status": status }));

    builder = if let Some(err) = error {
        builder.failure(err)
    } else {
        builder.success()
    };

    builder.emit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_event_builder() {
        let event = DomainEvent::new("discover-backend", EventCategory::Session, "materialized")
            .entity("session", "123")
            .duration_ms(100)
            .success()
            .build();

        assert_eq!(event.service, "discover-backend");
        assert_eq!(event.event_type, "materialized");
        assert_eq!(event.entity_id, Some("123".to_string()));
        assert_eq!(event.result, OperationResult::Success);
    }
}
