//! netcomply-core: Compliance verification engine
//!
//! Checks each inventory device for completeness, resolves the query
//! identifiers for its type, collects live attributes, reconciles them with
//! the inventory and routes every failure to its reporting sinks.

pub mod collect;
pub mod compare;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod resolve;
pub mod taxonomy;
pub mod types;
pub mod validate;

pub use collect::TelemetryCollector;
pub use compare::{Check, Comparator, MAX_UPTIME_TICKS};
pub use config::{FleetConfig, TICKS_PER_DAY};
pub use error::{CoreError, PassError};
pub use orchestrator::{FailedDevice, FleetOrchestrator, FleetReport};
pub use report::{
    DispatchSummary, JsonLinesReporter, LogReporter, ReportError, ReportRecord, ReportRouter,
    Reporter, ReporterRegistry, WebhookReporter,
};
pub use resolve::{MappingResolver, query_map_from_record};
pub use taxonomy::{Category, ComplianceError, ErrorContext, ErrorKind, UnknownErrorKind};
pub use types::{Attribute, AttributeQueryMap, DeviceRecord, LiveSnapshot};
pub use validate::validate_device;
