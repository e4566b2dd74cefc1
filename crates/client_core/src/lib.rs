pub mod config;
pub mod error;
pub mod requests;
pub mod store;
pub mod transport;

pub use config::{load_transport_config, TransportConfig};
pub use error::{ClientError, RequestSummary};
pub use requests::{
    decode_grouping_result, request_group_phrases, request_health_check, GroupingBackend,
};
pub use store::{ClusterizerState, ClusterizerStore, ErrorReporting, StoreEvent, StoreOptions};
pub use transport::{
    diagnose, log_error, user_message, Diagnostic, DiagnosticCase, Transport,
    FALLBACK_ERROR_MESSAGE,
};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
