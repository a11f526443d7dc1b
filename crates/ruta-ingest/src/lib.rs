//! Ruta Ingest - Connection file ingestion
//!
//! Turns line-oriented connection files (`source,target,weight`) into
//! validated edges and loads them into a tenant's graph. All validation
//! the graph core relies on happens here: weights are non-negative and
//! fit in 32 bits, location names are non-empty.

mod error;
mod loader;
mod parser;

pub use error::{IngestError, Result};
pub use loader::{load_connections, load_file, LoadSummary, DEFAULT_TENANT};
pub use parser::{parse_connections, read_connections};
