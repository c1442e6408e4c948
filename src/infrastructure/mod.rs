pub mod sink;
pub mod transport;

pub use sink::{JsonFileSink, SnapshotSink};
pub use transport::{HttpTransport, SheetTransport, TransportResponse};
