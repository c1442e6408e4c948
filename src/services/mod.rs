pub mod envelope_parser;
pub mod table_normalizer;
pub mod weighted_detector;

pub use envelope_parser::parse_envelope;
pub use table_normalizer::{normalize_table, NormalizedTable};
pub use weighted_detector::WeightedColumnDetector;
