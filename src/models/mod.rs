pub mod cell;
pub mod gviz;
pub mod record;

pub use cell::CellValue;
pub use gviz::{GvizCell, GvizColumn, GvizDocument, GvizIssue, GvizRow, GvizTable};
pub use record::NormalizedRecord;
