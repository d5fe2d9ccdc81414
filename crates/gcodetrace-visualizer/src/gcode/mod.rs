//! G-code processing: tokenizer, line parser, modal state and interpreter

pub mod estimate;
pub mod modal;
pub mod parser;
pub mod report;
pub mod tokenizer;
pub mod virtualizer;

pub use estimate::{AxisRates, Estimates, Estimator};
pub use modal::ModalState;
pub use parser::{compute_checksum, parse_line, ParseOptions, ParsedLine, Word, WordValue};
pub use report::{EventCounts, FileStats, InvalidLine, SegmentKind, ToolChangeRecord};
pub use tokenizer::{scan_line, scan_line_into, TokenSet, Tokenizer};
pub use virtualizer::{Virtualizer, VirtualizerData, VirtualizerOptions};
