//! Record-level machinery: logical-record reassembly, qualified-value
//! scanning, escape repair, and delimiter-count validation.

mod count;
mod escape;
mod reassemble;
mod scan;

pub use count::{BadDelimiterRecord, DelimiterClass, true_delimiter_count};
pub use escape::{BadEscapeRecord, has_unescaped_qualifiers};
pub use reassemble::{LogicalRecord, RecordReassembler};
pub use scan::{QualifiedValue, extract_qualified_values};
