pub mod decoder;
pub mod gateway;
pub mod preview;
pub mod registry;
pub mod session;
pub mod types;
pub mod validator;

pub use decoder::SpreadsheetDecoder;
pub use gateway::SubmissionGateway;
pub use preview::{project_preview, Preview, DEFAULT_PREVIEW_ROWS};
pub use registry::SchemaRegistry;
pub use session::{SessionState, UploadSession};
pub use types::{
    ColumnDescriptor, DecodedSheet, RawRow, SubmissionReceipt, UploadTypeDescriptor,
    ValidatedBatch, ValidationOutcome,
};
pub use validator::{missing_columns, validate};
