//! Dataset ingestion from raw sources to named, typed columns.

pub mod header;
pub mod schema;
pub mod source;

pub use header::{DataBatch, HeaderStrategy, resolve_header};
pub use schema::{ColumnType, infer_schema};
pub use source::{
    DataSource, DataSourceInfo, DelimitedSource, JsonSource, JsonlSource, RawSheet, SourceFormat,
    WorkbookSource, open_source,
};
