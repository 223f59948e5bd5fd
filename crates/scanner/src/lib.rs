/*
 * Table Extraction Engine - Scanner
 *
 * The scanner is responsible for:
 * 1. Building and executing the SELECT for each split in a chain
 * 2. Rendering fetched values to text and encoding delimited records
 * 3. Walking split chains sequentially with bounded resources
 * 4. Running whole tasks and reporting their outcome envelopes
 */

pub mod decode;
pub mod encoder;
pub mod executor;
pub mod scanner;
pub mod source;
pub mod sql;

pub use encoder::{encode_record, encode_value, FIELD_SEPARATOR, NULL_SENTINEL};
pub use executor::ScanExecutor;
pub use scanner::RowScanner;
pub use source::{MySqlRowSource, RowSource, RowStream};
pub use sql::{select_for_split, COMPOSITE_KEY_ALIAS};
