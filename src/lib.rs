//! xlsxtable - Export a named Excel table as a flat JSON array
//!
//! This crate reads a named table (Excel "Format as Table" object) from a worksheet
//! of an XLSX workbook and writes its data rows as a JSON array of objects, one
//! object per row, keyed by the table's header cells. Cell values are normalized:
//! empty cells become `null`, integral numbers become JSON integers and dates
//! become ISO 8601 strings.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxtable::{ConverterBuilder, DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_PATH};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Worksheet "Tools", table "Tools"
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // data/QA.xlsx -> data/tools.json
//!     let summary = converter.convert_file(DEFAULT_SOURCE_PATH, DEFAULT_OUTPUT_PATH)?;
//!     println!("{} records written", summary.records);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxtable::{ConverterBuilder, DateFormat, DuplicateHeaders};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_worksheet("Inventory")
//!         .with_table("Items")
//!         .with_duplicate_headers(DuplicateHeaders::Reject)
//!         .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
//!         .build()?;
//!
//!     let input = File::open("inventory.xlsx")?;
//!     let json = converter.convert_to_string(input)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Working with Records
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxtable::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     let document = converter.extract(File::open("data/QA.xlsx")?)?;
//!
//!     for record in document.records() {
//!         println!("{:?}", record.get("Name"));
//!     }
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod error;
mod extract;
mod normalize;
mod output;
mod parser;
mod security;
mod types;

// 公開API
pub use api::{
    DateFormat, DuplicateHeaders, DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_PATH, DEFAULT_TABLE,
    DEFAULT_WORKSHEET,
};
pub use builder::{ConversionSummary, Converter, ConverterBuilder};
pub use error::XlsxTableError;
pub use types::{OutputDocument, Record};
