//! Parser Module
//!
//! calamineとXMLメタデータ解析によるワークブック読み込みとテーブル特定。

mod tables;
mod workbook;

pub(crate) use tables::TableCatalog;
pub(crate) use workbook::{LocatedTable, WorkbookSource};
