//! Workbook Source Module
//!
//! calamineのラッパーとして、入力ファイルの読み込みとテーブルの特定を行うモジュール。
//! セル値はcalamineから（数式セルはキャッシュされた計算結果）、
//! テーブル定義は`TableCatalog`から取得します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xlsx};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::XlsxTableError;
use crate::parser::TableCatalog;
use crate::security::SecurityConfig;
use crate::types::TableDef;

/// 特定されたテーブルと、そのワークシートのセル値
#[derive(Debug, Clone)]
pub(crate) struct LocatedTable {
    /// テーブル定義
    pub table: TableDef,
    /// ワークシート全体のセル値（絶対座標でアクセス）
    pub cells: Range<Data>,
}

/// 読み込み済みのワークブック
///
/// 入力全体をメモリに保持し、calamineとテーブルカタログの両方で共有します。
pub(crate) struct WorkbookSource {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// テーブル定義の一覧
    catalog: TableCatalog,
}

impl WorkbookSource {
    /// ファイルパスからワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookSource)` - 読み込みに成功した場合
    /// * `Err(XlsxTableError::NotFound)` - パスが存在しない、または通常ファイルでない場合
    /// * `Err(XlsxTableError::CorruptSource)` - XLSXとして解析できない場合
    pub fn open_path(path: &Path) -> Result<Self, XlsxTableError> {
        if !path.is_file() {
            return Err(XlsxTableError::NotFound {
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), "Loading Excel file");
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => XlsxTableError::NotFound {
                path: path.to_path_buf(),
            },
            _ => XlsxTableError::CorruptSource(format!("Cannot read {}: {}", path.display(), e)),
        })?;

        Self::open_reader(file)
    }

    /// 任意のリーダーからワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズ制限を適用してから解析します。
    pub fn open_reader<R: Read>(mut reader: R) -> Result<Self, XlsxTableError> {
        let security_config = SecurityConfig::default();

        let mut buffer = Vec::new();
        let bytes_read = reader
            .read_to_end(&mut buffer)
            .map_err(|e| XlsxTableError::CorruptSource(format!("Cannot read input: {}", e)))?;
        security_config.check_input_size(bytes_read as u64)?;

        let catalog = TableCatalog::new(Cursor::new(buffer.as_slice()))?;

        let workbook = match open_workbook_auto_from_rs(Cursor::new(buffer))? {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(XlsxTableError::CorruptSource(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        info!(bytes = bytes_read, "Excel file loaded successfully");
        Ok(Self { workbook, catalog })
    }

    /// すべてのワークシート名を取得（ワークブック内の順序）
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// 1904年エポックを使用するかどうか
    pub fn is_1904(&self) -> bool {
        self.catalog.is_1904()
    }

    /// ワークシートとテーブルを名前で特定する（大文字小文字を区別）
    ///
    /// # 戻り値
    ///
    /// * `Ok(LocatedTable)` - テーブル定義とワークシートのセル値
    /// * `Err(XlsxTableError::WorksheetNotFound)` - ワークシートが存在しない場合
    /// * `Err(XlsxTableError::TableNotFound)` - ワークシート内にテーブルが存在しない場合
    pub fn locate(
        &mut self,
        worksheet: &str,
        table_name: &str,
    ) -> Result<LocatedTable, XlsxTableError> {
        let sheet_names = self.sheet_names();
        if !sheet_names.iter().any(|name| name == worksheet) {
            return Err(XlsxTableError::WorksheetNotFound {
                name: worksheet.to_string(),
                available: sheet_names,
            });
        }
        info!(worksheet, "Worksheet found and validated");

        let tables = self.catalog.tables_in(worksheet).unwrap_or(&[]);
        let table = tables
            .iter()
            .find(|table| table.matches(table_name))
            .cloned()
            .ok_or_else(|| XlsxTableError::TableNotFound {
                name: table_name.to_string(),
                worksheet: worksheet.to_string(),
                available: tables
                    .iter()
                    .map(|table| table.display_name.clone())
                    .collect(),
            })?;
        let (rows, columns) = table.range.size();
        info!(
            table = %table.name,
            range = %table.range,
            rows,
            columns,
            "Table found"
        );

        let cells = self.workbook.worksheet_range(worksheet)?;
        debug!(
            worksheet,
            start = ?cells.start(),
            end = ?cells.end(),
            "worksheet cells loaded"
        );

        Ok(LocatedTable { table, cells })
    }
}

// ワークブック全体を使うテストは統合テスト（tests/）で実装します。
