//! Row Extractor Module
//!
//! テーブル範囲からヘッダー行とデータ行を読み出し、レコード列を構築するモジュール。
//! 範囲の先頭行がヘッダー、それ以降の行がすべてデータ行です。

use std::collections::HashSet;

use calamine::{Data, Range};
use tracing::{debug, info, warn};

use crate::api::DuplicateHeaders;
use crate::error::XlsxTableError;
use crate::normalize::ValueNormalizer;
use crate::types::{OutputDocument, Record, TableDef};

/// 抽出結果
#[derive(Debug, Clone)]
pub(crate) struct ExtractedTable {
    /// ヘッダー（列順、重複を含む）
    pub headers: Vec<String>,
    /// 正規化済みのレコード列
    pub document: OutputDocument,
}

/// テーブルのヘッダー行を読み出す
///
/// ヘッダーセルの値はそのまま使用します（トリムや大文字小文字の正規化はしない）。
/// セルが空の場合はテーブル定義の列名、それもなければExcelの既定名
/// （`Column1`, `Column2`, ...）を使用します。
pub(crate) fn read_headers(
    cells: &Range<Data>,
    table: &TableDef,
    normalizer: &ValueNormalizer,
) -> Vec<String> {
    let header_row = table.range.start.row;

    (table.range.start.col..=table.range.end.col)
        .enumerate()
        .map(|(position, col)| {
            normalizer
                .header_text(cells.get_value((header_row, col)))
                .or_else(|| {
                    table
                        .columns
                        .get(position)
                        .filter(|name| !name.is_empty())
                        .cloned()
                })
                .unwrap_or_else(|| {
                    debug!(position, "empty header cell without column name");
                    format!("Column{}", position + 1)
                })
        })
        .collect()
}

/// データ行を上から順に読み出す
///
/// 各行はヘッダーと同じ列数を持ち、値のないセルは`None`になります。
pub(crate) fn data_rows<'a>(
    cells: &'a Range<Data>,
    table: &'a TableDef,
) -> impl Iterator<Item = Vec<Option<&'a Data>>> + 'a {
    let first_data_row = table.range.start.row + 1;

    (first_data_row..=table.range.end.row).map(move |row| {
        (table.range.start.col..=table.range.end.col)
            .map(move |col| cells.get_value((row, col)))
            .collect()
    })
}

/// 重複ヘッダーを検査する
fn check_duplicates(
    headers: &[String],
    table: &TableDef,
    policy: DuplicateHeaders,
) -> Result<(), XlsxTableError> {
    let mut seen = HashSet::new();
    for header in headers {
        if seen.insert(header.as_str()) {
            continue;
        }
        match policy {
            DuplicateHeaders::Reject => {
                return Err(XlsxTableError::DuplicateHeader {
                    header: header.clone(),
                    table: table.name.clone(),
                });
            }
            DuplicateHeaders::LastWins => {
                warn!(
                    header = %header,
                    table = %table.name,
                    worksheet = %table.worksheet,
                    "Duplicate header; the last column's value wins"
                );
            }
        }
    }
    Ok(())
}

/// テーブル全体をレコード列に変換する
///
/// # 戻り値
///
/// * `Ok(ExtractedTable)` - ヘッダーとレコード列
/// * `Err(XlsxTableError::DuplicateHeader)` - 重複を拒否する設定で重複を検出した場合
pub(crate) fn extract_table(
    cells: &Range<Data>,
    table: &TableDef,
    normalizer: &ValueNormalizer,
    policy: DuplicateHeaders,
) -> Result<ExtractedTable, XlsxTableError> {
    let headers = read_headers(cells, table, normalizer);
    info!(count = headers.len(), headers = ?headers, "Parsed headers");
    check_duplicates(&headers, table, policy)?;

    let records: Vec<Record> = data_rows(cells, table)
        .map(|row| {
            let mut record = Record::new();
            for (header, cell) in headers.iter().zip(row) {
                record.insert(header.clone(), normalizer.normalize(cell));
            }
            record
        })
        .collect();
    info!(rows = records.len(), "Extracted data rows from table");

    Ok(ExtractedTable {
        headers,
        document: OutputDocument::new(records),
    })
}
