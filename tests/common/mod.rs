//! テスト用フィクスチャ
//!
//! `rust_xlsxwriter`で生成するワークブックと、パッケージを直接組み立てるワークブックの
//! 2種類を提供します。後者はヘッダーのみのテーブル、数式のキャッシュ値、
//! 1904年エポックなど、`rust_xlsxwriter`では表現しにくいケースに使用します。

#![allow(dead_code)]

use rust_xlsxwriter::{ExcelDateTime, Format, Table, TableColumn, Workbook, XlsxError};
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};

/// `Tools`ワークシートに`Tools`テーブルを持つワークブックを生成
///
/// `headers`を1行目、`rows`を2行目以降に書き込み、全体をテーブルとして登録します。
pub fn tools_workbook(headers: &[&str], rows: &[Vec<Value>]) -> Result<Vec<u8>, XlsxError> {
    table_workbook("Tools", "Tools", headers, rows)
}

/// 任意のワークシート名・テーブル名でテーブルを持つワークブックを生成
pub fn table_workbook(
    sheet_name: &str,
    table_name: &str,
    headers: &[&str],
    rows: &[Vec<Value>],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let time_format = Format::new().set_num_format("hh:mm:ss");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let columns: Vec<TableColumn> = headers
        .iter()
        .map(|header| TableColumn::new().set_header(*header))
        .collect();
    let table = Table::new().set_name(table_name).set_columns(&columns);
    worksheet.add_table(
        0,
        0,
        rows.len() as u32,
        headers.len() as u16 - 1,
        &table,
    )?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            match value {
                Value::Str(text) => {
                    worksheet.write_string(row_num, col, *text)?;
                }
                Value::Num(number) => {
                    worksheet.write_number(row_num, col, *number)?;
                }
                Value::Bool(flag) => {
                    worksheet.write_boolean(row_num, col, *flag)?;
                }
                Value::Date(year, month, day) => {
                    let date = ExcelDateTime::from_ymd(*year, *month, *day)?;
                    worksheet.write_datetime_with_format(row_num, col, &date, &date_format)?;
                }
                Value::DateTime(year, month, day, hour, min, sec) => {
                    let datetime = ExcelDateTime::from_ymd(*year, *month, *day)?
                        .and_hms(*hour, *min, *sec)?;
                    worksheet.write_datetime_with_format(
                        row_num,
                        col,
                        &datetime,
                        &datetime_format,
                    )?;
                }
                Value::Time(hour, min, sec) => {
                    let time = ExcelDateTime::from_hms(*hour, *min, *sec)?;
                    worksheet.write_datetime_with_format(row_num, col, &time, &time_format)?;
                }
                Value::Blank => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// `rust_xlsxwriter`フィクスチャのセル値
#[derive(Debug, Clone)]
pub enum Value {
    Str(&'static str),
    Num(f64),
    Bool(bool),
    Date(u16, u8, u8),
    DateTime(u16, u8, u8, u16, u8, u8),
    Time(u16, u8, u8),
    Blank,
}

/// 直接組み立てるパッケージのセル値
#[derive(Debug, Clone)]
pub enum RawCell {
    /// インライン文字列
    Str(String),
    /// 数値（標準書式）
    Num(f64),
    /// 真偽値
    Bool(bool),
    /// 日付書式（組み込み書式14）のシリアル値
    Date(f64),
    /// 日時書式（組み込み書式22）のシリアル値
    DateTime(f64),
    /// 数式とキャッシュされた数値
    Formula(String, f64),
    /// エラー値（`#DIV/0!`など）
    Error(String),
}

impl RawCell {
    pub fn str(text: &str) -> Self {
        RawCell::Str(text.to_string())
    }
}

/// テーブル定義
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub display_name: String,
    pub reference: String,
    pub columns: Vec<String>,
}

impl RawTable {
    pub fn new(name: &str, reference: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            reference: reference.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }
}

/// ワークシート定義
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub name: String,
    pub cells: Vec<(String, RawCell)>,
    pub tables: Vec<RawTable>,
}

impl RawSheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn cell(mut self, reference: &str, value: RawCell) -> Self {
        self.cells.push((reference.to_string(), value));
        self
    }

    pub fn table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }
}

/// XLSXパッケージを直接組み立てるビルダー
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    sheets: Vec<RawSheet>,
    date1904: bool,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, sheet: RawSheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn date1904(mut self, enabled: bool) -> Self {
        self.date1904 = enabled;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let mut add = |name: &str, content: String| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        add("[Content_Types].xml", self.content_types());
        add(
            "_rels/.rels",
            relationships(&[(
                "rId1",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
                "xl/workbook.xml",
            )]),
        );
        add("xl/workbook.xml", self.workbook_xml());
        add("xl/_rels/workbook.xml.rels", self.workbook_rels());
        add("xl/styles.xml", STYLES_XML.to_string());

        let mut table_index = 0;
        for (sheet_index, sheet) in self.sheets.iter().enumerate() {
            let sheet_number = sheet_index + 1;
            add(
                &format!("xl/worksheets/sheet{}.xml", sheet_number),
                sheet_xml(sheet),
            );

            if sheet.tables.is_empty() {
                continue;
            }
            let mut rels = Vec::new();
            for table in &sheet.tables {
                table_index += 1;
                add(
                    &format!("xl/tables/table{}.xml", table_index),
                    table_xml(table, table_index),
                );
                rels.push((
                    format!("rId{}", rels.len() + 1),
                    format!("../tables/table{}.xml", table_index),
                ));
            }
            let rel_refs: Vec<(&str, &str, &str)> = rels
                .iter()
                .map(|(id, target)| {
                    (
                        id.as_str(),
                        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table",
                        target.as_str(),
                    )
                })
                .collect();
            add(
                &format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_number),
                relationships(&rel_refs),
            );
        }

        zip.finish().unwrap().into_inner()
    }

    fn content_types(&self) -> String {
        let mut overrides = String::new();
        overrides.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
        overrides.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        let mut table_index = 0;
        for (index, sheet) in self.sheets.iter().enumerate() {
            overrides.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                index + 1
            ));
            for _ in &sheet.tables {
                table_index += 1;
                overrides.push_str(&format!(
                    r#"<Override PartName="/xl/tables/table{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"/>"#,
                    table_index
                ));
            }
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{}</Types>"#,
            overrides
        )
    }

    fn workbook_xml(&self) -> String {
        let sheets: String = self
            .sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| {
                format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    escape(&sheet.name),
                    index + 1,
                    index + 1
                )
            })
            .collect();
        let workbook_pr = if self.date1904 {
            r#"<workbookPr date1904="1"/>"#
        } else {
            "<workbookPr/>"
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}<sheets>{}</sheets></workbook>"#,
            workbook_pr, sheets
        )
    }

    fn workbook_rels(&self) -> String {
        let mut entries: Vec<(String, &str, String)> = self
            .sheets
            .iter()
            .enumerate()
            .map(|(index, _)| {
                (
                    format!("rId{}", index + 1),
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
                    format!("worksheets/sheet{}.xml", index + 1),
                )
            })
            .collect();
        entries.push((
            format!("rId{}", self.sheets.len() + 1),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
            "styles.xml".to_string(),
        ));
        let refs: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        relationships(&refs)
    }
}

/// 組み込み書式14（日付）と22（日時）を持つスタイル
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="22" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

fn relationships(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id, kind, target
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

fn sheet_xml(sheet: &RawSheet) -> String {
    let mut cells: Vec<(u32, u32, &String, &RawCell)> = sheet
        .cells
        .iter()
        .map(|(reference, value)| {
            let (row, col) = parse_a1(reference);
            (row, col, reference, value)
        })
        .collect();
    cells.sort_by_key(|(row, col, _, _)| (*row, *col));

    let mut rows = String::new();
    let mut current_row = None;
    for (row, _, reference, value) in cells {
        if current_row != Some(row) {
            if current_row.is_some() {
                rows.push_str("</row>");
            }
            rows.push_str(&format!(r#"<row r="{}">"#, row + 1));
            current_row = Some(row);
        }
        rows.push_str(&cell_xml(reference, value));
    }
    if current_row.is_some() {
        rows.push_str("</row>");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetData>{}</sheetData></worksheet>"#,
        rows
    )
}

fn cell_xml(reference: &str, value: &RawCell) -> String {
    match value {
        RawCell::Str(text) => format!(
            r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            reference,
            escape(text)
        ),
        RawCell::Num(number) => format!(r#"<c r="{}"><v>{}</v></c>"#, reference, number),
        RawCell::Bool(flag) => format!(
            r#"<c r="{}" t="b"><v>{}</v></c>"#,
            reference,
            if *flag { 1 } else { 0 }
        ),
        RawCell::Date(serial) => format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, reference, serial),
        RawCell::DateTime(serial) => {
            format!(r#"<c r="{}" s="2"><v>{}</v></c>"#, reference, serial)
        }
        RawCell::Formula(formula, cached) => format!(
            r#"<c r="{}"><f>{}</f><v>{}</v></c>"#,
            reference,
            escape(formula),
            cached
        ),
        RawCell::Error(code) => format!(
            r#"<c r="{}" t="e"><v>{}</v></c>"#,
            reference,
            escape(code)
        ),
    }
}

fn table_xml(table: &RawTable, id: usize) -> String {
    let columns: String = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            format!(
                r#"<tableColumn id="{}" name="{}"/>"#,
                index + 1,
                escape(name)
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="{}" name="{}" displayName="{}" ref="{}" totalsRowShown="0"><autoFilter ref="{}"/><tableColumns count="{}">{}</tableColumns><tableStyleInfo name="TableStyleMedium2" showFirstColumn="0" showLastColumn="0" showRowStripes="1" showColumnStripes="0"/></table>"#,
        id,
        escape(&table.name),
        escape(&table.display_name),
        table.reference,
        table.reference,
        table.columns.len(),
        columns
    )
}

/// `B3`形式のセル参照を0始まりの(row, col)に変換
fn parse_a1(reference: &str) -> (u32, u32) {
    let letters: String = reference.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &reference[letters.len()..];
    let col = letters
        .chars()
        .fold(0u32, |acc, c| acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1));
    let row: u32 = digits.parse().unwrap();
    (row - 1, col - 1)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
