//! Table Catalog Module
//!
//! XLSX内部のXMLファイルから、ワークシートとテーブル定義の対応関係を抽出するモジュール。
//! calamineはテーブルのヘッダー行を含む宣言範囲を公開しないため、
//! `xl/workbook.xml`、リレーションシップ、`xl/tables/*.xml`を直接解析します。

use std::io::{Read, Seek};

use quick_xml::escape::unescape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::XlsxTableError;
use crate::security::SecurityConfig;
use crate::types::{CellRange, TableDef};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// リレーションシップ（`<Relationship Id=".." Type=".." Target=".."/>`）
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

impl Relationship {
    fn is_table(&self) -> bool {
        self.rel_type.ends_with("/table")
    }
}

/// ワークシートとそのテーブル定義
#[derive(Debug, Clone)]
struct SheetTables {
    name: String,
    tables: Vec<TableDef>,
}

/// ワークブック内のテーブル定義の一覧
///
/// ワークシートはワークブック内の順序、テーブルはワークシートの
/// リレーションシップファイル内の順序で保持します。
#[derive(Debug, Clone)]
pub(crate) struct TableCatalog {
    sheets: Vec<SheetTables>,
    is_1904: bool,
}

impl TableCatalog {
    /// XLSXファイル（ZIPアーカイブ）からテーブル定義を解析
    ///
    /// # 戻り値
    ///
    /// * `Ok(TableCatalog)` - 解析に成功した場合
    /// * `Err(XlsxTableError::CorruptSource)` - ZIPまたはXMLが不正な場合
    pub fn new<R: Read + Seek>(xlsx_reader: R) -> Result<Self, XlsxTableError> {
        let mut archive = ZipArchive::new(xlsx_reader)?;
        SecurityConfig::default().check_archive(&mut archive)?;

        let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?.ok_or_else(|| {
            XlsxTableError::CorruptSource(format!("Missing package part: {}", WORKBOOK_PART))
        })?;
        let (sheet_refs, is_1904) = parse_workbook(&workbook_xml)?;

        let workbook_rels = match read_part(&mut archive, WORKBOOK_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => Vec::new(),
        };

        let mut sheets = Vec::with_capacity(sheet_refs.len());
        for (sheet_name, rel_id) in sheet_refs {
            let sheet_part = workbook_rels
                .iter()
                .find(|rel| rel.id == rel_id)
                .map(|rel| resolve_target("xl", &rel.target));

            let tables = match sheet_part {
                Some(part) => Self::read_sheet_tables(&mut archive, &sheet_name, &part)?,
                None => Vec::new(),
            };

            debug!(
                sheet = %sheet_name,
                tables = tables.len(),
                "parsed worksheet table parts"
            );
            sheets.push(SheetTables {
                name: sheet_name,
                tables,
            });
        }

        Ok(Self { sheets, is_1904 })
    }

    /// 指定したワークシートのテーブル定義
    ///
    /// ワークシートが存在しない場合は`None`を返します。
    pub fn tables_in(&self, sheet_name: &str) -> Option<&[TableDef]> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == sheet_name)
            .map(|sheet| sheet.tables.as_slice())
    }

    /// 1904年エポックを使用するかどうか
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }

    /// ワークシートのリレーションシップからテーブル定義を読み込む
    fn read_sheet_tables<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        sheet_name: &str,
        sheet_part: &str,
    ) -> Result<Vec<TableDef>, XlsxTableError> {
        let (sheet_dir, sheet_file) = split_part(sheet_part);
        let rels_part = if sheet_dir.is_empty() {
            format!("_rels/{}.rels", sheet_file)
        } else {
            format!("{}/_rels/{}.rels", sheet_dir, sheet_file)
        };

        let relationships = match read_part(archive, &rels_part)? {
            Some(xml) => parse_relationships(&xml)?,
            None => return Ok(Vec::new()),
        };

        let mut tables = Vec::new();
        for rel in relationships.iter().filter(|rel| rel.is_table()) {
            let table_part = resolve_target(sheet_dir, &rel.target);
            let xml = read_part(archive, &table_part)?.ok_or_else(|| {
                XlsxTableError::CorruptSource(format!("Missing package part: {}", table_part))
            })?;
            tables.push(parse_table(&xml, sheet_name)?);
        }

        Ok(tables)
    }
}

/// ZIPエントリを読み込む（存在しない場合は`None`）
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, XlsxTableError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = Vec::new();
    file.read_to_end(&mut content).map_err(|e| {
        XlsxTableError::CorruptSource(format!("Failed to read package part '{}': {}", name, e))
    })?;
    Ok(Some(content))
}

/// パーツ名をディレクトリとファイル名に分割（例: "xl/worksheets/sheet1.xml"）
fn split_part(part: &str) -> (&str, &str) {
    match part.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", part),
    }
}

/// リレーションシップのターゲットをパッケージ内の絶対パーツ名に解決
///
/// `/xl/worksheets/sheet1.xml`のような絶対指定と、`../tables/table1.xml`のような
/// 相対指定の両方に対応します。
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if base_dir.is_empty() => target.to_string(),
        None => format!("{}/{}", base_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// 属性値をUTF-8として解釈し、実体参照を展開する
fn attr_string(attr: &Attribute<'_>) -> Result<String, XlsxTableError> {
    let raw = std::str::from_utf8(&attr.value)?;
    Ok(unescape(raw)?.into_owned())
}

/// xl/workbook.xml の解析
///
/// `<sheet name=".." r:id=".."/>`の一覧と、`<workbookPr date1904="1"/>`を取得します。
fn parse_workbook(xml: &[u8]) -> Result<(Vec<(String, String)>, bool), XlsxTableError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut is_1904 = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let mut name = None;
                    let mut rel_id = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let key = attr.key;
                        match key.local_name().as_ref() {
                            b"name" if key.prefix().is_none() => name = Some(attr_string(&attr)?),
                            b"id" if key.prefix().is_some() => rel_id = Some(attr_string(&attr)?),
                            _ => {}
                        }
                    }
                    if let (Some(name), Some(rel_id)) = (name, rel_id) {
                        sheets.push((name, rel_id));
                    }
                }
                b"workbookPr" => {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"date1904" {
                            let value = std::str::from_utf8(&attr.value)?;
                            is_1904 = value == "1" || value == "true";
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, is_1904))
}

/// リレーションシップファイルの解析（ファイル内の順序を保持）
fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, XlsxTableError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut rel_type = String::new();
                let mut target = None;

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr_string(&attr)?),
                        b"Type" => rel_type = attr_string(&attr)?,
                        b"Target" => target = Some(attr_string(&attr)?),
                        _ => {}
                    }
                }

                // IDまたはターゲットが欠落しているものは参照できないため無視
                if let (Some(id), Some(target)) = (id, target) {
                    relationships.push(Relationship {
                        id,
                        rel_type,
                        target,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// xl/tables/tableN.xml の解析
fn parse_table(xml: &[u8], sheet_name: &str) -> Result<TableDef, XlsxTableError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut name = None;
    let mut display_name = None;
    let mut reference = None;
    let mut columns = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"table" => {
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"name" => name = Some(attr_string(&attr)?),
                            b"displayName" => display_name = Some(attr_string(&attr)?),
                            b"ref" => reference = Some(attr_string(&attr)?),
                            _ => {}
                        }
                    }
                }
                b"tableColumn" => {
                    let mut column = String::new();
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"name" {
                            column = attr_string(&attr)?;
                        }
                    }
                    columns.push(column);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let name = name
        .or_else(|| display_name.clone())
        .ok_or_else(|| XlsxTableError::CorruptSource("Table definition has no name".to_string()))?;
    let display_name = display_name.unwrap_or_else(|| name.clone());
    let reference = reference.ok_or_else(|| {
        XlsxTableError::CorruptSource(format!("Table '{}' has no ref attribute", name))
    })?;
    let range = CellRange::parse_ref(&reference).ok_or_else(|| {
        XlsxTableError::CorruptSource(format!(
            "Table '{}' has an invalid range reference: '{}'",
            name, reference
        ))
    })?;

    Ok(TableDef {
        name,
        display_name,
        worksheet: sheet_name.to_string(),
        range,
        columns,
    })
}
