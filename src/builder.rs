//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use crate::api::{DateFormat, DuplicateHeaders, DEFAULT_TABLE, DEFAULT_WORKSHEET};
use crate::error::XlsxTableError;
use crate::extract::{extract_table, ExtractedTable};
use crate::normalize::ValueNormalizer;
use crate::parser::WorkbookSource;
use crate::types::OutputDocument;
use chrono::format::{Item, StrftimeItems};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 対象のワークシート名（大文字小文字を区別）
    pub worksheet: String,

    /// 対象のテーブル名（大文字小文字を区別）
    pub table: String,

    /// 重複ヘッダーの扱い
    pub duplicate_headers: DuplicateHeaders,

    /// 日付形式
    pub date_format: DateFormat,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            worksheet: DEFAULT_WORKSHEET.to_string(),
            table: DEFAULT_TABLE.to_string(),
            duplicate_headers: DuplicateHeaders::LastWins,
            date_format: DateFormat::Iso8601,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxtable::{ConverterBuilder, DuplicateHeaders};
///
/// # fn main() -> Result<(), xlsxtable::XlsxTableError> {
/// let converter = ConverterBuilder::new()
///     .with_worksheet("Inventory")
///     .with_table("Items")
///     .with_duplicate_headers(DuplicateHeaders::Reject)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - ワークシート: `Tools`
    /// - テーブル: `Tools`
    /// - 重複ヘッダー: 後の列の値で上書き
    /// - 日付形式: ISO 8601
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 対象のワークシート名を指定する
    pub fn with_worksheet(mut self, name: impl Into<String>) -> Self {
        self.config.worksheet = name.into();
        self
    }

    /// 対象のテーブル名を指定する
    ///
    /// テーブルの`name`または`displayName`と一致すれば選択されます。
    pub fn with_table(mut self, name: impl Into<String>) -> Self {
        self.config.table = name.into();
        self
    }

    /// 重複ヘッダーの扱いを指定する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxtable::{ConverterBuilder, DuplicateHeaders};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_duplicate_headers(DuplicateHeaders::Reject);
    /// ```
    pub fn with_duplicate_headers(mut self, policy: DuplicateHeaders) -> Self {
        self.config.duplicate_headers = policy;
        self
    }

    /// 日付の出力形式を指定する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxtable::{ConverterBuilder, DateFormat};
    ///
    /// // ISO 8601形式（デフォルト）
    /// let builder = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Iso8601);
    ///
    /// // カスタム形式
    /// let builder = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%Y年%m月%d日".to_string()));
    /// ```
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合、Converterインスタンス
    /// * `Err(XlsxTableError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * ワークシート名またはテーブル名が空
    /// * カスタム日付形式が空、または不正な書式指定子を含む
    pub fn build(self) -> Result<Converter, XlsxTableError> {
        // 1. 名前の検証
        if self.config.worksheet.is_empty() {
            return Err(XlsxTableError::Config(
                "Worksheet name must not be empty".to_string(),
            ));
        }
        if self.config.table.is_empty() {
            return Err(XlsxTableError::Config(
                "Table name must not be empty".to_string(),
            ));
        }

        // 2. カスタム日付形式の検証
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            let invalid = format_str.is_empty()
                || StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(XlsxTableError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        // 3. Converterインスタンス生成
        Ok(Converter::new(self.config))
    }
}

/// ファイル変換の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// 書き出したレコード数
    pub records: usize,
    /// テーブルのヘッダー（列順）
    pub headers: Vec<String>,
    /// 出力先パス
    pub output: PathBuf,
}

/// 変換処理のファサード
///
/// ワークブック内のテーブルをJSONレコード配列に変換するためのメインエントリーポイントです。
/// 処理は読み込み、テーブル特定、行抽出、値の正規化、書き出しの順に進み、
/// いずれかの段階で失敗した場合は以降の段階を実行しません。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxtable::ConverterBuilder;
///
/// # fn main() -> Result<(), xlsxtable::XlsxTableError> {
/// let converter = ConverterBuilder::new().build()?;
/// let summary = converter.convert_file("data/QA.xlsx", "data/tools.json")?;
/// println!("{} records", summary.records);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// 読み込み済みのワークブックからテーブルを抽出する
    fn extract_from(&self, mut source: WorkbookSource) -> Result<ExtractedTable, XlsxTableError> {
        let located = source.locate(&self.config.worksheet, &self.config.table)?;
        let normalizer = ValueNormalizer::new(self.config.date_format.clone(), source.is_1904());

        extract_table(
            &located.cells,
            &located.table,
            &normalizer,
            self.config.duplicate_headers,
        )
    }

    /// 入力からテーブルを読み出し、レコード列を返す
    ///
    /// # 戻り値
    ///
    /// * `Ok(OutputDocument)` - テーブルのデータ行（ヘッダーのみの場合は空）
    /// * `Err(XlsxTableError)` - 読み込み、テーブル特定、抽出のいずれかで失敗した場合
    pub fn extract<R: Read>(&self, input: R) -> Result<OutputDocument, XlsxTableError> {
        let source = WorkbookSource::open_reader(input)?;
        Ok(self.extract_from(source)?.document)
    }

    /// 入力を変換し、JSONをライターに書き出す
    ///
    /// ドキュメント全体を構築してから書き出すため、変換に失敗した場合は
    /// ライターに何も書き込みません。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxtable::ConverterBuilder;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let input = File::open("data/QA.xlsx")?;
    /// converter.convert(input, std::io::stdout())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read, W: Write>(&self, input: R, mut output: W) -> Result<(), XlsxTableError> {
        let document = self.extract(input)?;
        crate::output::render(&document, &mut output).map_err(|source| XlsxTableError::Write {
            path: PathBuf::from("<writer>"),
            source,
        })
    }

    /// 入力を変換し、JSON文字列を返す
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use xlsxtable::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let input = File::open("data/QA.xlsx")?;
    /// let json = converter.convert_to_string(input)?;
    /// println!("{}", json);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_string<R: Read>(&self, input: R) -> Result<String, XlsxTableError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;

        // serde_jsonの出力は常に有効なUTF-8
        String::from_utf8(buffer).map_err(|e| XlsxTableError::Write {
            path: PathBuf::from("<string>"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    /// 入力ファイルを変換し、JSONファイルとして書き出す
    ///
    /// 出力ファイルは変換がすべて成功した場合にのみ作成・置換されます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionSummary)` - レコード数、ヘッダー、出力先
    /// * `Err(XlsxTableError::NotFound)` - 入力ファイルが存在しない
    /// * `Err(XlsxTableError::CorruptSource)` - 入力ファイルを解析できない
    /// * `Err(XlsxTableError::WorksheetNotFound)` - ワークシートが存在しない
    /// * `Err(XlsxTableError::TableNotFound)` - テーブルが存在しない
    /// * `Err(XlsxTableError::Write)` - 出力ファイルを書き込めない
    pub fn convert_file(
        &self,
        source: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<ConversionSummary, XlsxTableError> {
        let source = source.as_ref();
        let output = output.as_ref();

        let workbook = WorkbookSource::open_path(source)?;
        let extracted = self.extract_from(workbook)?;
        let records = extracted.document.len();

        info!(records, path = %output.display(), "Writing JSON file");
        crate::output::write_document(&extracted.document, output)?;
        info!(records, "Conversion completed successfully");

        Ok(ConversionSummary {
            records,
            headers: extracted.headers,
            output: output.to_path_buf(),
        })
    }
}
