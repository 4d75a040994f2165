//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;
use thiserror::Error;

/// xlsxtableクレート全体で使用するエラー型
///
/// 変換パイプラインのどの段階で失敗したかを呼び出し側が判別できるように、
/// 段階ごとに異なるバリアントを持ちます。いずれのエラーも再試行されず、
/// バイナリでは終了コード`1`に対応します。
///
/// # エラーの種類
///
/// - `NotFound`: 入力ファイルが存在しない
/// - `CorruptSource`: 入力ファイルは存在するが、XLSXとして解析できない
/// - `WorksheetNotFound`: 指定したワークシートが存在しない
/// - `TableNotFound`: ワークシート内に指定したテーブルが存在しない
/// - `Write`: JSONファイルを書き込めない
/// - `Config`: ビルダー設定の検証に失敗した
/// - `DuplicateHeader`: 重複ヘッダーを拒否する設定で重複を検出した
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxtable::{ConverterBuilder, XlsxTableError};
///
/// let converter = ConverterBuilder::new().build().unwrap();
/// match converter.convert_file("data/QA.xlsx", "data/tools.json") {
///     Err(XlsxTableError::WorksheetNotFound { available, .. }) => {
///         println!("worksheets: {:?}", available);
///     }
///     _ => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxTableError {
    /// 入力ファイルが存在しない
    ///
    /// パスが存在しない場合、または通常ファイルでない場合に発生します。
    #[error("Excel file does not exist: {}", path.display())]
    NotFound {
        /// 指定された入力パス
        path: PathBuf,
    },

    /// 入力ファイルが破損している、または読み込めない
    ///
    /// ZIPコンテナの破損、XLSX以外の形式、XMLの不正、入力制限違反などが
    /// 原因となります。calamine、zip、quick-xml由来のエラーは`From`実装により
    /// このバリアントに変換されます。
    #[error("Excel file is corrupted or unreadable: {0}")]
    CorruptSource(String),

    /// 指定したワークシートが存在しない
    ///
    /// 診断のため、ワークブック内のワークシート名を順序通りに保持します。
    #[error(
        "Worksheet '{name}' not found in Excel file. Available: {}",
        list_or_none(available)
    )]
    WorksheetNotFound {
        /// 要求されたワークシート名
        name: String,
        /// ワークブック内のワークシート名
        available: Vec<String>,
    },

    /// ワークシート内に指定したテーブルが存在しない
    #[error(
        "Table '{name}' not found in worksheet '{worksheet}'. Available: {}",
        list_or_none(available)
    )]
    TableNotFound {
        /// 要求されたテーブル名
        name: String,
        /// 検索したワークシート名
        worksheet: String,
        /// ワークシート内のテーブル名（空の場合は"None"と表示）
        available: Vec<String>,
    },

    /// JSONファイルの書き込みに失敗した
    ///
    /// 権限不足、ディスクフル、ディレクトリであるべきパスにファイルが存在する
    /// 場合などに発生します。
    #[error("Cannot write JSON file {}: {source}", path.display())]
    Write {
        /// 出力先パス
        path: PathBuf,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 重複したヘッダーを検出した（`DuplicateHeaders::Reject`の場合のみ）
    #[error("Duplicate header '{header}' in table '{table}'")]
    DuplicateHeader {
        /// 重複したヘッダー文字列
        header: String,
        /// テーブル名
        table: String,
    },
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

impl From<calamine::XlsxError> for XlsxTableError {
    fn from(err: calamine::XlsxError) -> Self {
        XlsxTableError::CorruptSource(err.to_string())
    }
}

impl From<calamine::Error> for XlsxTableError {
    fn from(err: calamine::Error) -> Self {
        XlsxTableError::CorruptSource(err.to_string())
    }
}

impl From<zip::result::ZipError> for XlsxTableError {
    fn from(err: zip::result::ZipError) -> Self {
        XlsxTableError::CorruptSource(format!("ZIP archive error: {}", err))
    }
}

impl From<quick_xml::Error> for XlsxTableError {
    fn from(err: quick_xml::Error) -> Self {
        XlsxTableError::CorruptSource(format!("XML parse error: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for XlsxTableError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XlsxTableError::CorruptSource(format!("XML attribute error: {}", err))
    }
}

impl From<quick_xml::escape::EscapeError> for XlsxTableError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        XlsxTableError::CorruptSource(format!("XML escape error: {}", err))
    }
}

impl From<std::str::Utf8Error> for XlsxTableError {
    fn from(err: std::str::Utf8Error) -> Self {
        XlsxTableError::CorruptSource(format!("UTF-8 conversion error: {}", err))
    }
}

impl From<std::num::ParseIntError> for XlsxTableError {
    fn from(err: std::num::ParseIntError) -> Self {
        XlsxTableError::CorruptSource(format!("Number parse error: {}", err))
    }
}
