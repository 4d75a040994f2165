//! Public API Types
//!
//! 公開APIで使用する列挙型と既定値を定義するモジュール。

/// 既定の入力ファイルパス（カレントディレクトリ基準）
pub const DEFAULT_SOURCE_PATH: &str = "data/QA.xlsx";

/// 既定の出力ファイルパス（カレントディレクトリ基準）
pub const DEFAULT_OUTPUT_PATH: &str = "data/tools.json";

/// 既定のワークシート名
pub const DEFAULT_WORKSHEET: &str = "Tools";

/// 既定のテーブル名
pub const DEFAULT_TABLE: &str = "Tools";

/// 日付の出力形式
///
/// Excelの日付セルをJSON文字列に変換する際の出力形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式
    ///
    /// 時刻成分がない場合は`2025-10-30`、ある場合は`2025-10-30T14:30:00`。
    /// ミリ秒が0でない場合は`2025-10-30T14:30:00.250`のように付加されます。
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// 時刻成分の有無にかかわらず、同じフォーマット文字列を適用します。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxtable::{ConverterBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), xlsxtable::XlsxTableError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// 重複ヘッダーの扱い
///
/// Excelのテーブルは通常ヘッダーの重複を許しませんが、外部ツールで生成された
/// ファイルでは重複し得ます。レコードはヘッダー文字列をキーとするマップのため、
/// 重複時の動作を明示的に選択します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DuplicateHeaders {
    /// 後の列の値で上書きする（デフォルト）
    ///
    /// キーの位置は最初に現れた列の位置のまま、値は最後の列のものになります。
    LastWins,

    /// 重複を検出した時点でエラーにする
    Reject,
}
