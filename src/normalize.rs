//! Normalizer Module
//!
//! セル値をJSONプリミティブ（文字列・数値・真偽値・null）に変換するモジュール。
//! 1セルにつき1値、副作用なしの決定的な変換です。

use std::fmt::Write as _;

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde_json::{Number, Value};

use crate::api::DateFormat;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// JSONで整数として表現しても精度が失われない上限（2^53）
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// セル値のノーマライザー
///
/// 値の種類に応じて`DateFormatter`と数値変換に処理を振り分けます。
#[derive(Debug, Clone)]
pub(crate) struct ValueNormalizer {
    /// 日付フォーマッター
    date_formatter: DateFormatter,
}

impl ValueNormalizer {
    /// 新しいValueNormalizerインスタンスを生成
    ///
    /// # 引数
    ///
    /// * `date_format` - 日付セルの出力形式
    /// * `is_1904` - 1904年エポックを使用するかどうか
    pub fn new(date_format: DateFormat, is_1904: bool) -> Self {
        Self {
            date_formatter: DateFormatter {
                date_format,
                is_1904,
            },
        }
    }

    /// セル値をJSON値に変換
    ///
    /// 値を持たないセル（範囲外を含む）は`null`になります。
    pub fn normalize(&self, cell: Option<&Data>) -> Value {
        let cell = match cell {
            Some(cell) => cell,
            None => return Value::Null,
        };

        match cell {
            Data::Empty => Value::Null,
            Data::String(s) => Value::String(s.clone()),
            Data::Bool(b) => Value::Bool(*b),
            Data::Int(i) => Value::from(*i),
            Data::Float(f) => number_value(*f),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                if dt.is_duration() {
                    Value::String(format_duration(serial))
                } else {
                    match self.date_formatter.format(serial) {
                        Some(formatted) => Value::String(formatted),
                        // 表現できない日付はシリアル値のまま出力
                        None => number_value(serial),
                    }
                }
            }
            Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
            Data::Error(e) => Value::String(e.to_string()),
        }
    }

    /// ヘッダーセルをキー文字列に変換
    ///
    /// 文字列はそのまま（トリムや大文字小文字の正規化はしない）、
    /// それ以外の値はJSON表現の文字列になります。空セルは`None`を返します。
    pub fn header_text(&self, cell: Option<&Data>) -> Option<String> {
        match self.normalize(cell) {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// 数値をJSON数値に変換
///
/// 整数値の浮動小数点数は小数点を付けずに整数として出力します。
fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        return Value::from(value as i64);
    }

    match Number::from_f64(value) {
        Some(n) => Value::Number(n),
        None => Value::String(value.to_string()),
    }
}

/// 経過時間（日数）を`H:MM:SS`形式に変換（時間は24を超えて累積）
fn format_duration(days: f64) -> String {
    let total_seconds = (days * 86_400.0).round() as i64;
    let sign = if total_seconds < 0 { "-" } else { "" };
    let total_seconds = total_seconds.abs();

    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を文字列に変換します。
#[derive(Debug, Clone)]
pub(crate) struct DateFormatter {
    date_format: DateFormat,
    is_1904: bool,
}

impl DateFormatter {
    /// シリアル値を日時に変換
    ///
    /// # エポックシステム
    ///
    /// - 1900年システム（デフォルト）: 1899年12月30日起算
    ///   - Excelは存在しない1900年2月29日をシリアル値60として数えるため、
    ///     60未満の値は1日ずらして1900年1月1日 = 1とする
    /// - 1904年システム: 1904年1月1日起算（シリアル値0 = 1904年1月1日）
    ///
    /// 時刻はミリ秒単位に丸めます。範囲外の値は`None`を返します。
    pub fn to_datetime(&self, serial_value: f64) -> Option<NaiveDateTime> {
        if !serial_value.is_finite() {
            return None;
        }

        let epoch = if self.is_1904 {
            NaiveDate::from_ymd_opt(1904, 1, 1)?
        } else if serial_value < 60.0 {
            NaiveDate::from_ymd_opt(1899, 12, 31)?
        } else {
            NaiveDate::from_ymd_opt(1899, 12, 30)?
        };

        let millis = (serial_value * MILLIS_PER_DAY).round();
        if millis.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }

        epoch
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::milliseconds(millis as i64))
    }

    /// シリアル値を文字列にフォーマット
    ///
    /// ISO 8601形式では、時刻成分がない場合は日付のみを出力します。
    /// 1900年システムで0以上1未満のシリアル値は日付を持たない時刻として、
    /// 時刻部分のみを出力します。
    pub fn format(&self, serial_value: f64) -> Option<String> {
        let datetime = self.to_datetime(serial_value)?;
        let time_only = !self.is_1904 && (0.0..1.0).contains(&serial_value);

        let formatted = match &self.date_format {
            DateFormat::Iso8601 if time_only => iso8601_time(&datetime),
            DateFormat::Iso8601 => iso8601(&datetime),
            DateFormat::Custom(format_str) => {
                let mut out = String::new();
                if write!(out, "{}", datetime.format(format_str)).is_err() {
                    // 書式はbuild()で検証済みだが、失敗時はISO 8601にフォールバック
                    iso8601(&datetime)
                } else {
                    out
                }
            }
        };

        Some(formatted)
    }
}

fn iso8601(datetime: &NaiveDateTime) -> String {
    let time = datetime.time();
    if time.num_seconds_from_midnight() == 0 && time.nanosecond() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        format!("{}T{}", datetime.format("%Y-%m-%d"), iso8601_time(datetime))
    }
}

/// 時刻部分（ミリ秒は0以外の場合のみ）
fn iso8601_time(datetime: &NaiveDateTime) -> String {
    if datetime.time().nanosecond() == 0 {
        datetime.format("%H:%M:%S").to_string()
    } else {
        datetime.format("%H:%M:%S%.3f").to_string()
    }
}
