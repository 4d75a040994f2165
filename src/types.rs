//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;

/// 正規化済みの1行（ヘッダー文字列 -> JSONプリミティブ）
///
/// `serde_json`の`preserve_order`機能により、キーの順序はヘッダーの順序に従います。
pub type Record = serde_json::Map<String, serde_json::Value>;

/// 出力ドキュメント（レコードの順序付き列）
///
/// JSON配列としてそのままシリアライズされます。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputDocument(Vec<Record>);

impl OutputDocument {
    /// レコード列からドキュメントを生成
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    /// レコード数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// レコードが存在しないかどうか
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// レコードのスライス
    pub fn records(&self) -> &[Record] {
        &self.0
    }

    /// レコード列を取り出す
    pub fn into_records(self) -> Vec<Record> {
        self.0
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式のセル参照を座標に変換（例: "A1" -> (0, 0)、"$B$3" -> (2, 1)）
    ///
    /// 列は最大3文字（XFD）まで、行は1以上を受け付けます。
    pub fn parse_a1(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let mut col: u32 = 0;
        let mut letters = 0;
        let mut chars = reference.chars().peekable();

        if chars.peek() == Some(&'$') {
            chars.next();
        }
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            letters += 1;
            chars.next();
        }
        if letters == 0 || letters > 3 {
            return None;
        }
        if chars.peek() == Some(&'$') {
            chars.next();
        }

        let digits: String = chars.collect();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }

        Some(Self::new(row - 1, col - 1))
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    pub fn to_a1(self) -> String {
        let mut col = self.col;
        let mut letters = String::new();
        loop {
            letters.insert(0, (b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        format!("{}{}", letters, self.row + 1)
    }
}

/// セル範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// 新しい範囲を生成
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// "A1:D50"形式の範囲参照を解析
    ///
    /// 単一セル参照（"A1"）は1×1の範囲として扱います。
    /// 開始と終了が逆順に書かれていても正規化します。
    pub fn parse_ref(reference: &str) -> Option<Self> {
        let (first, second) = match reference.split_once(':') {
            Some((a, b)) => (CellCoord::parse_a1(a)?, CellCoord::parse_a1(b)?),
            None => {
                let single = CellCoord::parse_a1(reference)?;
                (single, single)
            }
        };

        Some(Self::new(
            CellCoord::new(first.row.min(second.row), first.col.min(second.col)),
            CellCoord::new(first.row.max(second.row), first.col.max(second.col)),
        ))
    }

    /// 範囲のサイズ（行数, 列数）
    pub fn size(&self) -> (u32, u32) {
        let rows = self.end.row - self.start.row + 1;
        let cols = self.end.col - self.start.col + 1;
        (rows, cols)
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start.to_a1(), self.end.to_a1())
    }
}

/// ワークシートに定義されたテーブル（xl/tables/tableN.xml）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableDef {
    /// テーブル名（`name`属性）
    pub name: String,
    /// 表示名（`displayName`属性、省略時は`name`と同じ）
    pub display_name: String,
    /// テーブルが属するワークシート名
    pub worksheet: String,
    /// テーブルの範囲（ヘッダー行を含む）
    pub range: CellRange,
    /// `tableColumn`要素の列名（列順）
    pub columns: Vec<String>,
}

impl TableDef {
    /// 要求された名前がこのテーブルを指すかどうか（大文字小文字を区別）
    pub fn matches(&self, requested: &str) -> bool {
        self.name == requested || self.display_name == requested
    }
}
