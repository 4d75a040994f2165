//! JSON Renderer
//!
//! 出力ドキュメントを2スペースインデントのJSON配列として描画します。
//! 非ASCII文字はエスケープせずにUTF-8のまま出力します。

use std::io::{self, Write};

use crate::types::OutputDocument;

/// ドキュメントをライターに描画する
///
/// 末尾に改行は付けません。
pub(crate) fn render<W: Write>(document: &OutputDocument, writer: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, document)?;
    writer.flush()
}
