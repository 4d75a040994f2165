//! Output Module
//!
//! 出力ドキュメントをJSONファイルとして書き出すモジュール。
//! ドキュメント全体をメモリ上で構築してから、一時ファイルに書き込み、
//! 出力先へリネームします。

mod json;

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::XlsxTableError;
use crate::types::OutputDocument;

pub(crate) use json::render;

/// ドキュメントをJSONファイルとして書き出す
///
/// 親ディレクトリが存在しない場合は作成します。既存のファイルは全体が置き換えられ、
/// 書き込み途中の内容が出力先に現れることはありません。
///
/// # 戻り値
///
/// * `Ok(u64)` - 書き込んだバイト数
/// * `Err(XlsxTableError::Write)` - I/Oエラーが発生した場合
pub(crate) fn write_document(
    document: &OutputDocument,
    path: &Path,
) -> Result<u64, XlsxTableError> {
    let write_error = |source: std::io::Error| XlsxTableError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_error)?;

    let mut buffer = Vec::new();
    render(document, &mut buffer).map_err(write_error)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".xlsxtable-")
        .suffix(".json.tmp")
        .tempfile_in(parent)
        .map_err(write_error)?;
    temp.write_all(&buffer).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o644))
            .map_err(write_error)?;
    }

    temp.persist(path).map_err(|e| write_error(e.error))?;

    let bytes = buffer.len() as u64;
    info!(path = %path.display(), "JSON file written successfully");
    info!(bytes, "File size");
    Ok(bytes)
}
