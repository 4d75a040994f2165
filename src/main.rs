//! xlsxtable CLI
//!
//! `data/QA.xlsx`のワークシート`Tools`にあるテーブル`Tools`を
//! `data/tools.json`に書き出します。パスはカレントディレクトリ基準です。
//! 成功時は終了コード0、失敗時は1を返します。

use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use tracing::{error, info};
use xlsxtable::{
    ConversionSummary, ConverterBuilder, XlsxTableError, DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_PATH,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Starting Excel to JSON conversion");

    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(summary)) => {
            info!(
                records = summary.records,
                output = %summary.output.display(),
                "Export finished"
            );
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            handle_error(&e);
            ExitCode::from(1)
        }
        Err(_) => {
            error!("Unexpected error: conversion aborted");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ConversionSummary, XlsxTableError> {
    let converter = ConverterBuilder::new().build()?;
    converter.convert_file(DEFAULT_SOURCE_PATH, DEFAULT_OUTPUT_PATH)
}

fn handle_error(e: &XlsxTableError) {
    error!("{}", e);
    match e {
        XlsxTableError::NotFound { .. } => {
            error!("Run from the project root so that the input path resolves.");
        }
        XlsxTableError::CorruptSource(_) => {
            error!("The file may not be a valid XLSX workbook or may be corrupted.");
        }
        XlsxTableError::WorksheetNotFound { .. } | XlsxTableError::TableNotFound { .. } => {
            error!("Check the worksheet and table names in the workbook.");
        }
        XlsxTableError::Write { .. } => {
            error!("Check that the output directory is writable.");
        }
        XlsxTableError::Config(_) | XlsxTableError::DuplicateHeader { .. } => {}
    }
}
