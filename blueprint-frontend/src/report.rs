use std::collections::BTreeMap;
use std::path::Path;

use blueprint_core::{
    dimension::{DimensionResult, ExpansionRule},
    perimeter::PerimeterMethod,
    record::GeometryRecord,
};
use blueprint_engine::{Analysis, EngineError};
use serde::Serialize;

use crate::errors::FrontendError;

const IN_MEMORY_SOURCE: &str = "<memory>";

/// 文本报告：五项结果按固定顺序输出，保留 `precision` 位小数。
pub fn render_text(analysis: &Analysis, precision: usize) -> String {
    let result = &analysis.result;
    let mut lines = vec![
        format!("File: {}", source_label(analysis.source.as_deref())),
        format!("Rule: {}", analysis.rule),
        format!("Perimeter method: {}", analysis.perimeter_method),
        format!(
            "Entities: {} line(s), {} polyline(s), {} skipped",
            analysis.segment_count(),
            analysis.polyline_count(),
            analysis.summary.skipped_total()
        ),
    ];
    let rows = [
        ("Internal Length (l)", result.internal_length),
        ("External Length (L)", result.external_length),
        ("Internal Breadth (b)", result.internal_breadth),
        ("External Breadth (B)", result.external_breadth),
        ("Perimeter", result.perimeter),
    ];
    lines.extend(
        rows.into_iter()
            .map(|(label, value)| format!("{label}: {value:.precision$} units")),
    );
    lines.into_iter().map(|line| line + "\n").collect()
}

/// 按文件顺序列出被采纳的几何记录，替代图形界面中的绘图预览。
pub fn render_entities(analysis: &Analysis, precision: usize) -> String {
    analysis
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| match record {
            GeometryRecord::Segment(segment) => format!(
                "  #{index} LINE layer={} ({:.p$}, {:.p$}) -> ({:.p$}, {:.p$}) length={:.p$}\n",
                segment.layer,
                segment.start.x(),
                segment.start.y(),
                segment.end.x(),
                segment.end.y(),
                segment.length(),
                p = precision
            ),
            GeometryRecord::Polyline(polyline) => format!(
                "  #{index} POLYLINE layer={} vertices={} closed={} length={:.p$}\n",
                polyline.layer,
                polyline.vertices.len(),
                if polyline.closed { "yes" } else { "no" },
                polyline.length(),
                p = precision
            ),
        })
        .collect()
}

pub fn render_text_error(path: &Path, error: &EngineError) -> String {
    format!("Error: {}: {error}\n", path.display())
}

#[derive(Debug, Serialize)]
struct EntityCounts<'a> {
    lines: usize,
    polylines: usize,
    skipped: &'a BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(flatten)]
    result: &'a DimensionResult,
    rule: ExpansionRule,
    perimeter_method: PerimeterMethod,
    entities: EntityCounts<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<&'a [GeometryRecord]>,
}

#[derive(Debug, Serialize)]
struct JsonError {
    file: String,
    error: String,
    no_entities: bool,
}

/// JSON 报告：与上传接口返回的字段一致（不含随机标语）。
pub fn render_json(analysis: &Analysis, include_records: bool) -> Result<String, FrontendError> {
    let report = JsonReport {
        file: source_label(analysis.source.as_deref()),
        version: analysis.summary.version.as_deref(),
        result: &analysis.result,
        rule: analysis.rule,
        perimeter_method: analysis.perimeter_method,
        entities: EntityCounts {
            lines: analysis.segment_count(),
            polylines: analysis.polyline_count(),
            skipped: &analysis.summary.skipped,
        },
        records: include_records.then_some(analysis.records.as_slice()),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render_json_error(path: &Path, error: &EngineError) -> Result<String, FrontendError> {
    let report = JsonError {
        file: path.display().to_string(),
        error: error.to_string(),
        no_entities: error.is_empty_geometry(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn source_label(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_else(|| IN_MEMORY_SOURCE.to_string())
}
