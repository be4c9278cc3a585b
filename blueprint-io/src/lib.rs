use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use blueprint_core::{
    geometry::Point2,
    record::{GeometryRecord, Polyline, Segment},
};
use serde::Serialize;
use thiserror::Error;

const BINARY_DXF_SENTINEL: &[u8] = b"AutoCAD Binary DXF";

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid drawing file: {0}")]
    InvalidDocument(String),
}

/// 解析过程的附带信息：文件版本与被忽略的实体统计。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceSummary {
    pub version: Option<String>,
    pub skipped: BTreeMap<String, usize>,
}

impl SourceSummary {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn record_skipped(&mut self, kind: &str) {
        *self.skipped.entry(kind.to_string()).or_default() += 1;
    }
}

/// 从图纸中提取的几何记录，保持文件中的先后顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub records: Vec<GeometryRecord>,
    pub summary: SourceSummary,
}

impl Drawing {
    pub fn segment_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| matches!(record, GeometryRecord::Segment(_)))
            .count()
    }

    pub fn polyline_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| matches!(record, GeometryRecord::Polyline(_)))
            .count()
    }
}

pub trait GeometrySource {
    fn load(&self, path: &Path) -> Result<Drawing, IoError>;
}

/// ASCII DXF 读取入口，仅提取模型空间中的 LINE / LWPOLYLINE / POLYLINE。
#[derive(Debug, Clone, Copy, Default)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_str(&self, source: &str) -> Result<Drawing, IoError> {
        let source = source.trim_start_matches('\u{feff}');
        DxfParser::new(source).parse().map_err(|err| match err {
            DxfError::Unsupported { feature } => IoError::UnsupportedFeature(feature),
            DxfError::Invalid { message } => IoError::InvalidDocument(message),
        })
    }

    pub fn parse_bytes(&self, data: &[u8]) -> Result<Drawing, IoError> {
        if data.starts_with(BINARY_DXF_SENTINEL) {
            return Err(IoError::UnsupportedFeature(
                "二进制 DXF 暂不支持，请另存为 ASCII DXF".to_string(),
            ));
        }
        // 坐标与组码均为 ASCII，旧版本的非 UTF-8 文本字段按有损方式处理即可
        let text = String::from_utf8_lossy(data);
        self.parse_str(&text)
    }
}

impl GeometrySource for DxfFacade {
    fn load(&self, path: &Path) -> Result<Drawing, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_bytes(&data)
    }
}

#[derive(Debug)]
enum DxfError {
    Unsupported { feature: String },
    Invalid { message: String },
}

impl DxfError {
    fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// 实体所在空间（组码 67，缺省为模型空间）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Space {
    #[default]
    Model,
    Paper,
}

impl Space {
    fn from_flag(raw: &str, context: &str) -> Result<Self, DxfError> {
        match parse_i32(raw, context)? {
            1 => Ok(Self::Paper),
            _ => Ok(Self::Model),
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
    drawing: Drawing,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
            drawing: Drawing::default(),
        }
    }

    fn parse(mut self) -> Result<Drawing, DxfError> {
        let mut saw_section = false;
        while let Some((code, value)) = self.reader.next_pair()? {
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "意外的组码 {code}（期望 0 表示 SECTION/EOF）"
                )));
            }
            match value.trim() {
                "SECTION" => {
                    saw_section = true;
                    let (name_code, name) = self
                        .reader
                        .next_pair()?
                        .ok_or_else(|| DxfError::invalid("SECTION 缺少名称（组码 2）"))?;
                    if name_code != 2 {
                        return Err(DxfError::invalid(format!(
                            "SECTION 名称使用了组码 {name_code}（期望 2）"
                        )));
                    }
                    match name.trim() {
                        "HEADER" => self.parse_header()?,
                        "ENTITIES" => self.parse_entities()?,
                        _ => self.skip_section()?,
                    }
                }
                "EOF" => break,
                unexpected => {
                    return Err(DxfError::invalid(format!(
                        "意外的标记 {unexpected}，期望 SECTION 或 EOF"
                    )));
                }
            }
        }
        if !saw_section {
            return Err(DxfError::invalid("未找到任何 SECTION，输入不是 DXF 图纸"));
        }
        Ok(self.drawing)
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some(_) => continue,
                None => {
                    return Err(DxfError::invalid("SECTION 未找到 ENDSEC 终止标记"));
                }
            }
        }
        Ok(())
    }

    fn parse_header(&mut self) -> Result<(), DxfError> {
        let mut variable: Option<String> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value.trim() == "ENDSEC" => break,
                Some((9, name)) => variable = Some(name.trim().to_string()),
                Some((1, value)) if variable.as_deref() == Some("$ACADVER") => {
                    let version = value.trim().to_string();
                    if !is_known_version(&version) {
                        return Err(DxfError::unsupported(format!(
                            "无法识别的 DXF 版本 {version}"
                        )));
                    }
                    self.drawing.summary.version = Some(version);
                    variable = None;
                }
                Some(_) => continue,
                None => return Err(DxfError::invalid("HEADER 段未找到 ENDSEC 终止标记")),
            }
        }
        Ok(())
    }

    fn parse_entities(&mut self) -> Result<(), DxfError> {
        loop {
            let (code, value) = match self.reader.next_pair()? {
                Some(pair) => pair,
                None => return Err(DxfError::invalid("ENTITIES 段提前结束")),
            };
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "ENTITIES 段遇到组码 {code}（期望 0 表示实体起始）"
                )));
            }

            match value.trim() {
                "ENDSEC" => break,
                "SEQEND" => self.skip_entity_body()?,
                "LINE" => {
                    let (segment, space) = self.parse_line()?;
                    self.accept("LINE", GeometryRecord::Segment(segment), space);
                }
                "LWPOLYLINE" => {
                    let (polyline, space) = self.parse_lwpolyline()?;
                    self.accept("LWPOLYLINE", GeometryRecord::Polyline(polyline), space);
                }
                "POLYLINE" => match self.parse_polyline()? {
                    Some((polyline, space)) => {
                        self.accept("POLYLINE", GeometryRecord::Polyline(polyline), space)
                    }
                    None => self.drawing.summary.record_skipped("POLYLINE"),
                },
                other => {
                    let kind = other.to_string();
                    self.skip_entity_body()?;
                    self.drawing.summary.record_skipped(&kind);
                }
            }
        }
        Ok(())
    }

    /// 图纸空间中的实体（图框、视口边界等）不参与尺寸计算，只计入跳过统计。
    fn accept(&mut self, kind: &str, record: GeometryRecord, space: Space) {
        match space {
            Space::Model => self.drawing.records.push(record),
            Space::Paper => self
                .drawing
                .summary
                .record_skipped(&format!("{kind} (paper space)")),
        }
    }

    fn parse_line(&mut self) -> Result<(Segment, Space), DxfError> {
        let mut layer = None;
        let mut space = Space::Model;
        let mut start_x = None;
        let mut start_y = None;
        let mut end_x = None;
        let mut end_y = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => space = Space::from_flag(&value, "LINE 空间标志（组码 67）")?,
                    10 => assign_coord(&mut start_x, &value, "LINE 起点 X（组码 10）")?,
                    20 => assign_coord(&mut start_y, &value, "LINE 起点 Y（组码 20）")?,
                    11 => assign_coord(&mut end_x, &value, "LINE 终点 X（组码 11）")?,
                    21 => assign_coord(&mut end_y, &value, "LINE 终点 Y（组码 21）")?,
                    30 | 31 => {} // 忽略 Z 坐标
                    _ => {}
                },
                None => return Err(DxfError::invalid("LINE 未正确结束")),
            }
        }

        let sx = start_x.ok_or_else(|| DxfError::invalid("LINE 缺少起点 X（组码 10）"))?;
        let sy = start_y.ok_or_else(|| DxfError::invalid("LINE 缺少起点 Y（组码 20）"))?;
        let ex = end_x.ok_or_else(|| DxfError::invalid("LINE 缺少终点 X（组码 11）"))?;
        let ey = end_y.ok_or_else(|| DxfError::invalid("LINE 缺少终点 Y（组码 21）"))?;

        let segment = Segment {
            start: Point2::new(sx, sy),
            end: Point2::new(ex, ey),
            layer: layer.unwrap_or_else(|| "0".to_string()),
        };
        Ok((segment, space))
    }

    fn parse_lwpolyline(&mut self) -> Result<(Polyline, Space), DxfError> {
        let mut layer = None;
        let mut space = Space::Model;
        let mut closed = false;
        let mut vertices: Vec<Point2> = Vec::new();
        let mut pending_x: Option<f64> = None;
        let mut pending_y: Option<f64> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => space = Space::from_flag(&value, "LWPOLYLINE 空间标志（组码 67）")?,
                    70 => {
                        let flag = parse_i32(&value, "LWPOLYLINE 标志")?;
                        closed = flag & 0x01 == 0x01;
                    }
                    10 => {
                        let x = parse_f64(&value, "LWPOLYLINE 顶点 X")?;
                        if let Some(y) = pending_y.take() {
                            vertices.push(Point2::new(x, y));
                        } else if pending_x.replace(x).is_some() {
                            return Err(DxfError::invalid(
                                "LWPOLYLINE 顶点缺少对应的 Y（组码 20）",
                            ));
                        }
                    }
                    20 => {
                        let y = parse_f64(&value, "LWPOLYLINE 顶点 Y")?;
                        if let Some(x) = pending_x.take() {
                            vertices.push(Point2::new(x, y));
                        } else if pending_y.replace(y).is_some() {
                            return Err(DxfError::invalid(
                                "LWPOLYLINE 顶点缺少对应的 X（组码 10）",
                            ));
                        }
                    }
                    // bulge 按弦处理，长度与包围盒只看顶点
                    42 => {
                        parse_f64(&value, "LWPOLYLINE 顶点 bulge")?;
                    }
                    _ => {}
                },
                None => return Err(DxfError::invalid("LWPOLYLINE 未正确结束")),
            }
        }

        if pending_x.is_some() || pending_y.is_some() {
            return Err(DxfError::invalid(
                "LWPOLYLINE 顶点坐标成对出现（组码 10/20），检测到不完整的顶点",
            ));
        }

        if vertices.is_empty() {
            return Err(DxfError::invalid("LWPOLYLINE 未解析到任何顶点"));
        }

        let polyline = Polyline {
            vertices,
            closed,
            layer: layer.unwrap_or_else(|| "0".to_string()),
        };
        Ok((polyline, space))
    }

    /// 旧式 POLYLINE + VERTEX + SEQEND 序列。网格类（Polyface / Polygon Mesh）返回 `None`。
    fn parse_polyline(&mut self) -> Result<Option<(Polyline, Space)>, DxfError> {
        let mut layer = None;
        let mut space = Space::Model;
        let mut flags: i16 = 0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    67 => space = Space::from_flag(&value, "POLYLINE 空间标志（组码 67）")?,
                    70 => flags = parse_i16(&value, "POLYLINE 标志（组码 70）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("POLYLINE 未正确结束")),
            }
        }

        if flags & (0x10 | 0x40) != 0 {
            self.skip_polyline_sequence()?;
            return Ok(None);
        }

        let mut vertices: Vec<Point2> = Vec::new();
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => {
                        if let Some(vertex) = self.parse_vertex()? {
                            vertices.push(vertex);
                        }
                    }
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        // 缺少 SEQEND 时以下一个实体作为结束
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some(_) => continue,
                None => return Err(DxfError::invalid("POLYLINE 未找到 SEQEND 终止标记")),
            }
        }

        if vertices.is_empty() {
            return Err(DxfError::invalid("POLYLINE 未解析到任何顶点"));
        }

        let polyline = Polyline {
            vertices,
            closed: flags & 0x01 != 0,
            layer: layer.unwrap_or_else(|| "0".to_string()),
        };
        Ok(Some((polyline, space)))
    }

    fn parse_vertex(&mut self) -> Result<Option<Point2>, DxfError> {
        let mut x = None;
        let mut y = None;
        let mut flags: i16 = 0;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    10 => assign_coord(&mut x, &value, "VERTEX X（组码 10）")?,
                    20 => assign_coord(&mut y, &value, "VERTEX Y（组码 20）")?,
                    70 => flags = parse_i16(&value, "VERTEX 标志（组码 70）")?,
                    _ => {}
                },
                None => return Err(DxfError::invalid("VERTEX 未正确结束")),
            }
        }

        // 样条框架控制点不属于实际绘制的折线
        if flags & 0x10 != 0 {
            return Ok(None);
        }

        let x = x.ok_or_else(|| DxfError::invalid("VERTEX 缺少 X（组码 10）"))?;
        let y = y.ok_or_else(|| DxfError::invalid("VERTEX 缺少 Y（组码 20）"))?;
        Ok(Some(Point2::new(x, y)))
    }

    fn skip_polyline_sequence(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => match value.trim() {
                    "VERTEX" => self.skip_entity_body()?,
                    "SEQEND" => {
                        self.skip_entity_body()?;
                        break;
                    }
                    _ => {
                        self.reader.put_back((0, value));
                        break;
                    }
                },
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }
}

struct DxfReader<'a> {
    lines: std::str::Lines<'a>,
    buffer: Option<(i32, String)>,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            buffer: None,
            line_number: 0,
        }
    }

    /// 读取下一组（组码, 值），跳过 999 注释。
    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }

        loop {
            let code_line = match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    line
                }
                None => return Ok(None),
            };

            // 允许文件末尾存在空行
            if code_line.trim().is_empty()
                && self.lines.clone().all(|line| line.trim().is_empty())
            {
                return Ok(None);
            }

            let value_line = match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    line
                }
                None => {
                    return Err(DxfError::invalid(format!(
                        "文件在第 {} 行结束，缺少与组码对应的值行",
                        self.line_number
                    )));
                }
            };

            let code = code_line.trim().parse::<i32>().map_err(|_| {
                DxfError::invalid(format!(
                    "第 {} 行的组码 \"{}\" 无法解析为整数",
                    self.line_number - 1,
                    code_line.trim()
                ))
            })?;
            if code == 999 {
                continue;
            }
            let value = value_line.trim_end_matches('\r').to_string();
            return Ok(Some((code, value)));
        }
    }

    fn put_back(&mut self, pair: (i32, String)) {
        debug_assert!(self.buffer.is_none(), "内部错误：尝试多次回退 DXF pair");
        self.buffer = Some(pair);
    }
}

fn is_known_version(version: &str) -> bool {
    match version.strip_prefix("AC") {
        Some(digits) => digits.len() == 4 && digits.chars().all(|ch| ch.is_ascii_digit()),
        None => false,
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("{context} 出现重复值")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))?;
    if !value.is_finite() {
        return Err(DxfError::invalid(format!(
            "{context} 不是有限数值（值：\"{raw}\"）"
        )));
    }
    Ok(value)
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

fn parse_i16(raw: &str, context: &str) -> Result<i16, DxfError> {
    let value = parse_i32(raw, context)?;
    i16::try_from(value)
        .map_err(|_| DxfError::invalid(format!("{context} 超出 i16 范围（值：{value}）")))
}
