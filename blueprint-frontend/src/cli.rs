use std::io::Write;
use std::path::PathBuf;

use blueprint_config::{OutputConfig, OutputFormat};
use blueprint_engine::Analyzer;
use blueprint_io::GeometrySource;
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::report::{
    render_entities, render_json, render_json_error, render_text, render_text_error,
};

/// 输出选项，来自配置文件与命令行覆盖项的合并结果。
#[derive(Debug, Clone, Copy)]
pub struct CliOptions {
    pub format: OutputFormat,
    pub precision: usize,
    pub list_entities: bool,
}

impl CliOptions {
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            format: output.format,
            precision: output.precision,
            list_entities: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    #[inline]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// 逐个分析图纸并写出报告。单个文件失败只影响该文件，其余文件照常处理。
pub fn run<S, W>(
    analyzer: &Analyzer<S>,
    paths: &[PathBuf],
    options: &CliOptions,
    out: &mut W,
) -> Result<RunSummary, FrontendError>
where
    S: GeometrySource,
    W: Write,
{
    let mut summary = RunSummary::default();
    for (index, path) in paths.iter().enumerate() {
        if index > 0 && options.format == OutputFormat::Text {
            writeln!(out)?;
        }
        match analyzer.analyze_path(path) {
            Ok(analysis) => {
                summary.succeeded += 1;
                match options.format {
                    OutputFormat::Text => {
                        out.write_all(render_text(&analysis, options.precision).as_bytes())?;
                        if options.list_entities {
                            writeln!(out, "Accepted entities:")?;
                            out.write_all(
                                render_entities(&analysis, options.precision).as_bytes(),
                            )?;
                        }
                    }
                    OutputFormat::Json => {
                        writeln!(out, "{}", render_json(&analysis, options.list_entities)?)?;
                    }
                }
            }
            Err(err) => {
                summary.failed += 1;
                warn!(path = %path.display(), error = %err, "分析图纸失败");
                match options.format {
                    OutputFormat::Text => out.write_all(render_text_error(path, &err).as_bytes())?,
                    OutputFormat::Json => writeln!(out, "{}", render_json_error(path, &err)?)?,
                }
            }
        }
    }
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "分析结束"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use blueprint_core::{dimension::ExpansionRule, perimeter::PerimeterMethod};

    use super::*;

    const RECTANGLE: &str = "0\nSECTION\n2\nENTITIES\n0\nLWPOLYLINE\n90\n4\n70\n1\n10\n0\n20\n0\n10\n4\n20\n0\n10\n4\n20\n3\n10\n0\n20\n3\n0\nENDSEC\n0\nEOF\n";
    const CIRCLE_ONLY: &str =
        "0\nSECTION\n2\nENTITIES\n0\nCIRCLE\n10\n0\n20\n0\n40\n1\n0\nENDSEC\n0\nEOF\n";

    fn temp_dxf(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".dxf")
            .tempfile()
            .expect("create temp file");
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn text_options() -> CliOptions {
        CliOptions {
            format: OutputFormat::Text,
            precision: 2,
            list_entities: false,
        }
    }

    #[test]
    fn text_run_reports_each_file() {
        let rectangle = temp_dxf(RECTANGLE);
        let analyzer =
            Analyzer::new(ExpansionRule::default(), PerimeterMethod::SegmentSum).unwrap();
        let mut out = Vec::new();
        let summary = run(
            &analyzer,
            &[rectangle.path().to_path_buf()],
            &CliOptions {
                list_entities: true,
                ..text_options()
            },
            &mut out,
        )
        .unwrap();

        assert!(summary.all_succeeded());
        assert_eq!(summary.succeeded, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Internal Length (l): 4.00 units"));
        assert!(text.contains("External Length (L): 4.40 units"));
        assert!(text.contains("Perimeter: 14.00 units"));
        assert!(text.contains("Accepted entities:"));
        assert!(text.contains("POLYLINE layer=0 vertices=4 closed=yes length=14.00"));
    }

    #[test]
    fn failures_do_not_stop_remaining_files() {
        let empty = temp_dxf(CIRCLE_ONLY);
        let rectangle = temp_dxf(RECTANGLE);
        let analyzer =
            Analyzer::new(ExpansionRule::default(), PerimeterMethod::Analytic).unwrap();
        let paths = vec![
            empty.path().to_path_buf(),
            PathBuf::from("/no/such/drawing.dxf"),
            rectangle.path().to_path_buf(),
        ];
        let mut out = Vec::new();
        let summary = run(&analyzer, &paths, &text_options(), &mut out).unwrap();

        assert_eq!(summary, RunSummary { succeeded: 1, failed: 2 });
        assert!(!summary.all_succeeded());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No valid entities found"));
        assert!(text.contains("/no/such/drawing.dxf"));
        assert!(text.contains("Internal Breadth (b): 3.00 units"));
    }

    #[test]
    fn json_run_emits_one_document_per_file() {
        let rectangle = temp_dxf(RECTANGLE);
        let analyzer =
            Analyzer::new(ExpansionRule::Multiplicative(1.02), PerimeterMethod::Analytic)
                .unwrap();
        let mut out = Vec::new();
        let options = CliOptions {
            format: OutputFormat::Json,
            precision: 2,
            list_entities: false,
        };
        run(&analyzer, &[rectangle.path().to_path_buf()], &options, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!((value["external_length"].as_f64().unwrap() - 4.08).abs() < 1e-9);
        assert!((value["external_breadth"].as_f64().unwrap() - 3.06).abs() < 1e-9);
        assert!((value["perimeter"].as_f64().unwrap() - 14.14).abs() < 1e-9);
    }
}
