use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use blueprint_config::{AppConfig, ConfigError, OutputFormat, RuleKind};
use blueprint_core::perimeter::PerimeterMethod;
use blueprint_engine::Analyzer;
use blueprint_frontend::CliOptions;
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// 配置错误或参数错误时的退出码（与 clap 参数错误保持一致）。
const EXIT_USAGE: u8 = 2;

/// 读取 DXF 图纸，计算内外尺寸与周长。
#[derive(Parser, Debug)]
#[command(name = "blueprint", version, about)]
struct Args {
    /// DXF 图纸路径，可一次传入多个
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// 配置文件路径（默认读取 `BLUEPRINT_CONFIG` 或 `./config/default.toml`）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 外部尺寸推算规则
    #[arg(long, value_enum)]
    rule: Option<RuleArg>,

    /// 百分比放量系数，例如 1.02
    #[arg(long, conflicts_with = "wall_thickness", allow_negative_numbers = true)]
    factor: Option<f64>,

    /// 墙厚（外部尺寸 = 内部尺寸 + 2 × 墙厚）
    #[arg(long, allow_negative_numbers = true)]
    wall_thickness: Option<f64>,

    /// 周长算法：analytic / segment_sum / centerline
    #[arg(long)]
    perimeter: Option<PerimeterMethod>,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,

    /// 结果保留的小数位数
    #[arg(long)]
    precision: Option<usize>,

    /// 同时列出被采纳的线段与多段线
    #[arg(long)]
    list_entities: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuleArg {
    WallThickness,
    Multiplicative,
}

impl From<RuleArg> for RuleKind {
    fn from(value: RuleArg) -> Self {
        match value {
            RuleArg::WallThickness => RuleKind::WallThickness,
            RuleArg::Multiplicative => RuleKind::Multiplicative,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_configuration(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("配置无效：{err}");
            return ExitCode::from(EXIT_USAGE);
        }
    };
    init_logging(&config);
    info!(files = args.files.len(), "启动 BlueprintIQ 尺寸分析");

    let analyzer = match build_analyzer(&config) {
        Ok(analyzer) => analyzer,
        Err(err) => {
            error!(error = %err, "无法创建分析器");
            eprintln!("配置无效：{err:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };
    info!(rule = %analyzer.rule(), perimeter = %analyzer.perimeter_method(), "分析参数");

    let options = CliOptions {
        list_entities: args.list_entities,
        ..CliOptions::from_config(&config.output)
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match blueprint_frontend::run(&analyzer, &args.files, &options, &mut out) {
        Ok(summary) if summary.all_succeeded() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "写出分析结果失败");
            ExitCode::FAILURE
        }
    }
}

/// 读取配置并叠加命令行覆盖项；最终结果在返回前统一校验。
fn load_configuration(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::discover()?,
    };

    let analysis = &mut config.analysis;
    if let Some(factor) = args.factor {
        analysis.factor = factor;
        analysis.rule = RuleKind::Multiplicative;
    }
    if let Some(thickness) = args.wall_thickness {
        analysis.wall_thickness = thickness;
        analysis.rule = RuleKind::WallThickness;
    }
    if let Some(rule) = args.rule {
        analysis.rule = rule.into();
    }
    if let Some(perimeter) = args.perimeter {
        analysis.perimeter = perimeter;
    }

    if args.json {
        config.output.format = OutputFormat::Json;
    }
    if let Some(precision) = args.precision {
        config.output.precision = precision;
    }

    config.validate()?;
    Ok(config)
}

fn build_analyzer(config: &AppConfig) -> anyhow::Result<Analyzer> {
    let rule = config
        .analysis
        .expansion_rule()
        .context("外部尺寸规则无效")?;
    let analyzer = Analyzer::new(rule, config.analysis.perimeter)?;
    Ok(analyzer)
}

fn init_logging(config: &AppConfig) {
    // 日志写到 stderr，保持 stdout 只包含分析结果
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
