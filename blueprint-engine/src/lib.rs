pub mod errors {
    use blueprint_core::CoreError;
    use blueprint_io::IoError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error(transparent)]
        Source(#[from] IoError),
        #[error(transparent)]
        Geometry(#[from] CoreError),
    }

    impl EngineError {
        /// 图纸中没有可用的直线/多段线。
        pub fn is_empty_geometry(&self) -> bool {
            matches!(self, EngineError::Geometry(CoreError::EmptyGeometry))
        }
    }
}

pub mod analysis {
    use std::path::{Path, PathBuf};

    use blueprint_core::{
        dimension::{DimensionResult, ExpansionRule, compute_bounding_box, derive_dimensions},
        geometry::BoundingBox,
        perimeter::PerimeterMethod,
        record::GeometryRecord,
    };
    use blueprint_io::{Drawing, DxfFacade, GeometrySource, SourceSummary};
    use tracing::{debug, info};

    use crate::errors::EngineError;

    /// 单次分析的完整输出。分析之间互不共享状态。
    #[derive(Debug, Clone)]
    pub struct Analysis {
        pub source: Option<PathBuf>,
        pub summary: SourceSummary,
        pub records: Vec<GeometryRecord>,
        pub bounding_box: BoundingBox,
        pub rule: ExpansionRule,
        pub perimeter_method: PerimeterMethod,
        pub result: DimensionResult,
    }

    impl Analysis {
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

    /// 文件 → 几何记录 → 包围盒 → 内外尺寸 → 周长。
    ///
    /// 只持有配置（放量规则与周长算法），每次调用都是独立的纯计算。
    #[derive(Debug, Clone)]
    pub struct Analyzer<S = DxfFacade> {
        source: S,
        rule: ExpansionRule,
        perimeter: PerimeterMethod,
    }

    impl Analyzer<DxfFacade> {
        pub fn new(rule: ExpansionRule, perimeter: PerimeterMethod) -> Result<Self, EngineError> {
            Self::with_source(DxfFacade::new(), rule, perimeter)
        }
    }

    impl<S: GeometrySource> Analyzer<S> {
        /// 放量规则在此处校验，非法配置不会进入计算阶段。
        pub fn with_source(
            source: S,
            rule: ExpansionRule,
            perimeter: PerimeterMethod,
        ) -> Result<Self, EngineError> {
            rule.validate()?;
            Ok(Self {
                source,
                rule,
                perimeter,
            })
        }

        #[inline]
        pub fn rule(&self) -> ExpansionRule {
            self.rule
        }

        #[inline]
        pub fn perimeter_method(&self) -> PerimeterMethod {
            self.perimeter
        }

        pub fn analyze_path(&self, path: &Path) -> Result<Analysis, EngineError> {
            let drawing = self.source.load(path)?;
            info!(
                path = %path.display(),
                segments = drawing.segment_count(),
                polylines = drawing.polyline_count(),
                skipped = drawing.summary.skipped_total(),
                "已读取图纸几何"
            );
            self.analyze_drawing(Some(path), drawing)
        }

        pub fn analyze_records(&self, records: Vec<GeometryRecord>) -> Result<Analysis, EngineError> {
            self.analyze_drawing(
                None,
                Drawing {
                    records,
                    summary: SourceSummary::default(),
                },
            )
        }

        pub fn analyze_drawing(
            &self,
            source: Option<&Path>,
            drawing: Drawing,
        ) -> Result<Analysis, EngineError> {
            for (kind, count) in &drawing.summary.skipped {
                debug!(kind = %kind, count, "忽略非直线类实体");
            }

            let bounding_box = compute_bounding_box(&drawing.records)?;
            debug!(
                min_x = bounding_box.min_x(),
                max_x = bounding_box.max_x(),
                min_y = bounding_box.min_y(),
                max_y = bounding_box.max_y(),
                "包围盒"
            );

            let dimensions = derive_dimensions(&bounding_box, self.rule);
            let perimeter = self.perimeter.compute(&dimensions, &drawing.records);
            let result = dimensions.with_perimeter(perimeter);
            info!(
                internal_length = result.internal_length,
                internal_breadth = result.internal_breadth,
                perimeter = result.perimeter,
                method = %self.perimeter,
                "尺寸计算完成"
            );

            Ok(Analysis {
                source: source.map(Path::to_path_buf),
                summary: drawing.summary,
                records: drawing.records,
                bounding_box,
                rule: self.rule,
                perimeter_method: self.perimeter,
                result,
            })
        }
    }

}

pub use analysis::{Analysis, Analyzer};
pub use errors::EngineError;
