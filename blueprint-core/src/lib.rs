pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum CoreError {
        #[error("No valid entities found")]
        EmptyGeometry,
        #[error("invalid expansion rule: {0}")]
        InvalidExpansionRule(String),
        #[error("unknown perimeter method: {0}")]
        UnknownPerimeterMethod(String),
    }
}

pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，单位与图纸保持一致，不做换算。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn midpoint(self, other: Point2) -> Point2 {
            Self((self.0 + other.0) * 0.5)
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 轴对齐包围盒。非空时满足 `min_x <= max_x` 且 `min_y <= max_y`。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct BoundingBox {
        min: Point2,
        max: Point2,
    }

    impl BoundingBox {
        /// 由任意两个角点构造，自动按分量整理出最小/最大值。
        pub fn new(a: Point2, b: Point2) -> Self {
            Self {
                min: Point2::from_vec(a.as_vec2().min(b.as_vec2())),
                max: Point2::from_vec(a.as_vec2().max(b.as_vec2())),
            }
        }

        #[inline]
        pub fn from_extents(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
            Self::new(Point2::new(min_x, min_y), Point2::new(max_x, max_y))
        }

        #[inline]
        pub(crate) fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub(crate) fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        pub(crate) fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            self.min = Point2::from_vec(self.min.as_vec2().min(point.as_vec2()));
            self.max = Point2::from_vec(self.max.as_vec2().max(point.as_vec2()));
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn min_x(&self) -> f64 {
            self.min.x()
        }

        #[inline]
        pub fn max_x(&self) -> f64 {
            self.max.x()
        }

        #[inline]
        pub fn min_y(&self) -> f64 {
            self.min.y()
        }

        #[inline]
        pub fn max_y(&self) -> f64 {
            self.max.y()
        }

        /// X 方向跨度，即内部长度。
        #[inline]
        pub fn length(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        /// Y 方向跨度，即内部宽度。
        #[inline]
        pub fn breadth(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            self.min.midpoint(self.max)
        }
    }
}

pub mod record {
    use serde::{Deserialize, Serialize};

    use crate::geometry::Point2;

    const DEFAULT_LAYER: &str = "0";

    /// 解析得到的几何记录，仅包含直线与多段线两类。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum GeometryRecord {
        Segment(Segment),
        Polyline(Polyline),
    }

    impl GeometryRecord {
        pub fn segment(start: Point2, end: Point2) -> Self {
            Self::Segment(Segment::new(start, end))
        }

        pub fn polyline(vertices: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
            Self::Polyline(Polyline::new(vertices, closed))
        }

        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                GeometryRecord::Segment(segment) => &segment.layer,
                GeometryRecord::Polyline(polyline) => &polyline.layer,
            }
        }

        /// 遍历记录涉及的全部点：线段两端点或多段线全部顶点。
        pub fn points(&self) -> impl Iterator<Item = Point2> + '_ {
            let no_vertices: &[Point2] = &[];
            let (ends, vertices) = match self {
                GeometryRecord::Segment(segment) => {
                    ([Some(segment.start), Some(segment.end)], no_vertices)
                }
                GeometryRecord::Polyline(polyline) => ([None, None], polyline.vertices.as_slice()),
            };
            ends.into_iter().flatten().chain(vertices.iter().copied())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Segment {
        pub start: Point2,
        pub end: Point2,
        pub layer: String,
    }

    impl Segment {
        #[inline]
        pub fn new(start: Point2, end: Point2) -> Self {
            Self {
                start,
                end,
                layer: DEFAULT_LAYER.to_string(),
            }
        }

        #[inline]
        pub fn length(&self) -> f64 {
            self.start.distance(self.end)
        }

        #[inline]
        pub fn midpoint(&self) -> Point2 {
            self.start.midpoint(self.end)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<Point2>,
        pub closed: bool,
        pub layer: String,
    }

    impl Polyline {
        pub fn new(vertices: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
            Self {
                vertices: vertices.into_iter().collect(),
                closed,
                layer: DEFAULT_LAYER.to_string(),
            }
        }

        /// 依次返回相邻顶点构成的边；闭合时追加末点到首点的闭合边。
        pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
            let closing = match (self.vertices.first(), self.vertices.last()) {
                (Some(first), Some(last)) if self.closed && self.vertices.len() >= 2 => {
                    Some((*last, *first))
                }
                _ => None,
            };
            self.vertices
                .windows(2)
                .map(|pair| (pair[0], pair[1]))
                .chain(closing)
        }

        pub fn length(&self) -> f64 {
            self.edges().map(|(a, b)| a.distance(b)).sum()
        }
    }
}

pub mod dimension {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::errors::CoreError;
    use crate::geometry::BoundingBox;
    use crate::perimeter::analytic_perimeter;
    use crate::record::GeometryRecord;

    /// 百分比放量的默认系数（2%）。
    pub const DEFAULT_EXPANSION_FACTOR: f64 = 1.02;
    /// 墙厚放量的默认厚度。
    pub const DEFAULT_WALL_THICKNESS: f64 = 0.2;

    /// 由内部尺寸推算外部尺寸的业务规则。
    ///
    /// 两种规则都保留并可配置选择；变体字段公开，调用方在计算前应先经过
    /// [`ExpansionRule::validate`]（构造函数已内置校验）。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpansionRule {
        /// `external = internal * factor`
        Multiplicative(f64),
        /// `external = internal + 2 * thickness`
        AdditiveWallThickness(f64),
    }

    impl ExpansionRule {
        pub fn multiplicative(factor: f64) -> Result<Self, CoreError> {
            let rule = Self::Multiplicative(factor);
            rule.validate()?;
            Ok(rule)
        }

        pub fn wall_thickness(thickness: f64) -> Result<Self, CoreError> {
            let rule = Self::AdditiveWallThickness(thickness);
            rule.validate()?;
            Ok(rule)
        }

        pub fn validate(&self) -> Result<(), CoreError> {
            match *self {
                ExpansionRule::Multiplicative(factor) => {
                    if !factor.is_finite() || factor <= 0.0 {
                        return Err(CoreError::InvalidExpansionRule(format!(
                            "factor must be a finite value greater than 0 (got {factor})"
                        )));
                    }
                }
                ExpansionRule::AdditiveWallThickness(thickness) => {
                    if !thickness.is_finite() || thickness < 0.0 {
                        return Err(CoreError::InvalidExpansionRule(format!(
                            "wall thickness must be a finite, non-negative value (got {thickness})"
                        )));
                    }
                }
            }
            Ok(())
        }

        #[inline]
        pub fn expand(&self, internal: f64) -> f64 {
            match *self {
                ExpansionRule::Multiplicative(factor) => internal * factor,
                ExpansionRule::AdditiveWallThickness(thickness) => internal + 2.0 * thickness,
            }
        }
    }

    impl Default for ExpansionRule {
        fn default() -> Self {
            ExpansionRule::AdditiveWallThickness(DEFAULT_WALL_THICKNESS)
        }
    }

    impl fmt::Display for ExpansionRule {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ExpansionRule::Multiplicative(factor) => write!(f, "multiplicative x{factor}"),
                ExpansionRule::AdditiveWallThickness(thickness) => {
                    write!(f, "wall thickness {thickness}")
                }
            }
        }
    }

    /// 内外尺寸（尚未附带周长）。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Dimensions {
        pub internal_length: f64,
        pub internal_breadth: f64,
        pub external_length: f64,
        pub external_breadth: f64,
    }

    impl Dimensions {
        #[inline]
        pub fn analytic_perimeter(&self) -> f64 {
            analytic_perimeter(
                self.internal_length,
                self.external_length,
                self.internal_breadth,
                self.external_breadth,
            )
        }

        #[inline]
        pub fn with_perimeter(self, perimeter: f64) -> DimensionResult {
            DimensionResult {
                internal_length: self.internal_length,
                internal_breadth: self.internal_breadth,
                external_length: self.external_length,
                external_breadth: self.external_breadth,
                perimeter,
            }
        }
    }

    /// 一次分析的最终结果，构造后不再修改。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct DimensionResult {
        pub internal_length: f64,
        pub internal_breadth: f64,
        pub external_length: f64,
        pub external_breadth: f64,
        pub perimeter: f64,
    }

    /// 汇总所有线段端点与多段线顶点的坐标极值。
    ///
    /// 结果与记录顺序无关；没有任何可用点时返回 [`CoreError::EmptyGeometry`]。
    pub fn compute_bounding_box(records: &[GeometryRecord]) -> Result<BoundingBox, CoreError> {
        let mut bounds = BoundingBox::empty();
        for point in records.iter().flat_map(|record| record.points()) {
            bounds.include_point(point);
        }
        if bounds.is_empty() {
            Err(CoreError::EmptyGeometry)
        } else {
            Ok(bounds)
        }
    }

    /// 退化包围盒（某一方向跨度为 0）同样按规则计算，不做特殊处理。
    pub fn derive_dimensions(bounds: &BoundingBox, rule: ExpansionRule) -> Dimensions {
        let internal_length = bounds.length();
        let internal_breadth = bounds.breadth();
        Dimensions {
            internal_length,
            internal_breadth,
            external_length: rule.expand(internal_length),
            external_breadth: rule.expand(internal_breadth),
        }
    }
}

pub mod perimeter {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};

    use crate::dimension::Dimensions;
    use crate::errors::CoreError;
    use crate::record::GeometryRecord;

    /// `P = 2[(l + w/2) + (b + k/2)]`，其中 `w = L - l`，`k = B - b`。
    pub fn analytic_perimeter(
        internal_length: f64,
        external_length: f64,
        internal_breadth: f64,
        external_breadth: f64,
    ) -> f64 {
        let w = external_length - internal_length;
        let k = external_breadth - internal_breadth;
        2.0 * ((internal_length + w / 2.0) + (internal_breadth + k / 2.0))
    }

    /// 所有线段长度与多段线边长之和。空输入返回 `0.0`。
    pub fn segment_sum_perimeter(records: &[GeometryRecord]) -> f64 {
        records
            .iter()
            .map(|record| match record {
                GeometryRecord::Segment(segment) => segment.length(),
                GeometryRecord::Polyline(polyline) => polyline.length(),
            })
            .sum()
    }

    /// 以中点计算的中心线长度，仅统计直线段，多段线不参与。
    pub fn centerline_length(records: &[GeometryRecord]) -> f64 {
        records
            .iter()
            .map(|record| match record {
                GeometryRecord::Segment(segment) => {
                    2.0 * segment.start.distance(segment.midpoint())
                }
                GeometryRecord::Polyline(_) => 0.0,
            })
            .sum()
    }

    /// 周长计算方式。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PerimeterMethod {
        #[default]
        Analytic,
        SegmentSum,
        Centerline,
    }

    impl PerimeterMethod {
        pub fn compute(self, dimensions: &Dimensions, records: &[GeometryRecord]) -> f64 {
            match self {
                PerimeterMethod::Analytic => dimensions.analytic_perimeter(),
                PerimeterMethod::SegmentSum => segment_sum_perimeter(records),
                PerimeterMethod::Centerline => centerline_length(records),
            }
        }

        pub fn as_str(self) -> &'static str {
            match self {
                PerimeterMethod::Analytic => "analytic",
                PerimeterMethod::SegmentSum => "segment_sum",
                PerimeterMethod::Centerline => "centerline",
            }
        }
    }

    impl fmt::Display for PerimeterMethod {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for PerimeterMethod {
        type Err = CoreError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                "analytic" => Ok(PerimeterMethod::Analytic),
                "segment_sum" => Ok(PerimeterMethod::SegmentSum),
                "centerline" => Ok(PerimeterMethod::Centerline),
                other => Err(CoreError::UnknownPerimeterMethod(other.to_string())),
            }
        }
    }
}

pub use dimension::{
    DimensionResult, Dimensions, ExpansionRule, compute_bounding_box, derive_dimensions,
};
pub use errors::CoreError;
pub use geometry::{BoundingBox, Point2};
pub use perimeter::{
    PerimeterMethod, analytic_perimeter, centerline_length, segment_sum_perimeter,
};
pub use record::{GeometryRecord, Polyline, Segment};

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS * a.abs().max(b.abs()).max(1.0)
    }

    fn l_shape() -> Vec<GeometryRecord> {
        vec![
            GeometryRecord::segment(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
            GeometryRecord::segment(Point2::new(0.0, 0.0), Point2::new(0.0, 5.0)),
        ]
    }

    fn rectangle() -> GeometryRecord {
        GeometryRecord::polyline(
            [
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 3.0),
                Point2::new(0.0, 3.0),
            ],
            true,
        )
    }

    fn mixed_records() -> Vec<GeometryRecord> {
        vec![
            GeometryRecord::segment(Point2::new(-3.0, 2.0), Point2::new(7.5, 2.0)),
            rectangle(),
            GeometryRecord::polyline(
                [
                    Point2::new(1.0, -4.0),
                    Point2::new(2.0, 9.0),
                    Point2::new(3.0, 1.0),
                ],
                false,
            ),
            GeometryRecord::segment(Point2::new(12.0, -1.0), Point2::new(11.0, 0.5)),
        ]
    }

    #[test]
    fn l_shape_scenario_matches_expected_numbers() {
        let bounds = compute_bounding_box(&l_shape()).expect("bounding box");
        assert_eq!(bounds, BoundingBox::from_extents(0.0, 10.0, 0.0, 5.0));

        let rule = ExpansionRule::multiplicative(1.02).expect("valid rule");
        let dims = derive_dimensions(&bounds, rule);
        assert!(approx(dims.internal_length, 10.0));
        assert!(approx(dims.internal_breadth, 5.0));
        assert!(approx(dims.external_length, 10.2));
        assert!(approx(dims.external_breadth, 5.1));
        assert!(approx(dims.analytic_perimeter(), 30.3));
    }

    #[test]
    fn closed_rectangle_scenario() {
        let records = vec![rectangle()];
        assert!(approx(segment_sum_perimeter(&records), 14.0));
        let bounds = compute_bounding_box(&records).expect("bounding box");
        assert!(approx(bounds.length(), 4.0));
        assert!(approx(bounds.breadth(), 3.0));
    }

    #[test]
    fn open_polyline_skips_closing_edge() {
        let records = vec![GeometryRecord::polyline(
            [
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 3.0),
                Point2::new(0.0, 3.0),
            ],
            false,
        )];
        assert!(approx(segment_sum_perimeter(&records), 11.0));
    }

    #[test]
    fn centerline_matches_segment_length() {
        let records = vec![GeometryRecord::segment(
            Point2::new(2.0, 2.0),
            Point2::new(6.0, 2.0),
        )];
        assert!(approx(centerline_length(&records), 4.0));
        assert!(approx(centerline_length(&records), segment_sum_perimeter(&records)));
    }

    #[test]
    fn centerline_ignores_polylines() {
        let mut records = vec![rectangle()];
        assert_eq!(centerline_length(&records), 0.0);
        records.push(GeometryRecord::segment(
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 4.0),
        ));
        assert!(approx(centerline_length(&records), 5.0));
    }

    #[test]
    fn bounding_box_is_order_independent() {
        let records = mixed_records();
        let expected = compute_bounding_box(&records).expect("bounding box");
        assert_eq!(expected, BoundingBox::from_extents(-3.0, 12.0, -4.0, 9.0));

        for shift in 0..records.len() {
            let mut rotated = records.clone();
            rotated.rotate_left(shift);
            assert_eq!(compute_bounding_box(&rotated).unwrap(), expected);
            rotated.reverse();
            assert_eq!(compute_bounding_box(&rotated).unwrap(), expected);
        }
        let mut swapped = records.clone();
        swapped.swap(0, 2);
        assert_eq!(compute_bounding_box(&swapped).unwrap(), expected);
    }

    #[test]
    fn empty_input_is_rejected_for_bounding_box() {
        assert_eq!(compute_bounding_box(&[]), Err(CoreError::EmptyGeometry));
        let no_points = vec![GeometryRecord::polyline(Vec::<Point2>::new(), false)];
        assert_eq!(compute_bounding_box(&no_points), Err(CoreError::EmptyGeometry));
        assert_eq!(
            CoreError::EmptyGeometry.to_string(),
            "No valid entities found"
        );
    }

    #[test]
    fn empty_input_sums_to_zero() {
        assert_eq!(segment_sum_perimeter(&[]), 0.0);
        assert_eq!(centerline_length(&[]), 0.0);
    }

    #[test]
    fn identity_rules_keep_internal_dimensions() {
        let bounds = BoundingBox::from_extents(1.0, 8.5, -2.0, 4.25);
        for rule in [
            ExpansionRule::multiplicative(1.0).unwrap(),
            ExpansionRule::wall_thickness(0.0).unwrap(),
        ] {
            let dims = derive_dimensions(&bounds, rule);
            assert_eq!(dims.external_length, dims.internal_length);
            assert_eq!(dims.external_breadth, dims.internal_breadth);
        }
    }

    #[test]
    fn wall_thickness_adds_twice_on_each_axis() {
        let bounds = BoundingBox::from_extents(0.0, 10.0, 0.0, 5.0);
        let dims = derive_dimensions(&bounds, ExpansionRule::default());
        assert!(approx(dims.external_length, 10.4));
        assert!(approx(dims.external_breadth, 5.4));
        assert!(approx(dims.analytic_perimeter(), 30.8));
    }

    #[test]
    fn degenerate_box_still_expands() {
        let records = vec![GeometryRecord::segment(
            Point2::new(0.0, 1.0),
            Point2::new(6.0, 1.0),
        )];
        let bounds = compute_bounding_box(&records).unwrap();
        let additive = derive_dimensions(&bounds, ExpansionRule::wall_thickness(0.25).unwrap());
        assert_eq!(additive.internal_breadth, 0.0);
        assert!(approx(additive.external_breadth, 0.5));

        let scaled = derive_dimensions(&bounds, ExpansionRule::multiplicative(1.02).unwrap());
        assert_eq!(scaled.external_breadth, 0.0);
    }

    #[test]
    fn analytic_perimeter_matches_simplified_form() {
        let cases = [
            (10.0, 10.2, 5.0, 5.1),
            (0.0, 0.4, 0.0, 0.4),
            (1234.5, 1259.19, 0.001, 0.00102),
            (7.25, 7.65, 3.5, 3.9),
        ];
        for (l, big_l, b, big_b) in cases {
            let expanded = analytic_perimeter(l, big_l, b, big_b);
            let simplified = (l + big_l) + (b + big_b);
            assert!(approx(expanded, simplified), "{expanded} vs {simplified}");
        }
    }

    #[test]
    fn perimeter_recomputed_from_derived_dimensions_is_stable() {
        let bounds = compute_bounding_box(&mixed_records()).unwrap();
        let dims = derive_dimensions(&bounds, ExpansionRule::multiplicative(1.02).unwrap());
        let via_result = dims.analytic_perimeter();
        let direct = analytic_perimeter(
            dims.internal_length,
            dims.external_length,
            dims.internal_breadth,
            dims.external_breadth,
        );
        assert_eq!(via_result, direct);
        assert_eq!(derive_dimensions(&bounds, ExpansionRule::multiplicative(1.02).unwrap()), dims);
    }

    #[test]
    fn invalid_rules_are_rejected() {
        assert!(ExpansionRule::multiplicative(0.0).is_err());
        assert!(ExpansionRule::multiplicative(-1.5).is_err());
        assert!(ExpansionRule::multiplicative(f64::NAN).is_err());
        assert!(ExpansionRule::wall_thickness(-0.1).is_err());
        assert!(ExpansionRule::wall_thickness(f64::INFINITY).is_err());
        assert!(ExpansionRule::AdditiveWallThickness(-2.0).validate().is_err());
        assert!(ExpansionRule::wall_thickness(0.0).is_ok());
    }

    #[test]
    fn perimeter_method_dispatch() {
        let records = vec![rectangle(), GeometryRecord::segment(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 2.0),
        )];
        let bounds = compute_bounding_box(&records).unwrap();
        let dims = derive_dimensions(&bounds, ExpansionRule::default());
        assert_eq!(
            PerimeterMethod::Analytic.compute(&dims, &records),
            dims.analytic_perimeter()
        );
        assert!(approx(PerimeterMethod::SegmentSum.compute(&dims, &records), 16.0));
        assert!(approx(PerimeterMethod::Centerline.compute(&dims, &records), 2.0));
    }

    #[test]
    fn perimeter_method_parses_names() {
        assert_eq!("analytic".parse::<PerimeterMethod>(), Ok(PerimeterMethod::Analytic));
        assert_eq!(
            "segment-sum".parse::<PerimeterMethod>(),
            Ok(PerimeterMethod::SegmentSum)
        );
        assert_eq!(
            "Centerline".parse::<PerimeterMethod>(),
            Ok(PerimeterMethod::Centerline)
        );
        assert!("area".parse::<PerimeterMethod>().is_err());
    }

    #[test]
    fn result_serializes_with_snake_case_fields() {
        let result = Dimensions {
            internal_length: 10.0,
            internal_breadth: 5.0,
            external_length: 10.4,
            external_breadth: 5.4,
        }
        .with_perimeter(30.8);
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["internal_length"], 10.0);
        assert_eq!(value["external_breadth"], 5.4);
        assert_eq!(value["perimeter"], 30.8);

        let rule = serde_json::to_value(ExpansionRule::Multiplicative(1.02)).unwrap();
        assert_eq!(rule["multiplicative"], 1.02);
    }

    #[test]
    fn closed_two_vertex_polyline_walks_back() {
        let line = Polyline::new([Point2::new(0.0, 0.0), Point2::new(5.0, 0.0)], true);
        assert_eq!(line.edges().count(), 2);
        assert!(approx(line.length(), 10.0));
    }
}
