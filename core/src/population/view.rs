use serde::Serialize;

use super::dataset::Dataset;
use super::filter::filter_records;
use super::record::RegionMode;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: u16,
    pub total: f64,
}

/// 1地域分の総数推移。線グラフの1系列に対応する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub area: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub series: Vec<TrendSeries>,
}

impl TrendChart {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// 全系列の最大総数。空グラフでは None。
    pub fn max_total(&self) -> Option<f64> {
        self.series
            .iter()
            .flat_map(|series| series.points.iter().map(|point| point.total))
            .fold(None, |max, total| match max {
                Some(current) if current >= total => Some(current),
                _ => Some(total),
            })
    }

    pub fn year_range(&self) -> Option<(u16, u16)> {
        let years: Vec<u16> = self
            .series
            .iter()
            .flat_map(|series| series.points.iter().map(|point| point.year))
            .collect();
        let min = years.iter().copied().min()?;
        let max = years.iter().copied().max()?;
        Some((min, max))
    }
}

/// 1年分の年齢階級値。アニメーションの1フレームに対応する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidFrame {
    pub year: u16,
    pub values: Vec<f64>,
}

/// 1地域の年齢別人口分布。総数列は含めず、年齢階級のみを年ごとに持つ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidChart {
    pub area: String,
    pub brackets: Vec<String>,
    pub frames: Vec<PyramidFrame>,
}

impl PyramidChart {
    pub fn title(&self) -> String {
        format!("年齢別人口分布（{}）", self.area)
    }

    /// 全フレーム通しての最大階級値。アニメーション中も軸を固定するために使う。
    pub fn max_value(&self) -> f64 {
        self.frames
            .iter()
            .flat_map(|frame| frame.values.iter().copied())
            .fold(0.0, f64::max)
    }

    pub fn frame_for_year(&self, year: u16) -> Option<&PyramidFrame> {
        self.frames.iter().find(|frame| frame.year == year)
    }
}

/// 選択地域の総数推移を系列化する。系列は選択内の初出順、点は年順。
/// 空の選択・該当なしは空のグラフとして返す。
pub fn compose_trend(dataset: &Dataset, mode: RegionMode, names: &[String]) -> TrendChart {
    let mut series: Vec<TrendSeries> = Vec::new();
    for record in filter_records(dataset, mode, names) {
        let key = record.selection_key(mode);
        let point = TrendPoint {
            year: record.year,
            total: record.total,
        };
        match series.iter_mut().find(|entry| entry.area == key) {
            Some(entry) => entry.points.push(point),
            None => series.push(TrendSeries {
                area: key.to_string(),
                points: vec![point],
            }),
        }
    }
    for entry in &mut series {
        entry.points.sort_by_key(|point| point.year);
    }
    TrendChart { series }
}

/// 1地域分の人口ピラミッドを組み立てる。該当行が無ければ None(描画抑制)。
pub fn compose_pyramid(dataset: &Dataset, mode: RegionMode, area: &str) -> Option<PyramidChart> {
    let mut frames: Vec<PyramidFrame> = dataset
        .records()
        .iter()
        .filter(|record| mode.matches(record.kind) && record.selection_key(mode) == area)
        .map(|record| PyramidFrame {
            year: record.year,
            values: record.brackets.clone(),
        })
        .collect();
    if frames.is_empty() {
        return None;
    }
    frames.sort_by_key(|frame| frame.year);
    Some(PyramidChart {
        area: area.to_string(),
        brackets: dataset.bracket_labels().to_vec(),
        frames,
    })
}
