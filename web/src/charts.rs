//! SVGグラフの座標計算。DOM描画から切り離してネイティブでテストする。

use jinkograph_core::{PyramidChart, TrendChart, TrendSeries};

pub const TREND_WIDTH: f64 = 460.0;
pub const TREND_HEIGHT: f64 = 320.0;
pub const MARGIN_LEFT: f64 = 70.0;
pub const MARGIN_RIGHT: f64 = 20.0;
pub const MARGIN_TOP: f64 = 20.0;
pub const MARGIN_BOTTOM: f64 = 30.0;

pub const PYRAMID_WIDTH: f64 = 460.0;
pub const PYRAMID_LABEL_GUTTER: f64 = 80.0;
pub const PYRAMID_ROW_HEIGHT: f64 = 14.0;
pub const PYRAMID_BAR_HEIGHT: f64 = 10.0;

// plotly express の既定パレットに合わせる。
const SERIES_COLORS: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
];

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// トレンドグラフの描画領域への写像。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendBounds {
    min_year: f64,
    max_year: f64,
    max_total: f64,
}

impl TrendBounds {
    pub fn from_chart(chart: &TrendChart) -> Option<Self> {
        let (min_year, max_year) = chart.year_range()?;
        let max_total = chart.max_total()?;
        Some(Self {
            min_year: min_year as f64,
            max_year: max_year as f64,
            max_total: max_total.max(1.0),
        })
    }

    pub fn x(&self, year: u16) -> f64 {
        let span = (self.max_year - self.min_year).max(1.0);
        let plot_width = TREND_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        MARGIN_LEFT + (year as f64 - self.min_year) / span * plot_width
    }

    pub fn y(&self, total: f64) -> f64 {
        let plot_height = TREND_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + (1.0 - (total / self.max_total).clamp(0.0, 1.0)) * plot_height
    }

    pub fn max_total(&self) -> f64 {
        self.max_total
    }
}

/// polyline の points 属性値 ("x,y x,y ...")。
pub fn polyline_points(series: &TrendSeries, bounds: &TrendBounds) -> String {
    series
        .points
        .iter()
        .map(|point| format!("{:.1},{:.1}", bounds.x(point.year), bounds.y(point.total)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 横棒の幅。最大値に対する比で描画幅に収める。
pub fn bar_width(value: f64, max: f64, plot_width: f64) -> f64 {
    if max <= 0.0 || value <= 0.0 {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0) * plot_width
}

pub fn pyramid_height(chart: &PyramidChart) -> f64 {
    MARGIN_TOP + chart.brackets.len() as f64 * PYRAMID_ROW_HEIGHT + MARGIN_BOTTOM
}

/// 人口の表示用桁区切り。
pub fn format_count(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
