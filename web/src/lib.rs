#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

pub mod charts;

use anyhow::Result as AnyResult;
use jinkograph_core::{ControlTree, Dataset, SubAreaOptions};

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use jinkograph_core::{
    Dashboard, InputEvent, PyramidChart, Recompute, RegionMode, TrendChart, ViewPayload,
};

#[cfg(target_arch = "wasm32")]
use gloo_timers::callback::Interval;

#[cfg(target_arch = "wasm32")]
use yew::events::InputEvent as SliderInput;

#[cfg(target_arch = "wasm32")]
use yew::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

const EMBEDDED_DATASET: &str = include_str!("../../data/shourai_jinko.csv");

#[cfg(target_arch = "wasm32")]
const ANIMATION_STEP_MS: u32 = 800;

#[cfg(target_arch = "wasm32")]
const HALF_PANE_STYLE: &str = "width: 50%; display: inline-block; vertical-align: top;";

fn load_embedded_dataset() -> AnyResult<Dataset> {
    Dataset::from_csv(EMBEDDED_DATASET)
}

/// 市区町村ドロップダウンの再計算結果を操作パネルへ反映する。
/// 都道府県モードの操作パネルには第2段が無いのでそのまま返す。
fn merge_sub_options(tree: ControlTree, options: SubAreaOptions) -> ControlTree {
    match tree {
        ControlTree::Municipal(mut municipal) => {
            municipal.sub_area_options = options.options;
            municipal.selected_sub_areas = options.selected;
            ControlTree::Municipal(municipal)
        }
        other => other,
    }
}

#[cfg(target_arch = "wasm32")]
fn selected_values(event: &Event) -> Option<Vec<String>> {
    let select = event
        .target()
        .and_then(|target| target.dyn_into::<HtmlSelectElement>().ok())?;
    let options = select.selected_options();
    let mut values = Vec::new();
    for idx in 0..options.length() {
        if let Some(option) = options
            .item(idx)
            .and_then(|element| element.dyn_into::<HtmlOptionElement>().ok())
        {
            values.push(option.value());
        }
    }
    Some(values)
}

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
fn app() -> Html {
    let dashboard = use_mut_ref(|| {
        let dataset = load_embedded_dataset().expect("人口データの読み込みに失敗しました");
        Dashboard::new(Rc::new(dataset))
    });

    let controls = use_state(|| dashboard.borrow().control_tree());
    let trend = use_state(|| dashboard.borrow().trend_chart());
    let pyramid = use_state(|| dashboard.borrow().pyramid_chart().rendered());
    let frame = use_state(|| 0usize);
    let playing = use_state(|| false);

    let apply_event = {
        let dashboard = dashboard.clone();
        let controls = controls.clone();
        let trend = trend.clone();
        let pyramid = pyramid.clone();
        let frame = frame.clone();
        Callback::from(move |event: InputEvent| {
            let updates = dashboard.borrow_mut().apply(event);
            let mut next_controls: Option<ControlTree> = None;
            for update in updates {
                let Recompute::Render(payload) = update.result else {
                    // 更新抑制: 直前の描画を維持する。
                    continue;
                };
                match payload {
                    ViewPayload::Controls(tree) => next_controls = Some(tree),
                    ViewPayload::SubAreas(options) => {
                        let base = next_controls
                            .take()
                            .unwrap_or_else(|| (*controls).clone());
                        next_controls = Some(merge_sub_options(base, options));
                    }
                    ViewPayload::Trend(chart) => trend.set(chart),
                    ViewPayload::Pyramid(chart) => {
                        pyramid.set(Some(chart));
                        frame.set(0);
                    }
                }
            }
            if let Some(tree) = next_controls {
                controls.set(tree);
            }
        })
    };

    let on_mode_change = {
        let apply_event = apply_event.clone();
        Callback::from(move |event: Event| {
            if let Some(input) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
            {
                if let Some(mode) = RegionMode::from_token(&input.value()) {
                    apply_event.emit(InputEvent::SetMode(mode));
                }
            }
        })
    };

    let on_pref_change = {
        let apply_event = apply_event.clone();
        Callback::from(move |event: Event| {
            if let Some(values) = selected_values(&event) {
                apply_event.emit(InputEvent::SetTopAreas(values));
            }
        })
    };

    let on_sub_change = {
        let apply_event = apply_event.clone();
        Callback::from(move |event: Event| {
            if let Some(values) = selected_values(&event) {
                apply_event.emit(InputEvent::SetSubAreas(values));
            }
        })
    };

    let on_click_area = {
        let apply_event = apply_event.clone();
        Callback::from(move |area: String| {
            apply_event.emit(InputEvent::ClickArea(area));
        })
    };

    let on_frame_change = {
        let frame = frame.clone();
        Callback::from(move |event: SliderInput| {
            if let Some(input) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
            {
                if let Ok(idx) = input.value().parse::<usize>() {
                    frame.set(idx);
                }
            }
        })
    };

    let on_toggle_play = {
        let playing = playing.clone();
        Callback::from(move |_: MouseEvent| {
            playing.set(!*playing);
        })
    };

    {
        let frame = frame.clone();
        let frame_count = (*pyramid)
            .as_ref()
            .map(|chart| chart.frames.len())
            .unwrap_or(0);
        use_effect_with(
            (*playing, frame_count, *frame),
            move |(is_playing, frame_count, current)| {
                let interval = if *is_playing && *frame_count > 1 {
                    let next = (*current + 1) % *frame_count;
                    Some(Interval::new(ANIMATION_STEP_MS, move || {
                        frame.set(next);
                    }))
                } else {
                    None
                };
                move || drop(interval)
            },
        );
    }

    let mode = dashboard.borrow().selection().mode();

    let controls_view = match &*controls {
        ControlTree::Prefecture(prefecture) => html! {
            <div class="controls">
                { area_multiselect("都道府県", &prefecture.options, &prefecture.selected, on_pref_change.clone()) }
            </div>
        },
        ControlTree::Municipal(municipal) => html! {
            <div class="controls">
                { area_multiselect("都道府県", &municipal.prefecture_options, &municipal.selected_prefectures, on_pref_change.clone()) }
                { area_multiselect("市区町村", &municipal.sub_area_options, &municipal.selected_sub_areas, on_sub_change.clone()) }
            </div>
        },
    };

    let pyramid_view = match &*pyramid {
        Some(chart) => pyramid_pane(
            chart,
            *frame,
            on_frame_change.clone(),
            *playing,
            on_toggle_play.clone(),
        ),
        None => html! { <p>{ "表示できる地域が選択されていません。" }</p> },
    };

    html! {
        <div class="app" style="padding: 5%; background-color: #67D5B5;">
            <div style="background-color: #C5E99B; padding: 2%;">
                <h1>{ "日本の地域別将来推計人口観察" }</h1>
                <h5>{ "表示地域選択" }</h5>
                { mode_radio(mode, on_mode_change.clone()) }
            </div>

            { controls_view }

            <div>
                <div style={HALF_PANE_STYLE}>{ trend_pane(&trend, on_click_area.clone()) }</div>
                <div style={HALF_PANE_STYLE}>{ pyramid_view }</div>
            </div>

            <div style="text-align: center; padding: 2%;">
                <p>{ "上のラジオボタンで観察する地域を選びます。" }</p>
                <p>{ "都道府県を選ぶと都道府県、市区、町村を選択するとそれぞれの人口データが確認できます。" }</p>
                <p>{ "左のグラフの気になる地域をクリックすると、右にその人口ピラミッドが表示されます。" }</p>
                <p>{ "さらに再生ボタンを押すと、その2045年までの推移が確認できます。" }</p>
                <p>{ "データは国立社会保障・人口問題研究所の日本の地域別将来推計人口を用いました。" }</p>
                <a href="http://www.ipss.go.jp/pp-shicyoson/j/shicyoson18/t-page.asp">{ "リンク" }</a>
            </div>
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
fn mode_radio(current: RegionMode, onchange: Callback<Event>) -> Html {
    html! {
        <div class="mode-select">
            { for RegionMode::ALL.iter().map(|mode| {
                html! {
                    <label style="margin-right: 1em;">
                        <input
                            type="radio"
                            name="region-mode"
                            value={mode.as_token()}
                            checked={*mode == current}
                            onchange={onchange.clone()}
                        />
                        { mode.label() }
                    </label>
                }
            }) }
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
fn area_multiselect(
    label: &str,
    options: &[String],
    selected: &[String],
    onchange: Callback<Event>,
) -> Html {
    html! {
        <label style="display: inline-block; margin: 0.5em 1em 0.5em 0;">
            { label }
            <select multiple=true size="8" {onchange} style="display: block; min-width: 12em;">
                { for options.iter().map(|name| {
                    let chosen = selected.iter().any(|value| value == name);
                    html! { <option value={name.clone()} selected={chosen}>{ name }</option> }
                }) }
            </select>
        </label>
    }
}

#[cfg(target_arch = "wasm32")]
fn trend_pane(chart: &TrendChart, on_click_area: Callback<String>) -> Html {
    let bounds = charts::TrendBounds::from_chart(chart);
    let width = charts::TREND_WIDTH.to_string();
    let height = charts::TREND_HEIGHT.to_string();
    let axis_bottom = charts::TREND_HEIGHT - charts::MARGIN_BOTTOM;

    let body = match bounds {
        Some(bounds) => {
            let mut years: Vec<u16> = chart
                .series
                .iter()
                .flat_map(|series| series.points.iter().map(|point| point.year))
                .collect();
            years.sort_unstable();
            years.dedup();

            html! {
                <>
                    { for years.iter().map(|year| html! {
                        <text
                            x={format!("{:.1}", bounds.x(*year))}
                            y={format!("{:.1}", axis_bottom + 16.0)}
                            font-size="10"
                            text-anchor="middle"
                        >
                            { year.to_string() }
                        </text>
                    }) }
                    <text
                        x={format!("{:.1}", charts::MARGIN_LEFT - 6.0)}
                        y={format!("{:.1}", charts::MARGIN_TOP + 4.0)}
                        font-size="10"
                        text-anchor="end"
                    >
                        { charts::format_count(bounds.max_total()) }
                    </text>
                    <text
                        x={format!("{:.1}", charts::MARGIN_LEFT - 6.0)}
                        y={format!("{:.1}", axis_bottom)}
                        font-size="10"
                        text-anchor="end"
                    >
                        { "0" }
                    </text>
                    { for chart.series.iter().enumerate().map(|(idx, series)| {
                        trend_series_view(idx, series, &bounds, &on_click_area)
                    }) }
                </>
            }
        }
        None => html! {
            <text
                x={format!("{:.1}", charts::TREND_WIDTH / 2.0)}
                y={format!("{:.1}", charts::TREND_HEIGHT / 2.0)}
                font-size="12"
                text-anchor="middle"
            >
                { "表示できるデータがありません" }
            </text>
        },
    };

    html! {
        <div class="trend">
            <h3>{ "総数の推移" }</h3>
            <svg width={width} height={height} style="background-color: #ffffff;">
                <line
                    x1={format!("{:.1}", charts::MARGIN_LEFT)}
                    y1={format!("{:.1}", charts::MARGIN_TOP)}
                    x2={format!("{:.1}", charts::MARGIN_LEFT)}
                    y2={format!("{:.1}", axis_bottom)}
                    stroke="#888888"
                />
                <line
                    x1={format!("{:.1}", charts::MARGIN_LEFT)}
                    y1={format!("{:.1}", axis_bottom)}
                    x2={format!("{:.1}", charts::TREND_WIDTH - charts::MARGIN_RIGHT)}
                    y2={format!("{:.1}", axis_bottom)}
                    stroke="#888888"
                />
                { body }
            </svg>
            <ul style="list-style: none; padding: 0; margin: 0.5em 0;">
                { for chart.series.iter().enumerate().map(|(idx, series)| html! {
                    <li style={format!("color: {}; display: inline-block; margin-right: 1em;", charts::series_color(idx))}>
                        { &series.area }
                    </li>
                }) }
            </ul>
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
fn trend_series_view(
    idx: usize,
    series: &jinkograph_core::TrendSeries,
    bounds: &charts::TrendBounds,
    on_click_area: &Callback<String>,
) -> Html {
    let color = charts::series_color(idx);
    let points = charts::polyline_points(series, bounds);
    html! {
        <g>
            <polyline points={points} fill="none" stroke={color} stroke-width="2" />
            { for series.points.iter().map(|point| {
                let onclick = {
                    let on_click_area = on_click_area.clone();
                    let area = series.area.clone();
                    Callback::from(move |_: MouseEvent| on_click_area.emit(area.clone()))
                };
                html! {
                    <circle
                        cx={format!("{:.1}", bounds.x(point.year))}
                        cy={format!("{:.1}", bounds.y(point.total))}
                        r="4"
                        fill={color}
                        style="cursor: pointer;"
                        {onclick}
                    >
                        <title>{ format!("{} {}年: {}", series.area, point.year, charts::format_count(point.total)) }</title>
                    </circle>
                }
            }) }
        </g>
    }
}

#[cfg(target_arch = "wasm32")]
fn pyramid_pane(
    chart: &PyramidChart,
    frame_idx: usize,
    on_frame: Callback<SliderInput>,
    playing: bool,
    on_toggle: Callback<MouseEvent>,
) -> Html {
    let last_frame = chart.frames.len().saturating_sub(1);
    let frame_idx = frame_idx.min(last_frame);
    let Some(frame) = chart.frames.get(frame_idx) else {
        return html! { <p>{ "表示できる年がありません。" }</p> };
    };
    let max = chart.max_value().max(1.0);
    let plot_width = charts::PYRAMID_WIDTH - charts::PYRAMID_LABEL_GUTTER - charts::MARGIN_RIGHT;
    let height = charts::pyramid_height(chart);

    html! {
        <div class="pyramid">
            <h3>{ chart.title() }</h3>
            <svg
                width={charts::PYRAMID_WIDTH.to_string()}
                height={height.to_string()}
                style="background-color: #ffffff;"
            >
                { for chart.brackets.iter().enumerate().map(|(idx, label)| {
                    // 最高齢の階級を最上段に置く。
                    let row = chart.brackets.len() - 1 - idx;
                    let y = charts::MARGIN_TOP + row as f64 * charts::PYRAMID_ROW_HEIGHT;
                    let value = frame.values.get(idx).copied().unwrap_or(0.0);
                    let width = charts::bar_width(value, max, plot_width);
                    html! {
                        <g>
                            <text
                                x={format!("{:.1}", charts::PYRAMID_LABEL_GUTTER - 6.0)}
                                y={format!("{:.1}", y + charts::PYRAMID_BAR_HEIGHT)}
                                font-size="9"
                                text-anchor="end"
                            >
                                { label }
                            </text>
                            <rect
                                x={format!("{:.1}", charts::PYRAMID_LABEL_GUTTER)}
                                y={format!("{:.1}", y + 2.0)}
                                width={format!("{:.1}", width)}
                                height={charts::PYRAMID_BAR_HEIGHT.to_string()}
                                fill={charts::series_color(0)}
                            />
                            <text
                                x={format!("{:.1}", charts::PYRAMID_LABEL_GUTTER + width + 4.0)}
                                y={format!("{:.1}", y + charts::PYRAMID_BAR_HEIGHT)}
                                font-size="8"
                            >
                                { charts::format_count(value) }
                            </text>
                        </g>
                    }
                }) }
            </svg>
            <div class="animation">
                <button onclick={on_toggle}>{ if playing { "停止" } else { "再生" } }</button>
                <input
                    type="range"
                    min="0"
                    max={last_frame.to_string()}
                    value={frame_idx.to_string()}
                    oninput={on_frame}
                />
                <span>{ format!("{}年", frame.year) }</span>
            </div>
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    yew::Renderer::<App>::new().render();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn start() {
    panic!("jinkograph-web は wasm32-unknown-unknown ターゲットでのみ利用できます。");
}

#[cfg(test)]
mod tests {
    use jinkograph_core::{MunicipalControls, PrefectureControls, RegionMode, top_areas};

    use super::*;

    #[test]
    fn embedded_dataset_parses_and_covers_all_modes() {
        let dataset = load_embedded_dataset().expect("同梱データは読み込めるはず");
        assert!(!dataset.is_empty());
        assert_eq!(dataset.bracket_labels().len(), 19);
        for mode in RegionMode::ALL {
            assert!(
                !top_areas(&dataset, mode).is_empty(),
                "粒度 {:?} の選択肢が空です",
                mode
            );
        }
    }

    #[test]
    fn embedded_dataset_contains_default_selections() {
        let dataset = load_embedded_dataset().unwrap();
        let prefectures = top_areas(&dataset, RegionMode::Prefecture);
        assert!(prefectures.iter().any(|name| name == "京都府"));
        assert!(prefectures.iter().any(|name| name == "北海道"));
    }

    #[test]
    fn merge_sub_options_rewrites_municipal_controls_only() {
        let municipal = ControlTree::Municipal(MunicipalControls {
            prefecture_options: vec!["北海道".to_string()],
            selected_prefectures: vec!["北海道".to_string()],
            sub_area_options: vec!["札幌市".to_string()],
            selected_sub_areas: vec!["札幌市".to_string()],
        });
        let merged = merge_sub_options(
            municipal,
            SubAreaOptions {
                options: vec!["函館市".to_string()],
                selected: vec!["函館市".to_string()],
            },
        );
        match merged {
            ControlTree::Municipal(controls) => {
                assert_eq!(controls.sub_area_options, vec!["函館市".to_string()]);
                assert_eq!(controls.selected_sub_areas, vec!["函館市".to_string()]);
                assert_eq!(controls.selected_prefectures, vec!["北海道".to_string()]);
            }
            ControlTree::Prefecture(_) => panic!("市区町村側の操作パネルのはず"),
        }

        let prefecture = ControlTree::Prefecture(PrefectureControls {
            options: vec!["京都府".to_string()],
            selected: vec!["京都府".to_string()],
        });
        let untouched = merge_sub_options(
            prefecture.clone(),
            SubAreaOptions {
                options: Vec::new(),
                selected: Vec::new(),
            },
        );
        assert_eq!(untouched, prefecture);
    }
}
