use std::rc::Rc;

use crate::population::{
    Dataset, PyramidChart, RegionMode, SelectionState, TrendChart, compose_pyramid, compose_trend,
    derive_sub_areas, top_areas,
};
use crate::reactive::{NodeId, ReactiveGraph, Recompute};

/// UI操作1回分の入力イベント。ハンドラは同期的に完走する。
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    SetMode(RegionMode),
    SetTopAreas(Vec<String>),
    SetSubAreas(Vec<String>),
    ClickArea(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefectureControls {
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalControls {
    pub prefecture_options: Vec<String>,
    pub selected_prefectures: Vec<String>,
    pub sub_area_options: Vec<String>,
    pub selected_sub_areas: Vec<String>,
}

/// モードごとの操作パネル。切替時は前モードの状態を捨てて作り直す。
#[derive(Debug, Clone, PartialEq)]
pub enum ControlTree {
    Prefecture(PrefectureControls),
    Municipal(MunicipalControls),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubAreaOptions {
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewPayload {
    Controls(ControlTree),
    SubAreas(SubAreaOptions),
    Trend(TrendChart),
    Pyramid(PyramidChart),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    ControlTree,
    SubAreaOptions,
    TrendChart,
    PyramidChart,
}

impl OutputKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutputKind::ControlTree => "操作パネル",
            OutputKind::SubAreaOptions => "市区町村の選択肢",
            OutputKind::TrendChart => "総数推移グラフ",
            OutputKind::PyramidChart => "人口ピラミッド",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputUpdate {
    pub output: OutputKind,
    pub result: Recompute<ViewPayload>,
}

struct NodeHandles {
    mode: NodeId,
    top: NodeId,
    sub: NodeId,
    click: NodeId,
    control_tree: NodeId,
    sub_options: NodeId,
    trend: NodeId,
    pyramid: NodeId,
}

/// ダッシュボード1セッション分の状態。共有データセットへの参照と
/// 選択状態、出力の依存グラフを束ねる。
pub struct Dashboard {
    dataset: Rc<Dataset>,
    selection: SelectionState,
    graph: ReactiveGraph,
    nodes: NodeHandles,
}

impl Dashboard {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        Self::with_mode(dataset, RegionMode::Prefecture)
    }

    pub fn with_mode(dataset: Rc<Dataset>, mode: RegionMode) -> Self {
        let selection = SelectionState::new(&dataset, mode);
        let mut graph = ReactiveGraph::new();
        let mode_node = graph.add_input("region_mode");
        let top = graph.add_input("top_selection");
        let sub = graph.add_input("sub_selection");
        let click = graph.add_input("clicked_area");
        let control_tree = graph
            .add_output("control_tree", &[mode_node, top, sub])
            .expect("依存グラフの構築に失敗しました");
        let sub_options = graph
            .add_output("sub_area_options", &[mode_node, top])
            .expect("依存グラフの構築に失敗しました");
        let trend = graph
            .add_output("trend_chart", &[mode_node, top, sub, sub_options])
            .expect("依存グラフの構築に失敗しました");
        let pyramid = graph
            .add_output("pyramid_chart", &[mode_node, top, sub, sub_options, click])
            .expect("依存グラフの構築に失敗しました");

        Self {
            dataset,
            selection,
            graph,
            nodes: NodeHandles {
                mode: mode_node,
                top,
                sub,
                click,
                control_tree,
                sub_options,
                trend,
                pyramid,
            },
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// 入力イベントを反映し、影響を受けた出力だけを依存順に再計算する。
    pub fn apply(&mut self, event: InputEvent) -> Vec<OutputUpdate> {
        let changed = match event {
            InputEvent::SetMode(mode) => {
                self.selection.set_mode(&self.dataset, mode);
                self.nodes.mode
            }
            InputEvent::SetTopAreas(areas) => {
                self.selection.set_top_areas(&self.dataset, areas);
                self.nodes.top
            }
            InputEvent::SetSubAreas(areas) => {
                self.selection.set_sub_areas(areas);
                self.nodes.sub
            }
            InputEvent::ClickArea(area) => {
                self.selection.click(area);
                self.nodes.click
            }
        };

        self.graph
            .affected(&[changed])
            .into_iter()
            .filter_map(|node| self.recompute(node))
            .collect()
    }

    /// 起動直後の初期描画。全出力を依存順に計算する。
    pub fn initial_updates(&self) -> Vec<OutputUpdate> {
        self.graph
            .affected(&[
                self.nodes.mode,
                self.nodes.top,
                self.nodes.sub,
                self.nodes.click,
            ])
            .into_iter()
            .filter_map(|node| self.recompute(node))
            .collect()
    }

    fn recompute(&self, node: NodeId) -> Option<OutputUpdate> {
        let (output, result) = if node == self.nodes.control_tree {
            (
                OutputKind::ControlTree,
                Recompute::Render(ViewPayload::Controls(self.control_tree())),
            )
        } else if node == self.nodes.sub_options {
            (
                OutputKind::SubAreaOptions,
                self.sub_area_options().map(ViewPayload::SubAreas),
            )
        } else if node == self.nodes.trend {
            (
                OutputKind::TrendChart,
                Recompute::Render(ViewPayload::Trend(self.trend_chart())),
            )
        } else if node == self.nodes.pyramid {
            (
                OutputKind::PyramidChart,
                self.pyramid_chart().map(ViewPayload::Pyramid),
            )
        } else {
            return None;
        };
        Some(OutputUpdate { output, result })
    }

    pub fn control_tree(&self) -> ControlTree {
        let mode = self.selection.mode();
        let options = top_areas(&self.dataset, mode);
        let selected = self.selection.top_areas().to_vec();
        if mode.uses_sub_areas() {
            ControlTree::Municipal(MunicipalControls {
                prefecture_options: options,
                selected_prefectures: selected,
                sub_area_options: derive_sub_areas(&self.dataset, mode, self.selection.top_areas()),
                selected_sub_areas: self.selection.sub_areas().to_vec(),
            })
        } else {
            ControlTree::Prefecture(PrefectureControls { options, selected })
        }
    }

    /// 市区町村ドロップダウンの選択肢。上流の選択が空のときは
    /// 空の選択肢を出す代わりに更新を抑制する。
    pub fn sub_area_options(&self) -> Recompute<SubAreaOptions> {
        let mode = self.selection.mode();
        if !mode.uses_sub_areas() || self.selection.top_areas().is_empty() {
            return Recompute::Suppress;
        }
        let options = derive_sub_areas(&self.dataset, mode, self.selection.top_areas());
        if options.is_empty() {
            return Recompute::Suppress;
        }
        Recompute::Render(SubAreaOptions {
            options,
            selected: self.selection.sub_areas().to_vec(),
        })
    }

    /// 現在の選択に対する総数推移。空の選択は空グラフとして描画する。
    pub fn trend_chart(&self) -> TrendChart {
        compose_trend(
            &self.dataset,
            self.selection.mode(),
            self.selection.leaf_areas(),
        )
    }

    /// クリック地域(なければ選択先頭)の人口ピラミッド。対象が無ければ抑制。
    pub fn pyramid_chart(&self) -> Recompute<PyramidChart> {
        let Some(area) = self.selection.pyramid_area() else {
            return Recompute::Suppress;
        };
        match compose_pyramid(&self.dataset, self.selection.mode(), area) {
            Some(chart) => Recompute::Render(chart),
            None => Recompute::Suppress,
        }
    }
}
