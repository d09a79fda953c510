use super::dataset::Dataset;
use super::filter::{derive_sub_areas, top_areas};
use super::record::RegionMode;

const DEFAULT_PREFECTURE: &str = "京都府";
const DEFAULT_MUNICIPAL_PREFECTURE: &str = "北海道";

/// セッション内のUI選択状態。永続化されず、モード切替で全て作り直される。
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    mode: RegionMode,
    top_areas: Vec<String>,
    sub_areas: Vec<String>,
    clicked: Option<String>,
}

impl SelectionState {
    pub fn new(dataset: &Dataset, mode: RegionMode) -> Self {
        let mut state = Self {
            mode,
            top_areas: Vec::new(),
            sub_areas: Vec::new(),
            clicked: None,
        };
        state.reset_defaults(dataset);
        state
    }

    pub fn mode(&self) -> RegionMode {
        self.mode
    }

    pub fn top_areas(&self) -> &[String] {
        &self.top_areas
    }

    pub fn sub_areas(&self) -> &[String] {
        &self.sub_areas
    }

    pub fn clicked(&self) -> Option<&str> {
        self.clicked.as_deref()
    }

    /// グラフ描画の対象になる末端の選択地域。
    /// 都道府県モードでは第1段、それ以外では第2段の選択。
    pub fn leaf_areas(&self) -> &[String] {
        if self.mode.uses_sub_areas() {
            &self.sub_areas
        } else {
            &self.top_areas
        }
    }

    /// モード切替。前モードの選択・クリックは持ち越さず、既定値から組み立て直す。
    pub fn set_mode(&mut self, dataset: &Dataset, mode: RegionMode) {
        self.mode = mode;
        self.reset_defaults(dataset);
    }

    /// 第1段の選択変更。第2段の既定値を導出し直し、
    /// 選択から外れた地域へのクリックは無効化する。
    pub fn set_top_areas(&mut self, dataset: &Dataset, areas: Vec<String>) {
        self.top_areas = areas;
        self.refresh_sub_defaults(dataset);
        self.drop_stale_click();
    }

    pub fn set_sub_areas(&mut self, areas: Vec<String>) {
        self.sub_areas = areas;
        self.drop_stale_click();
    }

    /// トレンドグラフ上の点クリック。ホバーラベルの地域名を記録する。
    pub fn click(&mut self, area: String) {
        self.clicked = Some(area);
    }

    /// 人口ピラミッドの対象地域。クリック済みならその地域、
    /// なければ現在選択の先頭。どのモードでも同じ後退規則を使う。
    pub fn pyramid_area(&self) -> Option<&str> {
        self.clicked
            .as_deref()
            .or_else(|| self.leaf_areas().first().map(String::as_str))
    }

    fn reset_defaults(&mut self, dataset: &Dataset) {
        let options = top_areas(dataset, self.mode);
        let preferred = match self.mode {
            RegionMode::Prefecture => DEFAULT_PREFECTURE,
            _ => DEFAULT_MUNICIPAL_PREFECTURE,
        };
        self.top_areas = pick_default(&options, preferred);
        self.clicked = None;
        self.refresh_sub_defaults(dataset);
    }

    fn refresh_sub_defaults(&mut self, dataset: &Dataset) {
        if !self.mode.uses_sub_areas() {
            self.sub_areas.clear();
            return;
        }
        let derived = derive_sub_areas(dataset, self.mode, &self.top_areas);
        self.sub_areas = derived.into_iter().take(1).collect();
    }

    fn drop_stale_click(&mut self) {
        if let Some(area) = &self.clicked {
            if !self.leaf_areas().iter().any(|name| name == area) {
                self.clicked = None;
            }
        }
    }
}

fn pick_default(options: &[String], preferred: &str) -> Vec<String> {
    if options.iter().any(|name| name == preferred) {
        vec![preferred.to_string()]
    } else {
        options.first().cloned().into_iter().collect()
    }
}
