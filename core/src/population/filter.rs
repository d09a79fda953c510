use std::collections::HashSet;

use super::dataset::Dataset;
use super::record::{PopulationRecord, RegionMode};

/// 粒度と選択地域名で行を絞り込む。副作用なし・冪等。
/// 一致する行が無い場合は空集合を返す(空グラフとして描画される正常系)。
pub fn filter_records<'a>(
    dataset: &'a Dataset,
    mode: RegionMode,
    names: &[String],
) -> Vec<&'a PopulationRecord> {
    dataset
        .records()
        .iter()
        .filter(|record| mode.matches(record.kind))
        .filter(|record| {
            names
                .iter()
                .any(|name| name == record.selection_key(mode))
        })
        .collect()
}

/// 粒度に対応する第1段ドロップダウンの選択肢(都道府県名)。
/// データセットの初出順を保ち、重複を除く。
pub fn top_areas(dataset: &Dataset, mode: RegionMode) -> Vec<String> {
    dedup_in_order(
        dataset
            .records()
            .iter()
            .filter(|record| mode.matches(record.kind))
            .map(|record| record.prefecture.as_str()),
    )
}

/// 選択された都道府県に属する市区町村名を導出する。
/// 初出順・重複なし。該当なしは空リストで、呼び出し側が更新抑制として扱う。
pub fn derive_sub_areas(
    dataset: &Dataset,
    mode: RegionMode,
    prefectures: &[String],
) -> Vec<String> {
    if !mode.uses_sub_areas() {
        return Vec::new();
    }
    dedup_in_order(
        dataset
            .records()
            .iter()
            .filter(|record| mode.matches(record.kind))
            .filter(|record| prefectures.iter().any(|name| name == &record.prefecture))
            .map(|record| record.area.as_str()),
    )
}

fn dedup_in_order<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for name in names {
        if seen.insert(name) {
            ordered.push(name.to_string());
        }
    }
    ordered
}
