use std::collections::HashSet;

use anyhow::{Result, bail, ensure};

use super::loader;
use super::record::PopulationRecord;

/// 読み込み済みの人口推計テーブル。プロセス起動時に一度だけ構築し、
/// 以降は読み取り専用で全セッションから共有される。
#[derive(Debug, Clone)]
pub struct Dataset {
    bracket_labels: Vec<String>,
    records: Vec<PopulationRecord>,
}

impl Dataset {
    pub(crate) fn new(bracket_labels: Vec<String>, records: Vec<PopulationRecord>) -> Result<Self> {
        ensure!(
            !bracket_labels.is_empty(),
            "年齢階級の列が1つもありません"
        );

        let mut seen = HashSet::new();
        for record in &records {
            ensure!(
                record.brackets.len() == bracket_labels.len(),
                "{} {}年の年齢階級数が見出しと一致しません",
                record.area,
                record.year
            );
            // 不変条件: (区分, 地域, 年) ごとに行はちょうど1つ。
            if !seen.insert((record.kind, record.area.clone(), record.year)) {
                bail!("重複した行があります: {} {}年", record.area, record.year);
            }
        }

        Ok(Self {
            bracket_labels,
            records,
        })
    }

    /// CSV本文からデータセットを構築する。必須列の欠落は即時エラー。
    pub fn from_csv(body: &str) -> Result<Self> {
        loader::parse_csv(body)
    }

    pub fn records(&self) -> &[PopulationRecord] {
        &self.records
    }

    pub fn bracket_labels(&self) -> &[String] {
        &self.bracket_labels
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// テーブルに現れる年の昇順リスト。
    pub fn years(&self) -> Vec<u16> {
        let mut years: Vec<u16> = self
            .records
            .iter()
            .map(|record| record.year)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        years.sort_unstable();
        years
    }
}
