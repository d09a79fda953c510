use anyhow::{Context, Result, anyhow, ensure};
use csv::StringRecord;

use super::dataset::Dataset;
use super::record::{AreaKind, PopulationRecord};

const KIND_COLUMN: &str = "市などの別";
const CODE_COLUMN: &str = "コード";
const PREFECTURE_COLUMN: &str = "都道府県";
const AREA_COLUMN: &str = "市区町村";
const YEAR_COLUMN: &str = "年";
const TOTAL_COLUMN: &str = "総数";

/// CSV本文を解析してデータセットを構築する。
///
/// 見出し行の必須列(市などの別・コード・都道府県・市区町村・年・総数)が
/// 欠けている場合はどの列が無いかを示すエラーで即座に失敗する。
/// 総数より後ろの列はすべて年齢階級としてファイルの並び順のまま取り込む。
pub(crate) fn parse_csv(body: &str) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .context("ヘッダー行の読み込みに失敗しました")?
        .clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let line = idx + 2;
        let row = row.with_context(|| format!("{line}行目の読み込みに失敗しました"))?;
        let record = layout
            .parse_row(&row)
            .with_context(|| format!("{line}行目の解析に失敗しました"))?;
        records.push(record);
    }

    let dataset = Dataset::new(layout.bracket_labels, records)?;
    log::debug!(
        "人口データを読み込みました: {}行 / 年齢階級{}区分",
        dataset.len(),
        dataset.bracket_labels().len()
    );
    Ok(dataset)
}

struct ColumnLayout {
    kind: usize,
    code: usize,
    prefecture: usize,
    area: usize,
    year: usize,
    total: usize,
    bracket_columns: Vec<usize>,
    bracket_labels: Vec<String>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| anyhow!("必須列が見つかりません: {name}"))
        };

        let total = find(TOTAL_COLUMN)?;
        let bracket_columns: Vec<usize> = (total + 1..headers.len()).collect();
        let bracket_labels: Vec<String> = bracket_columns
            .iter()
            .map(|&idx| headers[idx].trim().to_string())
            .collect();
        ensure!(
            !bracket_labels.is_empty(),
            "総数より後ろに年齢階級の列がありません"
        );

        Ok(Self {
            kind: find(KIND_COLUMN)?,
            code: find(CODE_COLUMN)?,
            prefecture: find(PREFECTURE_COLUMN)?,
            area: find(AREA_COLUMN)?,
            year: find(YEAR_COLUMN)?,
            total,
            bracket_columns,
            bracket_labels,
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Result<PopulationRecord> {
        let kind = AreaKind::from_code(self.field(row, self.kind)?)?;
        let code = self.field(row, self.code)?.to_string();
        let prefecture = self.field(row, self.prefecture)?.to_string();
        let area = self.field(row, self.area)?.to_string();
        let year = parse_year(self.field(row, self.year)?)?;
        let total = parse_count(self.field(row, self.total)?, TOTAL_COLUMN)?;

        let mut brackets = Vec::with_capacity(self.bracket_columns.len());
        for (&idx, label) in self.bracket_columns.iter().zip(&self.bracket_labels) {
            brackets.push(parse_count(self.field(row, idx)?, label)?);
        }

        Ok(PopulationRecord {
            kind,
            code,
            prefecture,
            area,
            year,
            total,
            brackets,
        })
    }

    fn field<'a>(&self, row: &'a StringRecord, idx: usize) -> Result<&'a str> {
        row.get(idx)
            .map(str::trim)
            .ok_or_else(|| anyhow!("{}列目の値がありません", idx + 1))
    }
}

fn parse_year(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .map_err(|_| anyhow!("年の値が不正です: {value}"))
}

fn parse_count(value: &str, label: &str) -> Result<f64> {
    // 桁区切りのカンマは取り除いてから解釈する。
    let normalized = value.replace(',', "");
    let count = normalized
        .parse::<f64>()
        .map_err(|_| anyhow!("{label}の値が不正です: {value}"))?;
    ensure!(count.is_finite() && count >= 0.0, "{label}の値が不正です: {value}");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::super::record::RegionMode;
    use super::super::testdata;
    use super::*;

    #[test]
    fn sample_csv_loads_with_ordered_brackets() {
        let dataset = testdata::sample_dataset();
        assert_eq!(dataset.len(), 14);
        assert_eq!(
            dataset.bracket_labels(),
            &["0~4歳".to_string(), "5~9歳".to_string(), "90歳以上".to_string()]
        );
        let first = &dataset.records()[0];
        assert_eq!(first.prefecture, "北海道");
        assert_eq!(first.year, 2015);
        assert!(RegionMode::Prefecture.matches(first.kind));
    }

    #[test]
    fn totals_and_brackets_are_numeric() {
        let dataset = testdata::sample_dataset();
        for record in dataset.records() {
            assert!(record.total > 0.0);
            assert_eq!(record.brackets.len(), dataset.bracket_labels().len());
        }
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let body = "市などの別,コード,都道府県,年,総数,0~4歳\n\
                    a,26000,京都府,2020,100,100\n";
        let err = parse_csv(body).expect_err("市区町村列の欠落はエラーになるはず");
        assert!(format!("{err}").contains("必須列が見つかりません: 市区町村"));
    }

    #[test]
    fn missing_bracket_columns_fail_fast() {
        let body = "市などの別,コード,都道府県,市区町村,年,総数\n\
                    a,26000,京都府,京都府,2020,100\n";
        let err = parse_csv(body).expect_err("年齢階級列の欠落はエラーになるはず");
        assert!(format!("{err}").contains("年齢階級"));
    }

    #[test]
    fn unknown_kind_code_reports_row_context() {
        let body = "市などの別,コード,都道府県,市区町村,年,総数,0~4歳\n\
                    z,26000,京都府,京都府,2020,100,100\n";
        let err = parse_csv(body).expect_err("未知の区分コードはエラーになるはず");
        let message = format!("{err:#}");
        assert!(message.contains("2行目"));
        assert!(message.contains("市などの別"));
    }

    #[test]
    fn malformed_count_reports_bracket_label() {
        let body = "市などの別,コード,都道府県,市区町村,年,総数,0~4歳\n\
                    a,26000,京都府,京都府,2020,100,abc\n";
        let err = parse_csv(body).expect_err("数値でない階級値はエラーになるはず");
        assert!(format!("{err:#}").contains("0~4歳"));
    }

    #[test]
    fn grouped_digit_counts_are_accepted() {
        let body = "市などの別,コード,都道府県,市区町村,年,総数,0~4歳\n\
                    a,26000,京都府,京都府,2020,\"1,234\",\"1,234\"\n";
        let dataset = parse_csv(body).expect("桁区切り付きの数値は受理されるはず");
        assert_eq!(dataset.records()[0].total, 1234.0);
    }

    #[test]
    fn duplicate_rows_are_rejected_at_load() {
        let body = "市などの別,コード,都道府県,市区町村,年,総数,0~4歳\n\
                    a,26000,京都府,京都府,2020,100,100\n\
                    a,26000,京都府,京都府,2020,100,100\n";
        let err = parse_csv(body).expect_err("重複行はエラーになるはず");
        assert!(format!("{err}").contains("重複した行"));
    }
}
