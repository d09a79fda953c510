use super::dataset::Dataset;

/// テスト用の縮約データ。実データと同じ列構成で、
/// 都道府県2件・市区3件・町村2件 × 2年分を収める。
pub(crate) const SAMPLE_CSV: &str = "\
市などの別,コード,都道府県,市区町村,年,総数,0~4歳,5~9歳,90歳以上
a,01000,北海道,北海道,2015,5380,180,210,120
a,01000,北海道,北海道,2020,5220,160,195,140
a,26000,京都府,京都府,2015,2610,95,110,60
a,26000,京都府,京都府,2020,2570,88,102,72
0,01100,北海道,札幌市,2015,1950,70,78,40
0,01100,北海道,札幌市,2020,1970,66,74,48
1,01202,北海道,函館市,2015,266,8,10,7
1,01202,北海道,函館市,2020,251,7,9,8
0,26100,京都府,京都市,2015,1475,52,58,33
0,26100,京都府,京都市,2020,1460,48,54,38
3,01393,北海道,倶知安町,2015,15.0,0.6,0.7,0.3
3,01393,北海道,倶知安町,2020,14.7,0.5,0.6,0.4
3,26344,京都府,宇治田原町,2015,9.3,0.3,0.4,0.2
3,26344,京都府,宇治田原町,2020,8.8,0.2,0.3,0.3
";

pub(crate) fn sample_dataset() -> Dataset {
    Dataset::from_csv(SAMPLE_CSV).expect("テストデータの読み込みに失敗しました")
}
