use anyhow::{Result, anyhow};
use serde::Serialize;

/// 市などの別コードに対応する地域区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AreaKind {
    Prefecture,
    DesignatedCity,
    City,
    Ward,
    TownVillage,
}

impl AreaKind {
    pub(crate) fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "a" => Ok(AreaKind::Prefecture),
            "0" => Ok(AreaKind::DesignatedCity),
            "1" => Ok(AreaKind::City),
            "2" => Ok(AreaKind::Ward),
            "3" => Ok(AreaKind::TownVillage),
            other => Err(anyhow!("未知の市などの別コードです: {other}")),
        }
    }
}

/// 観察する地域の粒度。ラジオボタンの選択肢に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegionMode {
    Prefecture,
    WardCity,
    TownVillage,
}

impl RegionMode {
    pub const ALL: [RegionMode; 3] = [
        RegionMode::Prefecture,
        RegionMode::WardCity,
        RegionMode::TownVillage,
    ];

    /// 地域区分がこの粒度に含まれるかどうか。
    pub fn matches(&self, kind: AreaKind) -> bool {
        match self {
            RegionMode::Prefecture => matches!(kind, AreaKind::Prefecture),
            RegionMode::WardCity => matches!(
                kind,
                AreaKind::DesignatedCity | AreaKind::City | AreaKind::Ward
            ),
            RegionMode::TownVillage => matches!(kind, AreaKind::TownVillage),
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "todofuken" | "都道府県" => Some(RegionMode::Prefecture),
            "shiku" | "市/区" | "市区" => Some(RegionMode::WardCity),
            "choson" | "町村" => Some(RegionMode::TownVillage),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            RegionMode::Prefecture => "todofuken",
            RegionMode::WardCity => "shiku",
            RegionMode::TownVillage => "choson",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegionMode::Prefecture => "都道府県",
            RegionMode::WardCity => "市/区",
            RegionMode::TownVillage => "町村",
        }
    }

    /// 町村・市区モードでは第2段の市区町村ドロップダウンを持つ。
    pub fn uses_sub_areas(&self) -> bool {
        !matches!(self, RegionMode::Prefecture)
    }
}

/// 1地域・1年分の推計人口行。読み込み後は不変。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRecord {
    pub kind: AreaKind,
    pub code: String,
    pub prefecture: String,
    pub area: String,
    pub year: u16,
    pub total: f64,
    pub brackets: Vec<f64>,
}

impl PopulationRecord {
    /// 粒度に応じた選択キー。都道府県モードでは都道府県名、それ以外は市区町村名。
    pub fn selection_key(&self, mode: RegionMode) -> &str {
        match mode {
            RegionMode::Prefecture => &self.prefecture,
            _ => &self.area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_kind_codes_map_to_variants() {
        assert_eq!(AreaKind::from_code("a").unwrap(), AreaKind::Prefecture);
        assert_eq!(AreaKind::from_code("0").unwrap(), AreaKind::DesignatedCity);
        assert_eq!(AreaKind::from_code("1").unwrap(), AreaKind::City);
        assert_eq!(AreaKind::from_code("2").unwrap(), AreaKind::Ward);
        assert_eq!(AreaKind::from_code("3").unwrap(), AreaKind::TownVillage);
    }

    #[test]
    fn unknown_area_kind_code_is_rejected() {
        let err = AreaKind::from_code("9").expect_err("未知コードはエラーになるはず");
        assert!(format!("{err}").contains("市などの別"));
    }

    #[test]
    fn region_modes_match_disjoint_kind_sets() {
        let kinds = [
            AreaKind::Prefecture,
            AreaKind::DesignatedCity,
            AreaKind::City,
            AreaKind::Ward,
            AreaKind::TownVillage,
        ];
        for kind in kinds {
            let matching = RegionMode::ALL
                .iter()
                .filter(|mode| mode.matches(kind))
                .count();
            assert_eq!(matching, 1, "区分 {kind:?} は1つの粒度だけに属するはず");
        }
    }

    #[test]
    fn mode_tokens_round_trip() {
        for mode in RegionMode::ALL {
            assert_eq!(RegionMode::from_token(mode.as_token()), Some(mode));
            assert_eq!(RegionMode::from_token(mode.label()), Some(mode));
        }
        assert_eq!(RegionMode::from_token("unknown"), None);
    }

    #[test]
    fn selection_key_follows_mode() {
        let record = PopulationRecord {
            kind: AreaKind::City,
            code: "01202".to_string(),
            prefecture: "北海道".to_string(),
            area: "函館市".to_string(),
            year: 2020,
            total: 1000.0,
            brackets: vec![400.0, 600.0],
        };
        assert_eq!(record.selection_key(RegionMode::Prefecture), "北海道");
        assert_eq!(record.selection_key(RegionMode::WardCity), "函館市");
        assert_eq!(record.selection_key(RegionMode::TownVillage), "函館市");
    }
}
