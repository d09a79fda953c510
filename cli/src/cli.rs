use std::io::{self, BufRead, Write};

use anyhow::{Result, anyhow, bail};
use jinkograph_core::{
    Dashboard, InputEvent, OutputUpdate, PyramidChart, Recompute, RegionMode, TrendChart,
    top_areas,
};

const BAR_WIDTH: usize = 40;

pub fn run(dashboard: &mut Dashboard) -> Result<()> {
    print_intro(dashboard);
    let stdin = io::stdin();

    loop {
        print!("{}> ", dashboard.selection().mode().label());
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line)?;

        if bytes == 0 {
            println!("入力が終了したため終了します。");
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Err(error) = dispatch_command(dashboard, trimmed) {
            println!("エラー: {error}");
        }
    }
}

fn dispatch_command(dashboard: &mut Dashboard, input: &str) -> Result<()> {
    let mut parts = input.split_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| anyhow!("コマンドが指定されていません。"))?
        .to_ascii_lowercase();
    let rest: Vec<&str> = parts.collect();

    match command.as_str() {
        "help" | "?" => {
            print_help();
            Ok(())
        }
        "modes" => {
            for mode in RegionMode::ALL {
                println!("  {:<10} {}", mode.as_token(), mode.label());
            }
            Ok(())
        }
        "mode" => {
            let token = rest
                .first()
                .ok_or_else(|| anyhow!("粒度を指定してください。(todofuken / shiku / choson)"))?;
            let mode = RegionMode::from_token(token)
                .ok_or_else(|| anyhow!("未知の粒度です: {token}"))?;
            let updates = dashboard.apply(InputEvent::SetMode(mode));
            println!("表示地域を「{}」に切り替えました。", mode.label());
            print_updates(&updates);
            Ok(())
        }
        "areas" => {
            let options = top_areas(dashboard.dataset(), dashboard.selection().mode());
            print_options("都道府県", &options);
            Ok(())
        }
        "select" => {
            if rest.is_empty() {
                bail!("選択する都道府県を指定してください。");
            }
            let options = top_areas(dashboard.dataset(), dashboard.selection().mode());
            let areas = resolve_areas(&options, &rest)?;
            let updates = dashboard.apply(InputEvent::SetTopAreas(areas));
            print_updates(&updates);
            Ok(())
        }
        "sub" => {
            match dashboard.sub_area_options() {
                Recompute::Render(options) => print_options("市区町村", &options.options),
                Recompute::Suppress => println!("選択できる市区町村がありません。"),
            }
            Ok(())
        }
        "subselect" => {
            if rest.is_empty() {
                bail!("選択する市区町村を指定してください。");
            }
            let options = match dashboard.sub_area_options() {
                Recompute::Render(options) => options.options,
                Recompute::Suppress => bail!("この粒度では市区町村を選択できません。"),
            };
            let areas = resolve_areas(&options, &rest)?;
            let updates = dashboard.apply(InputEvent::SetSubAreas(areas));
            print_updates(&updates);
            Ok(())
        }
        "click" => {
            let token = rest
                .first()
                .ok_or_else(|| anyhow!("クリックする地域を指定してください。"))?;
            let leaf: Vec<String> = dashboard.selection().leaf_areas().to_vec();
            let area = resolve_area(&leaf, token)?;
            let updates = dashboard.apply(InputEvent::ClickArea(area));
            print_updates(&updates);
            Ok(())
        }
        "status" => {
            print_status(dashboard);
            Ok(())
        }
        "trend" => {
            print_trend(&dashboard.trend_chart());
            Ok(())
        }
        "pyramid" => {
            let year = rest
                .first()
                .map(|token| {
                    token
                        .parse::<u16>()
                        .map_err(|_| anyhow!("年の値が不正です: {token}"))
                })
                .transpose()?;
            match dashboard.pyramid_chart() {
                Recompute::Render(chart) => print_pyramid(&chart, year)?,
                Recompute::Suppress => println!("表示できる地域が選択されていません。"),
            }
            Ok(())
        }
        "export" => {
            let target = rest
                .first()
                .ok_or_else(|| anyhow!("出力対象を指定してください。(trend / pyramid)"))?;
            export_json(dashboard, target)
        }
        "quit" | "exit" => {
            println!("終了します。");
            std::process::exit(0);
        }
        other => {
            bail!("未知のコマンドです: {other}. help で一覧を確認してください。");
        }
    }
}

fn print_intro(dashboard: &Dashboard) {
    println!("日本の地域別将来推計人口観察 (対話モード)");
    println!(
        "{}行のデータを読み込み済みです。対象年: {:?}",
        dashboard.dataset().len(),
        dashboard.dataset().years()
    );
    println!("コマンド例: mode shiku / areas / select 1 / trend / click 京都府 / pyramid");
    println!("help で利用可能なコマンド一覧を表示します。");
}

fn print_help() {
    println!("利用可能なコマンド:");
    println!("  modes                 選択できる表示粒度の一覧");
    println!("  mode <粒度>           表示粒度を切り替える (todofuken / shiku / choson)");
    println!("  areas                 都道府県の選択肢を表示");
    println!("  select <地域...>      都道府県を選択 (番号か名称)");
    println!("  sub                   市区町村の選択肢を表示");
    println!("  subselect <地域...>   市区町村を選択 (番号か名称)");
    println!("  click <地域>          トレンドグラフの点クリックを再現");
    println!("  status                現在の選択状態を表示");
    println!("  trend                 総数推移を表形式で表示");
    println!("  pyramid [年]          年齢別人口分布を表示");
    println!("  export <trend|pyramid> 現在のグラフをJSONで出力");
    println!("  quit                  終了");
}

fn print_options(label: &str, options: &[String]) {
    println!("{label}の選択肢:");
    for (idx, name) in options.iter().enumerate() {
        println!("  {:>3}: {}", idx + 1, name);
    }
}

fn print_updates(updates: &[OutputUpdate]) {
    for update in updates {
        let outcome = if update.result.is_suppressed() {
            "更新抑制"
        } else {
            "再描画"
        };
        println!("  -> {}: {}", update.output.label(), outcome);
    }
}

fn print_status(dashboard: &Dashboard) {
    let selection = dashboard.selection();
    println!("表示粒度: {}", selection.mode().label());
    println!("都道府県: {}", join_or_placeholder(selection.top_areas()));
    if selection.mode().uses_sub_areas() {
        println!("市区町村: {}", join_or_placeholder(selection.sub_areas()));
    }
    println!(
        "クリック: {}",
        selection.clicked().unwrap_or("なし")
    );
    println!(
        "ピラミッド対象: {}",
        selection.pyramid_area().unwrap_or("なし")
    );
}

fn join_or_placeholder(names: &[String]) -> String {
    if names.is_empty() {
        "(未選択)".to_string()
    } else {
        names.join(", ")
    }
}

fn print_trend(chart: &TrendChart) {
    if chart.is_empty() {
        println!("(空のグラフ)");
        return;
    }
    let mut years: Vec<u16> = chart
        .series
        .iter()
        .flat_map(|series| series.points.iter().map(|point| point.year))
        .collect();
    years.sort_unstable();
    years.dedup();

    print!("{:<6}", "年");
    for series in &chart.series {
        print!(" | {:>12}", series.area);
    }
    println!();
    for year in years {
        print!("{year:<6}");
        for series in &chart.series {
            match series.points.iter().find(|point| point.year == year) {
                Some(point) => print!(" | {:>12.0}", point.total),
                None => print!(" | {:>12}", "-"),
            }
        }
        println!();
    }
}

fn print_pyramid(chart: &PyramidChart, year: Option<u16>) -> Result<()> {
    let frame = match year {
        Some(year) => chart
            .frame_for_year(year)
            .ok_or_else(|| anyhow!("{year}年のデータがありません。"))?,
        None => chart
            .frames
            .first()
            .ok_or_else(|| anyhow!("表示できる年がありません。"))?,
    };
    println!("-- {} {}年 --", chart.title(), frame.year);
    let max = chart.max_value().max(1.0);
    for (label, value) in chart.brackets.iter().zip(&frame.values) {
        let bar = "#".repeat(scaled_bar_length(*value, max, BAR_WIDTH));
        println!("{:<8} | {:<width$} {:.0}", label, bar, value, width = BAR_WIDTH);
    }
    Ok(())
}

fn export_json(dashboard: &Dashboard, target: &str) -> Result<()> {
    match target.to_ascii_lowercase().as_str() {
        "trend" => {
            let json = serde_json::to_string_pretty(&dashboard.trend_chart())?;
            println!("{json}");
            Ok(())
        }
        "pyramid" => match dashboard.pyramid_chart() {
            Recompute::Render(chart) => {
                let json = serde_json::to_string_pretty(&chart)?;
                println!("{json}");
                Ok(())
            }
            Recompute::Suppress => bail!("表示できる地域が選択されていません。"),
        },
        other => bail!("未知の出力対象です: {other} (trend / pyramid)"),
    }
}

fn scaled_bar_length(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * width as f64).round() as usize
}

fn resolve_areas(options: &[String], tokens: &[&str]) -> Result<Vec<String>> {
    tokens
        .iter()
        .map(|token| resolve_area(options, token))
        .collect()
}

fn resolve_area(options: &[String], token: &str) -> Result<String> {
    if let Ok(index) = token.parse::<usize>() {
        if index > 0 && index <= options.len() {
            return Ok(options[index - 1].clone());
        }
    }
    options
        .iter()
        .find(|name| name.as_str() == token)
        .cloned()
        .ok_or_else(|| {
            anyhow!("地域を特定できませんでした: {token} (番号か完全な名称を入力してください)")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use jinkograph_core::Dataset;

    const SAMPLE_CSV: &str = "\
市などの別,コード,都道府県,市区町村,年,総数,0~4歳,5~9歳
a,01000,北海道,北海道,2015,5380,180,210
a,01000,北海道,北海道,2020,5220,160,195
a,26000,京都府,京都府,2015,2610,95,110
a,26000,京都府,京都府,2020,2570,88,102
0,01100,北海道,札幌市,2015,1950,70,78
0,01100,北海道,札幌市,2020,1970,66,74
";

    fn sample_dashboard() -> Dashboard {
        let dataset = Dataset::from_csv(SAMPLE_CSV).expect("テストデータの読み込みに失敗しました");
        Dashboard::new(Rc::new(dataset))
    }

    #[test]
    fn resolve_area_accepts_index_and_name() {
        let options = vec!["北海道".to_string(), "京都府".to_string()];
        assert_eq!(resolve_area(&options, "1").unwrap(), "北海道");
        assert_eq!(resolve_area(&options, "京都府").unwrap(), "京都府");
        assert!(resolve_area(&options, "3").is_err());
        assert!(resolve_area(&options, "沖縄県").is_err());
    }

    #[test]
    fn bar_length_scales_against_maximum() {
        assert_eq!(scaled_bar_length(210.0, 210.0, 40), 40);
        assert_eq!(scaled_bar_length(105.0, 210.0, 40), 20);
        assert_eq!(scaled_bar_length(0.0, 210.0, 40), 0);
        assert_eq!(scaled_bar_length(10.0, 0.0, 40), 0);
    }

    #[test]
    fn mode_command_switches_and_reports_updates() {
        let mut dashboard = sample_dashboard();
        dispatch_command(&mut dashboard, "mode shiku").unwrap();
        assert_eq!(dashboard.selection().mode(), RegionMode::WardCity);
        assert_eq!(dashboard.selection().sub_areas(), ["札幌市".to_string()]);
    }

    #[test]
    fn select_command_resolves_indices() {
        let mut dashboard = sample_dashboard();
        dispatch_command(&mut dashboard, "select 1 2").unwrap();
        assert_eq!(
            dashboard.selection().top_areas(),
            ["北海道".to_string(), "京都府".to_string()]
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut dashboard = sample_dashboard();
        let err = dispatch_command(&mut dashboard, "nope").expect_err("未知コマンドはエラー");
        assert!(format!("{err}").contains("未知のコマンド"));
    }
}
