mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use jinkograph_core::{Dashboard, Dataset};

fn main() -> Result<()> {
    env_logger::init();

    let data_path = resolve_data_path()?;
    let body = fs::read_to_string(&data_path)
        .with_context(|| format!("人口データファイルを開けません: {}", data_path.display()))?;
    let dataset = Dataset::from_csv(&body)
        .with_context(|| format!("人口データファイルの解析に失敗しました: {}", data_path.display()))?;
    log::info!(
        "人口データを読み込みました: {} ({}行)",
        data_path.display(),
        dataset.len()
    );

    let mut dashboard = Dashboard::new(Rc::new(dataset));
    cli::run(&mut dashboard)
}

fn resolve_data_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("カレントディレクトリの取得に失敗しました")?;
    let candidates = [
        cwd.join("data").join("shourai_jinko.csv"),
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("data")
            .join("shourai_jinko.csv"),
    ];

    for path in candidates {
        if path.exists() {
            return Ok(path);
        }
    }

    anyhow::bail!("人口データファイルが見つかりません。data/shourai_jinko.csv を配置してください。")
}
