use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nba_matchup::aggregate::average;
use nba_matchup::artifacts::load_predictor;
use nba_matchup::config::AppConfig;
use nba_matchup::predictor::MatchupPredictor;
use nba_matchup::season_store::SeasonStore;

fn fixture_predictor() -> MatchupPredictor {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("resources");
    load_predictor(&AppConfig::with_resource_dir(&dir)).expect("fixture artifacts load")
}

fn bench_predict(c: &mut Criterion) {
    let predictor = fixture_predictor();
    c.bench_function("predict_matchup", |b| {
        b.iter(|| {
            let res = predictor
                .predict(black_box("Boston Celtics"), black_box("Los Angeles Lakers"))
                .unwrap();
            black_box(res.prob_a);
        })
    });
}

fn bench_field(c: &mut Criterion) {
    let predictor = fixture_predictor();
    c.bench_function("predict_against_field", |b| {
        b.iter(|| {
            let rows = predictor
                .predict_against_field(black_box("Miami Heat"))
                .unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_season_load_and_average(c: &mut Criterion) {
    let mut table = String::from("team,year,leag,pts,reb,ast,stl,blk,won,lost\n");
    for year in 1950..2020 {
        for team in ["BOS", "LAL", "NYK", "CHI"] {
            table.push_str(&format!(
                "{team},{year},N,{},{},{},{},{},41,41\n",
                8000 + year,
                3500 + year % 7,
                1900 + year % 11,
                600,
                if year % 5 == 0 { "NA".to_string() } else { "400".to_string() }
            ));
        }
    }

    c.bench_function("season_table_parse", |b| {
        b.iter(|| {
            let store = SeasonStore::from_reader(black_box(table.as_bytes())).unwrap();
            black_box(store.rows());
        })
    });

    let store = SeasonStore::from_reader(table.as_bytes()).unwrap();
    c.bench_function("team_average", |b| {
        b.iter(|| {
            let records = store.records_for(black_box("BOS")).unwrap();
            let v = average(store.schema(), records).unwrap();
            black_box(v.values().len());
        })
    });
}

criterion_group!(
    perf,
    bench_predict,
    bench_field,
    bench_season_load_and_average
);
criterion_main!(perf);
