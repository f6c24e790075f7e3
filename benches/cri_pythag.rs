use criterion::{criterion_group, criterion_main, Criterion};
use gridiron::data::{Season, Standing, Team};
use gridiron::pythag::{Fit, Formula, PythagoreanModel, DEFAULT_EXPONENT};

fn standings(teams: u32) -> Season {
    let standings = (0..teams)
        .map(|team| {
            let points_for = 300.0 + (team * 37 % 200) as f64;
            let points_against = 300.0 + (team * 53 % 200) as f64;
            let wins = (17.0 * points_for / (points_for + points_against)).round() as u32;
            Standing {
                team: Team::from(format!("T{team:02}")),
                wins,
                losses: 17 - wins,
                ties: 0,
                points_for,
                points_against,
            }
        })
        .collect();
    Season::from_standings(standings).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let season = standings(32);
    {
        let model = PythagoreanModel::new(Formula::Classic, Fit::Static(vec![DEFAULT_EXPONENT]));
        c.bench_function("cri_pythag_static_32", |b| {
            b.iter(|| model.evaluate(&season).unwrap());
        });
    }
    for formula in [
        Formula::Classic,
        Formula::Pythagenport,
        Formula::PythagenportFo,
        Formula::Pythagenpat,
    ] {
        let model = PythagoreanModel::new(formula, Fit::Optimise { initial: None });
        c.bench_function(&format!("cri_pythag_fit_{formula}_32"), |b| {
            b.iter(|| model.evaluate(&season).unwrap());
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
