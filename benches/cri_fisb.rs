use criterion::{criterion_group, criterion_main, Criterion};
use gridiron::data::{Game, Season};
use gridiron::fisb;
use gridiron::fisb::{BootstrapConfig, FisbConfig};

/// A double round robin of `teams` teams with margins spread deterministically.
fn league(teams: usize) -> Season {
    let mut games = vec![];
    for home in 0..teams {
        for away in 0..teams {
            if home != away {
                let margin = (home as f64 - away as f64) + ((games.len() * 7919) % 15) as f64 - 5.0;
                games.push(Game::new(format!("T{home:02}"), format!("T{away:02}"), 20.0 + margin, 20.0));
            }
        }
    }
    Season::from_games(games).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let season = league(32);
    let config = FisbConfig::default();
    c.bench_function("cri_fisb_32", |b| {
        b.iter(|| fisb::rate(&season, &config).unwrap());
    });

    for workers in [1, 4] {
        let bootstrap = BootstrapConfig {
            iterations: 100,
            workers,
            seed: 0,
        };
        c.bench_function(&format!("cri_fisb_bootstrap_32_x100_w{workers}"), |b| {
            b.iter(|| fisb::rate_bootstrap(&season, &config, &bootstrap).unwrap());
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
