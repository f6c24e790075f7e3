use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::anyhow;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use gridiron::config::Config;
use gridiron::csv::{read_games_file, read_standings_file, CsvWriter};
use gridiron::data::{DataProvider, Season};
use gridiron::metrics::{Metrics, MetricsTable, Stat};
use gridiron::print;
use gridiron::sos::SosMode;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// CSV file of games: home,away,home_score,away_score (unquoted; team names may not contain commas)
    #[clap(short = 'g', long)]
    games: Option<PathBuf>,

    /// CSV file of standings: team,wins,losses,ties,points_for,points_against (unquoted)
    #[clap(long)]
    standings: Option<PathBuf>,

    /// JSON config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// comma-separated stats to compute (fisb,ml,srs,pyth,port,pat); all by default
    #[clap(short = 's', long, value_parser = parse_stats)]
    stats: Option<StatList>,

    /// strength of schedule mode (average, scaled or bcs)
    #[clap(long, value_parser = parse_sos_mode)]
    sos: Option<SosMode>,

    /// number of bootstrap resamples for FISB
    #[clap(short = 'b', long)]
    bootstrap: Option<u64>,

    /// number of bootstrap worker threads
    #[clap(short = 'w', long)]
    workers: Option<usize>,

    /// bootstrap random seed
    #[clap(long)]
    seed: Option<u64>,

    /// where to write the results as CSV
    #[clap(short = 'o', long)]
    out: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.games.is_none() && self.standings.is_none() {
            return Err(anyhow!("a games or standings file must be specified"));
        }
        if self.bootstrap.is_none() && (self.workers.is_some() || self.seed.is_some()) {
            return Err(anyhow!("workers and seed apply only to bootstrapping"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StatList(Vec<Stat>);

fn parse_stats(s: &str) -> anyhow::Result<StatList> {
    Ok(StatList(Stat::parse_list(&s.to_lowercase())?))
}

fn parse_sos_mode(s: &str) -> anyhow::Result<SosMode> {
    Ok(SosMode::from_str(&s.to_lowercase())?)
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(iterations) = args.bootstrap {
        config.bootstrap.iterations = iterations;
    }
    if let Some(workers) = args.workers {
        config.bootstrap.workers = workers;
    }
    if let Some(seed) = args.seed {
        config.bootstrap.seed = seed;
    }

    let season = match (&args.games, &args.standings) {
        (Some(games), Some(standings)) => Season::new(read_games_file(games)?, read_standings_file(standings)?)?,
        (Some(games), None) => Season::from_games(read_games_file(games)?)?,
        (None, Some(standings)) => Season::from_standings(read_standings_file(standings)?)?,
        (None, None) => Err(anyhow!("a games or standings file must be specified"))?,
    };
    info!(
        "loaded {} games for {} teams",
        season.games().len(),
        season.teams().len()
    );

    let stats = match args.stats {
        Some(StatList(stats)) => stats,
        None if season.games().is_empty() => vec![Stat::Pythagorean, Stat::Pythagenport, Stat::Pythagenpat],
        None => Stat::iter().collect(),
    };
    let metrics = Metrics {
        config,
        bootstrap: args.bootstrap.is_some(),
        sos: args.sos,
    };

    let start_time = Instant::now();
    let table = metrics.compute(&season, &stats)?;
    let elapsed = start_time.elapsed();
    info!(
        "computed {stats:?} in {}s",
        elapsed.as_millis() as f64 / 1_000.
    );
    for note in table.notes() {
        warn!("{note}");
    }
    info!("ratings:\n{}", Console::default().render(&print::tabulate(&table)));

    if let Some(out) = args.out {
        write_csv(&table, out)?;
    }
    Ok(())
}

fn write_csv(table: &MetricsTable, path: PathBuf) -> anyhow::Result<()> {
    let mut csv = CsvWriter::create(&path)?;
    let mut header = vec!["team".to_string()];
    header.extend(table.columns().iter().map(|column| column.heading.clone()));
    csv.append(header)?;
    for (index, label) in table.rows().iter().enumerate() {
        let mut record = vec![label.clone()];
        record.extend(table.columns().iter().map(|column| {
            column.values[index]
                .map(|value| value.to_string())
                .unwrap_or_default()
        }));
        csv.append(record)?;
    }
    csv.flush()?;
    info!("wrote {}", path.display());
    Ok(())
}
