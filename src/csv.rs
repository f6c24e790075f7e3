//! Loading of games and standings from CSV files, and writing of result tables.
//!
//! Files are comma-separated with a header row naming the columns. Columns may appear in any order;
//! unrecognised columns are ignored. Values are not quoted, so they may not contain commas; a row
//! whose value count differs from the header's is rejected.

use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;

use ordinalizer::Ordinal;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;

use crate::data::{Game, Standing, Team};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("missing header row")]
    MissingHeader,

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("line {line}: expected {expected} values, got {actual} (values may not contain commas)")]
    RowWidth {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("line {line}: cannot parse '{value}' in column '{column}'")]
    Unparsable {
        line: usize,
        column: String,
        value: String,
    },
}

pub struct CsvWriter<W: Write = BufWriter<File>> {
    writer: W,
}
impl CsvWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}
impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for datum in record.into_iter() {
            if first {
                first = false;
            } else {
                self.writer.write_all(",".as_bytes())?;
            }
            let str: &str = datum.as_ref();
            self.writer.write_all(str.as_bytes())?;
        }
        self.writer.write_all("\n".as_bytes())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub struct CsvReader<R: BufRead = BufReader<File>> {
    lines: Lines<R>,
}
impl CsvReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}
impl<R: BufRead> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Reads the next non-blank line, split into trimmed values.
    pub fn read(&mut self) -> Option<Result<Vec<String>, io::Error>> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    return Some(Ok(line
                        .split(',')
                        .map(|value| value.trim().to_string())
                        .collect()))
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<R: BufRead> Iterator for CsvReader<R> {
    type Item = Result<Vec<String>, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum GameColumn {
    Home,
    Away,
    HomeScore,
    AwayScore,
}

impl From<GameColumn> for usize {
    fn from(column: GameColumn) -> Self {
        column.ordinal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum StandingColumn {
    Team,
    Wins,
    Losses,
    Ties,
    PointsFor,
    PointsAgainst,
}

impl From<StandingColumn> for usize {
    fn from(column: StandingColumn) -> Self {
        column.ordinal()
    }
}

/// A named column of a table, convertible to its ordinal.
trait Column: IntoEnumIterator + strum::EnumCount + ToString + Copy + Into<usize> {}

impl<C: IntoEnumIterator + strum::EnumCount + ToString + Copy + Into<usize>> Column for C {}

/// Positions of the named columns within a row, indexed by the column's ordinal.
struct Layout<C> {
    positions: Vec<usize>,
    columns: PhantomData<C>,
}
impl<C: Column> Layout<C> {
    fn from_header(header: &[String]) -> Result<Self, LoadError> {
        let mut positions = vec![0; C::COUNT];
        for column in C::iter() {
            let name = column.to_string();
            let position = header
                .iter()
                .position(|heading| heading.eq_ignore_ascii_case(&name))
                .ok_or(LoadError::MissingColumn(name))?;
            positions[column.into()] = position;
        }
        Ok(Self {
            positions,
            columns: PhantomData,
        })
    }

    fn get<'a>(&self, row: &'a [String], column: C) -> &'a str {
        &row[self.positions[column.into()]]
    }

    fn parse<T: FromStr>(&self, line: usize, row: &[String], column: C) -> Result<T, LoadError> {
        let value = self.get(row, column);
        value.parse().map_err(|_| LoadError::Unparsable {
            line,
            column: column.to_string(),
            value: value.into(),
        })
    }
}

/// Iterates over the data rows of a table with columns `C`, passing each to `f` with its line
/// number.
fn read_table<C: Column, R: BufRead, T>(
    mut reader: CsvReader<R>,
    mut f: impl FnMut(&Layout<C>, usize, &[String]) -> Result<T, LoadError>,
) -> Result<Vec<T>, LoadError> {
    let header = reader.read().ok_or(LoadError::MissingHeader)??;
    let layout = Layout::<C>::from_header(&header)?;
    let mut records = vec![];
    for (index, row) in reader.enumerate() {
        let row = row?;
        let line = index + 2;
        if row.len() != header.len() {
            return Err(LoadError::RowWidth {
                line,
                expected: header.len(),
                actual: row.len(),
            });
        }
        records.push(f(&layout, line, &row)?);
    }
    Ok(records)
}

pub fn read_games<R: BufRead>(reader: CsvReader<R>) -> Result<Vec<Game>, LoadError> {
    read_table::<GameColumn, _, _>(reader, |layout, line, row| {
        Ok(Game {
            home: Team::from(layout.get(row, GameColumn::Home)),
            away: Team::from(layout.get(row, GameColumn::Away)),
            home_score: layout.parse(line, row, GameColumn::HomeScore)?,
            away_score: layout.parse(line, row, GameColumn::AwayScore)?,
        })
    })
}

pub fn read_standings<R: BufRead>(reader: CsvReader<R>) -> Result<Vec<Standing>, LoadError> {
    read_table::<StandingColumn, _, _>(reader, |layout, line, row| {
        Ok(Standing {
            team: Team::from(layout.get(row, StandingColumn::Team)),
            wins: layout.parse(line, row, StandingColumn::Wins)?,
            losses: layout.parse(line, row, StandingColumn::Losses)?,
            ties: layout.parse(line, row, StandingColumn::Ties)?,
            points_for: layout.parse(line, row, StandingColumn::PointsFor)?,
            points_against: layout.parse(line, row, StandingColumn::PointsAgainst)?,
        })
    })
}

pub fn read_games_file(path: impl AsRef<Path>) -> Result<Vec<Game>, LoadError> {
    read_games(CsvReader::open(path)?)
}

pub fn read_standings_file(path: impl AsRef<Path>) -> Result<Vec<Standing>, LoadError> {
    read_standings(CsvReader::open(path)?)
}
