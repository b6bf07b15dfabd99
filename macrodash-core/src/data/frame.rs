//! Conversion between [`SeriesTable`] and Polars DataFrames.
//!
//! Storage schema per shape:
//! - time-value: `date` (Date), `<column>` (Float64)
//! - OHLCV: `date` (Date), `Open High Low Close` (Float64), `Volume` (UInt64)
//! - panel: `date` (Date) or `year` (Int32), then one Float64 column each
//! - event log: String / Float64 / Date columns in table order

use crate::series::{IndexKey, PanelAxis, SeriesShape};
use crate::table::{
    EventColumn, EventLogTable, EventValues, OhlcvBar, PanelRow, PanelTable, SeriesTable,
    TimeValueTable, OHLCV_COLUMNS,
};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use std::fs;
use std::path::Path;

/// Failure converting or reading a frame. Mapped to `StoreError` with the
/// series key attached.
#[derive(Debug)]
pub(crate) enum FrameError {
    Polars(String),
    Schema(String),
}

fn epoch() -> NaiveDate {
    // chrono's default date is 1970-01-01
    NaiveDate::default()
}

fn polars_err(context: &str) -> impl Fn(PolarsError) -> FrameError + '_ {
    move |e| FrameError::Polars(format!("{context}: {e}"))
}

fn schema_err(context: &str) -> impl Fn(PolarsError) -> FrameError + '_ {
    move |e| FrameError::Schema(format!("{context}: {e}"))
}

fn date_column(name: &str, dates: impl Iterator<Item = NaiveDate>) -> Result<Column, FrameError> {
    let days: Vec<i32> = dates.map(|d| (d - epoch()).num_days() as i32).collect();
    Column::new(name.into(), days)
        .cast(&DataType::Date)
        .map_err(polars_err("date cast"))
}

/// Build the storage DataFrame for a table.
pub(crate) fn table_to_dataframe(table: &SeriesTable) -> Result<DataFrame, FrameError> {
    let columns = match table {
        SeriesTable::TimeValue(t) => vec![
            date_column("date", t.points.iter().map(|(d, _)| *d))?,
            Column::new(
                t.column.as_str().into(),
                t.points.iter().map(|(_, v)| *v).collect::<Vec<f64>>(),
            ),
        ],
        SeriesTable::Ohlcv(bars) => {
            let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
            let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
            let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
            let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
            let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();
            vec![
                date_column("date", bars.iter().map(|b| b.date))?,
                Column::new(OHLCV_COLUMNS[0].into(), opens),
                Column::new(OHLCV_COLUMNS[1].into(), highs),
                Column::new(OHLCV_COLUMNS[2].into(), lows),
                Column::new(OHLCV_COLUMNS[3].into(), closes),
                Column::new(OHLCV_COLUMNS[4].into(), volumes),
            ]
        }
        SeriesTable::Panel(p) => {
            let mut cols = Vec::with_capacity(p.columns.len() + 1);
            cols.push(match p.axis {
                PanelAxis::Daily => date_column(
                    "date",
                    p.rows.iter().filter_map(|r| r.key.as_date()),
                )?,
                PanelAxis::Annual => {
                    let years: Vec<i32> = p
                        .rows
                        .iter()
                        .filter_map(|r| match r.key {
                            IndexKey::Year(y) => Some(y),
                            _ => None,
                        })
                        .collect();
                    Column::new("year".into(), years)
                }
            });
            for (i, name) in p.columns.iter().enumerate() {
                let values: Vec<f64> = p
                    .rows
                    .iter()
                    .map(|r| r.values.get(i).copied().unwrap_or(f64::NAN))
                    .collect();
                cols.push(Column::new(name.as_str().into(), values));
            }
            cols
        }
        SeriesTable::EventLog(e) => {
            let mut cols = Vec::with_capacity(e.columns.len());
            for c in &e.columns {
                cols.push(match &c.values {
                    EventValues::Text(v) => Column::new(c.name.as_str().into(), v.clone()),
                    EventValues::Number(v) => Column::new(c.name.as_str().into(), v.clone()),
                    EventValues::Date(v) => date_column(&c.name, v.iter().copied())?,
                });
            }
            cols
        }
    };

    DataFrame::new(columns).map_err(polars_err("dataframe creation"))
}

fn read_dates(col: &Column) -> Result<Vec<NaiveDate>, FrameError> {
    let ca = col
        .date()
        .map_err(schema_err(&format!("column '{}' is not a date", col.name())))?;
    let epoch = epoch();
    (0..ca.len())
        .map(|i| {
            ca.get(i)
                .map(|days| epoch + Duration::days(days as i64))
                .ok_or_else(|| {
                    FrameError::Schema(format!("null in '{}' at row {i}", col.name()))
                })
        })
        .collect()
}

fn read_f64(col: &Column) -> Result<Vec<f64>, FrameError> {
    let ca = col
        .f64()
        .map_err(schema_err(&format!("column '{}' is not Float64", col.name())))?;
    Ok((0..ca.len())
        .map(|i| ca.get(i).unwrap_or(f64::NAN))
        .collect())
}

fn expect_name(col: &Column, expected: &str) -> Result<(), FrameError> {
    if col.name().as_str() == expected {
        Ok(())
    } else {
        Err(FrameError::Schema(format!(
            "expected column '{expected}', found '{}'",
            col.name()
        )))
    }
}

/// Decode a stored DataFrame as the requested shape.
pub(crate) fn dataframe_to_table(
    df: &DataFrame,
    shape: SeriesShape,
) -> Result<SeriesTable, FrameError> {
    let cols = df.get_columns();

    match shape {
        SeriesShape::TimeValue => {
            if cols.len() != 2 {
                return Err(FrameError::Schema(format!(
                    "time-value table needs 2 columns, found {}",
                    cols.len()
                )));
            }
            expect_name(&cols[0], "date")?;
            let dates = read_dates(&cols[0])?;
            let values = read_f64(&cols[1])?;
            Ok(SeriesTable::TimeValue(TimeValueTable {
                column: cols[1].name().to_string(),
                points: dates.into_iter().zip(values).collect(),
            }))
        }
        SeriesShape::Ohlcv => {
            if cols.len() != OHLCV_COLUMNS.len() + 1 {
                return Err(FrameError::Schema(format!(
                    "OHLCV table needs 6 columns, found {}",
                    cols.len()
                )));
            }
            expect_name(&cols[0], "date")?;
            for (col, name) in cols[1..].iter().zip(OHLCV_COLUMNS) {
                expect_name(col, name)?;
            }
            let dates = read_dates(&cols[0])?;
            let opens = read_f64(&cols[1])?;
            let highs = read_f64(&cols[2])?;
            let lows = read_f64(&cols[3])?;
            let closes = read_f64(&cols[4])?;
            let vol_ca = cols[5]
                .u64()
                .map_err(schema_err("column 'Volume' is not UInt64"))?;

            Ok(SeriesTable::Ohlcv(
                dates
                    .into_iter()
                    .enumerate()
                    .map(|(i, date)| OhlcvBar {
                        date,
                        open: opens[i],
                        high: highs[i],
                        low: lows[i],
                        close: closes[i],
                        volume: vol_ca.get(i).unwrap_or(0),
                    })
                    .collect(),
            ))
        }
        SeriesShape::Panel(axis) => {
            let (index, values) = cols
                .split_first()
                .ok_or_else(|| FrameError::Schema("panel table has no columns".into()))?;
            expect_name(index, axis.index_column())?;

            let keys: Vec<IndexKey> = match axis {
                PanelAxis::Daily => read_dates(index)?.into_iter().map(IndexKey::Date).collect(),
                PanelAxis::Annual => {
                    let ca = index
                        .i32()
                        .map_err(schema_err("column 'year' is not Int32"))?;
                    (0..ca.len())
                        .map(|i| {
                            ca.get(i).map(IndexKey::Year).ok_or_else(|| {
                                FrameError::Schema(format!("null year at row {i}"))
                            })
                        })
                        .collect::<Result<_, _>>()?
                }
            };
            let data: Vec<Vec<f64>> = values.iter().map(read_f64).collect::<Result<_, _>>()?;

            Ok(SeriesTable::Panel(PanelTable {
                axis,
                columns: values.iter().map(|c| c.name().to_string()).collect(),
                rows: keys
                    .into_iter()
                    .enumerate()
                    .map(|(i, key)| PanelRow {
                        key,
                        values: data.iter().map(|col| col[i]).collect(),
                    })
                    .collect(),
            }))
        }
        SeriesShape::EventLog => {
            let mut columns = Vec::with_capacity(cols.len());
            for col in cols {
                let values = match col.dtype() {
                    DataType::String => {
                        let ca = col.str().map_err(schema_err("string column"))?;
                        EventValues::Text(
                            (0..ca.len())
                                .map(|i| ca.get(i).unwrap_or_default().to_string())
                                .collect(),
                        )
                    }
                    DataType::Float64 => EventValues::Number(read_f64(col)?),
                    DataType::Date => EventValues::Date(read_dates(col)?),
                    other => {
                        return Err(FrameError::Schema(format!(
                            "unsupported event-log column '{}' of type {other}",
                            col.name()
                        )))
                    }
                };
                columns.push(EventColumn {
                    name: col.name().to_string(),
                    values,
                });
            }
            Ok(SeriesTable::EventLog(EventLogTable { columns }))
        }
    }
}

/// Write a DataFrame to a Parquet file.
pub(crate) fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), FrameError> {
    let file = fs::File::create(path)
        .map_err(|e| FrameError::Polars(format!("create {}: {e}", path.display())))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(polars_err("write parquet"))?;
    Ok(())
}

/// Read a whole Parquet file.
pub(crate) fn read_parquet(path: &Path) -> Result<DataFrame, FrameError> {
    let file = fs::File::open(path)
        .map_err(|e| FrameError::Polars(format!("open {}: {e}", path.display())))?;
    ParquetReader::new(file)
        .finish()
        .map_err(polars_err("read parquet"))
}
