//! Plain-text log of the iterates visited by a run.
//!
//! One point per line, coordinates joined by `" , "`. The decimal mark is
//! configurable so that logs can be read by locale-aware tools expecting a
//! comma (`-4,5 , 10,25`) as well as by plain parsers (`-4.5 , 10.25`).
//! Reading accepts either mark.

use crate::error::TrajectoryError;
use nalgebra::DVector;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Field separator between coordinates.
pub const FIELD_SEPARATOR: &str = " , ";

/// File name used by the demos when none is given.
pub const DEFAULT_LOG_FILE: &str = "gradient_log.csv";

/// Decimal mark used when writing coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecimalSeparator {
    /// `1.5`
    #[default]
    Dot,
    /// `1,5`
    Comma,
}

/// Formatting options for [`TrajectoryLog::write_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryFormat {
    /// Decimal mark of every coordinate
    pub decimal_separator: DecimalSeparator,

    /// Fixed number of decimals, or the shortest exact representation
    pub precision: Option<usize>,
}

impl TrajectoryFormat {
    /// Comma decimal mark, as expected by German-locale readers.
    pub fn comma() -> Self {
        Self {
            decimal_separator: DecimalSeparator::Comma,
            precision: None,
        }
    }

    /// Sets a fixed number of decimals.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    fn format_value(&self, value: f64) -> String {
        let text = match self.precision {
            Some(precision) => format!("{value:.precision$}"),
            None => value.to_string(),
        };
        match self.decimal_separator {
            DecimalSeparator::Dot => text,
            DecimalSeparator::Comma => text.replace('.', ","),
        }
    }
}

/// Ordered sequence of iterates x₀, x₁, …
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryLog {
    points: Vec<DVector<f64>>,
}

impl TrajectoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point.
    pub fn push(&mut self, point: DVector<f64>) {
        self.points.push(point);
    }

    /// The recorded points, oldest first.
    pub fn points(&self) -> &[DVector<f64>] {
        &self.points
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First recorded point.
    pub fn first(&self) -> Option<&DVector<f64>> {
        self.points.first()
    }

    /// Last recorded point.
    pub fn last(&self) -> Option<&DVector<f64>> {
        self.points.last()
    }

    /// Iterates over the recorded points.
    pub fn iter(&self) -> std::slice::Iter<'_, DVector<f64>> {
        self.points.iter()
    }

    /// Writes one line per point.
    pub fn write_to<W: Write>(&self, mut writer: W, format: &TrajectoryFormat) -> Result<(), TrajectoryError> {
        for point in &self.points {
            let line = point
                .iter()
                .map(|&value| format.format_value(value))
                .collect::<Vec<_>>()
                .join(FIELD_SEPARATOR);
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Parses a log. Blank lines are skipped; every other line must have
    /// as many coordinates as the first one. Coordinates may use a `.` or a
    /// `,` decimal mark, the latter with optional `.` digit grouping.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, TrajectoryError> {
        let mut log = Self::new();
        let mut dimension = None;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let values = line
                .split(FIELD_SEPARATOR)
                .map(|field| parse_coordinate(field, line_number))
                .collect::<Result<Vec<_>, _>>()?;

            match dimension {
                None => dimension = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(TrajectoryError::parse(
                        line_number,
                        format!("expected {expected} coordinates, found {}", values.len()),
                    ));
                }
                Some(_) => {}
            }

            log.push(DVector::from_vec(values));
        }

        Ok(log)
    }

    /// Writes the log to a file, replacing it if present.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: &TrajectoryFormat) -> Result<(), TrajectoryError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file), format)
    }

    /// Reads a log from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

impl FromIterator<DVector<f64>> for TrajectoryLog {
    fn from_iter<I: IntoIterator<Item = DVector<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TrajectoryLog {
    type Item = &'a DVector<f64>;
    type IntoIter = std::slice::Iter<'a, DVector<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Parses one coordinate in either decimal convention.
///
/// With a `,` decimal mark any `.` is a digit group separator (`1.234,5`);
/// without one, `.` is the decimal mark.
fn parse_coordinate(field: &str, line_number: usize) -> Result<f64, TrajectoryError> {
    let field = field.trim();
    let normalized = if field.contains(',') {
        field.replace('.', "").replace(',', ".")
    } else {
        field.to_owned()
    };
    normalized
        .parse::<f64>()
        .map_err(|err| TrajectoryError::parse(line_number, format!("invalid coordinate '{field}': {err}")))
}
