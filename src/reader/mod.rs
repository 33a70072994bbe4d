// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading [Locations](crate::Location) from delimited text files.

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::Location;

mod delimited;

pub use delimited::Record;

/// Format of the input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the compression based on the content
    #[default]
    Unknown,

    /// Force uncompressed delimited text
    Csv,

    /// Force delimited text with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    CsvGz,

    /// Force delimited text with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    CsvBz2,
}

impl FileFormat {
    /// Guesses the format of a file based on its leading bytes.
    /// Anything without a known compression magic number is assumed to be [FileFormat::Csv].
    pub fn sniff(prefix: &[u8]) -> Self {
        if prefix.starts_with(&[0x1F, 0x8B]) {
            Self::CsvGz
        } else if prefix.starts_with(b"BZh") {
            Self::CsvBz2
        } else {
            Self::Csv
        }
    }
}

/// Controls for interpreting delimited text as [Locations](Location).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// Field delimiter, `b','` by default.
    pub delimiter: u8,

    /// Whether the first row contains column names, rather than data.
    pub has_headers: bool,

    /// Zero-based index of the column with longitudes, in degrees.
    pub lon_column: usize,

    /// Zero-based index of the column with latitudes, in degrees.
    pub lat_column: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file_format: FileFormat::Unknown,
            delimiter: b',',
            has_headers: true,
            lon_column: 0,
            lat_column: 1,
        }
    }
}

/// Error which can occur when reading locations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: missing column {column}")]
    MissingColumn { row: usize, column: usize },

    #[error("row {row}: column {column}: invalid coordinate {value:?}")]
    InvalidCoordinate {
        row: usize,
        column: usize,
        value: String,
    },
}

/// Locations read from a file, together with names of their payload columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Names of the non-coordinate columns, in file order.
    /// Empty if [Options::has_headers] was not set.
    pub headers: Record,

    /// All read locations, in file order. These are not deduplicated.
    pub locations: Vec<Location<Record>>,
}

/// Parse [Locations](Location) from a reader as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn read_from_io<R: io::Read>(options: &Options, reader: R) -> Result<Dataset, Error> {
    let mut b = io::BufReader::new(reader);
    let format = match options.file_format {
        FileFormat::Unknown => {
            let format = FileFormat::sniff(b.fill_buf()?);
            log::debug!("detected input format: {:?}", format);
            format
        }
        format => format,
    };
    read_with_format(options, format, b)
}

fn read_with_format<R: io::BufRead>(
    options: &Options,
    format: FileFormat,
    reader: R,
) -> Result<Dataset, Error> {
    match format {
        FileFormat::Unknown | FileFormat::Csv => delimited::read(options, reader),

        FileFormat::CsvGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            delimited::read(options, io::BufReader::new(d))
        }

        FileFormat::CsvBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            delimited::read(options, io::BufReader::new(d))
        }
    }
}

/// Parse [Locations](Location) from a file at the provided path as per the provided [Options].
pub fn read_from_file<P: AsRef<Path>>(options: &Options, path: P) -> Result<Dataset, Error> {
    let f = File::open(path)?;
    read_from_io(options, f)
}

/// Parse [Locations](Location) from an in-memory buffer as per the provided [Options].
pub fn read_from_buffer(options: &Options, data: &[u8]) -> Result<Dataset, Error> {
    match options.file_format {
        // Fast path - no need to sniff or buffer in-memory uncompressed data
        FileFormat::Csv => delimited::read(options, data),
        FileFormat::Unknown if FileFormat::sniff(data) == FileFormat::Csv => {
            delimited::read(options, data)
        }
        _ => read_from_io(options, data),
    }
}
