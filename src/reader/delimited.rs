// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use super::{Dataset, Error, Options};
use crate::Location;

/// Payload of a [Location] read from a file: all of its non-coordinate fields,
/// in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<String>,
}

impl Record {
    /// Returns the field at a given (payload) index.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }
}

/// Reads a whole delimited text stream into a [Dataset].
pub(super) fn read<R: io::Read>(options: &Options, reader: R) -> Result<Dataset, Error> {
    let mut r = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = if options.has_headers {
        payload(options, r.headers()?)
    } else {
        Record::default()
    };

    let mut locations = Vec::new();
    for (idx, result) in r.records().enumerate() {
        let record = result?;
        let row = idx + 1;
        locations.push(Location {
            lon: coordinate(&record, row, options.lon_column)?,
            lat: coordinate(&record, row, options.lat_column)?,
            data: payload(options, &record),
        });
    }

    log::debug!("read {} locations", locations.len());
    Ok(Dataset { headers, locations })
}

fn coordinate(record: &csv::StringRecord, row: usize, column: usize) -> Result<f64, Error> {
    let value = record
        .get(column)
        .ok_or(Error::MissingColumn { row, column })?;

    value.parse().map_err(|_| Error::InvalidCoordinate {
        row,
        column,
        value: value.to_string(),
    })
}

fn payload(options: &Options, record: &csv::StringRecord) -> Record {
    Record {
        fields: record
            .iter()
            .enumerate()
            .filter(|&(column, _)| column != options.lon_column && column != options.lat_column)
            .map(|(_, field)| field.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(options: &Options, data: &str) -> Result<Dataset, Error> {
        read(options, data.as_bytes())
    }

    #[test]
    fn read_default_columns() {
        let d = read_str(
            &Options::default(),
            "lon,lat,name\n19.94,50.06,Kraków\n21.01,52.23,Warszawa\n",
        )
        .unwrap();

        assert_eq!(d.headers.fields, ["name"]);
        assert_eq!(
            d.locations,
            [
                Location::new(19.94, 50.06, Record { fields: vec!["Kraków".to_string()] }),
                Location::new(21.01, 52.23, Record { fields: vec!["Warszawa".to_string()] }),
            ]
        );
    }

    #[test]
    fn read_without_headers() {
        let options = Options {
            delimiter: b';',
            has_headers: false,
            lon_column: 2,
            lat_column: 0,
            ..Options::default()
        };
        let d = read_str(&options, "50.06;Kraków;19.94\n52.23;Warszawa;21.01;extra\n").unwrap();

        assert!(d.headers.fields.is_empty());
        assert_eq!(d.locations.len(), 2);
        assert_eq!(d.locations[0].lon, 19.94);
        assert_eq!(d.locations[0].lat, 50.06);
        assert_eq!(d.locations[0].data.get(0), Some("Kraków"));
        assert_eq!(d.locations[1].data.fields, ["Warszawa", "extra"]);
    }

    #[test]
    fn read_empty() {
        let d = read_str(&Options::default(), "lon,lat\n").unwrap();
        assert!(d.locations.is_empty());
        assert!(d.headers.fields.is_empty());
    }

    #[test]
    fn read_invalid_coordinate() {
        let err = read_str(&Options::default(), "lon,lat\n1.0,2.0\n1.0,north\n").unwrap_err();
        match err {
            Error::InvalidCoordinate { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, 1);
                assert_eq!(value, "north");
            }
            _ => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn read_blank_coordinate() {
        let err = read_str(&Options::default(), "lon,lat\n1.0, \n").unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinate { row: 1, column: 1, .. }));
    }

    #[test]
    fn read_missing_column() {
        let err = read_str(&Options::default(), "lon,lat\n1.0,2.0\n3.0\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn { row: 2, column: 1 }));
    }
}
