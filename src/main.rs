use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use nearloc::reader::{self, FileFormat};
use nearloc::SpatialIndex;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct LoadError(PathBuf, #[source] reader::Error);

#[derive(Debug, thiserror::Error)]
enum ArgError {
    #[error("queries must be lon-lat pairs, got {0} numbers")]
    OddQueryCount(usize),

    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    CsvGz,
    CsvBz2,
}

impl From<Format> for FileFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => FileFormat::Csv,
            Format::CsvGz => FileFormat::CsvGz,
            Format::CsvBz2 => FileFormat::CsvBz2,
        }
    }
}

#[derive(Parser)]
struct Cli {
    /// The path to the file with locations
    file: PathBuf,

    /// Longitude-latitude pairs to find nearest locations to
    #[arg(required = true, allow_negative_numbers = true)]
    queries: Vec<f64>,

    /// Format of the file; guessed from its content if not provided
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Treat the first row as data, not column names
    #[arg(long)]
    no_headers: bool,

    /// Zero-based index of the longitude column
    #[arg(long, default_value_t = 0)]
    lon_column: usize,

    /// Zero-based index of the latitude column
    #[arg(long, default_value_t = 1)]
    lat_column: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn reader_options(&self) -> Result<reader::Options, ArgError> {
        if !self.delimiter.is_ascii() {
            return Err(ArgError::InvalidDelimiter(self.delimiter));
        }

        Ok(reader::Options {
            file_format: self.format.map_or(FileFormat::Unknown, FileFormat::from),
            delimiter: self.delimiter as u8,
            has_headers: !self.no_headers,
            lon_column: self.lon_column,
            lat_column: self.lat_column,
        })
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut logger = colog::default_builder();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if cli.queries.len() % 2 != 0 {
        return Err(ArgError::OddQueryCount(cli.queries.len()).into());
    }

    let options = cli.reader_options()?;
    let dataset = load_dataset(&cli.file, &options)?;
    let total = dataset.locations.len();

    let index = SpatialIndex::from_locations(dataset.locations);
    log::info!("indexed {} unique locations (out of {})", index.len(), total);

    let mut w = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_writer(io::stdout().lock());

    if options.has_headers {
        let mut header = vec!["lon", "lat", "distance_km"];
        header.extend(dataset.headers.fields.iter().map(String::as_str));
        w.write_record(&header)?;
    }

    for query in cli.queries.chunks_exact(2) {
        let (lon, lat) = (query[0], query[1]);
        match index.nearest_with_distance(lon, lat) {
            Some((location, dist)) => {
                let mut row = vec![
                    location.lon.to_string(),
                    location.lat.to_string(),
                    format!("{:.3}", dist),
                ];
                row.extend(location.data.fields);
                w.write_record(&row)?;
            }
            None => log::warn!("no location near {}, {} - the index is empty", lon, lat),
        }
    }

    w.flush()?;
    Ok(())
}

fn load_dataset<P: AsRef<Path>>(
    path: P,
    options: &reader::Options,
) -> Result<reader::Dataset, LoadError> {
    match reader::read_from_file(options, path.as_ref()) {
        Ok(d) => Ok(d),
        Err(e) => Err(LoadError(PathBuf::from(path.as_ref()), e)),
    }
}
