use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use image::ImageReader;
use tilescan_engine::RgbaRaster;
use tilescan_validation::{
    DiagnosticsRun, HistoryStore, HistoryStoreError, LabelExport, RasterSource,
};
use tracing::{debug, warn};

/// Destination of a command's JSON result.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `path`, or to stdout when `None`.
    pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let mut output = match path {
            Some(path) => Self::create(path)?,
            None => Self::Stdout(io::stdout().lock()),
        };
        output.write_json(value)
    }

    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    fn describe(&self) -> String {
        match self {
            Self::Stdout(_) => "stdout".to_owned(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let target = self.describe();
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {target}"))?;
        writeln!(self).with_context(|| format!("Failed to write JSON to {target}"))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {target}"))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Decodes an image file into an RGBA raster.
pub fn load_image<P>(path: P) -> anyhow::Result<RgbaRaster>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let image = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image: {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode image: {}", path.display()))?
        .to_rgba8();
    let width = usize::try_from(image.width())?;
    let height = usize::try_from(image.height())?;
    Ok(RgbaRaster::new(width, height, image.into_raw())?)
}

/// Reads every `*.json` label export in `dir`, sorted by file name.
///
/// Files that fail to parse are logged and skipped.
pub fn read_label_dir<P>(dir: P) -> anyhow::Result<Vec<LabelExport>>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("Failed to read label directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    let mut exports = Vec::with_capacity(paths.len());
    for path in paths {
        match read_json_file::<LabelExport, _>("label", &path) {
            Ok(export) => exports.push(export),
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "skipping label file");
            }
        }
    }
    debug!(dir = %dir.display(), count = exports.len(), "read label exports");
    Ok(exports)
}

/// Loads dataset images from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryRasters {
    dir: PathBuf,
}

impl DirectoryRasters {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl RasterSource for DirectoryRasters {
    fn load(&mut self, image: &str) -> Option<RgbaRaster> {
        load_image(self.dir.join(image))
            .inspect_err(|err| debug!(image, error = %format!("{err:#}"), "image not loaded"))
            .ok()
    }
}

/// Run history persisted as a JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HistoryStore for JsonFileHistory {
    fn load(&mut self) -> Result<Vec<DiagnosticsRun>, HistoryStoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(HistoryStoreError::load(err)),
        };
        serde_json::from_reader(BufReader::new(file)).map_err(HistoryStoreError::load)
    }

    fn save(&mut self, runs: &[DiagnosticsRun]) -> Result<(), HistoryStoreError> {
        let json = serde_json::to_vec_pretty(runs).map_err(HistoryStoreError::save)?;
        fs::write(&self.path, json).map_err(HistoryStoreError::save)
    }
}
