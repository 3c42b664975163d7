//! GeoTIFF access.
//!
//! [`RasterHandle`] owns the open file for the duration of one sampling or
//! rendering operation and releases it when dropped, on success and error
//! paths alike. Pixels are read into a [`RasterWindow`], an in-memory buffer
//! with its own transform that outlives nothing but the operation using it.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use geo::{coord, Rect};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::debug;

use super::crs::RasterCrs;
use super::error::RasterError;
use super::transform::GeoTransform;

/// Pixel value marking a deforested cell.
pub const DEFORESTED_VALUE: f64 = 1.0;

/// Rectangular block of pixels, in full-raster pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: u32,
    pub row_off: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelWindow {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Open single-band GeoTIFF.
pub struct RasterHandle {
    path: PathBuf,
    decoder: Decoder<BufReader<File>>,
    width: u32,
    height: u32,
    transform: GeoTransform,
    crs: RasterCrs,
    nodata: Option<f64>,
}

impl std::fmt::Debug for RasterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterHandle")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("crs", &self.crs)
            .finish_non_exhaustive()
    }
}

impl RasterHandle {
    /// Opens a raster and reads its georeferencing.
    ///
    /// # Errors
    ///
    /// * [`RasterError::Io`] when the file cannot be opened
    /// * [`RasterError::Decode`] when it is not a single-band TIFF
    /// * [`RasterError::MissingGeoreference`] when neither a tiepoint/scale
    ///   pair nor a transformation matrix is present
    /// * [`RasterError::UnsupportedCrs`] for CRS other than WGS84, Web
    ///   Mercator and WGS84 UTM
    pub fn open(path: &Path) -> Result<Self, RasterError> {
        let file = File::open(path).map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decode = |e: tiff::TiffError| RasterError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut decoder = Decoder::new(BufReader::new(file)).map_err(decode)?;
        let (width, height) = decoder.dimensions().map_err(decode)?;
        match decoder.colortype().map_err(decode)? {
            ColorType::Gray(_) => {}
            other => {
                return Err(RasterError::Decode {
                    path: path.to_path_buf(),
                    message: format!("expected a single-band raster, found {:?}", other),
                })
            }
        }

        let transform = read_transform(&mut decoder, path)?;
        let crs = match decoder
            .find_tag(Tag::GeoKeyDirectoryTag)
            .map_err(decode)?
        {
            Some(value) => RasterCrs::from_geokeys(&value.into_u16_vec().map_err(decode)?)?,
            None => {
                return Err(RasterError::MissingGeoreference {
                    path: path.to_path_buf(),
                    message: "no GeoKeyDirectoryTag".to_string(),
                })
            }
        };
        let nodata = decoder
            .find_tag(Tag::GdalNodata)
            .map_err(decode)?
            .and_then(|value| value.into_string().ok())
            .and_then(|text| text.trim().trim_end_matches('\0').parse::<f64>().ok());

        debug!(
            path = %path.display(),
            width,
            height,
            crs = %crs,
            nodata = ?nodata,
            "Raster opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            decoder,
            width,
            height,
            transform,
            crs,
            nodata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> RasterCrs {
        self.crs
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Full extent in native coordinates.
    pub fn native_extent(&self) -> Rect<f64> {
        let (x1, y1) = self.transform.pixel_to_geo(0.0, 0.0);
        let (x2, y2) = self
            .transform
            .pixel_to_geo(self.width as f64, self.height as f64);
        Rect::new(coord! { x: x1, y: y1 }, coord! { x: x2, y: y2 })
    }

    /// Smallest pixel window covering a native rectangle, clipped to the
    /// raster. Every pixel the rectangle touches is included.
    pub fn window_for(&self, rect: &Rect<f64>) -> Option<PixelWindow> {
        let corners = [
            (rect.min().x, rect.min().y),
            (rect.max().x, rect.min().y),
            (rect.max().x, rect.max().y),
            (rect.min().x, rect.max().y),
        ];

        let mut min_col = f64::MAX;
        let mut max_col = f64::MIN;
        let mut min_row = f64::MAX;
        let mut max_row = f64::MIN;
        for (x, y) in corners {
            let (col, row) = self.transform.geo_to_pixel(x, y)?;
            min_col = min_col.min(col);
            max_col = max_col.max(col);
            min_row = min_row.min(row);
            max_row = max_row.max(row);
        }

        let col_start = min_col.floor().max(0.0);
        let row_start = min_row.floor().max(0.0);
        let col_end = (max_col.floor() + 1.0).min(self.width as f64);
        let row_end = (max_row.floor() + 1.0).min(self.height as f64);
        if col_end <= col_start || row_end <= row_start {
            return None;
        }

        Some(PixelWindow {
            col_off: col_start as u32,
            row_off: row_start as u32,
            width: (col_end - col_start) as u32,
            height: (row_end - row_start) as u32,
        })
    }

    /// Window covering the whole raster.
    pub fn full_window(&self) -> PixelWindow {
        PixelWindow {
            col_off: 0,
            row_off: 0,
            width: self.width,
            height: self.height,
        }
    }

    /// Reads the pixels of `window`.
    ///
    /// Only the strips or tiles intersecting the window are decoded, one at a
    /// time, and samples keep the raster's own type.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::NoDataOverlap`] for an empty window and
    /// [`RasterError::Decode`] when the pixel data cannot be read.
    pub fn read_window(&mut self, window: PixelWindow) -> Result<RasterWindow, RasterError> {
        if window.is_empty()
            || window.col_off + window.width > self.width
            || window.row_off + window.height > self.height
        {
            return Err(RasterError::NoDataOverlap);
        }

        let path = self.path.clone();
        let corrupt = |message: String| RasterError::Decode {
            path: path.clone(),
            message,
        };

        let (chunk_width, chunk_height) = self.decoder.chunk_dimensions();
        if chunk_width == 0 || chunk_height == 0 {
            return Err(corrupt("zero-sized strip or tile".to_string()));
        }
        let chunks_across = self.width.div_ceil(chunk_width);
        let col_end = window.col_off + window.width;
        let row_end = window.row_off + window.height;
        let window_len = window.width as usize * window.height as usize;

        let mut data: Option<Samples> = None;
        let mut chunks = 0u32;
        for chunk_row in window.row_off / chunk_height..=(row_end - 1) / chunk_height {
            for chunk_col in window.col_off / chunk_width..=(col_end - 1) / chunk_width {
                let index = chunk_row * chunks_across + chunk_col;
                let (data_width, data_height) = self.decoder.chunk_data_dimensions(index);
                let chunk = Samples::from(
                    self.decoder
                        .read_chunk(index)
                        .map_err(|e| corrupt(e.to_string()))?,
                );
                if chunk.len() < data_width as usize * data_height as usize {
                    return Err(corrupt(format!(
                        "chunk {} holds {} samples, expected {}x{}",
                        index,
                        chunk.len(),
                        data_width,
                        data_height
                    )));
                }

                let x0 = chunk_col * chunk_width;
                let y0 = chunk_row * chunk_height;
                let span_start = window.col_off.max(x0);
                let span_end = col_end.min(x0 + data_width);
                if span_end <= span_start {
                    continue;
                }
                let span = (span_end - span_start) as usize;

                let target = data.get_or_insert_with(|| chunk.zeroed(window_len));
                for row in window.row_off.max(y0)..row_end.min(y0 + data_height) {
                    let src = (row - y0) as usize * data_width as usize + (span_start - x0) as usize;
                    let dst = (row - window.row_off) as usize * window.width as usize
                        + (span_start - window.col_off) as usize;
                    if !target.copy_span(&chunk, src, dst, span) {
                        return Err(corrupt(format!("chunk {} changes sample type", index)));
                    }
                }
                chunks += 1;
            }
        }
        let data = data.ok_or_else(|| corrupt("no pixel data in window".to_string()))?;

        debug!(
            path = %self.path.display(),
            col_off = window.col_off,
            row_off = window.row_off,
            width = window.width,
            height = window.height,
            chunks,
            "Raster window read"
        );

        Ok(RasterWindow {
            width: window.width,
            height: window.height,
            transform: self.transform.offset(window.col_off, window.row_off),
            crs: self.crs,
            nodata: self.nodata,
            data,
        })
    }
}

impl Drop for RasterHandle {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "Raster released");
    }
}

/// In-memory single-band pixels with their transform and CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterWindow {
    pub width: u32,
    pub height: u32,
    /// Maps window pixel coordinates to native CRS coordinates
    pub transform: GeoTransform,
    pub crs: RasterCrs,
    pub nodata: Option<f64>,
    pub data: Samples,
}

impl RasterWindow {
    /// Value at a window pixel, `None` outside the window or for nodata.
    pub fn value(&self, col: u32, row: u32) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let value = self.data.get(row as usize * self.width as usize + col as usize)?;
        match self.nodata {
            Some(nodata) if (value - nodata).abs() < f64::EPSILON => None,
            _ if value.is_nan() => None,
            _ => Some(value),
        }
    }

    pub fn is_deforested(&self, col: u32, row: u32) -> bool {
        self.value(col, row) == Some(DEFORESTED_VALUE)
    }
}

fn read_transform(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
) -> Result<GeoTransform, RasterError> {
    let decode = |e: tiff::TiffError| RasterError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(matrix) = decoder
        .find_tag(Tag::ModelTransformationTag)
        .map_err(decode)?
    {
        let matrix = matrix.into_f64_vec().map_err(decode)?;
        if let Some(transform) = GeoTransform::from_model_transformation(&matrix) {
            return Ok(transform);
        }
    }

    let tiepoint = decoder.find_tag(Tag::ModelTiepointTag).map_err(decode)?;
    let scale = decoder.find_tag(Tag::ModelPixelScaleTag).map_err(decode)?;
    match (tiepoint, scale) {
        (Some(tiepoint), Some(scale)) => {
            let tiepoint = tiepoint.into_f64_vec().map_err(decode)?;
            let scale = scale.into_f64_vec().map_err(decode)?;
            GeoTransform::from_tiepoint(&tiepoint, &scale).ok_or_else(|| {
                RasterError::MissingGeoreference {
                    path: path.to_path_buf(),
                    message: "malformed tiepoint or pixel scale".to_string(),
                }
            })
        }
        _ => Err(RasterError::MissingGeoreference {
            path: path.to_path_buf(),
            message: "no tiepoint/pixel scale or transformation matrix".to_string(),
        }),
    }
}

/// Pixel samples in the raster's own type, row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl From<DecodingResult> for Samples {
    fn from(result: DecodingResult) -> Self {
        match result {
            DecodingResult::U8(v) => Samples::U8(v),
            DecodingResult::U16(v) => Samples::U16(v),
            DecodingResult::U32(v) => Samples::U32(v),
            DecodingResult::U64(v) => Samples::U64(v),
            DecodingResult::I8(v) => Samples::I8(v),
            DecodingResult::I16(v) => Samples::I16(v),
            DecodingResult::I32(v) => Samples::I32(v),
            DecodingResult::I64(v) => Samples::I64(v),
            DecodingResult::F32(v) => Samples::F32(v),
            DecodingResult::F64(v) => Samples::F64(v),
        }
    }
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(v) => v.len(),
            Samples::U16(v) => v.len(),
            Samples::U32(v) => v.len(),
            Samples::U64(v) => v.len(),
            Samples::I8(v) => v.len(),
            Samples::I16(v) => v.len(),
            Samples::I32(v) => v.len(),
            Samples::I64(v) => v.len(),
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index` widened to `f64`.
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Samples::U8(v) => v.get(index).map(|&x| x as f64),
            Samples::U16(v) => v.get(index).map(|&x| x as f64),
            Samples::U32(v) => v.get(index).map(|&x| x as f64),
            Samples::U64(v) => v.get(index).map(|&x| x as f64),
            Samples::I8(v) => v.get(index).map(|&x| x as f64),
            Samples::I16(v) => v.get(index).map(|&x| x as f64),
            Samples::I32(v) => v.get(index).map(|&x| x as f64),
            Samples::I64(v) => v.get(index).map(|&x| x as f64),
            Samples::F32(v) => v.get(index).map(|&x| x as f64),
            Samples::F64(v) => v.get(index).copied(),
        }
    }

    /// Zero-filled buffer of `len` samples of the same type.
    fn zeroed(&self, len: usize) -> Self {
        match self {
            Samples::U8(_) => Samples::U8(vec![0; len]),
            Samples::U16(_) => Samples::U16(vec![0; len]),
            Samples::U32(_) => Samples::U32(vec![0; len]),
            Samples::U64(_) => Samples::U64(vec![0; len]),
            Samples::I8(_) => Samples::I8(vec![0; len]),
            Samples::I16(_) => Samples::I16(vec![0; len]),
            Samples::I32(_) => Samples::I32(vec![0; len]),
            Samples::I64(_) => Samples::I64(vec![0; len]),
            Samples::F32(_) => Samples::F32(vec![0.0; len]),
            Samples::F64(_) => Samples::F64(vec![0.0; len]),
        }
    }

    /// Copies `len` samples from `src[src_start..]` to `self[dst_start..]`.
    ///
    /// Returns false when the two buffers hold different sample types.
    fn copy_span(&mut self, src: &Samples, src_start: usize, dst_start: usize, len: usize) -> bool {
        match (self, src) {
            (Samples::U8(d), Samples::U8(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::U16(d), Samples::U16(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::U32(d), Samples::U32(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::U64(d), Samples::U64(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::I8(d), Samples::I8(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::I16(d), Samples::I16(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::I32(d), Samples::I32(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::I64(d), Samples::I64(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::F32(d), Samples::F32(s)) => copy_span(d, s, src_start, dst_start, len),
            (Samples::F64(d), Samples::F64(s)) => copy_span(d, s, src_start, dst_start, len),
            _ => return false,
        }
        true
    }
}

fn copy_span<T: Copy>(dst: &mut [T], src: &[T], src_start: usize, dst_start: usize, len: usize) {
    dst[dst_start..dst_start + len].copy_from_slice(&src[src_start..src_start + len]);
}
