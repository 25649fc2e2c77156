//! Decoding of single filter stages
//!
//! Image filters never reach this module; callers keep them encoded.

use std::io::Read;
use flate2::read::ZlibDecoder;
use log::trace;
use lopdf::{Dictionary, Object, Stream};

use crate::error::{PDFRebuildError, PDFRebuildResult};

/// Predictor settings of a FlateDecode stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PredictorParams {
    predictor: i64,
    colors: usize,
    bits_per_component: usize,
    columns: usize,
}

impl PredictorParams {
    fn from_dict(params: Option<&Dictionary>) -> PDFRebuildResult<Self> {
        let int = |key: &[u8], default: i64| {
            params
                .and_then(|p| p.get(key).ok())
                .and_then(|value| value.as_i64().ok())
                .unwrap_or(default)
        };
        let positive = |key: &str, default: i64| {
            let value = int(key.as_bytes(), default);
            usize::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    PDFRebuildError::malformed_object(format!("{} {} out of range", key, value))
                })
        };

        let params = Self {
            predictor: int(b"Predictor", 1),
            colors: positive("Colors", 1)?,
            bits_per_component: positive("BitsPerComponent", 8)?,
            columns: positive("Columns", 1)?,
        };
        if !matches!(params.bits_per_component, 1 | 2 | 4 | 8 | 16) {
            return Err(PDFRebuildError::malformed_object(format!(
                "BitsPerComponent {} out of range",
                params.bits_per_component
            )));
        }
        Ok(params)
    }

    /// Bytes per pixel, rounded up to at least one
    fn pixel_bytes(&self) -> usize {
        (self.colors * self.bits_per_component).div_ceil(8)
    }

    fn row_bytes(&self) -> PDFRebuildResult<usize> {
        self.colors
            .checked_mul(self.bits_per_component)
            .and_then(|bits| bits.checked_mul(self.columns))
            .map(|bits| bits.div_ceil(8))
            .ok_or_else(|| PDFRebuildError::malformed_object("predictor row size overflows"))
    }
}

/// Undo one filter stage
pub(crate) fn decode_stage(
    filter: &str,
    data: &[u8],
    params: Option<&Dictionary>,
) -> PDFRebuildResult<Vec<u8>> {
    trace!("Decoding {} stage of {} bytes", filter, data.len());
    match filter {
        "ASCIIHexDecode" | "AHx" => decode_ascii_hex(data),
        "RunLengthDecode" | "RL" => decode_run_length(data),
        "FlateDecode" | "Fl" => {
            let params = PredictorParams::from_dict(params)?;
            apply_predictor(inflate(data)?, &params)
        }
        "LZWDecode" | "LZW" => decode_with_lopdf("LZWDecode", data, params),
        "ASCII85Decode" | "A85" => decode_with_lopdf("ASCII85Decode", data, params),
        other => Err(PDFRebuildError::UnsupportedFilter(other.to_string())),
    }
}

fn decode_ascii_hex(data: &[u8]) -> PDFRebuildResult<Vec<u8>> {
    let mut digits: Vec<u8> = data
        .iter()
        .copied()
        .take_while(|&b| b != b'>')
        .filter(|&b| !b.is_ascii_whitespace() && b != 0)
        .collect();
    // A missing final digit counts as 0
    if digits.len() % 2 == 1 {
        digits.push(b'0');
    }
    hex::decode(&digits)
        .map_err(|err| PDFRebuildError::malformed_object(format!("ASCIIHexDecode failed: {}", err)))
}

fn decode_run_length(data: &[u8]) -> PDFRebuildResult<Vec<u8>> {
    let truncated = || PDFRebuildError::malformed_object("RunLengthDecode run past end of data");
    let mut output = Vec::with_capacity(data.len() * 2);
    let mut pos = 0;

    while let Some(&length) = data.get(pos) {
        pos += 1;
        match length {
            0..=127 => {
                let end = pos + length as usize + 1;
                output.extend_from_slice(data.get(pos..end).ok_or_else(truncated)?);
                pos = end;
            }
            128 => break,
            _ => {
                let byte = *data.get(pos).ok_or_else(truncated)?;
                output.extend(std::iter::repeat(byte).take(257 - length as usize));
                pos += 1;
            }
        }
    }
    Ok(output)
}

fn inflate(data: &[u8]) -> PDFRebuildResult<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data)
        .read_to_end(&mut output)
        .map_err(|err| PDFRebuildError::malformed_object(format!("FlateDecode failed: {}", err)))?;
    Ok(output)
}

fn apply_predictor(data: Vec<u8>, params: &PredictorParams) -> PDFRebuildResult<Vec<u8>> {
    match params.predictor {
        1 => Ok(data),
        2 if params.bits_per_component == 8 => undo_tiff(data, params),
        10..=15 => undo_png(&data, params),
        other => Err(PDFRebuildError::UnsupportedFilter(format!(
            "FlateDecode predictor {} with {} bits per component",
            other, params.bits_per_component
        ))),
    }
}

fn undo_tiff(mut data: Vec<u8>, params: &PredictorParams) -> PDFRebuildResult<Vec<u8>> {
    let bpp = params.pixel_bytes();
    for row in data.chunks_mut(params.row_bytes()?) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }
    Ok(data)
}

fn undo_png(data: &[u8], params: &PredictorParams) -> PDFRebuildResult<Vec<u8>> {
    let bpp = params.pixel_bytes();
    let row_len = params.row_bytes()?;
    let mut output = Vec::with_capacity(data.len());
    let mut previous = vec![0u8; row_len];
    let mut current = vec![0u8; row_len];

    for chunk in data.chunks(row_len + 1) {
        let (&kind, row) = chunk
            .split_first()
            .ok_or_else(|| PDFRebuildError::malformed_object("empty predictor row"))?;

        for (i, &raw) in row.iter().enumerate() {
            let left = if i >= bpp { current[i - bpp] } else { 0 };
            let up = previous[i];
            let up_left = if i >= bpp { previous[i - bpp] } else { 0 };
            current[i] = match kind {
                0 => raw,
                1 => raw.wrapping_add(left),
                2 => raw.wrapping_add(up),
                3 => raw.wrapping_add(((left as u16 + up as u16) / 2) as u8),
                4 => raw.wrapping_add(paeth(left, up, up_left)),
                other => {
                    return Err(PDFRebuildError::malformed_object(format!(
                        "unknown PNG predictor type {}",
                        other
                    )))
                }
            };
        }

        output.extend_from_slice(&current[..row.len()]);
        std::mem::swap(&mut previous, &mut current);
    }
    Ok(output)
}

fn paeth(left: u8, up: u8, up_left: u8) -> u8 {
    let estimate = left as i16 + up as i16 - up_left as i16;
    let distance_left = (estimate - left as i16).abs();
    let distance_up = (estimate - up as i16).abs();
    let distance_up_left = (estimate - up_left as i16).abs();

    if distance_left <= distance_up && distance_left <= distance_up_left {
        left
    } else if distance_up <= distance_up_left {
        up
    } else {
        up_left
    }
}

/// Stages lopdf already implements, run one at a time
fn decode_with_lopdf(
    filter: &str,
    data: &[u8],
    params: Option<&Dictionary>,
) -> PDFRebuildResult<Vec<u8>> {
    let mut dict = Dictionary::new();
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    if let Some(params) = params {
        dict.set("DecodeParms", Object::Dictionary(params.clone()));
    }
    Stream::new(dict, data.to_vec())
        .decompressed_content()
        .map_err(|err| PDFRebuildError::malformed_object(format!("{} failed: {}", filter, err)))
}
