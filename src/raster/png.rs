use crate::foundation::core::Color;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::inflate::zlib_decompress;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const MAX_DIMENSION: u32 = 1 << 15;
const MAX_PIXELS: u64 = 1 << 28;

/// Decoded 8-bit RGBA pixels, row-major, straight (non-premultiplied) alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Raster {
    /// Wrap an RGBA buffer; its length must be `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> BackdropResult<Self> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if rgba.len() as u64 != expected {
            return Err(BackdropError::validation(format!(
                "raster buffer has {} bytes, expected {expected}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Raw channels at `(x, y)`, or `None` outside the raster.
    pub fn channels(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Pixel color at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: i64, y: i64) -> Option<Color> {
        self.channels(x, y)
            .map(|[r, g, b, a]| Color::rgba(r, g, b, f64::from(a) / 255.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColorType {
    Rgb,
    Rgba,
}

impl ColorType {
    fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Header {
    width: u32,
    height: u32,
    color_type: ColorType,
}

/// Decode a PNG screenshot.
///
/// Only non-interlaced 8-bit RGB and RGBA images are accepted. Chunk CRCs are not verified.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_png(bytes: &[u8]) -> BackdropResult<Raster> {
    let Some(rest) = bytes.strip_prefix(&SIGNATURE) else {
        return Err(BackdropError::decode("missing PNG signature"));
    };

    let mut header: Option<Header> = None;
    let mut idat = Vec::new();
    let mut saw_end = false;
    let mut pos = 0usize;

    while pos < rest.len() {
        let (kind, data, next) = read_chunk(rest, pos)?;
        pos = next;
        match &kind {
            b"IHDR" => {
                if header.is_some() {
                    return Err(BackdropError::decode("duplicate IHDR chunk"));
                }
                header = Some(parse_header(data)?);
            }
            b"IDAT" => {
                if header.is_none() {
                    return Err(BackdropError::decode("IDAT before IHDR"));
                }
                idat.extend_from_slice(data);
            }
            b"IEND" => {
                saw_end = true;
                break;
            }
            _ if header.is_none() => {
                return Err(BackdropError::decode("first chunk is not IHDR"));
            }
            // Ancillary chunks carry nothing the sampler needs.
            _ => {}
        }
    }

    let Some(header) = header else {
        return Err(BackdropError::decode("missing IHDR chunk"));
    };
    if idat.is_empty() {
        return Err(BackdropError::decode("missing IDAT data"));
    }
    if !saw_end {
        tracing::debug!("PNG stream ended without IEND");
    }

    let bpp = header.color_type.bytes_per_pixel();
    let stride = header.width as usize * bpp;
    let expected = (stride + 1) * header.height as usize;
    let filtered = zlib_decompress(&idat, expected)?;
    if filtered.len() < expected {
        return Err(BackdropError::decode(format!(
            "image data has {} bytes, expected {expected}",
            filtered.len()
        )));
    }

    let pixels = unfilter(&filtered, header.height as usize, stride, bpp)?;
    let rgba = match header.color_type {
        ColorType::Rgba => pixels,
        ColorType::Rgb => {
            let mut out = Vec::with_capacity(pixels.len() / 3 * 4);
            for px in pixels.chunks_exact(3) {
                out.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
            out
        }
    };
    Raster::new(header.width, header.height, rgba)
}

fn read_chunk(buf: &[u8], pos: usize) -> BackdropResult<([u8; 4], &[u8], usize)> {
    let head = buf
        .get(pos..pos + 8)
        .ok_or_else(|| BackdropError::decode("truncated chunk header"))?;
    let len = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as usize;
    let kind = [head[4], head[5], head[6], head[7]];
    let start = pos + 8;
    let end = start
        .checked_add(len)
        .filter(|&e| e.saturating_add(4) <= buf.len())
        .ok_or_else(|| BackdropError::decode("truncated chunk data"))?;
    Ok((kind, &buf[start..end], end + 4))
}

fn parse_header(data: &[u8]) -> BackdropResult<Header> {
    let [w0, w1, w2, w3, h0, h1, h2, h3, depth, color, compression, filter, interlace] = *data
    else {
        return Err(BackdropError::decode("IHDR must be 13 bytes"));
    };
    let width = u32::from_be_bytes([w0, w1, w2, w3]);
    let height = u32::from_be_bytes([h0, h1, h2, h3]);
    if width == 0 || height == 0 {
        return Err(BackdropError::decode("image has zero size"));
    }
    if width > MAX_DIMENSION
        || height > MAX_DIMENSION
        || u64::from(width) * u64::from(height) > MAX_PIXELS
    {
        return Err(BackdropError::decode(format!(
            "image {width}x{height} is too large"
        )));
    }
    if depth != 8 {
        return Err(BackdropError::decode(format!("unsupported bit depth {depth}")));
    }
    let color_type = match color {
        2 => ColorType::Rgb,
        6 => ColorType::Rgba,
        other => {
            return Err(BackdropError::decode(format!(
                "unsupported color type {other}"
            )));
        }
    };
    if compression != 0 || filter != 0 {
        return Err(BackdropError::decode("unsupported compression or filter method"));
    }
    if interlace != 0 {
        return Err(BackdropError::decode("interlaced images are not supported"));
    }
    Ok(Header {
        width,
        height,
        color_type,
    })
}

/// Reverse per-scanline filtering. Predictors read reconstructed bytes of the current and
/// previous rows.
fn unfilter(filtered: &[u8], height: usize, stride: usize, bpp: usize) -> BackdropResult<Vec<u8>> {
    let mut out = vec![0u8; stride * height];
    for row in 0..height {
        let src = &filtered[row * (stride + 1)..(row + 1) * (stride + 1)];
        let filter = src[0];
        let line = &src[1..];

        let (done, current) = out.split_at_mut(row * stride);
        let prev = if row == 0 {
            None
        } else {
            Some(&done[(row - 1) * stride..])
        };
        let cur = &mut current[..stride];

        for i in 0..stride {
            let a = if i >= bpp { cur[i - bpp] } else { 0 };
            let b = prev.map_or(0, |p| p[i]);
            let c = if i >= bpp { prev.map_or(0, |p| p[i - bpp]) } else { 0 };
            let predicted = match filter {
                0 => 0,
                1 => a,
                2 => b,
                3 => ((u16::from(a) + u16::from(b)) / 2) as u8,
                4 => paeth(a, b, c),
                other => {
                    return Err(BackdropError::decode(format!(
                        "unknown filter type {other} on row {row}"
                    )));
                }
            };
            cur[i] = line[i].wrapping_add(predicted);
        }
    }
    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/png.rs"]
mod tests;
