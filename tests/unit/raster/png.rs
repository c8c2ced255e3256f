use super::*;
use std::io::Cursor;

fn encode_with_image(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    // CRC is not checked.
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

fn ihdr(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
    let mut d = width.to_be_bytes().to_vec();
    d.extend_from_slice(&height.to_be_bytes());
    d.extend_from_slice(&[depth, color, 0, 0, interlace]);
    chunk(b"IHDR", &d)
}

fn stored_zlib(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0x78, 0x01, 0x01];
    let len = payload.len() as u16;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

/// Apply `filters[row]` to raw scanlines the way an encoder would.
fn filter_rows(raw: &[Vec<u8>], filters: &[u8], bpp: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for (row, line) in raw.iter().enumerate() {
        let prev = row.checked_sub(1).map(|r| raw[r].as_slice());
        out.push(filters[row]);
        for i in 0..line.len() {
            let a = if i >= bpp { line[i - bpp] } else { 0 };
            let b = prev.map_or(0, |p| p[i]);
            let c = if i >= bpp { prev.map_or(0, |p| p[i - bpp]) } else { 0 };
            let pred = match filters[row] {
                0 => 0,
                1 => a,
                2 => b,
                3 => ((u16::from(a) + u16::from(b)) / 2) as u8,
                _ => paeth(a, b, c),
            };
            out.push(line[i].wrapping_sub(pred));
        }
    }
    out
}

fn build_png(header: Vec<u8>, idat: &[u8]) -> Vec<u8> {
    let mut png = SIGNATURE.to_vec();
    png.extend(header);
    png.extend(chunk(b"tEXt", b"Comment\0fixture"));
    png.extend(chunk(b"IDAT", idat));
    png.extend(chunk(b"IEND", &[]));
    png
}

#[test]
fn solid_raster_roundtrips_exactly() {
    let img = image::RgbaImage::from_pixel(17, 9, image::Rgba([12, 200, 99, 255]));
    let raster = decode_png(&encode_with_image(img)).unwrap();
    assert_eq!((raster.width(), raster.height()), (17, 9));
    assert!(raster.rgba().chunks_exact(4).all(|px| px == [12, 200, 99, 255]));
}

#[test]
fn gradient_raster_roundtrips_exactly() {
    let img = image::RgbaImage::from_fn(64, 48, |x, y| {
        image::Rgba([(x * 4) as u8, (y * 5) as u8, ((x + y) * 3) as u8, 255 - x as u8])
    });
    let expected = img.as_raw().clone();
    let raster = decode_png(&encode_with_image(img)).unwrap();
    assert_eq!(raster.rgba(), expected.as_slice());
}

#[test]
fn rgb_images_gain_opaque_alpha() {
    let img = image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    let raster = decode_png(&buf).unwrap();
    assert_eq!(raster.channels(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(raster.channels(3, 1), None);
}

#[test]
fn every_filter_type_reconstructs_from_decoded_neighbors() {
    let (w, h, bpp) = (4usize, 5usize, 4usize);
    let raw: Vec<Vec<u8>> = (0..h)
        .map(|y| {
            (0..w * bpp)
                .map(|i| ((i * 37 + y * 91 + (i * y) % 13) % 251) as u8)
                .collect()
        })
        .collect();
    let filtered = filter_rows(&raw, &[0, 1, 2, 3, 4], bpp);
    let png = build_png(ihdr(w as u32, h as u32, 8, 6, 0), &stored_zlib(&filtered));

    let raster = decode_png(&png).unwrap();
    assert_eq!(raster.rgba(), raw.concat().as_slice());
}

#[test]
fn filters_can_vary_per_row_for_rgb() {
    let (w, h, bpp) = (3usize, 5usize, 3usize);
    let raw: Vec<Vec<u8>> = (0..h)
        .map(|y| (0..w * bpp).map(|i| (200 - i * 9 - y * 17) as u8).collect())
        .collect();
    let filtered = filter_rows(&raw, &[4, 3, 2, 1, 0], bpp);
    let png = build_png(ihdr(w as u32, h as u32, 8, 2, 0), &stored_zlib(&filtered));

    let raster = decode_png(&png).unwrap();
    assert_eq!(raster.pixel(1, 2).map(|c| c.channels()), Some([
        raw[2][3], raw[2][4], raw[2][5]
    ]));
    assert!(raster.rgba().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn unsupported_headers_are_rejected() {
    let data = stored_zlib(&[0, 0, 0, 0, 0]);
    for header in [
        ihdr(1, 1, 16, 6, 0),
        ihdr(1, 1, 8, 3, 0),
        ihdr(1, 1, 8, 0, 0),
        ihdr(1, 1, 8, 6, 1),
        ihdr(0, 1, 8, 6, 0),
    ] {
        assert!(decode_png(&build_png(header, &data)).is_err());
    }
}

#[test]
fn malformed_streams_are_rejected() {
    assert!(decode_png(b"not a png").is_err());

    let mut missing_idat = SIGNATURE.to_vec();
    missing_idat.extend(ihdr(1, 1, 8, 6, 0));
    missing_idat.extend(chunk(b"IEND", &[]));
    assert!(decode_png(&missing_idat).is_err());

    let short = build_png(ihdr(2, 2, 8, 6, 0), &stored_zlib(&[0, 1, 2]));
    assert!(decode_png(&short).is_err());

    let bad_filter = build_png(ihdr(1, 1, 8, 6, 0), &stored_zlib(&[9, 1, 2, 3, 4]));
    assert!(decode_png(&bad_filter).is_err());

    let mut truncated = build_png(ihdr(1, 1, 8, 6, 0), &stored_zlib(&[0, 1, 2, 3, 4]));
    truncated.truncate(30);
    assert!(decode_png(&truncated).is_err());
}

#[test]
fn raster_new_checks_buffer_length() {
    assert!(Raster::new(2, 2, vec![0; 16]).is_ok());
    assert!(Raster::new(2, 2, vec![0; 15]).is_err());
}
