use crate::foundation::error::{BackdropError, BackdropResult};

const MAX_BITS: usize = 15;
const MAX_LIT_CODES: usize = 286;
const MAX_DIST_CODES: usize = 30;

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];
/// Permuted order of code-length code lengths in a dynamic block header.
const CLEN_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Decompress a zlib stream (RFC 1950 wrapper around RFC 1951 deflate).
///
/// `limit` caps the decompressed size; exceeding it is an error. The trailing Adler-32 checksum is
/// not verified.
pub fn zlib_decompress(data: &[u8], limit: usize) -> BackdropResult<Vec<u8>> {
    let [cmf, flg, ..] = *data else {
        return Err(BackdropError::decode("zlib stream shorter than its header"));
    };
    if cmf & 0x0f != 8 {
        return Err(BackdropError::decode(format!(
            "unsupported zlib compression method {}",
            cmf & 0x0f
        )));
    }
    if (u16::from(cmf) << 8 | u16::from(flg)) % 31 != 0 {
        return Err(BackdropError::decode("zlib header check failed"));
    }
    if flg & 0x20 != 0 {
        return Err(BackdropError::decode("zlib preset dictionaries are not supported"));
    }
    inflate(&data[2..], limit)
}

/// Decompress a raw deflate stream.
pub fn inflate(data: &[u8], limit: usize) -> BackdropResult<Vec<u8>> {
    let mut inflater = Inflater {
        bits: BitReader::new(data),
        out: Vec::new(),
        limit,
    };
    loop {
        let last = inflater.bits.take(1)? == 1;
        match inflater.bits.take(2)? {
            0 => inflater.stored()?,
            1 => {
                let (lit, dist) = fixed_tables()?;
                inflater.codes(&lit, &dist)?;
            }
            2 => {
                let (lit, dist) = inflater.dynamic_tables()?;
                inflater.codes(&lit, &dist)?;
            }
            _ => return Err(BackdropError::decode("invalid deflate block type 3")),
        }
        if last {
            return Ok(inflater.out);
        }
    }
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    buf: u32,
    count: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            buf: 0,
            count: 0,
        }
    }

    /// Read `n` bits (n <= 16), least significant first.
    fn take(&mut self, n: u32) -> BackdropResult<u32> {
        while self.count < n {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(BackdropError::decode("deflate stream truncated"));
            };
            self.pos += 1;
            self.buf |= u32::from(byte) << self.count;
            self.count += 8;
        }
        let v = self.buf & ((1u32 << n) - 1);
        self.buf >>= n;
        self.count -= n;
        Ok(v)
    }

    fn align(&mut self) {
        self.buf = 0;
        self.count = 0;
    }

    fn bytes(&mut self, n: usize) -> BackdropResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&e| e <= self.data.len())
            .ok_or_else(|| BackdropError::decode("stored block truncated"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

/// Canonical Huffman table: code counts per length plus symbols in code order.
struct Huffman {
    counts: [u16; MAX_BITS + 1],
    symbols: Vec<u16>,
}

impl Huffman {
    fn new(lengths: &[u8]) -> BackdropResult<Self> {
        let mut counts = [0u16; MAX_BITS + 1];
        for &l in lengths {
            counts[usize::from(l)] += 1;
        }
        let mut left: i32 = 1;
        for &count in &counts[1..] {
            left = (left << 1) - i32::from(count);
            if left < 0 {
                return Err(BackdropError::decode("over-subscribed huffman code"));
            }
        }

        let mut offsets = [0u16; MAX_BITS + 1];
        for len in 1..MAX_BITS {
            offsets[len + 1] = offsets[len] + counts[len];
        }
        let mut symbols = vec![0u16; lengths.len()];
        for (sym, &l) in lengths.iter().enumerate() {
            if l != 0 {
                symbols[usize::from(offsets[usize::from(l)])] = sym as u16;
                offsets[usize::from(l)] += 1;
            }
        }
        counts[0] = 0;
        Ok(Self { counts, symbols })
    }

    fn decode(&self, bits: &mut BitReader<'_>) -> BackdropResult<u16> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;
        for len in 1..=MAX_BITS {
            code |= bits.take(1)? as i32;
            let count = i32::from(self.counts[len]);
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err(BackdropError::decode("invalid huffman code"))
    }
}

fn fixed_tables() -> BackdropResult<(Huffman, Huffman)> {
    let mut lengths = [0u8; 288];
    lengths[..144].fill(8);
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths[280..].fill(8);
    Ok((Huffman::new(&lengths)?, Huffman::new(&[5u8; 30])?))
}

struct Inflater<'a> {
    bits: BitReader<'a>,
    out: Vec<u8>,
    limit: usize,
}

impl Inflater<'_> {
    fn ensure_room(&self, extra: usize) -> BackdropResult<()> {
        if self.out.len() + extra > self.limit {
            return Err(BackdropError::decode(format!(
                "decompressed data exceeds {} bytes",
                self.limit
            )));
        }
        Ok(())
    }

    fn stored(&mut self) -> BackdropResult<()> {
        self.bits.align();
        let header = self.bits.bytes(4)?;
        let len = u16::from_le_bytes([header[0], header[1]]);
        let nlen = u16::from_le_bytes([header[2], header[3]]);
        if len != !nlen {
            return Err(BackdropError::decode("stored block length mismatch"));
        }
        self.ensure_room(usize::from(len))?;
        let payload = self.bits.bytes(usize::from(len))?;
        self.out.extend_from_slice(payload);
        Ok(())
    }

    fn dynamic_tables(&mut self) -> BackdropResult<(Huffman, Huffman)> {
        let nlen = self.bits.take(5)? as usize + 257;
        let ndist = self.bits.take(5)? as usize + 1;
        let ncode = self.bits.take(4)? as usize + 4;
        if nlen > MAX_LIT_CODES || ndist > MAX_DIST_CODES {
            return Err(BackdropError::decode("too many length or distance codes"));
        }

        let mut clens = [0u8; 19];
        for &slot in &CLEN_ORDER[..ncode] {
            clens[slot] = self.bits.take(3)? as u8;
        }
        let clen_code = Huffman::new(&clens)?;

        let mut lengths = vec![0u8; nlen + ndist];
        let mut i = 0;
        while i < lengths.len() {
            let sym = clen_code.decode(&mut self.bits)?;
            if sym < 16 {
                lengths[i] = sym as u8;
                i += 1;
                continue;
            }
            let (value, repeat) = match sym {
                16 => {
                    let Some(&prev) = i.checked_sub(1).and_then(|p| lengths.get(p)) else {
                        return Err(BackdropError::decode("repeat with no previous length"));
                    };
                    (prev, 3 + self.bits.take(2)? as usize)
                }
                17 => (0, 3 + self.bits.take(3)? as usize),
                _ => (0, 11 + self.bits.take(7)? as usize),
            };
            if i + repeat > lengths.len() {
                return Err(BackdropError::decode("code lengths overflow"));
            }
            lengths[i..i + repeat].fill(value);
            i += repeat;
        }
        if lengths[256] == 0 {
            return Err(BackdropError::decode("missing end-of-block code"));
        }

        Ok((
            Huffman::new(&lengths[..nlen])?,
            Huffman::new(&lengths[nlen..])?,
        ))
    }

    fn codes(&mut self, lit: &Huffman, dist: &Huffman) -> BackdropResult<()> {
        loop {
            let sym = usize::from(lit.decode(&mut self.bits)?);
            match sym {
                0..=255 => {
                    self.ensure_room(1)?;
                    self.out.push(sym as u8);
                }
                256 => return Ok(()),
                _ => {
                    let li = sym - 257;
                    if li >= LENGTH_BASE.len() {
                        return Err(BackdropError::decode("invalid length symbol"));
                    }
                    let len = usize::from(LENGTH_BASE[li])
                        + self.bits.take(u32::from(LENGTH_EXTRA[li]))? as usize;

                    let di = usize::from(dist.decode(&mut self.bits)?);
                    if di >= DIST_BASE.len() {
                        return Err(BackdropError::decode("invalid distance symbol"));
                    }
                    let distance = usize::from(DIST_BASE[di])
                        + self.bits.take(u32::from(DIST_EXTRA[di]))? as usize;
                    if distance > self.out.len() {
                        return Err(BackdropError::decode("distance too far back"));
                    }

                    self.ensure_room(len)?;
                    let start = self.out.len() - distance;
                    // Overlapping copies are byte-serial.
                    for k in 0..len {
                        let b = self.out[start + k];
                        self.out.push(b);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/inflate.rs"]
mod tests;
