use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// Seeded xxh3 hasher with explicit, length-prefixed field encoding.
///
/// Every id derived through this type is stable across runs, platforms, and thread counts.
pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_opt_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }

    /// Hash a float at a fixed precision so tiny arithmetic noise cannot change an id.
    pub(crate) fn write_f64_rounded(&mut self, v: f64, decimals: i32) {
        let scale = 10f64.powi(decimals);
        let q = (v * scale).round();
        if q.is_finite() {
            self.write_u64(q as i64 as u64);
        } else {
            self.write_u64(u64::MAX);
        }
    }

    pub(crate) fn finish(self) -> u64 {
        self.inner.digest()
    }

    /// Finish and render as `<prefix>-<16 hex digits>`.
    pub(crate) fn finish_id(self, prefix: &str) -> String {
        format!("{prefix}-{:016x}", self.finish())
    }
}
