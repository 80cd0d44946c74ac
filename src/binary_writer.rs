pub struct BinaryWriter {
    bytes: Vec<u8>,
    buf: u8,
    index: usize,
}

impl BinaryWriter {
    pub fn new() -> BinaryWriter {
        BinaryWriter {
            bytes: vec![],
            buf: 0,
            index: 0,
        }
    }

    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) {
        self.buf = (self.buf << 1) | bit as u8;
        self.index += 1;
        if self.index == 8 {
            self.bytes.push(self.buf);
            self.index = 0;
            self.buf = 0;
        }
    }

    pub fn write_bits(&mut self, bits: u32, n_bits: usize) {
        for i in (0..n_bits).rev() {
            self.write_bit((bits >> i) & 1 > 0);
        }
    }

    pub fn byte_align(&mut self) {
        let rem = if self.index > 0 { 8 - self.index } else { 0 };
        for _ in 0..rem {
            self.write_bit(false);
        }
    }

    pub fn num_bits(&self) -> usize {
        self.bytes.len() * 8 + self.index
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.index == 0
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.byte_align();
        self.bytes
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_bits_msb_first() {
        let mut writer = BinaryWriter::new();
        writer.write_bits(0b101, 3);
        assert_eq!(writer.num_bits(), 3);
        assert!(!writer.is_byte_aligned());
        writer.write_bits(0b11111, 5);
        assert!(writer.is_byte_aligned());
        writer.write_bit(true);
        assert_eq!(writer.into_bytes(), vec![0b1011_1111, 0b1000_0000]);
    }
}
