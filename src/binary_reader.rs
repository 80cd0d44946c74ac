use std::fs::File;
use std::io::{self, Read};

/// MSB-first bit cursor over an entropy coded payload.
///
/// Reads past the end of the buffer return zero bits and set a sticky
/// overrun flag, so a truncated substream decodes to garbage instead of
/// touching memory outside the slice.
pub struct BinaryReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
    overrun: bool,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> BinaryReader<'a> {
        BinaryReader {
            data,
            bit_pos: 0,
            overrun: false,
        }
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> bool {
        let byte_pos = self.bit_pos >> 3;
        if byte_pos >= self.data.len() {
            self.overrun = true;
            self.bit_pos += 1;
            return false;
        }
        let bit = (self.data[byte_pos] >> (7 - (self.bit_pos & 7))) & 1 > 0;
        self.bit_pos += 1;
        bit
    }

    pub fn read_bits(&mut self, n_bits: usize) -> u32 {
        debug_assert!(n_bits <= 32);
        let mut v = 0u32;
        for _ in 0..n_bits {
            v = (v << 1) | self.read_bit() as u32;
        }
        v
    }

    pub fn skip_bits(&mut self, n_bits: usize) {
        self.bit_pos += n_bits;
        if self.bit_pos > self.data.len() * 8 {
            self.overrun = true;
        }
    }

    pub fn byte_align(&mut self) {
        self.bit_pos = (self.bit_pos + 7) & !7;
    }

    pub fn seek_bits(&mut self, bit_pos: usize) {
        self.bit_pos = bit_pos;
    }

    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }

    pub fn bits_left(&self) -> isize {
        (self.data.len() * 8) as isize - self.bit_pos as isize
    }

    pub fn is_overrun(&self) -> bool {
        self.overrun
    }
}

/// Loads a whole payload from a file, or from stdin when `path` is `-`.
pub fn read_input(path: &str) -> io::Result<Vec<u8>> {
    let mut data = vec![];
    if path == "-" {
        io::stdin().lock().read_to_end(&mut data)?;
    } else {
        io::BufReader::new(File::open(path)?).read_to_end(&mut data)?;
    }
    Ok(data)
}
