use super::binary_reader::BinaryReader;
use super::context::ContextModel;
use debug_print::*;

pub trait BinDecoder {
    fn decode_decision(&mut self, model: &mut ContextModel) -> bool;

    fn decode_bypass(&mut self) -> bool;

    /// Returns `value` for a bypass bin equal to 1 and `-value` otherwise.
    #[inline(always)]
    fn decode_bypass_signed(&mut self, value: i32) -> i32 {
        if self.decode_bypass() {
            value
        } else {
            -value
        }
    }

    fn decode_terminate(&mut self) -> bool;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EngineState {
    Initialized,
    Decoding,
    Terminated,
}

pub struct CabacEngine<'a> {
    reader: BinaryReader<'a>,
    range: u32,
    offset: u32,
    state: EngineState,
}

impl<'a> CabacEngine<'a> {
    pub fn new(data: &'a [u8]) -> CabacEngine<'a> {
        CabacEngine {
            reader: BinaryReader::new(data),
            range: 510,
            offset: 0,
            state: EngineState::Initialized,
        }
    }

    pub fn init_decoder(&mut self) {
        self.reader.byte_align();
        self.offset = self.reader.read_bits(9);
        self.range = 510;
        self.state = EngineState::Decoding;
        debug_eprintln!(
            "cabac: init at bit {} offset={}",
            self.reader.bit_position() - 9,
            self.offset
        );
    }

    /// Starts decoding after a slice header of `header_bits` bits, consuming
    /// the `alignment_bit_equal_to_one` that precedes the slice data.
    pub fn init_after_header(&mut self, header_bits: usize) {
        self.reader.seek_bits(header_bits);
        self.reader.skip_bits(1);
        self.init_decoder();
    }

    pub fn reinit(&mut self) {
        debug_eprintln!("cabac: reinit from {:?}", self.state);
        self.init_decoder();
    }

    pub fn restart_at(&mut self, byte_pos: usize) {
        self.reader.seek_bits(byte_pos * 8);
        self.init_decoder();
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn bit_position(&self) -> usize {
        self.reader.bit_position()
    }

    pub fn is_overrun(&self) -> bool {
        self.reader.is_overrun()
    }

    #[inline(always)]
    fn renorm(&mut self) {
        while self.range < 256 {
            self.range <<= 1;
            self.offset = (self.offset << 1) | self.reader.read_bit() as u32;
        }
    }
}

impl<'a> BinDecoder for CabacEngine<'a> {
    #[inline(always)]
    fn decode_decision(&mut self, model: &mut ContextModel) -> bool {
        let q_range_idx = ((self.range >> 6) & 3) as usize;
        let lps_range = RANGE_TAB_LPS[model.state as usize][q_range_idx] as u32;
        self.range -= lps_range;
        let bin = if self.offset >= self.range {
            let bin = !model.mps;
            self.offset -= self.range;
            self.range = lps_range;
            if model.state == 0 {
                model.mps = !model.mps;
            }
            model.state = TRANS_IDX_LPS[model.state as usize];
            bin
        } else {
            model.state = TRANS_IDX_MPS[model.state as usize];
            model.mps
        };
        self.renorm();
        bin
    }

    #[inline(always)]
    fn decode_bypass(&mut self) -> bool {
        self.offset = (self.offset << 1) | self.reader.read_bit() as u32;
        if self.offset >= self.range {
            self.offset -= self.range;
            true
        } else {
            false
        }
    }

    fn decode_terminate(&mut self) -> bool {
        self.range -= 2;
        if self.offset >= self.range {
            self.state = EngineState::Terminated;
            true
        } else {
            self.renorm();
            false
        }
    }
}

// state transitions after an MPS and an LPS bin
pub const TRANS_IDX_MPS: [u8; 64] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50,
    51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 62, 63,
];

pub const TRANS_IDX_LPS: [u8; 64] = [
    0, 0, 1, 2, 2, 4, 4, 5, 6, 7, 8, 9, 9, 11, 11, 12, 13, 13, 15, 15, 16, 16, 18, 18, 19, 19, 21,
    21, 22, 22, 23, 24, 24, 25, 26, 26, 27, 27, 28, 29, 29, 30, 30, 30, 31, 32, 32, 33, 33, 33, 34,
    34, 35, 35, 35, 36, 36, 36, 37, 37, 37, 38, 38, 63,
];

// LPS sub-range indexed by [state][(range >> 6) & 3]
pub const RANGE_TAB_LPS: [[u8; 4]; 64] = [
    [128, 176, 208, 240],
    [128, 167, 197, 227],
    [128, 158, 187, 216],
    [123, 150, 178, 205],
    [116, 142, 169, 195],
    [111, 135, 160, 185],
    [105, 128, 152, 175],
    [100, 122, 144, 166],
    [95, 116, 137, 158],
    [90, 110, 130, 150],
    [85, 104, 123, 142],
    [81, 99, 117, 135],
    [77, 94, 111, 128],
    [73, 89, 105, 122],
    [69, 85, 100, 116],
    [66, 80, 95, 110],
    [62, 76, 90, 104],
    [59, 72, 86, 99],
    [56, 69, 81, 94],
    [53, 65, 77, 89],
    [51, 62, 73, 85],
    [48, 59, 69, 80],
    [46, 56, 66, 76],
    [43, 53, 63, 72],
    [41, 50, 59, 69],
    [39, 48, 56, 65],
    [37, 45, 54, 62],
    [35, 43, 51, 59],
    [33, 41, 48, 56],
    [32, 39, 46, 53],
    [30, 37, 43, 50],
    [29, 35, 41, 48],
    [27, 33, 39, 45],
    [26, 31, 37, 43],
    [24, 30, 35, 41],
    [23, 28, 33, 39],
    [22, 27, 32, 37],
    [21, 26, 30, 35],
    [20, 24, 29, 33],
    [19, 23, 27, 31],
    [18, 22, 26, 30],
    [17, 21, 25, 28],
    [16, 20, 23, 27],
    [15, 19, 22, 25],
    [14, 18, 21, 24],
    [14, 17, 20, 23],
    [13, 16, 19, 22],
    [12, 15, 18, 21],
    [12, 14, 17, 20],
    [11, 14, 16, 19],
    [11, 13, 15, 18],
    [10, 12, 15, 17],
    [10, 12, 14, 16],
    [9, 11, 13, 15],
    [9, 11, 12, 14],
    [8, 10, 12, 14],
    [8, 9, 11, 13],
    [7, 9, 11, 12],
    [7, 9, 10, 12],
    [7, 8, 10, 11],
    [6, 8, 9, 11],
    [6, 7, 9, 10],
    [6, 7, 8, 9],
    [2, 2, 2, 2],
];
