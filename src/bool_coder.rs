use super::binary_writer::BinaryWriter;
use super::bool_decoder::{RANGE_TAB_LPS, TRANS_IDX_LPS, TRANS_IDX_MPS};
use super::cabac_contexts::CABAC_MAX_BIN;
use super::context::ContextModel;
use debug_print::*;

pub struct BoolCoder {
    writer: BinaryWriter,
    cabac_ivl_curr_range: u32,
    cabac_ivl_low: u32,
    cabac_first_bit_flag: bool,
    cabac_bits_outstanding: usize,
}

impl BoolCoder {
    pub fn new() -> BoolCoder {
        BoolCoder {
            writer: BinaryWriter::new(),
            cabac_ivl_curr_range: 510,
            cabac_ivl_low: 0,
            cabac_first_bit_flag: true,
            cabac_bits_outstanding: 0,
        }
    }

    /// Writes raw slice header bits followed by `byte_alignment()`.
    /// Must precede the first arithmetic coded bin.
    pub fn write_header(&mut self, bits: u32, n_bits: usize) {
        debug_assert!(self.cabac_first_bit_flag && self.cabac_bits_outstanding == 0);
        self.writer.write_bits(bits, n_bits);
        self.writer.write_bit(true);
        self.writer.byte_align();
    }

    #[inline(always)]
    fn renorm_cabac_encode_engine(&mut self) {
        while self.cabac_ivl_curr_range < 256 {
            if self.cabac_ivl_low < 256 {
                self.put_bit(false);
            } else if self.cabac_ivl_low >= 512 {
                self.cabac_ivl_low -= 512;
                self.put_bit(true);
            } else {
                self.cabac_ivl_low -= 256;
                self.cabac_bits_outstanding += 1;
            }
            self.cabac_ivl_curr_range <<= 1;
            self.cabac_ivl_low <<= 1;
        }
    }

    #[inline(always)]
    fn put_bit(&mut self, bin: bool) {
        if !self.cabac_first_bit_flag {
            self.writer.write_bit(bin);
        }
        self.cabac_first_bit_flag = false;
        while self.cabac_bits_outstanding > 0 {
            self.writer.write_bit(!bin);
            self.cabac_bits_outstanding -= 1;
        }
    }

    pub fn encode_decision(&mut self, model: &mut ContextModel, bin: bool) {
        let q_range_idx = ((self.cabac_ivl_curr_range >> 6) & 3) as usize;
        let lps_range = RANGE_TAB_LPS[model.state as usize][q_range_idx] as u32;
        self.cabac_ivl_curr_range -= lps_range;
        if bin != model.mps {
            self.cabac_ivl_low += self.cabac_ivl_curr_range;
            self.cabac_ivl_curr_range = lps_range;
            if model.state == 0 {
                model.mps = !model.mps;
            }
            model.state = TRANS_IDX_LPS[model.state as usize];
        } else {
            model.state = TRANS_IDX_MPS[model.state as usize];
        }
        self.renorm_cabac_encode_engine();
    }

    pub fn encode_bypass(&mut self, bin: bool) {
        self.cabac_ivl_low <<= 1;
        if bin {
            self.cabac_ivl_low += self.cabac_ivl_curr_range;
        }
        if self.cabac_ivl_low >= 1024 {
            self.put_bit(true);
            self.cabac_ivl_low -= 1024;
        } else if self.cabac_ivl_low < 512 {
            self.put_bit(false);
        } else {
            self.cabac_ivl_low -= 512;
            self.cabac_bits_outstanding += 1;
        }
    }

    pub fn encode_bypass_bits(&mut self, value: u32, n_bits: usize) {
        for i in (0..n_bits).rev() {
            self.encode_bypass((value >> i) & 1 > 0);
        }
    }

    /// k-th order Exp-Golomb in bypass bins, prefix capped like the decoder.
    pub fn encode_kth_order_exp_golomb(&mut self, symbol_val: u32, k: usize) {
        let mut abs_v = symbol_val as u64;
        let mut k = k;
        while k < CABAC_MAX_BIN && abs_v >= 1 << k {
            self.encode_bypass(true);
            abs_v -= 1 << k;
            k += 1;
        }
        if k < CABAC_MAX_BIN {
            self.encode_bypass(false);
        }
        while k > 0 {
            k -= 1;
            self.encode_bypass((abs_v >> k) & 1 == 1);
        }
    }

    pub fn encode_terminate(&mut self, bin: bool) {
        self.cabac_ivl_curr_range -= 2;
        if bin {
            self.cabac_ivl_low += self.cabac_ivl_curr_range;
            self.encode_flush();
        } else {
            self.renorm_cabac_encode_engine();
        }
    }

    fn encode_flush(&mut self) {
        self.cabac_ivl_curr_range = 2;
        self.renorm_cabac_encode_engine();
        let bin = (self.cabac_ivl_low >> 9) & 1 > 0;
        self.put_bit(bin);
        // the final 1 doubles as the stop or alignment bit
        self.writer.write_bits(((self.cabac_ivl_low >> 7) & 3) | 1, 2);
    }

    pub fn finish_substream(&mut self) {
        self.writer.byte_align();
        debug_eprintln!("bool coder: substream ends at byte {}", self.writer.num_bits() / 8);
        self.cabac_ivl_curr_range = 510;
        self.cabac_ivl_low = 0;
        self.cabac_first_bit_flag = true;
        self.cabac_bits_outstanding = 0;
    }

    pub fn num_bits(&self) -> usize {
        self.writer.num_bits()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

impl Default for BoolCoder {
    fn default() -> Self {
        Self::new()
    }
}
