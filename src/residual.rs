use super::bool_decoder::BinDecoder;
use super::cabac_contexts::*;
use super::common::*;
use super::scan::*;
use super::syntax::SyntaxDecoder;

const CTX_IDX_MAP: [usize; 16] = [0, 1, 4, 5, 2, 3, 4, 5, 6, 6, 8, 8, 7, 7, 8, 8];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ResidualCodingParams {
    pub log2_trafo_size: usize,
    pub c_idx: usize,
    pub scan_idx: ScanType,
    pub transform_skip_enabled_flag: bool,
    pub cu_transquant_bypass_flag: bool,
    pub sign_data_hiding_enabled_flag: bool,
}

/// Coefficient levels of one transform block in raster order, before scaling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResidualBlock {
    pub log2_trafo_size: usize,
    pub transform_skip_flag: bool,
    pub coeffs: Vec<i32>,
}

impl ResidualBlock {
    pub fn coeff(&self, x: usize, y: usize) -> i32 {
        self.coeffs[(y << self.log2_trafo_size) + x]
    }
}

#[inline(always)]
pub fn last_sig_coeff_ctx(c_idx: usize, log2_size: usize) -> (usize, usize) {
    if c_idx == 0 {
        (3 * (log2_size - 2) + ((log2_size - 1) >> 2), (log2_size + 1) >> 2)
    } else {
        (15, log2_size - 2)
    }
}

pub fn sig_coeff_ctx_inc(
    c_idx: usize,
    x_c: usize,
    y_c: usize,
    log2_trafo_size: usize,
    scan_idx: ScanType,
    prev_sig: usize,
) -> usize {
    let sig_ctx = if x_c + y_c == 0 {
        0
    } else if log2_trafo_size == 2 {
        CTX_IDX_MAP[(y_c << 2) + x_c]
    } else {
        let mut sig_ctx = match prev_sig {
            0 => {
                let off = (x_c & 3) + (y_c & 3);
                if off == 0 {
                    2
                } else if off <= 2 {
                    1
                } else {
                    0
                }
            }
            1 => 2 - (y_c & 3).min(2),
            2 => 2 - (x_c & 3).min(2),
            _ => 2,
        };
        if c_idx == 0 && (x_c >> 2 > 0 || y_c >> 2 > 0) {
            sig_ctx += 3;
        }
        if log2_trafo_size == 3 {
            sig_ctx += if scan_idx == ScanType::SCAN_DIAG { 9 } else { 15 };
        } else {
            sig_ctx += if c_idx > 0 { 12 } else { 21 };
        }
        sig_ctx
    };
    if c_idx == 0 {
        sig_ctx
    } else {
        sig_ctx + 27
    }
}

impl<'a, D: BinDecoder + ?Sized> SyntaxDecoder<'a, D> {
    fn last_significant_coeff_prefix(
        &mut self,
        element: SyntaxElement,
        c_idx: usize,
        log2_size: usize,
    ) -> u32 {
        let max = (log2_size << 1) - 1;
        let (ctx_offset, ctx_shift) = last_sig_coeff_ctx(c_idx, log2_size);
        let offset = element.offset() + ctx_offset;
        let mut i = 0;
        while i < max && self.decode_bin(offset + (i >> ctx_shift)) {
            i += 1;
        }
        i as u32
    }

    pub fn last_significant_coeff_x_prefix(&mut self, c_idx: usize, log2_size: usize) -> u32 {
        self.last_significant_coeff_prefix(
            SyntaxElement::LastSignificantCoeffXPrefix,
            c_idx,
            log2_size,
        )
    }

    pub fn last_significant_coeff_y_prefix(&mut self, c_idx: usize, log2_size: usize) -> u32 {
        self.last_significant_coeff_prefix(
            SyntaxElement::LastSignificantCoeffYPrefix,
            c_idx,
            log2_size,
        )
    }

    /// Fixed-length suffix of a prefix greater than 3.
    pub fn last_significant_coeff_suffix(&mut self, prefix: u32) -> u32 {
        let length = ((prefix >> 1) as usize).saturating_sub(1).max(1);
        self.decode_bypass_bits(length)
    }

    pub fn significant_coeff_group_flag(&mut self, c_idx: usize, ctx_cg: usize) -> bool {
        let inc = ctx_cg.min(1) + if c_idx > 0 { 2 } else { 0 };
        self.decode_bin(SyntaxElement::SignificantCoeffGroupFlag.offset() + inc)
    }

    pub fn significant_coeff_flag(
        &mut self,
        c_idx: usize,
        x_c: usize,
        y_c: usize,
        log2_trafo_size: usize,
        scan_idx: ScanType,
        prev_sig: usize,
    ) -> bool {
        let inc = sig_coeff_ctx_inc(c_idx, x_c, y_c, log2_trafo_size, scan_idx, prev_sig);
        self.decode_bin(SyntaxElement::SignificantCoeffFlag.offset() + inc)
    }

    pub fn coeff_abs_level_greater1_flag(&mut self, c_idx: usize, inc: usize) -> bool {
        let inc = if c_idx > 0 { inc + 16 } else { inc };
        self.decode_bin(SyntaxElement::CoeffAbsLevelGreater1Flag.offset() + inc)
    }

    pub fn coeff_abs_level_greater2_flag(&mut self, c_idx: usize, inc: usize) -> bool {
        let inc = if c_idx > 0 { inc + 4 } else { inc };
        self.decode_bin(SyntaxElement::CoeffAbsLevelGreater2Flag.offset() + inc)
    }

    /// Rice/Exp-Golomb coded remainder, saturated to `u32`.
    pub fn coeff_abs_level_remaining(&mut self, rc_rice_param: usize) -> u32 {
        let mut prefix = 0;
        while prefix < CABAC_MAX_BIN && self.decode_bypass() {
            prefix += 1;
        }
        if prefix == CABAC_MAX_BIN {
            self.report_max_bin(SyntaxElement::CoeffAbsLevelRemaining, prefix);
        }
        let value = if prefix < 3 {
            let suffix = self.decode_bypass_bits(rc_rice_param) as u64;
            ((prefix as u64) << rc_rice_param) + suffix
        } else {
            let prefix_minus3 = prefix - 3;
            let mut suffix = 0u64;
            for _ in 0..prefix_minus3 + rc_rice_param {
                suffix = (suffix << 1) | self.decode_bypass() as u64;
            }
            (((1u64 << prefix_minus3) + 2) << rc_rice_param) + suffix
        };
        value.min(u32::MAX as u64) as u32
    }

    /// `nb` sign bits, first coefficient in the most significant bit.
    pub fn coeff_sign_flag(&mut self, nb: usize) -> u32 {
        self.decode_bypass_bits(nb)
    }

    pub fn residual_coding(&mut self, params: &ResidualCodingParams) -> ResidualBlock {
        let log2_trafo_size = params.log2_trafo_size;
        let c_idx = params.c_idx;
        let scan_idx = params.scan_idx;
        let mut coeffs = vec![0i32; 1 << (log2_trafo_size << 1)];

        let transform_skip_flag = params.transform_skip_enabled_flag
            && !params.cu_transquant_bypass_flag
            && log2_trafo_size == 2
            && self.transform_skip_flag(c_idx);

        let mut last_x = self.last_significant_coeff_x_prefix(c_idx, log2_trafo_size);
        let mut last_y = self.last_significant_coeff_y_prefix(c_idx, log2_trafo_size);
        if last_x > 3 {
            let suffix = self.last_significant_coeff_suffix(last_x);
            last_x = (1 << ((last_x >> 1) - 1)) * (2 + (last_x & 1)) + suffix;
        }
        if last_y > 3 {
            let suffix = self.last_significant_coeff_suffix(last_y);
            last_y = (1 << ((last_y >> 1) - 1)) * (2 + (last_y & 1)) + suffix;
        }
        if scan_idx == ScanType::SCAN_VERT {
            std::mem::swap(&mut last_x, &mut last_y);
        }
        let (last_x, last_y) = (last_x as usize, last_y as usize);
        let trafo_size = 1 << log2_trafo_size;
        if last_x >= trafo_size || last_y >= trafo_size {
            // only reachable on corrupt data; keep the scan tables in bounds
            return ResidualBlock {
                log2_trafo_size,
                transform_skip_flag,
                coeffs,
            };
        }

        let log2_cg_size = log2_trafo_size - 2;
        let cg_max = (1 << log2_cg_size) - 1;
        let cg_scan = scan_order(scan_idx, log2_cg_size);
        let sub_scan = scan_order(scan_idx, 2);
        let (x_cg_last_sig, y_cg_last_sig) = (last_x >> 2, last_y >> 2);
        let num_coeff = (scan_pos(scan_idx, log2_cg_size, x_cg_last_sig, y_cg_last_sig) << 4)
            + scan_pos(scan_idx, 2, last_x & 3, last_y & 3)
            + 1;
        let num_last_subset = (num_coeff - 1) >> 4;

        // [x_cg][y_cg]
        let mut coded_sub_block_flag = [[false; 8]; 8];
        let mut greater1_ctx = 1;

        for i in (0..=num_last_subset).rev() {
            let (x_cg, y_cg) = cg_scan[i];
            let offset = i << 4;
            let mut implicit_non_zero_coeff = false;

            if i < num_last_subset && i > 0 {
                let mut ctx_cg = 0;
                if x_cg < cg_max {
                    ctx_cg += coded_sub_block_flag[x_cg + 1][y_cg] as usize;
                }
                if y_cg < cg_max {
                    ctx_cg += coded_sub_block_flag[x_cg][y_cg + 1] as usize;
                }
                coded_sub_block_flag[x_cg][y_cg] = self.significant_coeff_group_flag(c_idx, ctx_cg);
                implicit_non_zero_coeff = true;
            } else {
                coded_sub_block_flag[x_cg][y_cg] = (x_cg == x_cg_last_sig && y_cg == y_cg_last_sig)
                    || (x_cg == 0 && y_cg == 0);
            }
            let coded = coded_sub_block_flag[x_cg][y_cg];

            let mut sig_idx = [0usize; 16];
            let mut nb_sig = 0;
            let n_count = if i == num_last_subset {
                sig_idx[0] = num_coeff - offset - 1;
                nb_sig = 1;
                sig_idx[0]
            } else {
                16
            };

            let mut prev_sig = 0;
            if x_cg < cg_max {
                prev_sig = coded_sub_block_flag[x_cg + 1][y_cg] as usize;
            }
            if y_cg < cg_max {
                prev_sig += (coded_sub_block_flag[x_cg][y_cg + 1] as usize) << 1;
            }

            for n in (0..n_count).rev() {
                let (x_off, y_off) = sub_scan[n];
                let (x_c, y_c) = ((x_cg << 2) + x_off, (y_cg << 2) + y_off);
                if coded && (n > 0 || !implicit_non_zero_coeff) {
                    if self.significant_coeff_flag(
                        c_idx,
                        x_c,
                        y_c,
                        log2_trafo_size,
                        scan_idx,
                        prev_sig,
                    ) {
                        sig_idx[nb_sig] = n;
                        nb_sig += 1;
                        implicit_non_zero_coeff = false;
                    }
                } else if n == 0 && implicit_non_zero_coeff && coded {
                    sig_idx[nb_sig] = n;
                    nb_sig += 1;
                }
            }

            if nb_sig == 0 {
                continue;
            }

            let mut ctx_set = if i > 0 && c_idx == 0 { 2 } else { 0 };
            if i != num_last_subset && greater1_ctx == 0 {
                ctx_set += 1;
            }
            greater1_ctx = 1;

            let mut base_level = [1u32; 16];
            let mut first_greater1_idx = None;
            for &n_idx in sig_idx.iter().take(nb_sig.min(8)) {
                let inc = (ctx_set << 2) + greater1_ctx;
                let greater1 = self.coeff_abs_level_greater1_flag(c_idx, inc);
                if greater1 {
                    base_level[n_idx] = 2;
                    greater1_ctx = 0;
                    if first_greater1_idx.is_none() {
                        first_greater1_idx = Some(n_idx);
                    }
                } else if greater1_ctx > 0 && greater1_ctx < 3 {
                    greater1_ctx += 1;
                }
            }

            let last_nz_pos_in_cg = sig_idx[0];
            let first_nz_pos_in_cg = sig_idx[nb_sig - 1];
            let sign_hidden = params.sign_data_hiding_enabled_flag
                && last_nz_pos_in_cg - first_nz_pos_in_cg >= 4
                && !params.cu_transquant_bypass_flag;

            if let Some(n_idx) = first_greater1_idx {
                base_level[n_idx] += self.coeff_abs_level_greater2_flag(c_idx, ctx_set) as u32;
            }

            let nb_signs = if sign_hidden { nb_sig - 1 } else { nb_sig };
            let mut coeff_sign_flag = (self.coeff_sign_flag(nb_signs) << (16 - nb_signs)) & 0xffff;

            let mut c_rice_param = 0;
            let mut sum_abs = 0i64;
            for (m, &n) in sig_idx.iter().take(nb_sig).enumerate() {
                let (x_off, y_off) = sub_scan[n];
                let (x_c, y_c) = ((x_cg << 2) + x_off, (y_cg << 2) + y_off);
                let mut level = base_level[n] as i64;
                let escape_level = if m >= 8 {
                    1
                } else if Some(n) == first_greater1_idx {
                    3
                } else {
                    2
                };
                if level == escape_level {
                    level += self.coeff_abs_level_remaining(c_rice_param) as i64;
                    if level > (3 << c_rice_param) {
                        c_rice_param = (c_rice_param + 1).min(4);
                    }
                }
                if sign_hidden {
                    sum_abs += level;
                    if n == first_nz_pos_in_cg && sum_abs & 1 == 1 {
                        level = -level;
                    }
                }
                if coeff_sign_flag >> 15 > 0 {
                    level = -level;
                }
                coeff_sign_flag = (coeff_sign_flag << 1) & 0xffff;
                coeffs[y_c * trafo_size + x_c] = level.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            }
        }

        ResidualBlock {
            log2_trafo_size,
            transform_skip_flag,
            coeffs,
        }
    }
}
