use super::bool_decoder::BinDecoder;
use super::cabac_contexts::*;
use super::common::*;
use super::context::ContextSet;
use super::diagnostics::*;

/// Coding tree information around the current block, indexed in minimum
/// coding block units.
pub struct CodingTreeNeighbours<'a> {
    pub ctb_left_flag: bool,
    pub ctb_up_flag: bool,
    pub log2_ctb_size: usize,
    pub log2_min_cb_size: usize,
    pub min_cb_width: usize,
    pub ct_depth: &'a [u8],
    pub skip_flag: &'a [u8],
}

impl<'a> CodingTreeNeighbours<'a> {
    fn left<T: Copy>(&self, map: &[T], x0: usize, y0: usize) -> Option<T> {
        let x0b = x0 & ((1 << self.log2_ctb_size) - 1);
        if !self.ctb_left_flag && x0b == 0 {
            return None;
        }
        let x_cb = (x0 >> self.log2_min_cb_size).checked_sub(1)?;
        let y_cb = y0 >> self.log2_min_cb_size;
        map.get(y_cb * self.min_cb_width + x_cb).copied()
    }

    fn up<T: Copy>(&self, map: &[T], x0: usize, y0: usize) -> Option<T> {
        let y0b = y0 & ((1 << self.log2_ctb_size) - 1);
        if !self.ctb_up_flag && y0b == 0 {
            return None;
        }
        let x_cb = x0 >> self.log2_min_cb_size;
        let y_cb = (y0 >> self.log2_min_cb_size).checked_sub(1)?;
        map.get(y_cb * self.min_cb_width + x_cb).copied()
    }

    pub fn depth_left(&self, x0: usize, y0: usize) -> Option<u8> {
        self.left(self.ct_depth, x0, y0)
    }

    pub fn depth_up(&self, x0: usize, y0: usize) -> Option<u8> {
        self.up(self.ct_depth, x0, y0)
    }

    pub fn skip_left(&self, x0: usize, y0: usize) -> Option<bool> {
        self.left(self.skip_flag, x0, y0).map(|v| v != 0)
    }

    pub fn skip_up(&self, x0: usize, y0: usize) -> Option<bool> {
        self.up(self.skip_flag, x0, y0).map(|v| v != 0)
    }
}

/// Unavailable neighbours count as depth 0.
#[inline(always)]
pub fn split_cu_flag_ctx_inc(depth_left: Option<u8>, depth_up: Option<u8>, ct_depth: u8) -> usize {
    (depth_left.unwrap_or(0) > ct_depth) as usize + (depth_up.unwrap_or(0) > ct_depth) as usize
}

#[inline(always)]
pub fn skip_flag_ctx_inc(skip_left: Option<bool>, skip_up: Option<bool>) -> usize {
    skip_left.unwrap_or(false) as usize + skip_up.unwrap_or(false) as usize
}

pub struct SyntaxDecoder<'a, D: BinDecoder + ?Sized> {
    pub(crate) engine: &'a mut D,
    pub(crate) contexts: &'a mut ContextSet,
    pub(crate) sink: &'a mut dyn DiagnosticSink,
}

impl<'a, D: BinDecoder + ?Sized> SyntaxDecoder<'a, D> {
    pub fn new(
        engine: &'a mut D,
        contexts: &'a mut ContextSet,
        sink: &'a mut dyn DiagnosticSink,
    ) -> SyntaxDecoder<'a, D> {
        SyntaxDecoder {
            engine,
            contexts,
            sink,
        }
    }

    #[inline(always)]
    pub(crate) fn decode_bin(&mut self, ctx_idx: usize) -> bool {
        self.engine.decode_decision(&mut self.contexts[ctx_idx])
    }

    #[inline(always)]
    pub(crate) fn decode_bypass(&mut self) -> bool {
        self.engine.decode_bypass()
    }

    #[inline(always)]
    pub(crate) fn decode_bypass_bits(&mut self, n_bits: usize) -> u32 {
        let mut value = 0;
        for _ in 0..n_bits {
            value = (value << 1) | self.engine.decode_bypass() as u32;
        }
        value
    }

    pub(crate) fn report_max_bin(&mut self, element: SyntaxElement, bins: usize) {
        self.sink.report(Diagnostic::MaxBinReached { element, bins });
    }

    /// Unary bypass prefix of an Exp-Golomb code starting at order `k`,
    /// returning the accumulated prefix value and the final order.
    fn exp_golomb_prefix(&mut self, element: SyntaxElement, k: usize) -> (u64, usize) {
        let mut value = 0u64;
        let mut k = k;
        while k < CABAC_MAX_BIN && self.decode_bypass() {
            value += 1 << k;
            k += 1;
        }
        if k == CABAC_MAX_BIN {
            self.report_max_bin(element, k);
        }
        (value, k)
    }

    fn exp_golomb_suffix(&mut self, mut value: u64, k: usize) -> u64 {
        let mut k = k;
        while k > 0 {
            k -= 1;
            value += (self.decode_bypass() as u64) << k;
        }
        value
    }

    pub fn sao_merge_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::SaoMergeFlag.offset())
    }

    pub fn sao_type_idx(&mut self) -> SaoType {
        if !self.decode_bin(SyntaxElement::SaoTypeIdx.offset()) {
            SaoType::SAO_NOT_APPLIED
        } else if !self.decode_bypass() {
            SaoType::SAO_BAND
        } else {
            SaoType::SAO_EDGE
        }
    }

    pub fn sao_band_position(&mut self) -> u32 {
        self.decode_bypass_bits(5)
    }

    pub fn sao_offset_abs(&mut self, bit_depth: usize) -> u32 {
        let c_max = (1 << bit_depth.min(10).saturating_sub(5)) - 1;
        let mut i = 0;
        while i < c_max && self.decode_bypass() {
            i += 1;
        }
        i
    }

    pub fn sao_offset_sign(&mut self) -> bool {
        self.decode_bypass()
    }

    pub fn sao_eo_class(&mut self) -> u32 {
        self.decode_bypass_bits(2)
    }

    pub fn end_of_slice_flag(&mut self) -> bool {
        self.engine.decode_terminate()
    }

    pub fn end_of_subset_one_bit(&mut self) -> bool {
        self.engine.decode_terminate()
    }

    pub fn cu_transquant_bypass_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::CuTransquantBypassFlag.offset())
    }

    pub fn skip_flag(&mut self, nb: &CodingTreeNeighbours, x0: usize, y0: usize) -> bool {
        let inc = skip_flag_ctx_inc(nb.skip_left(x0, y0), nb.skip_up(x0, y0));
        self.decode_bin(SyntaxElement::SkipFlag.offset() + inc)
    }

    pub fn split_coding_unit_flag(
        &mut self,
        nb: &CodingTreeNeighbours,
        ct_depth: u8,
        x0: usize,
        y0: usize,
    ) -> bool {
        let inc = split_cu_flag_ctx_inc(nb.depth_left(x0, y0), nb.depth_up(x0, y0), ct_depth);
        self.decode_bin(SyntaxElement::SplitCodingUnitFlag.offset() + inc)
    }

    /// Saturates at `u32::MAX` on a capped suffix.
    pub fn cu_qp_delta_abs(&mut self) -> u32 {
        let offset = SyntaxElement::CuQpDelta.offset();
        let mut prefix_val = 0;
        let mut inc = 0;
        while prefix_val < 5 && self.decode_bin(offset + inc) {
            prefix_val += 1;
            inc = 1;
        }
        let mut value = prefix_val as u64;
        if prefix_val >= 5 {
            let (suffix_val, k) = self.exp_golomb_prefix(SyntaxElement::CuQpDelta, 0);
            value += self.exp_golomb_suffix(suffix_val, k);
        }
        value.min(u32::MAX as u64) as u32
    }

    pub fn cu_qp_delta_sign_flag(&mut self) -> bool {
        self.decode_bypass()
    }

    /// `true` for intra.
    pub fn pred_mode_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::PredMode.offset())
    }

    pub fn part_mode(
        &mut self,
        log2_cb_size: usize,
        log2_min_cb_size: usize,
        pred_mode: PredMode,
        amp_enabled_flag: bool,
    ) -> PartMode {
        let offset = SyntaxElement::PartMode.offset();
        if self.decode_bin(offset) {
            return PartMode::PART_2Nx2N;
        }
        if log2_cb_size == log2_min_cb_size {
            if pred_mode == PredMode::MODE_INTRA {
                return PartMode::PART_NxN;
            }
            if self.decode_bin(offset + 1) {
                return PartMode::PART_2NxN;
            }
            if log2_cb_size == 3 {
                return PartMode::PART_Nx2N;
            }
            if self.decode_bin(offset + 2) {
                return PartMode::PART_Nx2N;
            }
            return PartMode::PART_NxN;
        }

        if !amp_enabled_flag {
            if self.decode_bin(offset + 1) {
                return PartMode::PART_2NxN;
            }
            return PartMode::PART_Nx2N;
        }

        if self.decode_bin(offset + 1) {
            if self.decode_bin(offset + 3) {
                PartMode::PART_2NxN
            } else if self.decode_bypass() {
                PartMode::PART_2NxnD
            } else {
                PartMode::PART_2NxnU
            }
        } else if self.decode_bin(offset + 3) {
            PartMode::PART_Nx2N
        } else if self.decode_bypass() {
            PartMode::PART_nRx2N
        } else {
            PartMode::PART_nLx2N
        }
    }

    pub fn pcm_flag(&mut self) -> bool {
        self.engine.decode_terminate()
    }

    pub fn prev_intra_luma_pred_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::PrevIntraLumaPredFlag.offset())
    }

    pub fn mpm_idx(&mut self) -> u32 {
        let mut i = 0;
        while i < 2 && self.decode_bypass() {
            i += 1;
        }
        i
    }

    pub fn rem_intra_luma_pred_mode(&mut self) -> u32 {
        self.decode_bypass_bits(5)
    }

    /// 4 means derived from the luma mode.
    pub fn intra_chroma_pred_mode(&mut self) -> u32 {
        if !self.decode_bin(SyntaxElement::IntraChromaPredMode.offset()) {
            return 4;
        }
        self.decode_bypass_bits(2)
    }

    pub fn merge_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::MergeFlag.offset())
    }

    pub fn merge_idx(&mut self, max_num_merge_cand: u32) -> u32 {
        let mut i = self.decode_bin(SyntaxElement::MergeIdx.offset()) as u32;
        if i != 0 {
            while i + 1 < max_num_merge_cand && self.decode_bypass() {
                i += 1;
            }
        }
        i
    }

    pub fn inter_pred_idc(&mut self, n_pb_w: usize, n_pb_h: usize, ct_depth: usize) -> InterPredIdc {
        let offset = SyntaxElement::InterPredIdc.offset();
        if n_pb_w + n_pb_h != 12 && self.decode_bin(offset + ct_depth) {
            return InterPredIdc::PRED_BI;
        }
        if self.decode_bin(offset + 4) {
            InterPredIdc::PRED_L1
        } else {
            InterPredIdc::PRED_L0
        }
    }

    /// Both lists share the `ref_idx_l0` contexts.
    pub fn ref_idx_lx(&mut self, num_ref_idx_active: u32) -> u32 {
        let offset = SyntaxElement::RefIdxL0.offset();
        let max = num_ref_idx_active.saturating_sub(1);
        let max_ctx = max.min(2);
        let mut i = 0;
        while i < max_ctx && self.decode_bin(offset + i as usize) {
            i += 1;
        }
        if i == 2 {
            while i < max && self.decode_bypass() {
                i += 1;
            }
        }
        i
    }

    pub fn mvp_lx_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::MvpLxFlag.offset())
    }

    pub fn no_residual_syntax_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::NoResidualDataFlag.offset())
    }

    pub fn abs_mvd_greater0_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::AbsMvdGreater0Flag.offset())
    }

    pub fn abs_mvd_greater1_flag(&mut self) -> bool {
        self.decode_bin(SyntaxElement::AbsMvdGreater1Flag.offset() + 1)
    }

    /// Signed `abs_mvd_minus2 + 2`, saturated to the `i32` range.
    pub fn mvd(&mut self) -> i32 {
        let (prefix, k) = self.exp_golomb_prefix(SyntaxElement::AbsMvdMinus2, 1);
        let abs_mvd = self.exp_golomb_suffix(prefix + 2, k);
        let abs_mvd = abs_mvd.min(i32::MAX as u64) as i32;
        self.engine.decode_bypass_signed(-abs_mvd)
    }

    pub fn mvd_sign_flag(&mut self) -> i32 {
        self.engine.decode_bypass_signed(-1)
    }

    pub fn mvd_coding(&mut self) -> Mvd {
        let mut x = self.abs_mvd_greater0_flag() as u32;
        let mut y = self.abs_mvd_greater0_flag() as u32;
        if x > 0 {
            x += self.abs_mvd_greater1_flag() as u32;
        }
        if y > 0 {
            y += self.abs_mvd_greater1_flag() as u32;
        }
        Mvd {
            x: self.mvd_component(x),
            y: self.mvd_component(y),
        }
    }

    fn mvd_component(&mut self, greater_flags: u32) -> i32 {
        match greater_flags {
            2 => self.mvd(),
            1 => self.mvd_sign_flag(),
            _ => 0,
        }
    }

    pub fn split_transform_flag(&mut self, log2_trafo_size: usize) -> bool {
        self.decode_bin(SyntaxElement::SplitTransformFlag.offset() + 5 - log2_trafo_size)
    }

    pub fn cbf_cb_cr(&mut self, trafo_depth: usize) -> bool {
        self.decode_bin(SyntaxElement::CbfCbCr.offset() + trafo_depth)
    }

    pub fn cbf_luma(&mut self, trafo_depth: usize) -> bool {
        self.decode_bin(SyntaxElement::CbfLuma.offset() + (trafo_depth == 0) as usize)
    }

    pub fn transform_skip_flag(&mut self, c_idx: usize) -> bool {
        self.decode_bin(SyntaxElement::TransformSkipFlag.offset() + (c_idx != 0) as usize)
    }
}


#[cfg(test)]
mod tests {
    use super::super::bool_decoder::CabacEngine;
    use super::super::context::{ContextModel, InitType};
    use super::super::slice_header::SliceType;
    use super::script::*;
    use super::*;

    fn contexts(slice_type: SliceType) -> ContextSet {
        ContextSet::new(InitType::derive(slice_type, false), 30)
    }

    fn run<T>(
        slice_type: SliceType,
        bins: &[Bin],
        f: impl FnOnce(&mut SyntaxDecoder<CabacEngine>) -> T,
    ) -> (T, Vec<Diagnostic>) {
        let mut set = contexts(slice_type);
        let data = encode(&set, bins);
        let mut engine = CabacEngine::new(&data);
        engine.init_decoder();
        let mut diagnostics = vec![];
        let out = {
            let mut dec = SyntaxDecoder::new(&mut engine, &mut set, &mut diagnostics);
            let out = f(&mut dec);
            assert!(dec.end_of_slice_flag());
            out
        };
        assert!(!engine.is_overrun());
        (out, diagnostics)
    }

    /// Answers every bin with 1.
    struct AllOnes {
        bypass_reads: usize,
    }

    impl BinDecoder for AllOnes {
        fn decode_decision(&mut self, _model: &mut ContextModel) -> bool {
            true
        }

        fn decode_bypass(&mut self) -> bool {
            self.bypass_reads += 1;
            true
        }

        fn decode_terminate(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn sao_elements() {
        let mut bins = vec![
            Bin::Ctx(0, true),
            Bin::Ctx(1, true),
            Bin::Bypass(true),
            Bin::Ctx(1, true),
            Bin::Bypass(false),
            Bin::Ctx(1, false),
        ];
        bins.extend(bypass_bits(0b10110, 5));
        bins.extend(bypass_bits(0b1110, 4));
        bins.extend(bypass_bits(0b1111111, 7));
        bins.extend(bypass_bits(0b1111_1111_10, 10));
        bins.push(Bin::Bypass(true));
        bins.extend(bypass_bits(0b10, 2));
        let (values, diagnostics) = run(SliceType::I, &bins, |dec| {
            (
                dec.sao_merge_flag(),
                [dec.sao_type_idx(), dec.sao_type_idx(), dec.sao_type_idx()],
                dec.sao_band_position(),
                dec.sao_offset_abs(8),
                dec.sao_offset_abs(8),
                dec.sao_offset_abs(12),
                dec.sao_offset_sign(),
                dec.sao_eo_class(),
            )
        });
        assert_eq!(
            values,
            (
                true,
                [SaoType::SAO_EDGE, SaoType::SAO_BAND, SaoType::SAO_NOT_APPLIED],
                0b10110,
                3,
                7,
                9,
                true,
                2
            )
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn sao_offset_abs_tolerates_low_bit_depth() {
        let mut engine = AllOnes { bypass_reads: 0 };
        let mut set = contexts(SliceType::I);
        let mut diagnostics: Vec<Diagnostic> = vec![];
        let mut dec = SyntaxDecoder::new(&mut engine, &mut set, &mut diagnostics);
        assert_eq!(dec.sao_offset_abs(4), 0);
        assert_eq!(dec.sao_offset_abs(0), 0);
        assert_eq!(dec.sao_offset_abs(6), 1);
        drop(dec);
        assert_eq!(engine.bypass_reads, 1);
    }

    #[test]
    fn part_mode_tree() {
        use PartMode::*;
        use PredMode::*;
        let o = SyntaxElement::PartMode.offset();
        // (log2_cb_size, log2_min_cb_size, pred_mode, amp, bins, expected)
        let cases: Vec<(usize, usize, PredMode, bool, Vec<Bin>, PartMode)> = vec![
            (4, 3, MODE_INTER, true, vec![Bin::Ctx(o, true)], PART_2Nx2N),
            (3, 3, MODE_INTRA, false, vec![Bin::Ctx(o, false)], PART_NxN),
            (3, 3, MODE_INTER, false, vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, true)], PART_2NxN),
            (3, 3, MODE_INTER, false, vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, false)], PART_Nx2N),
            (
                4,
                4,
                MODE_INTER,
                false,
                vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, false), Bin::Ctx(o + 2, true)],
                PART_Nx2N,
            ),
            (
                4,
                4,
                MODE_INTER,
                false,
                vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, false), Bin::Ctx(o + 2, false)],
                PART_NxN,
            ),
            (5, 3, MODE_INTER, false, vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, true)], PART_2NxN),
            (5, 3, MODE_INTER, false, vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, false)], PART_Nx2N),
            (
                5,
                3,
                MODE_INTER,
                true,
                vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, true), Bin::Ctx(o + 3, true)],
                PART_2NxN,
            ),
            (
                5,
                3,
                MODE_INTER,
                true,
                vec![
                    Bin::Ctx(o, false),
                    Bin::Ctx(o + 1, true),
                    Bin::Ctx(o + 3, false),
                    Bin::Bypass(true),
                ],
                PART_2NxnD,
            ),
            (
                5,
                3,
                MODE_INTER,
                true,
                vec![
                    Bin::Ctx(o, false),
                    Bin::Ctx(o + 1, true),
                    Bin::Ctx(o + 3, false),
                    Bin::Bypass(false),
                ],
                PART_2NxnU,
            ),
            (
                5,
                3,
                MODE_INTER,
                true,
                vec![Bin::Ctx(o, false), Bin::Ctx(o + 1, false), Bin::Ctx(o + 3, true)],
                PART_Nx2N,
            ),
            (
                5,
                3,
                MODE_INTER,
                true,
                vec![
                    Bin::Ctx(o, false),
                    Bin::Ctx(o + 1, false),
                    Bin::Ctx(o + 3, false),
                    Bin::Bypass(true),
                ],
                PART_nRx2N,
            ),
            (
                5,
                3,
                MODE_INTER,
                true,
                vec![
                    Bin::Ctx(o, false),
                    Bin::Ctx(o + 1, false),
                    Bin::Ctx(o + 3, false),
                    Bin::Bypass(false),
                ],
                PART_nLx2N,
            ),
        ];
        let bins: Vec<Bin> = cases.iter().flat_map(|c| c.4.clone()).collect();
        let (decoded, _) = run(SliceType::B, &bins, |dec| {
            cases
                .iter()
                .map(|&(log2_cb, log2_min, pred_mode, amp, _, _)| {
                    dec.part_mode(log2_cb, log2_min, pred_mode, amp)
                })
                .collect::<Vec<_>>()
        });
        let expected: Vec<PartMode> = cases.iter().map(|c| c.5).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn cu_qp_delta_prefix_and_suffix() {
        let o = SyntaxElement::CuQpDelta.offset();
        let mut bins = vec![
            Bin::Ctx(o, true),
            Bin::Ctx(o + 1, true),
            Bin::Ctx(o + 1, true),
            Bin::Ctx(o + 1, false),
            Bin::Bypass(true),
            Bin::Ctx(o, false),
            Bin::Ctx(o, true),
        ];
        bins.extend((0..4).map(|_| Bin::Ctx(o + 1, true)));
        bins.extend(exp_golomb(6, 0));
        let (values, diagnostics) = run(SliceType::P, &bins, |dec| {
            (
                dec.cu_qp_delta_abs(),
                dec.cu_qp_delta_sign_flag(),
                dec.cu_qp_delta_abs(),
                dec.cu_qp_delta_abs(),
            )
        });
        assert_eq!(values, (3, true, 0, 11));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn intra_prediction_modes() {
        let mut bins = vec![Bin::Ctx(SyntaxElement::PrevIntraLumaPredFlag.offset(), true)];
        bins.extend(bypass_bits(0b11, 2));
        bins.extend(bypass_bits(0b10, 2));
        bins.push(Bin::Bypass(false));
        bins.extend(bypass_bits(0b10011, 5));
        let chroma = SyntaxElement::IntraChromaPredMode.offset();
        bins.push(Bin::Ctx(chroma, false));
        bins.push(Bin::Ctx(chroma, true));
        bins.extend(bypass_bits(0b01, 2));
        let (values, _) = run(SliceType::I, &bins, |dec| {
            (
                dec.prev_intra_luma_pred_flag(),
                [dec.mpm_idx(), dec.mpm_idx(), dec.mpm_idx()],
                dec.rem_intra_luma_pred_mode(),
                dec.intra_chroma_pred_mode(),
                dec.intra_chroma_pred_mode(),
            )
        });
        assert_eq!(values, (true, [2, 1, 0], 0b10011, 4, 1));
    }

    #[test]
    fn prediction_unit_elements() {
        let merge_idx = SyntaxElement::MergeIdx.offset();
        let ipi = SyntaxElement::InterPredIdc.offset();
        let ref_idx = SyntaxElement::RefIdxL0.offset();
        let bins = vec![
            Bin::Ctx(SyntaxElement::MergeFlag.offset(), true),
            // merge_idx 3 of 5
            Bin::Ctx(merge_idx, true),
            Bin::Bypass(true),
            Bin::Bypass(true),
            Bin::Bypass(false),
            // merge_idx 4 of 5, no terminating bin
            Bin::Ctx(merge_idx, true),
            Bin::Bypass(true),
            Bin::Bypass(true),
            Bin::Bypass(true),
            Bin::Ctx(merge_idx, false),
            // 8x4 block
            Bin::Ctx(ipi + 4, true),
            // 16x16 at depth 1
            Bin::Ctx(ipi + 1, true),
            Bin::Ctx(ipi + 1, false),
            Bin::Ctx(ipi + 4, false),
            // ref_idx 3 of 4
            Bin::Ctx(ref_idx, true),
            Bin::Ctx(ref_idx + 1, true),
            Bin::Bypass(true),
            // ref_idx 2 of 4
            Bin::Ctx(ref_idx, true),
            Bin::Ctx(ref_idx + 1, true),
            Bin::Bypass(false),
            // ref_idx 1 of 2
            Bin::Ctx(ref_idx, true),
            Bin::Ctx(SyntaxElement::MvpLxFlag.offset(), true),
            Bin::Ctx(SyntaxElement::NoResidualDataFlag.offset(), false),
        ];
        let (values, _) = run(SliceType::B, &bins, |dec| {
            (
                dec.merge_flag(),
                [dec.merge_idx(5), dec.merge_idx(5), dec.merge_idx(5)],
                [
                    dec.inter_pred_idc(8, 4, 0),
                    dec.inter_pred_idc(16, 16, 1),
                    dec.inter_pred_idc(16, 16, 1),
                ],
                [dec.ref_idx_lx(4), dec.ref_idx_lx(4), dec.ref_idx_lx(2), dec.ref_idx_lx(1)],
                dec.mvp_lx_flag(),
                dec.no_residual_syntax_flag(),
            )
        });
        assert_eq!(
            values,
            (
                true,
                [3, 4, 0],
                [InterPredIdc::PRED_L1, InterPredIdc::PRED_BI, InterPredIdc::PRED_L0],
                [3, 2, 1, 0],
                true,
                false
            )
        );
    }

    #[test]
    fn motion_vector_difference() {
        let g0 = SyntaxElement::AbsMvdGreater0Flag.offset();
        let g1 = SyntaxElement::AbsMvdGreater1Flag.offset() + 1;
        let mut bins = vec![
            Bin::Ctx(g0, true),
            Bin::Ctx(g0, true),
            Bin::Ctx(g1, true),
            Bin::Ctx(g1, false),
        ];
        // |x| = 5
        bins.extend(exp_golomb(3, 1));
        bins.push(Bin::Bypass(true));
        bins.push(Bin::Bypass(false));
        // second mvd: x = 0, y = 130
        bins.extend([Bin::Ctx(g0, false), Bin::Ctx(g0, true), Bin::Ctx(g1, true)]);
        bins.extend(exp_golomb(128, 1));
        bins.push(Bin::Bypass(false));
        let (values, _) = run(SliceType::P, &bins, |dec| [dec.mvd_coding(), dec.mvd_coding()]);
        assert_eq!(values, [Mvd { x: -5, y: 1 }, Mvd { x: 0, y: 130 }]);
    }

    #[test]
    fn transform_tree_flags() {
        let stf = SyntaxElement::SplitTransformFlag.offset();
        let cbf_luma = SyntaxElement::CbfLuma.offset();
        let cbf_chroma = SyntaxElement::CbfCbCr.offset();
        let ts = SyntaxElement::TransformSkipFlag.offset();
        let bins = vec![
            Bin::Ctx(stf, true),
            Bin::Ctx(stf + 2, false),
            Bin::Ctx(cbf_chroma + 1, true),
            Bin::Ctx(cbf_luma + 1, true),
            Bin::Ctx(cbf_luma, false),
            Bin::Ctx(ts + 1, true),
            Bin::Ctx(SyntaxElement::CuTransquantBypassFlag.offset(), true),
            Bin::Ctx(SyntaxElement::PredMode.offset(), false),
            Bin::Term(false),
        ];
        let (values, _) = run(SliceType::P, &bins, |dec| {
            (
                dec.split_transform_flag(5),
                dec.split_transform_flag(3),
                dec.cbf_cb_cr(1),
                dec.cbf_luma(0),
                dec.cbf_luma(2),
                dec.transform_skip_flag(2),
                dec.cu_transquant_bypass_flag(),
                dec.pred_mode_flag(),
                dec.pcm_flag(),
            )
        });
        assert_eq!(values, (true, false, true, true, false, true, true, false, false));
    }

    fn neighbours<'a>(
        ctb_left_flag: bool,
        ctb_up_flag: bool,
        ct_depth: &'a [u8],
        skip_flag: &'a [u8],
    ) -> CodingTreeNeighbours<'a> {
        // 64x64 CTBs over a 128x128 picture of 8x8 minimum blocks
        CodingTreeNeighbours {
            ctb_left_flag,
            ctb_up_flag,
            log2_ctb_size: 6,
            log2_min_cb_size: 3,
            min_cb_width: 16,
            ct_depth,
            skip_flag,
        }
    }

    #[test]
    fn split_cu_ctx_inc_covers_all_neighbour_combinations() {
        let mut depth = vec![0u8; 16 * 16];
        for (i, d) in depth.iter_mut().enumerate() {
            *d = (i % 4) as u8;
        }
        let skip = vec![1u8; 16 * 16];
        for left in [false, true] {
            for up in [false, true] {
                let nb = neighbours(left, up, &depth, &skip);
                for x0b in [0, 8, 32, 56] {
                    for y0b in [0, 16, 56] {
                        let (x0, y0) = (64 + x0b, 64 + y0b);
                        for ct_depth in 0..4 {
                            let inc = split_cu_flag_ctx_inc(
                                nb.depth_left(x0, y0),
                                nb.depth_up(x0, y0),
                                ct_depth,
                            );
                            assert!(inc <= 2);
                            let ctx = SyntaxElement::SplitCodingUnitFlag.offset() + inc;
                            assert_eq!(
                                SyntaxElement::owning(ctx),
                                Some(SyntaxElement::SplitCodingUnitFlag)
                            );
                        }
                        assert_eq!(nb.depth_left(x0, y0).is_some(), left || x0b > 0);
                        assert_eq!(nb.depth_up(x0, y0).is_some(), up || y0b > 0);
                        let inc = skip_flag_ctx_inc(nb.skip_left(x0, y0), nb.skip_up(x0, y0));
                        assert_eq!(inc, (left || x0b > 0) as usize + (up || y0b > 0) as usize);
                    }
                }
            }
        }
    }

    #[test]
    fn neighbour_dependent_flags() {
        let mut depth = vec![0u8; 16 * 16];
        let mut skip = vec![0u8; 16 * 16];
        // left of (64, 64) is min block (7, 8), above is (8, 7)
        depth[8 * 16 + 7] = 2;
        depth[7 * 16 + 8] = 2;
        skip[8 * 16 + 7] = 1;
        let split = SyntaxElement::SplitCodingUnitFlag.offset();
        let skip_ctx = SyntaxElement::SkipFlag.offset();
        let bins = vec![
            Bin::Ctx(split + 2, true),
            Bin::Ctx(split, false),
            Bin::Ctx(skip_ctx + 1, true),
            Bin::Ctx(skip_ctx, false),
        ];
        let (values, _) = run(SliceType::B, &bins, |dec| {
            let available = neighbours(true, true, &depth, &skip);
            let unavailable = neighbours(false, false, &depth, &skip);
            (
                dec.split_coding_unit_flag(&available, 1, 64, 64),
                dec.split_coding_unit_flag(&unavailable, 1, 64, 64),
                dec.skip_flag(&available, 64, 64),
                dec.skip_flag(&unavailable, 64, 64),
            )
        });
        assert_eq!(values, (true, false, true, false));
    }

    #[test]
    fn unary_prefixes_stop_at_max_bin() {
        let mut set = contexts(SliceType::B);
        let mut engine = AllOnes { bypass_reads: 0 };
        let mut diagnostics = vec![];
        let mut dec = SyntaxDecoder::new(&mut engine, &mut set, &mut diagnostics);
        assert_eq!(dec.cu_qp_delta_abs(), u32::MAX);
        assert_eq!(dec.mvd(), -i32::MAX);
        drop(dec);
        assert_eq!(engine.bypass_reads, 62 + 62);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::MaxBinReached {
                    element: SyntaxElement::CuQpDelta,
                    bins: CABAC_MAX_BIN
                },
                Diagnostic::MaxBinReached {
                    element: SyntaxElement::AbsMvdMinus2,
                    bins: CABAC_MAX_BIN
                },
            ]
        );
    }
}
