#![allow(non_upper_case_globals)]

use num::FromPrimitive;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, FromPrimitive)]
pub enum SyntaxElement {
    SaoMergeFlag = 0,
    SaoTypeIdx = 1,
    SaoEoClass = 2,
    SaoBandPosition = 3,
    SaoOffsetAbs = 4,
    SaoOffsetSign = 5,
    EndOfSliceFlag = 6,
    SplitCodingUnitFlag = 7,
    CuTransquantBypassFlag = 8,
    SkipFlag = 9,
    CuQpDelta = 10,
    PredMode = 11,
    PartMode = 12,
    PcmFlag = 13,
    PrevIntraLumaPredFlag = 14,
    MpmIdx = 15,
    RemIntraLumaPredMode = 16,
    IntraChromaPredMode = 17,
    MergeFlag = 18,
    MergeIdx = 19,
    InterPredIdc = 20,
    RefIdxL0 = 21,
    RefIdxL1 = 22,
    AbsMvdGreater0Flag = 23,
    AbsMvdGreater1Flag = 24,
    AbsMvdMinus2 = 25,
    MvdSignFlag = 26,
    MvpLxFlag = 27,
    NoResidualDataFlag = 28,
    SplitTransformFlag = 29,
    CbfLuma = 30,
    CbfCbCr = 31,
    TransformSkipFlag = 32,
    LastSignificantCoeffXPrefix = 33,
    LastSignificantCoeffYPrefix = 34,
    LastSignificantCoeffXSuffix = 35,
    LastSignificantCoeffYSuffix = 36,
    SignificantCoeffGroupFlag = 37,
    SignificantCoeffFlag = 38,
    CoeffAbsLevelGreater1Flag = 39,
    CoeffAbsLevelGreater2Flag = 40,
    CoeffAbsLevelRemaining = 41,
    CoeffSignFlag = 42,
}

pub const NUM_SYNTAX_ELEMENTS: usize = 43;

pub const HEVC_CONTEXTS: usize = 160;

/// Upper bound on unbounded unary bypass prefixes.
pub const CABAC_MAX_BIN: usize = 31;

pub const NUM_BINS_IN_SE: [u8; NUM_SYNTAX_ELEMENTS] = [
    1,  // sao_merge_flag
    1,  // sao_type_idx
    0,  // sao_eo_class
    0,  // sao_band_position
    0,  // sao_offset_abs
    0,  // sao_offset_sign
    0,  // end_of_slice_flag
    3,  // split_coding_unit_flag
    1,  // cu_transquant_bypass_flag
    3,  // skip_flag
    3,  // cu_qp_delta
    1,  // pred_mode
    4,  // part_mode
    0,  // pcm_flag
    1,  // prev_intra_luma_pred_mode
    0,  // mpm_idx
    0,  // rem_intra_luma_pred_mode
    2,  // intra_chroma_pred_mode
    1,  // merge_flag
    1,  // merge_idx
    5,  // inter_pred_idc
    2,  // ref_idx_l0
    2,  // ref_idx_l1
    2,  // abs_mvd_greater0_flag
    2,  // abs_mvd_greater1_flag
    0,  // abs_mvd_minus2
    0,  // mvd_sign_flag
    1,  // mvp_lx_flag
    1,  // no_residual_data_flag
    3,  // split_transform_flag
    2,  // cbf_luma
    4,  // cbf_cb, cbf_cr
    2,  // transform_skip_flag
    18, // last_significant_coeff_x_prefix
    18, // last_significant_coeff_y_prefix
    0,  // last_significant_coeff_x_suffix
    0,  // last_significant_coeff_y_suffix
    4,  // significant_coeff_group_flag
    42, // significant_coeff_flag
    24, // coeff_abs_level_greater1_flag
    6,  // coeff_abs_level_greater2_flag
    0,  // coeff_abs_level_remaining
    0,  // coeff_sign_flag
];

pub const ELEM_OFFSET: [usize; NUM_SYNTAX_ELEMENTS] = [
    0, 1, 2, 2, 2, 2, 2, 2, 5, 6, 9, 12, 13, 17, 17, 18, 18, 18, 20, 21, 22, 27, 29, 31, 33, 35,
    35, 35, 36, 37, 40, 42, 46, 48, 66, 84, 84, 84, 88, 130, 154, 160, 160,
];

impl SyntaxElement {
    #[inline(always)]
    pub fn offset(self) -> usize {
        ELEM_OFFSET[self as usize]
    }

    #[inline(always)]
    pub fn num_contexts(self) -> usize {
        NUM_BINS_IN_SE[self as usize] as usize
    }

    pub fn owning(ctx_idx: usize) -> Option<SyntaxElement> {
        (0..NUM_SYNTAX_ELEMENTS)
            .filter_map(SyntaxElement::from_usize)
            .find(|se| ctx_idx >= se.offset() && ctx_idx < se.offset() + se.num_contexts())
    }

    pub fn name(self) -> &'static str {
        SYNTAX_ELEMENT_NAMES[self as usize]
    }
}

const SYNTAX_ELEMENT_NAMES: [&str; NUM_SYNTAX_ELEMENTS] = [
    "sao_merge_flag",
    "sao_type_idx",
    "sao_eo_class",
    "sao_band_position",
    "sao_offset_abs",
    "sao_offset_sign",
    "end_of_slice_flag",
    "split_coding_unit_flag",
    "cu_transquant_bypass_flag",
    "skip_flag",
    "cu_qp_delta",
    "pred_mode",
    "part_mode",
    "pcm_flag",
    "prev_intra_luma_pred_flag",
    "mpm_idx",
    "rem_intra_luma_pred_mode",
    "intra_chroma_pred_mode",
    "merge_flag",
    "merge_idx",
    "inter_pred_idc",
    "ref_idx_l0",
    "ref_idx_l1",
    "abs_mvd_greater0_flag",
    "abs_mvd_greater1_flag",
    "abs_mvd_minus2",
    "mvd_sign_flag",
    "mvp_lx_flag",
    "no_residual_data_flag",
    "split_transform_flag",
    "cbf_luma",
    "cbf_cb_cr",
    "transform_skip_flag",
    "last_significant_coeff_x_prefix",
    "last_significant_coeff_y_prefix",
    "last_significant_coeff_x_suffix",
    "last_significant_coeff_y_suffix",
    "significant_coeff_group_flag",
    "significant_coeff_flag",
    "coeff_abs_level_greater1_flag",
    "coeff_abs_level_greater2_flag",
    "coeff_abs_level_remaining",
    "coeff_sign_flag",
];

const CNU: u8 = 154;

pub const INIT_VALUES: [[u8; HEVC_CONTEXTS]; 3] = [
    [
        // sao_merge_flag
        153,
        // sao_type_idx
        200,
        // split_coding_unit_flag
        139, 141, 157,
        // cu_transquant_bypass_flag
        154,
        // skip_flag
        CNU, CNU, CNU,
        // cu_qp_delta
        154, 154, 154,
        // pred_mode
        CNU,
        // part_mode
        184, CNU, CNU, CNU,
        // prev_intra_luma_pred_mode
        184,
        // intra_chroma_pred_mode
        63, 139,
        // merge_flag
        CNU,
        // merge_idx
        CNU,
        // inter_pred_idc
        CNU, CNU, CNU, CNU, CNU,
        // ref_idx_l0
        CNU, CNU,
        // ref_idx_l1
        CNU, CNU,
        // abs_mvd_greater0_flag
        CNU, CNU,
        // abs_mvd_greater1_flag
        CNU, CNU,
        // mvp_lx_flag
        CNU,
        // no_residual_data_flag
        CNU,
        // split_transform_flag
        153, 138, 138,
        // cbf_luma
        111, 141,
        // cbf_cb, cbf_cr
        94, 138, 182, 154,
        // transform_skip_flag
        139, 139,
        // last_significant_coeff_x_prefix
        110, 110, 124, 125, 140, 153, 125, 127, 140, 109, 111, 143, 127, 111,
        79, 108, 123, 63,
        // last_significant_coeff_y_prefix
        110, 110, 124, 125, 140, 153, 125, 127, 140, 109, 111, 143, 127, 111,
        79, 108, 123, 63,
        // significant_coeff_group_flag
        91, 171, 134, 141,
        // significant_coeff_flag
        111, 111, 125, 110, 110, 94, 124, 108, 124, 107, 125, 141, 179, 153,
        125, 107, 125, 141, 179, 153, 125, 107, 125, 141, 179, 153, 125, 140,
        139, 182, 182, 152, 136, 152, 136, 153, 136, 139, 111, 136, 139, 111,
        // coeff_abs_level_greater1_flag
        140, 92, 137, 138, 140, 152, 138, 139, 153, 74, 149, 92, 139, 107,
        122, 152, 140, 179, 166, 182, 140, 227, 122, 197,
        // coeff_abs_level_greater2_flag
        138, 153, 136, 167, 152, 152,
    ],
    [
        // sao_merge_flag
        153,
        // sao_type_idx
        185,
        // split_coding_unit_flag
        107, 139, 126,
        // cu_transquant_bypass_flag
        154,
        // skip_flag
        197, 185, 201,
        // cu_qp_delta
        154, 154, 154,
        // pred_mode
        149,
        // part_mode
        154, 139, 154, 154,
        // prev_intra_luma_pred_mode
        154,
        // intra_chroma_pred_mode
        152, 139,
        // merge_flag
        110,
        // merge_idx
        122,
        // inter_pred_idc
        95, 79, 63, 31, 31,
        // ref_idx_l0
        153, 153,
        // ref_idx_l1
        153, 153,
        // abs_mvd_greater0_flag
        140, 198,
        // abs_mvd_greater1_flag
        140, 198,
        // mvp_lx_flag
        168,
        // no_residual_data_flag
        79,
        // split_transform_flag
        124, 138, 94,
        // cbf_luma
        153, 111,
        // cbf_cb, cbf_cr
        149, 107, 167, 154,
        // transform_skip_flag
        139, 139,
        // last_significant_coeff_x_prefix
        125, 110, 94, 110, 95, 79, 125, 111, 110, 78, 110, 111, 111, 95,
        94, 108, 123, 108,
        // last_significant_coeff_y_prefix
        125, 110, 94, 110, 95, 79, 125, 111, 110, 78, 110, 111, 111, 95,
        94, 108, 123, 108,
        // significant_coeff_group_flag
        121, 140, 61, 154,
        // significant_coeff_flag
        155, 154, 139, 153, 139, 123, 123, 63, 153, 166, 183, 140, 136, 153,
        154, 166, 183, 140, 136, 153, 154, 166, 183, 140, 136, 153, 154, 170,
        153, 123, 123, 107, 121, 107, 121, 167, 151, 183, 140, 151, 183, 140,
        // coeff_abs_level_greater1_flag
        154, 196, 196, 167, 154, 152, 167, 182, 182, 134, 149, 136, 153, 121,
        136, 137, 169, 194, 166, 167, 154, 167, 137, 182,
        // coeff_abs_level_greater2_flag
        107, 167, 91, 122, 107, 167,
    ],
    [
        // sao_merge_flag
        153,
        // sao_type_idx
        160,
        // split_coding_unit_flag
        107, 139, 126,
        // cu_transquant_bypass_flag
        154,
        // skip_flag
        197, 185, 201,
        // cu_qp_delta
        154, 154, 154,
        // pred_mode
        134,
        // part_mode
        154, 139, 154, 154,
        // prev_intra_luma_pred_mode
        183,
        // intra_chroma_pred_mode
        152, 139,
        // merge_flag
        154,
        // merge_idx
        137,
        // inter_pred_idc
        95, 79, 63, 31, 31,
        // ref_idx_l0
        153, 153,
        // ref_idx_l1
        153, 153,
        // abs_mvd_greater0_flag
        169, 198,
        // abs_mvd_greater1_flag
        169, 198,
        // mvp_lx_flag
        168,
        // no_residual_data_flag
        79,
        // split_transform_flag
        224, 167, 122,
        // cbf_luma
        153, 111,
        // cbf_cb, cbf_cr
        149, 92, 167, 154,
        // transform_skip_flag
        139, 139,
        // last_significant_coeff_x_prefix
        125, 110, 124, 110, 95, 94, 125, 111, 111, 79, 125, 126, 111, 111,
        79, 108, 123, 93,
        // last_significant_coeff_y_prefix
        125, 110, 124, 110, 95, 94, 125, 111, 111, 79, 125, 126, 111, 111,
        79, 108, 123, 93,
        // significant_coeff_group_flag
        121, 140, 61, 154,
        // significant_coeff_flag
        170, 154, 139, 153, 139, 123, 123, 63, 124, 166, 183, 140, 136, 153,
        154, 166, 183, 140, 136, 153, 154, 166, 183, 140, 136, 153, 154, 170,
        153, 138, 138, 122, 121, 122, 121, 167, 151, 183, 140, 151, 183, 140,
        // coeff_abs_level_greater1_flag
        154, 196, 167, 167, 154, 152, 167, 182, 182, 134, 149, 136, 153, 121,
        136, 122, 169, 208, 166, 167, 154, 152, 167, 182,
        // coeff_abs_level_greater2_flag
        107, 167, 91, 107, 107, 167,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_prefix_sums_of_bin_counts() {
        let mut offset = 0;
        for se in 0..NUM_SYNTAX_ELEMENTS {
            assert_eq!(ELEM_OFFSET[se], offset, "element {se}");
            offset += NUM_BINS_IN_SE[se] as usize;
        }
        assert_eq!(offset, HEVC_CONTEXTS);
    }

    #[test]
    fn every_context_has_one_owner() {
        for ctx_idx in 0..HEVC_CONTEXTS {
            let owner = SyntaxElement::owning(ctx_idx).unwrap();
            assert!(ctx_idx >= owner.offset());
            assert!(ctx_idx < owner.offset() + owner.num_contexts());
        }
        assert_eq!(SyntaxElement::owning(HEVC_CONTEXTS), None);
    }

    #[test]
    fn named_lookup() {
        assert_eq!(SyntaxElement::SaoMergeFlag.offset(), 0);
        assert_eq!(SyntaxElement::SignificantCoeffFlag.offset(), 88);
        assert_eq!(SyntaxElement::CoeffAbsLevelGreater2Flag.num_contexts(), 6);
        assert_eq!(
            SyntaxElement::from_usize(38),
            Some(SyntaxElement::SignificantCoeffFlag)
        );
        assert_eq!(SyntaxElement::MergeIdx.name(), "merge_idx");
    }
}
