use super::bool_decoder::*;
use super::cabac_contexts::*;
use super::common::*;
use super::context::*;
use super::diagnostics::DiagnosticSink;
use super::error::*;
use super::residual::*;
use super::slice_header::SliceType;
use super::syntax::*;
use num::FromPrimitive;
use std::fmt;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Element {
    SaoMergeFlag,
    SaoTypeIdx,
    SaoBandPosition,
    SaoOffsetAbs { bit_depth: usize },
    SaoOffsetSign,
    SaoEoClass,
    EndOfSliceFlag,
    EndOfSubsetOneBit,
    SplitCodingUnitFlag { ct_depth: u8 },
    CuTransquantBypassFlag,
    SkipFlag,
    CuQpDeltaAbs,
    CuQpDeltaSignFlag,
    PredModeFlag,
    PartMode {
        log2_cb_size: usize,
        log2_min_cb_size: usize,
        intra: bool,
        amp_enabled_flag: bool,
    },
    PcmFlag,
    PrevIntraLumaPredFlag,
    MpmIdx,
    RemIntraLumaPredMode,
    IntraChromaPredMode,
    MergeFlag,
    MergeIdx { max_num_merge_cand: u32 },
    InterPredIdc { n_pb_w: usize, n_pb_h: usize, ct_depth: usize },
    RefIdxLx { num_ref_idx_active: u32 },
    MvpLxFlag,
    NoResidualSyntaxFlag,
    AbsMvdGreater0Flag,
    AbsMvdGreater1Flag,
    Mvd,
    MvdSignFlag,
    MvdCoding,
    SplitTransformFlag { log2_trafo_size: usize },
    CbfCbCr { trafo_depth: usize },
    CbfLuma { trafo_depth: usize },
    TransformSkipFlag { c_idx: usize },
    LastSignificantCoeffXPrefix { c_idx: usize, log2_size: usize },
    LastSignificantCoeffYPrefix { c_idx: usize, log2_size: usize },
    LastSignificantCoeffSuffix { prefix: u32 },
    SignificantCoeffGroupFlag { c_idx: usize, ctx_cg: usize },
    CoeffAbsLevelGreater1Flag { c_idx: usize, inc: usize },
    CoeffAbsLevelGreater2Flag { c_idx: usize, inc: usize },
    CoeffAbsLevelRemaining { rc_rice_param: usize },
    CoeffSignFlag { nb: usize },
    ResidualCoding(ResidualCodingParams),
}

fn params<const N: usize>(name: &str, values: &[&str]) -> Result<[usize; N]> {
    if values.len() != N {
        return Err(Error::InvalidParameter {
            element: name.to_string(),
            reason: format!("expected {} parameter(s), got {}", N, values.len()),
        });
    }
    let mut out = [0; N];
    for (o, v) in out.iter_mut().zip(values.iter()) {
        *o = v.parse::<usize>().map_err(|e| Error::InvalidParameter {
            element: name.to_string(),
            reason: format!("{}: {}", v, e),
        })?;
    }
    Ok(out)
}

fn check(name: &str, ok: bool, reason: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            element: name.to_string(),
            reason: reason.to_string(),
        })
    }
}

fn c_idx_param(name: &str, c_idx: usize) -> Result<usize> {
    check(name, c_idx < 3, "c_idx must be 0, 1 or 2")?;
    Ok(c_idx)
}

fn log2_param(name: &str, log2_size: usize) -> Result<usize> {
    check(name, (2..=5).contains(&log2_size), "log2 size must be in 2..=5")?;
    Ok(log2_size)
}

impl Element {
    /// Parses `name` or `name=P1:P2:...`.
    pub fn parse(token: &str) -> Result<Element> {
        let token = token.trim();
        let (name, values) = match token.split_once('=') {
            Some((name, values)) => (name, values.split(':').collect::<Vec<&str>>()),
            None => (token, vec![]),
        };
        let element = match name {
            "sao_merge_flag" => {
                params::<0>(name, &values)?;
                Element::SaoMergeFlag
            }
            "sao_type_idx" => {
                params::<0>(name, &values)?;
                Element::SaoTypeIdx
            }
            "sao_band_position" => {
                params::<0>(name, &values)?;
                Element::SaoBandPosition
            }
            "sao_offset_abs" => {
                let [bit_depth] = params(name, &values)?;
                check(name, (8..=16).contains(&bit_depth), "bit depth must be in 8..=16")?;
                Element::SaoOffsetAbs { bit_depth }
            }
            "sao_offset_sign" => {
                params::<0>(name, &values)?;
                Element::SaoOffsetSign
            }
            "sao_eo_class" => {
                params::<0>(name, &values)?;
                Element::SaoEoClass
            }
            "end_of_slice_flag" => {
                params::<0>(name, &values)?;
                Element::EndOfSliceFlag
            }
            "end_of_subset_one_bit" => {
                params::<0>(name, &values)?;
                Element::EndOfSubsetOneBit
            }
            "split_coding_unit_flag" => {
                let [ct_depth] = params(name, &values)?;
                check(name, ct_depth < 4, "ct_depth must be below 4")?;
                Element::SplitCodingUnitFlag {
                    ct_depth: ct_depth as u8,
                }
            }
            "cu_transquant_bypass_flag" => {
                params::<0>(name, &values)?;
                Element::CuTransquantBypassFlag
            }
            "skip_flag" => {
                params::<0>(name, &values)?;
                Element::SkipFlag
            }
            "cu_qp_delta_abs" => {
                params::<0>(name, &values)?;
                Element::CuQpDeltaAbs
            }
            "cu_qp_delta_sign_flag" => {
                params::<0>(name, &values)?;
                Element::CuQpDeltaSignFlag
            }
            "pred_mode_flag" => {
                params::<0>(name, &values)?;
                Element::PredModeFlag
            }
            "part_mode" => {
                let [log2_cb_size, log2_min_cb_size, intra, amp] = params(name, &values)?;
                check(
                    name,
                    (3..=6).contains(&log2_cb_size) && log2_min_cb_size <= log2_cb_size,
                    "log2_cb_size must be in 3..=6 and at least log2_min_cb_size",
                )?;
                Element::PartMode {
                    log2_cb_size,
                    log2_min_cb_size,
                    intra: intra != 0,
                    amp_enabled_flag: amp != 0,
                }
            }
            "pcm_flag" => {
                params::<0>(name, &values)?;
                Element::PcmFlag
            }
            "prev_intra_luma_pred_flag" => {
                params::<0>(name, &values)?;
                Element::PrevIntraLumaPredFlag
            }
            "mpm_idx" => {
                params::<0>(name, &values)?;
                Element::MpmIdx
            }
            "rem_intra_luma_pred_mode" => {
                params::<0>(name, &values)?;
                Element::RemIntraLumaPredMode
            }
            "intra_chroma_pred_mode" => {
                params::<0>(name, &values)?;
                Element::IntraChromaPredMode
            }
            "merge_flag" => {
                params::<0>(name, &values)?;
                Element::MergeFlag
            }
            "merge_idx" => {
                let [max] = params(name, &values)?;
                check(name, (1..=5).contains(&max), "MaxNumMergeCand must be in 1..=5")?;
                Element::MergeIdx {
                    max_num_merge_cand: max as u32,
                }
            }
            "inter_pred_idc" => {
                let [n_pb_w, n_pb_h, ct_depth] = params(name, &values)?;
                check(name, ct_depth < 4, "ct_depth must be below 4")?;
                Element::InterPredIdc {
                    n_pb_w,
                    n_pb_h,
                    ct_depth,
                }
            }
            "ref_idx_l0" | "ref_idx_l1" => {
                let [num] = params(name, &values)?;
                check(name, (1..=16).contains(&num), "num_ref_idx_active must be in 1..=16")?;
                Element::RefIdxLx {
                    num_ref_idx_active: num as u32,
                }
            }
            "mvp_l0_flag" | "mvp_l1_flag" => {
                params::<0>(name, &values)?;
                Element::MvpLxFlag
            }
            "rqt_root_cbf" | "no_residual_syntax_flag" => {
                params::<0>(name, &values)?;
                Element::NoResidualSyntaxFlag
            }
            "abs_mvd_greater0_flag" => {
                params::<0>(name, &values)?;
                Element::AbsMvdGreater0Flag
            }
            "abs_mvd_greater1_flag" => {
                params::<0>(name, &values)?;
                Element::AbsMvdGreater1Flag
            }
            "mvd" => {
                params::<0>(name, &values)?;
                Element::Mvd
            }
            "mvd_sign_flag" => {
                params::<0>(name, &values)?;
                Element::MvdSignFlag
            }
            "mvd_coding" => {
                params::<0>(name, &values)?;
                Element::MvdCoding
            }
            "split_transform_flag" => {
                let [log2_trafo_size] = params(name, &values)?;
                check(name, (3..=5).contains(&log2_trafo_size), "log2_trafo_size must be in 3..=5")?;
                Element::SplitTransformFlag { log2_trafo_size }
            }
            "cbf_cb" | "cbf_cr" | "cbf_cb_cr" => {
                let [trafo_depth] = params(name, &values)?;
                check(name, trafo_depth < 4, "trafo_depth must be below 4")?;
                Element::CbfCbCr { trafo_depth }
            }
            "cbf_luma" => {
                let [trafo_depth] = params(name, &values)?;
                Element::CbfLuma { trafo_depth }
            }
            "transform_skip_flag" => {
                let [c_idx] = params(name, &values)?;
                Element::TransformSkipFlag {
                    c_idx: c_idx_param(name, c_idx)?,
                }
            }
            "last_sig_coeff_x_prefix" | "last_significant_coeff_x_prefix" => {
                let [c_idx, log2_size] = params(name, &values)?;
                Element::LastSignificantCoeffXPrefix {
                    c_idx: c_idx_param(name, c_idx)?,
                    log2_size: log2_param(name, log2_size)?,
                }
            }
            "last_sig_coeff_y_prefix" | "last_significant_coeff_y_prefix" => {
                let [c_idx, log2_size] = params(name, &values)?;
                Element::LastSignificantCoeffYPrefix {
                    c_idx: c_idx_param(name, c_idx)?,
                    log2_size: log2_param(name, log2_size)?,
                }
            }
            "last_sig_coeff_suffix" | "last_significant_coeff_suffix" => {
                let [prefix] = params(name, &values)?;
                check(name, (4..=9).contains(&prefix), "prefix must be in 4..=9")?;
                Element::LastSignificantCoeffSuffix {
                    prefix: prefix as u32,
                }
            }
            "coded_sub_block_flag" | "significant_coeff_group_flag" => {
                let [c_idx, ctx_cg] = params(name, &values)?;
                Element::SignificantCoeffGroupFlag {
                    c_idx: c_idx_param(name, c_idx)?,
                    ctx_cg,
                }
            }
            "coeff_abs_level_greater1_flag" => {
                let [c_idx, inc] = params(name, &values)?;
                check(name, inc < 16, "context increment must be below 16")?;
                Element::CoeffAbsLevelGreater1Flag {
                    c_idx: c_idx_param(name, c_idx)?,
                    inc,
                }
            }
            "coeff_abs_level_greater2_flag" => {
                let [c_idx, inc] = params(name, &values)?;
                check(name, inc < 4, "context increment must be below 4")?;
                Element::CoeffAbsLevelGreater2Flag {
                    c_idx: c_idx_param(name, c_idx)?,
                    inc,
                }
            }
            "coeff_abs_level_remaining" => {
                let [rc_rice_param] = params(name, &values)?;
                check(name, rc_rice_param <= 4, "rice parameter must be at most 4")?;
                Element::CoeffAbsLevelRemaining { rc_rice_param }
            }
            "coeff_sign_flag" => {
                let [nb] = params(name, &values)?;
                check(name, nb <= 16, "at most 16 sign bits")?;
                Element::CoeffSignFlag { nb }
            }
            "residual_coding" => {
                let [log2_trafo_size, c_idx, scan_idx, ts, bypass, sdh] = params(name, &values)?;
                let scan_idx = ScanType::from_usize(scan_idx).ok_or_else(|| Error::InvalidParameter {
                    element: name.to_string(),
                    reason: format!("unknown scan_idx {}", scan_idx),
                })?;
                Element::ResidualCoding(ResidualCodingParams {
                    log2_trafo_size: log2_param(name, log2_trafo_size)?,
                    c_idx: c_idx_param(name, c_idx)?,
                    scan_idx,
                    transform_skip_enabled_flag: ts != 0,
                    cu_transquant_bypass_flag: bypass != 0,
                    sign_data_hiding_enabled_flag: sdh != 0,
                })
            }
            _ => return Err(Error::UnknownSyntaxElement(name.to_string())),
        };
        Ok(element)
    }
}

pub fn parse_elements(script: &str) -> Result<Vec<Element>> {
    script
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(Element::parse)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Flag(bool),
    Uint(u32),
    Int(i32),
    Sao(SaoType),
    Part(PartMode),
    InterPred(InterPredIdc),
    Mvd(Mvd),
    Residual(ResidualBlock),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Flag(flag) => write!(f, "{}", *flag as u8),
            Value::Uint(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Sao(sao_type) => write!(f, "{:?}", sao_type),
            Value::Part(part_mode) => write!(f, "{:?}", part_mode),
            Value::InterPred(idc) => write!(f, "{:?}", idc),
            Value::Mvd(mvd) => write!(f, "({}, {})", mvd.x, mvd.y),
            Value::Residual(block) => {
                write!(f, "transform_skip_flag={}", block.transform_skip_flag as u8)?;
                let size = 1 << block.log2_trafo_size;
                for row in block.coeffs.chunks(size) {
                    write!(f, "\n   ")?;
                    for c in row {
                        write!(f, " {:4}", c)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn decode_element<D: BinDecoder + ?Sized>(dec: &mut SyntaxDecoder<D>, element: &Element) -> Value {
    match *element {
        Element::SaoMergeFlag => Value::Flag(dec.sao_merge_flag()),
        Element::SaoTypeIdx => Value::Sao(dec.sao_type_idx()),
        Element::SaoBandPosition => Value::Uint(dec.sao_band_position()),
        Element::SaoOffsetAbs { bit_depth } => Value::Uint(dec.sao_offset_abs(bit_depth)),
        Element::SaoOffsetSign => Value::Flag(dec.sao_offset_sign()),
        Element::SaoEoClass => Value::Uint(dec.sao_eo_class()),
        Element::EndOfSliceFlag => Value::Flag(dec.end_of_slice_flag()),
        Element::EndOfSubsetOneBit => Value::Flag(dec.end_of_subset_one_bit()),
        Element::SplitCodingUnitFlag { ct_depth } => {
            Value::Flag(dec.split_coding_unit_flag(&UNAVAILABLE, ct_depth, 0, 0))
        }
        Element::CuTransquantBypassFlag => Value::Flag(dec.cu_transquant_bypass_flag()),
        Element::SkipFlag => Value::Flag(dec.skip_flag(&UNAVAILABLE, 0, 0)),
        Element::CuQpDeltaAbs => Value::Uint(dec.cu_qp_delta_abs()),
        Element::CuQpDeltaSignFlag => Value::Flag(dec.cu_qp_delta_sign_flag()),
        Element::PredModeFlag => Value::Flag(dec.pred_mode_flag()),
        Element::PartMode {
            log2_cb_size,
            log2_min_cb_size,
            intra,
            amp_enabled_flag,
        } => {
            let pred_mode = if intra {
                PredMode::MODE_INTRA
            } else {
                PredMode::MODE_INTER
            };
            Value::Part(dec.part_mode(log2_cb_size, log2_min_cb_size, pred_mode, amp_enabled_flag))
        }
        Element::PcmFlag => Value::Flag(dec.pcm_flag()),
        Element::PrevIntraLumaPredFlag => Value::Flag(dec.prev_intra_luma_pred_flag()),
        Element::MpmIdx => Value::Uint(dec.mpm_idx()),
        Element::RemIntraLumaPredMode => Value::Uint(dec.rem_intra_luma_pred_mode()),
        Element::IntraChromaPredMode => Value::Uint(dec.intra_chroma_pred_mode()),
        Element::MergeFlag => Value::Flag(dec.merge_flag()),
        Element::MergeIdx { max_num_merge_cand } => Value::Uint(dec.merge_idx(max_num_merge_cand)),
        Element::InterPredIdc {
            n_pb_w,
            n_pb_h,
            ct_depth,
        } => Value::InterPred(dec.inter_pred_idc(n_pb_w, n_pb_h, ct_depth)),
        Element::RefIdxLx { num_ref_idx_active } => Value::Uint(dec.ref_idx_lx(num_ref_idx_active)),
        Element::MvpLxFlag => Value::Flag(dec.mvp_lx_flag()),
        Element::NoResidualSyntaxFlag => Value::Flag(dec.no_residual_syntax_flag()),
        Element::AbsMvdGreater0Flag => Value::Flag(dec.abs_mvd_greater0_flag()),
        Element::AbsMvdGreater1Flag => Value::Flag(dec.abs_mvd_greater1_flag()),
        Element::Mvd => Value::Int(dec.mvd()),
        Element::MvdSignFlag => Value::Int(dec.mvd_sign_flag()),
        Element::MvdCoding => Value::Mvd(dec.mvd_coding()),
        Element::SplitTransformFlag { log2_trafo_size } => {
            Value::Flag(dec.split_transform_flag(log2_trafo_size))
        }
        Element::CbfCbCr { trafo_depth } => Value::Flag(dec.cbf_cb_cr(trafo_depth)),
        Element::CbfLuma { trafo_depth } => Value::Flag(dec.cbf_luma(trafo_depth)),
        Element::TransformSkipFlag { c_idx } => Value::Flag(dec.transform_skip_flag(c_idx)),
        Element::LastSignificantCoeffXPrefix { c_idx, log2_size } => {
            Value::Uint(dec.last_significant_coeff_x_prefix(c_idx, log2_size))
        }
        Element::LastSignificantCoeffYPrefix { c_idx, log2_size } => {
            Value::Uint(dec.last_significant_coeff_y_prefix(c_idx, log2_size))
        }
        Element::LastSignificantCoeffSuffix { prefix } => {
            Value::Uint(dec.last_significant_coeff_suffix(prefix))
        }
        Element::SignificantCoeffGroupFlag { c_idx, ctx_cg } => {
            Value::Flag(dec.significant_coeff_group_flag(c_idx, ctx_cg))
        }
        Element::CoeffAbsLevelGreater1Flag { c_idx, inc } => {
            Value::Flag(dec.coeff_abs_level_greater1_flag(c_idx, inc))
        }
        Element::CoeffAbsLevelGreater2Flag { c_idx, inc } => {
            Value::Flag(dec.coeff_abs_level_greater2_flag(c_idx, inc))
        }
        Element::CoeffAbsLevelRemaining { rc_rice_param } => {
            Value::Uint(dec.coeff_abs_level_remaining(rc_rice_param))
        }
        Element::CoeffSignFlag { nb } => Value::Uint(dec.coeff_sign_flag(nb)),
        Element::ResidualCoding(ref params) => Value::Residual(dec.residual_coding(params)),
    }
}

/// Neighbourhood of a block at the top left of a slice.
const UNAVAILABLE: CodingTreeNeighbours<'static> = CodingTreeNeighbours {
    ctb_left_flag: false,
    ctb_up_flag: false,
    log2_ctb_size: 6,
    log2_min_cb_size: 3,
    min_cb_width: 0,
    ct_depth: &[],
    skip_flag: &[],
};

#[derive(Clone, Debug)]
pub struct TraceConfig {
    pub slice_type: SliceType,
    pub slice_qp: i32,
    pub cabac_init_flag: bool,
    /// Slice header length in bits; `None` when the payload starts with slice data.
    pub header_bits: Option<usize>,
}

impl TraceConfig {
    pub fn init_type(&self) -> InitType {
        InitType::derive(self.slice_type, self.cabac_init_flag)
    }
}

#[derive(Clone, Debug)]
pub struct Trace {
    pub values: Vec<(Element, Value)>,
    pub bit_position: usize,
    pub overrun: bool,
}

pub fn run_trace(
    data: &[u8],
    config: &TraceConfig,
    elements: &[Element],
    sink: &mut dyn DiagnosticSink,
) -> Trace {
    let mut contexts = ContextSet::new(config.init_type(), config.slice_qp);
    let mut engine = CabacEngine::new(data);
    match config.header_bits {
        Some(header_bits) => engine.init_after_header(header_bits),
        None => engine.init_decoder(),
    }
    let values = {
        let mut dec = SyntaxDecoder::new(&mut engine, &mut contexts, sink);
        elements
            .iter()
            .map(|element| (*element, decode_element(&mut dec, element)))
            .collect()
    };
    Trace {
        values,
        bit_position: engine.bit_position(),
        overrun: engine.is_overrun(),
    }
}

pub fn dump_contexts<W: Write>(writer: &mut W, contexts: &ContextSet) -> io::Result<()> {
    for (ctx_idx, model) in contexts.models().iter().enumerate() {
        let owner = SyntaxElement::owning(ctx_idx).map_or("-", |se| se.name());
        writeln!(
            writer,
            "{:3} {:32} state={:2} mps={} pre={}",
            ctx_idx,
            owner,
            model.state,
            model.mps as u8,
            model.packed()
        )?;
    }
    Ok(())
}
