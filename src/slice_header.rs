use super::context::InitType;
use super::error::*;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
pub enum SliceType {
    B = 0,
    P = 1,
    I = 2,
}

impl FromStr for SliceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<SliceType> {
        match s {
            "B" | "b" | "0" => Ok(SliceType::B),
            "P" | "p" | "1" => Ok(SliceType::P),
            "I" | "i" | "2" => Ok(SliceType::I),
            _ => Err(Error::InvalidSliceType(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SliceEntropyParams {
    pub slice_type: SliceType,
    pub cabac_init_flag: bool,
    pub slice_qp: i32,
    pub first_slice_in_pic_flag: bool,
    pub dependent_slice_segment_flag: bool,
    pub slice_ctb_addr_ts: usize,
    /// Length of the slice segment header in bits, up to `byte_alignment()`.
    pub slice_header_bits: usize,
    pub entropy_coding_sync_enabled_flag: bool,
    pub tiles_enabled_flag: bool,
    pub ctb_width: usize,
    /// Tile index of every CTU, in tile scan order.
    pub tile_id: Vec<usize>,
}

impl SliceEntropyParams {
    pub fn new(slice_type: SliceType, slice_qp: i32) -> SliceEntropyParams {
        SliceEntropyParams {
            slice_type,
            cabac_init_flag: false,
            slice_qp,
            first_slice_in_pic_flag: true,
            dependent_slice_segment_flag: false,
            slice_ctb_addr_ts: 0,
            slice_header_bits: 0,
            entropy_coding_sync_enabled_flag: false,
            tiles_enabled_flag: false,
            ctb_width: 1,
            tile_id: vec![],
        }
    }

    pub fn init_type(&self) -> InitType {
        InitType::derive(self.slice_type, self.cabac_init_flag)
    }

    pub fn is_tile_start(&self, ctb_addr_ts: usize) -> bool {
        if !self.tiles_enabled_flag || ctb_addr_ts == 0 {
            return false;
        }
        match (self.tile_id.get(ctb_addr_ts), self.tile_id.get(ctb_addr_ts - 1)) {
            (Some(curr), Some(prev)) => curr != prev,
            _ => false,
        }
    }

    pub fn is_row_start(&self, ctb_addr_ts: usize) -> bool {
        self.entropy_coding_sync_enabled_flag && ctb_addr_ts % self.ctb_width.max(1) == 0
    }
}
