use super::cabac_contexts::*;
use super::slice_header::SliceType;
use debug_print::*;
use lazy_static::lazy_static;
use std::ops::{Index, IndexMut};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ContextModel {
    pub state: u8,
    pub mps: bool,
}

impl ContextModel {
    /// Unpacks the `2 * state + mps` byte produced by the initializer.
    #[inline(always)]
    pub fn from_packed(pre: u8) -> ContextModel {
        ContextModel {
            state: pre >> 1,
            mps: pre & 1 > 0,
        }
    }

    #[inline(always)]
    pub fn packed(&self) -> u8 {
        (self.state << 1) | self.mps as u8
    }
}

/// Packed initial state of a context for a given slice QP.
pub fn init_context_state(init_value: u8, slice_qp: i32) -> u8 {
    let m = (init_value as i32 >> 4) * 5 - 45;
    let n = ((init_value as i32 & 15) << 3) - 16;
    let mut pre = 2 * (((m * slice_qp.clamp(0, 51)) >> 4) + n) - 127;
    pre ^= pre >> 31;
    if pre > 124 {
        pre = 124 + (pre & 1);
    }
    pre as u8
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InitType(usize);

impl InitType {
    pub fn derive(slice_type: SliceType, cabac_init_flag: bool) -> InitType {
        let init_type = 2 - slice_type as usize;
        if cabac_init_flag && slice_type != SliceType::I {
            InitType(init_type ^ 3)
        } else {
            InitType(init_type)
        }
    }

    pub fn from_index(idx: usize) -> Option<InitType> {
        if idx < 3 {
            Some(InitType(idx))
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ContextSet([ContextModel; HEVC_CONTEXTS]);

lazy_static! {
    static ref INITIAL_CONTEXT_SETS: Vec<Vec<ContextSet>> = (0..3)
        .map(|init_type| {
            (0..=51)
                .map(|qp| ContextSet::compute(InitType(init_type), qp))
                .collect()
        })
        .collect();
}

impl ContextSet {
    /// Initial states for `init_type` at `slice_qp`, clipped to `[0, 51]`.
    pub fn new(init_type: InitType, slice_qp: i32) -> ContextSet {
        INITIAL_CONTEXT_SETS[init_type.index()][slice_qp.clamp(0, 51) as usize].clone()
    }

    fn compute(init_type: InitType, slice_qp: i32) -> ContextSet {
        let mut models = [ContextModel::default(); HEVC_CONTEXTS];
        for (model, &init_value) in models.iter_mut().zip(INIT_VALUES[init_type.index()].iter()) {
            *model = ContextModel::from_packed(init_context_state(init_value, slice_qp));
        }
        ContextSet(models)
    }

    pub fn models(&self) -> &[ContextModel] {
        &self.0
    }
}

impl Index<usize> for ContextSet {
    type Output = ContextModel;
    #[inline(always)]
    fn index(&self, idx: usize) -> &ContextModel {
        &self.0[idx]
    }
}

impl IndexMut<usize> for ContextSet {
    #[inline(always)]
    fn index_mut(&mut self, idx: usize) -> &mut ContextModel {
        &mut self.0[idx]
    }
}

/// Whether the states reached right before the CTU at `ctb_addr_ts` seed the
/// next wavefront row.
#[inline(always)]
pub fn is_sync_save_point(
    entropy_coding_sync_enabled_flag: bool,
    ctb_addr_ts: usize,
    ctb_width: usize,
) -> bool {
    let ctb_width = ctb_width.max(1);
    entropy_coding_sync_enabled_flag
        && (ctb_addr_ts % ctb_width == 2 || (ctb_width == 2 && ctb_addr_ts % ctb_width == 0))
}

#[derive(Clone, Debug)]
pub struct ContextStore {
    live: ContextSet,
    saved: ContextSet,
}

impl ContextStore {
    pub fn new(init_type: InitType, slice_qp: i32) -> ContextStore {
        let live = ContextSet::new(init_type, slice_qp);
        ContextStore {
            saved: live.clone(),
            live,
        }
    }

    #[inline(always)]
    pub fn live(&self) -> &ContextSet {
        &self.live
    }

    #[inline(always)]
    pub fn live_mut(&mut self) -> &mut ContextSet {
        &mut self.live
    }

    pub fn saved(&self) -> &ContextSet {
        &self.saved
    }

    pub fn save(&mut self) {
        debug_eprintln!("context store: save");
        self.saved.clone_from(&self.live);
    }

    pub fn load(&mut self) {
        debug_eprintln!("context store: load");
        self.live.clone_from(&self.saved);
    }

    pub fn reinit(&mut self, init_type: InitType, slice_qp: i32) {
        debug_eprintln!(
            "context store: reinit init_type={} qp={}",
            init_type.index(),
            slice_qp
        );
        self.live = ContextSet::new(init_type, slice_qp);
    }

    pub fn snapshot(&self) -> ContextSet {
        self.saved.clone()
    }

    pub fn load_from(&mut self, seed: &ContextSet) {
        self.saved.clone_from(seed);
        self.live.clone_from(seed);
    }

    /// Saves once decoding has advanced to `ctb_addr_ts`, if that is a wavefront
    /// save point.
    pub fn save_states(
        &mut self,
        ctb_addr_ts: usize,
        ctb_width: usize,
        entropy_coding_sync_enabled_flag: bool,
    ) -> bool {
        if is_sync_save_point(entropy_coding_sync_enabled_flag, ctb_addr_ts, ctb_width) {
            self.save();
            true
        } else {
            false
        }
    }
}
