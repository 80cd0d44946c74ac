use super::bool_decoder::*;
use super::context::*;
use super::diagnostics::DiagnosticSink;
use super::slice_header::*;
use super::syntax::SyntaxDecoder;
use debug_print::*;

pub struct SliceEntropyDecoder<'a> {
    engine: CabacEngine<'a>,
    store: ContextStore,
    params: SliceEntropyParams,
}

impl<'a> SliceEntropyDecoder<'a> {
    pub fn new(data: &'a [u8], params: SliceEntropyParams) -> SliceEntropyDecoder<'a> {
        let store = ContextStore::new(params.init_type(), params.slice_qp);
        SliceEntropyDecoder::with_store(data, params, store)
    }

    /// Continues from the states left by the previous slice segment, as a
    /// dependent slice segment does.
    pub fn with_store(
        data: &'a [u8],
        params: SliceEntropyParams,
        store: ContextStore,
    ) -> SliceEntropyDecoder<'a> {
        SliceEntropyDecoder {
            engine: CabacEngine::new(data),
            store,
            params,
        }
    }

    fn reinit_states(&mut self) {
        self.store.reinit(self.params.init_type(), self.params.slice_qp);
    }

    pub fn start_ctu(&mut self, ctb_addr_ts: usize) {
        let tile_start = self.params.is_tile_start(ctb_addr_ts);
        let row_start = self.params.is_row_start(ctb_addr_ts);
        let single_ctb_row = self.params.ctb_width == 1;

        if ctb_addr_ts == self.params.slice_ctb_addr_ts {
            self.engine.init_after_header(self.params.slice_header_bits);
            if !self.params.dependent_slice_segment_flag || tile_start {
                self.reinit_states();
            } else if !self.params.first_slice_in_pic_flag && row_start {
                if single_ctb_row {
                    self.reinit_states();
                } else {
                    self.store.load();
                }
            }
            return;
        }

        if tile_start || row_start {
            if self.engine.state() != EngineState::Terminated && !self.engine.decode_terminate() {
                debug_eprintln!("slice: end_of_subset_one_bit missing before CTU {}", ctb_addr_ts);
            }
            self.engine.reinit();
        }
        if tile_start {
            debug_eprintln!("slice: tile starts at CTU {}", ctb_addr_ts);
            self.reinit_states();
        } else if row_start {
            if single_ctb_row {
                self.reinit_states();
            } else {
                self.store.load();
            }
        }
    }

    /// Saves the states for the next wavefront row after the CTU at
    /// `ctb_addr_ts` when it is the row's sync point.
    pub fn end_ctu(&mut self, ctb_addr_ts: usize) -> bool {
        self.store.save_states(
            ctb_addr_ts + 1,
            self.params.ctb_width,
            self.params.entropy_coding_sync_enabled_flag,
        )
    }

    pub fn syntax<'b>(
        &'b mut self,
        sink: &'b mut dyn DiagnosticSink,
    ) -> SyntaxDecoder<'b, CabacEngine<'a>> {
        SyntaxDecoder::new(&mut self.engine, self.store.live_mut(), sink)
    }

    pub fn params(&self) -> &SliceEntropyParams {
        &self.params
    }

    pub fn engine(&self) -> &CabacEngine<'a> {
        &self.engine
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn into_store(self) -> ContextStore {
        self.store
    }
}
