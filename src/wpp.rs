use super::context::ContextSet;
use debug_print::*;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

pub struct RowSeedSender(SyncSender<ContextSet>);

pub struct RowSeedReceiver(Receiver<ContextSet>);

pub fn row_handoff() -> (RowSeedSender, RowSeedReceiver) {
    let (tx, rx) = sync_channel(1);
    (RowSeedSender(tx), RowSeedReceiver(rx))
}

impl RowSeedSender {
    pub fn publish(self, seed: ContextSet) {
        if self.0.send(seed).is_err() {
            debug_eprintln!("wpp: next row is gone, seed dropped");
        }
    }
}

impl RowSeedReceiver {
    /// Blocks until the row above has saved its states. `None` if it
    /// stopped without reaching its sync point.
    pub fn wait(self) -> Option<ContextSet> {
        self.0.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::super::bool_coder::BoolCoder;
    use super::super::bool_decoder::*;
    use super::super::context::*;
    use super::super::slice_header::SliceType;
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::thread;

    const CTB_WIDTH: usize = 4;

    fn random_row(rng: &mut StdRng) -> Vec<Vec<(usize, bool)>> {
        (0..CTB_WIDTH)
            .map(|_| {
                (0..rng.gen_range(8..32))
                    .map(|_| (rng.gen_range(0..6), rng.gen_bool(0.8)))
                    .collect()
            })
            .collect()
    }

    fn encode_row(store: &mut ContextStore, row: &[Vec<(usize, bool)>]) -> Vec<u8> {
        let mut coder = BoolCoder::new();
        for (x, ctu) in row.iter().enumerate() {
            for &(ctx, bin) in ctu {
                coder.encode_decision(&mut store.live_mut()[ctx], bin);
            }
            store.save_states(x + 1, CTB_WIDTH, true);
        }
        coder.encode_terminate(true);
        coder.into_bytes()
    }

    fn decode_row(
        data: &[u8],
        store: &mut ContextStore,
        row: &[Vec<(usize, bool)>],
        seed_to: Option<RowSeedSender>,
    ) {
        let mut engine = CabacEngine::new(data);
        engine.init_decoder();
        let mut seed_to = seed_to;
        for (x, ctu) in row.iter().enumerate() {
            for &(ctx, bin) in ctu {
                assert_eq!(engine.decode_decision(&mut store.live_mut()[ctx]), bin);
            }
            if store.save_states(x + 1, CTB_WIDTH, true) {
                if let Some(sender) = seed_to.take() {
                    sender.publish(store.snapshot());
                }
            }
        }
        assert!(engine.decode_terminate());
    }

    #[test]
    fn rows_decode_on_separate_threads() {
        let mut rng = StdRng::seed_from_u64(42);
        let rows = [random_row(&mut rng), random_row(&mut rng)];
        let init_type = InitType::derive(SliceType::B, false);

        let mut store = ContextStore::new(init_type, 33);
        let row0_data = encode_row(&mut store, &rows[0]);
        store.load();
        let row1_data = encode_row(&mut store, &rows[1]);
        let expected_row1 = store.live().clone();

        let (sender, receiver) = row_handoff();
        let row0 = rows[0].clone();
        let upper = thread::spawn(move || {
            let mut store = ContextStore::new(init_type, 33);
            decode_row(&row0_data, &mut store, &row0, Some(sender));
        });
        let row1 = rows[1].clone();
        let lower = thread::spawn(move || {
            let seed = receiver.wait().expect("row 0 publishes its states");
            let mut store = ContextStore::new(init_type, 33);
            store.load_from(&seed);
            decode_row(&row1_data, &mut store, &row1, None);
            store.live().clone()
        });
        upper.join().unwrap();
        assert_eq!(lower.join().unwrap(), expected_row1);
    }

    #[test]
    fn dropped_sender_yields_none() {
        let (sender, receiver) = row_handoff();
        drop(sender);
        assert_eq!(receiver.wait(), None);
    }

    #[test]
    fn publish_does_not_block_without_consumer() {
        let (sender, receiver) = row_handoff();
        let seed = ContextSet::new(InitType::derive(SliceType::I, false), 26);
        sender.publish(seed.clone());
        assert_eq!(receiver.wait(), Some(seed));
    }
}
