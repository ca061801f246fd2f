use feed_core::wire::{RECORD_LEN, encode_packet};
use feed_core::{Packet, WireError};
use rand::Rng;
use std::collections::{BTreeSet, HashMap};

/// Бэклог фида: все пакеты плюс номера, которые stream-all "теряет".
#[derive(Debug)]
pub(crate) struct FeedBook {
    packets: Vec<Packet>,
    by_sequence: HashMap<i32, usize>,
    dropped: BTreeSet<i32>,
}

impl FeedBook {
    pub(crate) fn new(packets: Vec<Packet>, dropped: BTreeSet<i32>) -> Self {
        let by_sequence = packets
            .iter()
            .enumerate()
            .map(|(i, p)| (p.sequence, i))
            .collect();

        Self {
            packets,
            by_sequence,
            dropped,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.packets.len()
    }

    pub(crate) fn dropped(&self) -> &BTreeSet<i32> {
        &self.dropped
    }

    /// Ответ на stream-all: записи подряд, без пропущенных номеров.
    pub(crate) fn stream_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut out = Vec::with_capacity(self.packets.len() * RECORD_LEN);
        for p in self.packets.iter().filter(|p| !self.dropped.contains(&p.sequence)) {
            out.extend_from_slice(&encode_packet(p)?);
        }
        Ok(out)
    }

    /// Ответ на resend; `None`, если такого номера нет.
    pub(crate) fn resend_record(&self, sequence: i32) -> Result<Option<[u8; RECORD_LEN]>, WireError> {
        self.by_sequence
            .get(&sequence)
            .map(|&i| encode_packet(&self.packets[i]))
            .transpose()
    }
}

/// Явные пропуски плюс случайные с вероятностью `rate`.
/// Последний номер случайно не теряется, иначе клиент не узнает верхнюю границу.
pub(crate) fn plan_drops<R: Rng + ?Sized>(
    count: i32,
    explicit: &[i32],
    rate: f64,
    rng: &mut R,
) -> BTreeSet<i32> {
    let mut out: BTreeSet<i32> = explicit.iter().copied().collect();
    if rate > 0.0 {
        out.extend((1..count).filter(|_| rng.random_bool(rate)));
    }
    out
}
