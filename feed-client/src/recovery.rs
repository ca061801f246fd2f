use feed_core::gaps::SequenceTracker;
use feed_core::protocol::resend_arg;
use feed_core::{Packet, ProtocolError};
use log::info;
use thiserror::Error;

use crate::session::{self, SessionError, Transport};

#[derive(Debug, Error)]
pub(crate) enum RecoveryError {
    #[error("stream-all session failed: {0}")]
    StreamAll(#[source] SessionError),

    #[error("resend session for sequence {sequence} failed: {source}")]
    Resend {
        sequence: i32,
        #[source]
        source: SessionError,
    },

    /// Пропуск за пределами однобайтового аргумента resend
    #[error("cannot request resend: {0}")]
    Unaddressable(#[from] ProtocolError),
}

/// Всё, что накоплено за прогон: пакеты в порядке получения и номера.
#[derive(Debug, Default)]
pub(crate) struct RecoveryState {
    packets: Vec<Packet>,
    tracker: SequenceTracker,
}

impl RecoveryState {
    pub(crate) fn record(&mut self, p: Packet) {
        self.tracker.observe(p.sequence);
        self.packets.push(p);
    }

    #[cfg(test)]
    pub(crate) fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub(crate) fn max_sequence(&self) -> i32 {
        self.tracker.max_sequence()
    }

    pub(crate) fn missing_iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.tracker.missing_iter()
    }
}

#[derive(Debug)]
pub(crate) struct RecoveryReport {
    /// неотсортированные, дубли возможны
    pub(crate) packets: Vec<Packet>,
    pub(crate) streamed: usize,
    pub(crate) missing: Vec<i32>,
    pub(crate) recovered: usize,
}

/// Один прогон: stream-all, затем по одному resend на каждый пропуск,
/// строго последовательно. Первая же ошибка обрывает прогон.
pub(crate) struct Recovery<'t, T: Transport + ?Sized> {
    transport: &'t mut T,
    state: RecoveryState,
}

impl<'t, T: Transport + ?Sized> Recovery<'t, T> {
    pub(crate) fn new(transport: &'t mut T) -> Self {
        Self {
            transport,
            state: RecoveryState::default(),
        }
    }

    pub(crate) fn run(mut self) -> Result<RecoveryReport, RecoveryError> {
        let streamed = session::stream_all(&mut *self.transport, &mut self.state)
            .map_err(RecoveryError::StreamAll)?;

        info!("max sequence {}", self.state.max_sequence());

        // все номера проверяются до первого соединения; перебор ленивый и
        // обрывается на первом номере, не влезающем в байт
        let plan = self
            .state
            .missing_iter()
            .map(|s| resend_arg(s).map(|arg| (s, arg)))
            .collect::<Result<Vec<(i32, u8)>, _>>()?;

        let missing: Vec<i32> = plan.iter().map(|&(s, _)| s).collect();
        info!("missing sequences: {:?}", missing);

        let mut recovered = 0;
        for (sequence, arg) in plan {
            let got = session::resend(&mut *self.transport, arg, &mut self.state)
                .map_err(|source| RecoveryError::Resend { sequence, source })?;
            if got {
                recovered += 1;
            }
        }

        Ok(RecoveryReport {
            packets: self.state.packets,
            streamed,
            missing,
            recovered,
        })
    }
}
