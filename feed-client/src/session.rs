use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use feed_core::{RecordFramer, Request};
use log::{debug, info, warn};
use thiserror::Error;

use crate::recovery::RecoveryState;

const READ_BUF_LEN: usize = 4096;

/// Что делать с соединением после очередного чанка
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// клиент закрывает соединение сам, не дожидаясь сервера
    Close,
}

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("connect to {server} failed: {source}")]
    Connect {
        server: String,
        #[source]
        source: io::Error,
    },

    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

/// Один обмен запрос/ответ поверх нового соединения.
///
/// `on_data` вызывается синхронно на каждый пришедший чанк; границы чанков
/// произвольные. Обмен завершается успешно, когда сервер закрыл соединение
/// или `on_data` вернул [`Flow::Close`].
pub(crate) trait Transport {
    fn exchange(
        &mut self,
        payload: &[u8],
        on_data: &mut dyn FnMut(&[u8]) -> Flow,
    ) -> Result<(), SessionError>;
}

pub(crate) struct TcpTransport {
    server: String,
    /// `None` — ждём сколько угодно
    read_timeout: Option<Duration>,
}

impl TcpTransport {
    pub(crate) fn new(server: impl Into<String>, read_timeout: Option<Duration>) -> Self {
        Self {
            server: server.into(),
            read_timeout,
        }
    }
}

impl Transport for TcpTransport {
    fn exchange(
        &mut self,
        payload: &[u8],
        on_data: &mut dyn FnMut(&[u8]) -> Flow,
    ) -> Result<(), SessionError> {
        let mut stream = TcpStream::connect(self.server.as_str()).map_err(|source| {
            warn!("connect to {} failed: {source}", self.server);
            SessionError::Connect {
                server: self.server.clone(),
                source,
            }
        })?;
        debug!("connected to {}", self.server);

        stream.set_nodelay(true).ok();
        stream.set_read_timeout(self.read_timeout)?;

        stream.write_all(payload)?;
        stream.flush()?;

        let mut buf = [0u8; READ_BUF_LEN];
        loop {
            let n = match stream.read(&mut buf) {
                Ok(0) => {
                    debug!("connection closed by server");
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("transport error on {}: {e}", self.server);
                    return Err(e.into());
                }
            };

            if on_data(&buf[..n]) == Flow::Close {
                stream.shutdown(Shutdown::Both).ok();
                debug!("connection closed by client");
                return Ok(());
            }
        }
    }
}

/// Сессия stream-all: все записи до закрытия соединения сервером.
/// Возвращает число декодированных пакетов.
pub(crate) fn stream_all<T: Transport + ?Sized>(
    transport: &mut T,
    state: &mut RecoveryState,
) -> Result<usize, SessionError> {
    let mut framer = RecordFramer::new();
    let mut count = 0;

    info!("requesting full stream");
    transport.exchange(&Request::StreamAll.encode(), &mut |chunk| {
        framer.push(chunk);
        for p in framer.drain() {
            state.record(p);
            count += 1;
        }
        Flow::Continue
    })?;

    let dropped = framer.finish();
    if dropped > 0 {
        warn!("stream ended inside a record; {dropped} trailing bytes discarded");
    }
    info!("stream complete: {count} packets");

    Ok(count)
}

/// Сессия resend: ровно одна запись, после неё соединение закрывает клиент.
/// Возвращает `false`, если сервер закрыл соединение раньше, чем пришла запись.
pub(crate) fn resend<T: Transport + ?Sized>(
    transport: &mut T,
    sequence: u8,
    state: &mut RecoveryState,
) -> Result<bool, SessionError> {
    let mut framer = RecordFramer::new();
    let mut got = None;

    info!("requesting resend for sequence {sequence}");
    transport.exchange(&Request::Resend { sequence }.encode(), &mut |chunk| {
        framer.push(chunk);
        match framer.next_packet() {
            Some(p) => {
                debug!("recovered {p}");
                got = Some(p.sequence);
                state.record(p);
                Flow::Close
            }
            None => Flow::Continue,
        }
    })?;

    match got {
        Some(s) if s == i32::from(sequence) => {
            info!("resend for sequence {sequence} complete");
            Ok(true)
        }
        Some(s) => {
            warn!("resend for sequence {sequence} returned sequence {s}");
            Ok(true)
        }
        None => {
            warn!(
                "resend for sequence {sequence} returned no record ({} bytes)",
                framer.pending()
            );
            Ok(false)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::{Reply, ScriptedTransport};
    use super::*;
    use feed_core::Packet;
    use feed_core::wire::encode_packet;
    use std::net::TcpListener;
    use std::thread;

    fn pkt(sequence: i32) -> Packet {
        Packet {
            symbol: "AAPL".to_string(),
            side: "B".to_string(),
            quantity: 10 * sequence,
            price: 1000 + sequence,
            sequence,
        }
    }

    fn records(seqs: &[i32]) -> Vec<u8> {
        seqs.iter()
            .flat_map(|&s| encode_packet(&pkt(s)).unwrap())
            .collect()
    }

    #[test]
    fn stream_all_decodes_records_split_across_chunks() {
        let bytes = records(&[1, 2, 3]);
        // 17 + 17 + 17 = 51, режем на 5 / 20 / 26
        let chunks = vec![bytes[..5].to_vec(), bytes[5..25].to_vec(), bytes[25..].to_vec()];
        let mut t = ScriptedTransport::new(vec![Reply::Chunks(chunks)]);
        let mut state = RecoveryState::default();

        let n = stream_all(&mut t, &mut state).unwrap();

        assert_eq!(n, 3);
        assert_eq!(t.payloads, vec![vec![1, 0]]);
        assert_eq!(state.packets(), &[pkt(1), pkt(2), pkt(3)]);
        assert_eq!(state.max_sequence(), 3);
    }

    #[test]
    fn stream_all_discards_trailing_partial_record() {
        let mut bytes = records(&[1, 2]);
        bytes.extend_from_slice(&[0xAA; 9]);
        let mut t = ScriptedTransport::new(vec![Reply::Chunks(vec![bytes])]);
        let mut state = RecoveryState::default();

        assert_eq!(stream_all(&mut t, &mut state).unwrap(), 2);
        assert_eq!(state.packets().len(), 2);
    }

    #[test]
    fn stream_all_propagates_transport_error() {
        let mut t = ScriptedTransport::new(vec![Reply::FailAfter(
            vec![records(&[1])],
            io::ErrorKind::ConnectionReset,
        )]);
        let mut state = RecoveryState::default();

        let err = stream_all(&mut t, &mut state).unwrap_err();
        assert!(matches!(err, SessionError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn resend_closes_after_first_complete_record() {
        let bytes = records(&[4]);
        let chunks = vec![bytes[..10].to_vec(), bytes[10..].to_vec(), records(&[99])];
        let mut t = ScriptedTransport::new(vec![Reply::Chunks(chunks)]);
        let mut state = RecoveryState::default();

        assert!(resend(&mut t, 4, &mut state).unwrap());

        assert_eq!(t.payloads, vec![vec![2, 4]]);
        // третий чанк не читается: соединение уже закрыто клиентом
        assert_eq!(t.delivered, vec![2]);
        assert_eq!(state.packets(), &[pkt(4)]);
    }

    #[test]
    fn resend_without_record_contributes_nothing() {
        let mut t = ScriptedTransport::new(vec![Reply::Chunks(vec![vec![1, 2, 3]])]);
        let mut state = RecoveryState::default();

        assert!(!resend(&mut t, 7, &mut state).unwrap());
        assert!(state.packets().is_empty());
    }

    #[test]
    fn tcp_transport_sends_payload_and_reads_until_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let body = records(&[1, 2]);
        let reply = body.clone();

        let h = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            let mut req = [0u8; 2];
            s.read_exact(&mut req).unwrap();
            // отдаём запись порциями, разрезая её посередине
            s.write_all(&reply[..9]).unwrap();
            s.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
            s.write_all(&reply[9..]).unwrap();
            req
        });

        let mut t = TcpTransport::new(addr.to_string(), Some(Duration::from_secs(5)));
        let mut received = Vec::new();
        t.exchange(&[1, 0], &mut |chunk| {
            received.extend_from_slice(chunk);
            Flow::Continue
        })
        .unwrap();

        assert_eq!(h.join().unwrap(), [1, 0]);
        assert_eq!(received, body);
    }

    #[test]
    fn tcp_transport_reports_connect_failure() {
        // занимаем порт и сразу освобождаем: подключаться некуда
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap()
        };

        let mut t = TcpTransport::new(addr.to_string(), None);
        let err = t.exchange(&[1, 0], &mut |_| Flow::Continue).unwrap_err();
        assert!(matches!(err, SessionError::Connect { .. }));
    }
}
