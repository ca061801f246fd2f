use crate::book::FeedBook;
use crate::config::{ACCEPT_TICK, TCP_READ_TIMEOUT, TCP_WRITE_TIMEOUT};
use anyhow::Context;
use feed_core::REQUEST_LEN;
use feed_core::protocol::{Request, parse_request};
use log::{debug, info, warn};
use rand::Rng;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::thread;

// accept loop, одно соединение = один запрос
pub(crate) fn run_tcp_listener(
    listener: TcpListener,
    book: Arc<FeedBook>,
    max_chunk: usize,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    listener
        .set_nonblocking(true)
        .context("listener.set_nonblocking(true)")?;
    let mut conn_handles = Vec::new();

    loop {
        reap_finished(&mut conn_handles);

        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down tcp listener");
            break;
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                stream
                    .set_nonblocking(false)
                    .context("stream.set_nonblocking(false)")?;

                stream.set_nodelay(true).ok();
                stream.set_read_timeout(Some(TCP_READ_TIMEOUT)).ok();
                stream.set_write_timeout(Some(TCP_WRITE_TIMEOUT)).ok();

                let book = book.clone();
                let h = thread::spawn(move || {
                    if let Err(e) = handle_conn(stream, peer, &book, max_chunk) {
                        warn!("handle_conn {peer} error: {e}");
                    }
                });
                conn_handles.push(h);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // нет новых соединений прямо сейчас
                thread::sleep(ACCEPT_TICK);
            }
            Err(e) => {
                warn!("accept error: {e}");
                thread::sleep(ACCEPT_TICK);
            }
        }
    }

    for h in conn_handles {
        if let Err(panic) = h.join() {
            warn!("connection thread panicked: {:?}", panic);
        }
    }

    Ok(())
}

fn reap_finished(handles: &mut Vec<thread::JoinHandle<()>>) {
    let mut i = 0;
    while i < handles.len() {
        if handles[i].is_finished() {
            let h = handles.swap_remove(i);
            if let Err(panic) = h.join() {
                warn!("connection thread panicked: {:?}", panic);
            }
        } else {
            i += 1;
        }
    }
}

/// Читает один двухбайтовый запрос, отвечает и закрывает соединение.
/// На кривой запрос протокол ответа не предусматривает: просто закрываем.
pub(crate) fn handle_conn(
    mut stream: TcpStream,
    peer: SocketAddr,
    book: &FeedBook,
    max_chunk: usize,
) -> anyhow::Result<()> {
    let mut req = [0u8; REQUEST_LEN];
    if let Err(e) = stream.read_exact(&mut req) {
        debug!("{peer}: no request ({e})");
        return Ok(());
    }

    let request = match parse_request(&req) {
        Ok(r) => r,
        Err(e) => {
            warn!("{peer}: bad request {req:?}: {e}");
            return Ok(());
        }
    };

    match request {
        Request::StreamAll => {
            let bytes = book.stream_bytes()?;
            info!("{peer}: stream all, {} bytes", bytes.len());
            write_chunked(&mut stream, &bytes, max_chunk, &mut rand::rng())?;
        }
        Request::Resend { sequence } => match book.resend_record(i32::from(sequence))? {
            Some(rec) => {
                info!("{peer}: resend {sequence}");
                stream.write_all(&rec)?;
            }
            None => warn!("{peer}: resend {sequence}: no such packet"),
        },
    }

    stream.flush()?;
    stream.shutdown(std::net::Shutdown::Both).ok();
    Ok(())
}

/// Пишет порциями случайной длины 1..=max_chunk: границы записей не совпадают с write.
fn write_chunked<W: Write, R: Rng + ?Sized>(
    w: &mut W,
    bytes: &[u8],
    max_chunk: usize,
    rng: &mut R,
) -> std::io::Result<()> {
    let mut rest = bytes;
    while !rest.is_empty() {
        let n = rng.random_range(1..=max_chunk.max(1)).min(rest.len());
        let (head, tail) = rest.split_at(n);
        w.write_all(head)?;
        w.flush()?;
        rest = tail;
    }
    Ok(())
}
