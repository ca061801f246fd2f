use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use feed_core::Packet;
use feed_core::wire::encode_packet;
use predicates::prelude::*;

/// ------------------------------------------------------------
/// Минимальный фид в потоке теста: обслуживает ровно `connections`
/// соединений и закрывает listener.
/// ------------------------------------------------------------
struct Feed {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<[u8; 2]>>>,
    handle: JoinHandle<()>,
}

impl Feed {
    fn spawn(stream: Vec<i32>, resend: HashMap<u8, i32>, connections: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        let handle = thread::spawn(move || {
            for _ in 0..connections {
                let (mut s, _) = listener.accept().unwrap();
                let mut req = [0u8; 2];
                s.read_exact(&mut req).unwrap();
                log.lock().unwrap().push(req);

                match req {
                    [1, _] => {
                        // режем на 5 байт, чтобы записи ложились поперёк чанков
                        for chunk in records(&stream).chunks(5) {
                            s.write_all(chunk).unwrap();
                            s.flush().unwrap();
                        }
                    }
                    [2, arg] => {
                        if let Some(&seq) = resend.get(&arg) {
                            let _ = s.write_all(&records(&[seq]));
                        }
                    }
                    _ => {}
                }
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    fn finish(self) -> Vec<[u8; 2]> {
        self.handle.join().unwrap();
        let reqs = self.requests.lock().unwrap().clone();
        reqs
    }
}

fn packet(sequence: i32) -> Packet {
    Packet {
        symbol: ["AAPL", "MSFT", "TSLA"][sequence as usize % 3].to_string(),
        side: if sequence % 2 == 0 { "S" } else { "B" }.to_string(),
        quantity: 100 + sequence,
        price: 150_000 - sequence,
        sequence,
    }
}

fn records(seqs: &[i32]) -> Vec<u8> {
    seqs.iter()
        .flat_map(|&s| encode_packet(&packet(s)).unwrap())
        .collect()
}

fn client(addr: SocketAddr, output: &Path) -> Command {
    let mut cmd = Command::cargo_bin("feed-client").unwrap();
    cmd.arg("--server")
        .arg(addr.to_string())
        .arg("--output")
        .arg(output)
        .env("RUST_LOG", "info");
    cmd
}

fn read_output(path: &Path) -> Vec<Packet> {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn seqs(ps: &[Packet]) -> Vec<i32> {
    ps.iter().map(|p| p.sequence).collect()
}

#[test]
fn recovers_single_gap_and_writes_sorted_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output.json");
    let feed = Feed::spawn(vec![1, 2, 3, 5], HashMap::from([(4, 4)]), 2);

    client(feed.addr, &out)
        .assert()
        .success()
        .stderr(predicate::str::contains("missing sequences: [4]"));

    assert_eq!(feed.finish(), vec![[1, 0], [2, 4]]);

    let got = read_output(&out);
    assert_eq!(seqs(&got), vec![1, 2, 3, 4, 5]);
    assert_eq!(got[3], packet(4));
}

#[test]
fn contiguous_stream_needs_no_resend() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output.json");
    let feed = Feed::spawn((1..=8).collect(), HashMap::new(), 1);

    client(feed.addr, &out).assert().success();

    assert_eq!(feed.finish(), vec![[1, 0]]);
    let got = read_output(&out);
    assert_eq!(got, (1..=8).map(packet).collect::<Vec<_>>());
}

#[test]
fn dedup_flag_drops_duplicate_from_resend() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output.json");
    // на resend 2 фид по ошибке отвечает пакетом 3
    let feed = Feed::spawn(vec![1, 3], HashMap::from([(2, 3)]), 2);

    client(feed.addr, &out).arg("--dedup").assert().success();

    feed.finish();
    assert_eq!(seqs(&read_output(&out)), vec![1, 3]);
}

#[test]
fn failed_resend_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output.json");
    // после stream-all listener закрывается: resend не может подключиться
    let feed = Feed::spawn(vec![1, 4], HashMap::new(), 1);

    client(feed.addr, &out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("resend session for sequence 2 failed"));

    assert_eq!(feed.finish(), vec![[1, 0]]);
    assert!(!out.exists());
}

#[test]
fn unreachable_feed_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output.json");
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap()
    };

    client(addr, &out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("stream-all session failed"));

    assert!(!out.exists());
}
