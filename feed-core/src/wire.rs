use std::collections::VecDeque;

pub use crate::constants::RECORD_LEN;
use crate::error::WireError;
use crate::types::Packet;

// Смещения полей внутри записи. Все целые big-endian.
const SYMBOL: std::ops::Range<usize> = 0..4;
const SIDE: std::ops::Range<usize> = 4..5;
const OFF_QUANTITY: usize = 5;
const OFF_PRICE: usize = 9;
const OFF_SEQUENCE: usize = 13;

/// Декодирует ровно одну запись.
///
/// ```text
/// [symbol: 4][side: 1][quantity: i32 BE][price: i32 BE][sequence: i32 BE]
/// ```
pub fn decode_packet(rec: &[u8; RECORD_LEN]) -> Packet {
    Packet {
        symbol: ascii(&rec[SYMBOL]),
        side: ascii(&rec[SIDE]),
        quantity: read_i32(rec, OFF_QUANTITY),
        price: read_i32(rec, OFF_PRICE),
        sequence: read_i32(rec, OFF_SEQUENCE),
    }
}

/// Обратная операция к [`decode_packet`]. Нужна симулятору и тестам.
pub fn encode_packet(p: &Packet) -> Result<[u8; RECORD_LEN], WireError> {
    let mut out = [0u8; RECORD_LEN];
    out[SYMBOL].copy_from_slice(fixed_ascii("symbol", &p.symbol, SYMBOL.len())?);
    out[SIDE].copy_from_slice(fixed_ascii("side", &p.side, SIDE.len())?);
    out[OFF_QUANTITY..OFF_QUANTITY + 4].copy_from_slice(&p.quantity.to_be_bytes());
    out[OFF_PRICE..OFF_PRICE + 4].copy_from_slice(&p.price.to_be_bytes());
    out[OFF_SEQUENCE..OFF_SEQUENCE + 4].copy_from_slice(&p.sequence.to_be_bytes());
    Ok(out)
}

impl Packet {
    /// Декодирует первую запись из среза; хвост после 17 байт игнорируется.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let rec: &[u8; RECORD_LEN] = buf
            .get(..RECORD_LEN)
            .and_then(|s| s.try_into().ok())
            .ok_or(WireError::PacketTooShort { len: buf.len() })?;
        Ok(decode_packet(rec))
    }
}

fn read_i32(rec: &[u8; RECORD_LEN], off: usize) -> i32 {
    i32::from_be_bytes([rec[off], rec[off + 1], rec[off + 2], rec[off + 3]])
}

// старший бит отбрасываем, как делает нестрогий ASCII-декодер
fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| (b & 0x7f) as char).collect()
}

fn fixed_ascii<'a>(field: &'static str, value: &'a str, width: usize) -> Result<&'a [u8], WireError> {
    if value.len() != width || !value.is_ascii() {
        return Err(WireError::BadField {
            field,
            width,
            value: value.to_string(),
        });
    }
    Ok(value.as_bytes())
}

/// Нарезка непрерывного потока байт на 17-байтовые записи.
///
/// TCP не гарантирует, что границы чанков совпадут с границами записей,
/// поэтому неполный хвост остаётся в буфере до следующего `push`.
#[derive(Debug, Default)]
pub struct RecordFramer {
    buf: VecDeque<u8>,
}

impl RecordFramer {
    /// Пустой буфер
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить очередной чанк
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend(chunk);
    }

    /// Достать следующую полную запись, если она уже накопилась
    pub fn next_packet(&mut self) -> Option<Packet> {
        if self.buf.len() < RECORD_LEN {
            return None;
        }
        let mut rec = [0u8; RECORD_LEN];
        for (dst, src) in rec.iter_mut().zip(self.buf.drain(..RECORD_LEN)) {
            *dst = src;
        }
        Some(decode_packet(&rec))
    }

    /// Все полные записи, накопленные к этому моменту
    pub fn drain(&mut self) -> impl Iterator<Item = Packet> + '_ {
        std::iter::from_fn(move || self.next_packet())
    }

    /// Сколько байт неполной записи ждёт продолжения
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Закрыть поток: неполный хвост выбрасывается, возвращается его длина.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf.clear();
        dropped
    }
}
