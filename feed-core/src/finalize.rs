use std::collections::HashSet;
use std::io::Write;

use crate::types::Packet;

/// Что делать с пакетами, пришедшими дважды (stream-all + resend)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// оставить все копии
    #[default]
    Keep,
    /// оставить первую полученную копию каждого номера
    FirstWins,
}

/// Стабильная сортировка: дубли сохраняют порядок вставки.
pub fn sort_by_sequence(packets: &mut [Packet]) {
    packets.sort_by_key(|p| p.sequence);
}

/// Удаляет повторные номера, оставляя первую копию.
pub fn dedup_by_sequence(packets: &mut Vec<Packet>) {
    let mut seen = HashSet::with_capacity(packets.len());
    packets.retain(|p| seen.insert(p.sequence));
}

/// Итоговый упорядоченный набор
pub fn finalize(mut packets: Vec<Packet>, policy: DuplicatePolicy) -> Vec<Packet> {
    if policy == DuplicatePolicy::FirstWins {
        dedup_by_sequence(&mut packets);
    }
    sort_by_sequence(&mut packets);
    packets
}

/// JSON-массив с отступом в 2 пробела
pub fn write_json<W: Write>(writer: W, packets: &[Packet]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, packets)
}

/// То же, что [`write_json`], но в память и с завершающим переводом строки
pub fn to_json_bytes(packets: &[Packet]) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_json(&mut out, packets)?;
    out.push(b'\n');
    Ok(out)
}
