use std::io;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

const DEFAULT_SYMBOLS: &str = include_str!("../assets/symbols.txt");

pub(crate) const TCP_BIND_ADDR: &str = "0.0.0.0:3000";

/// Сколько пакетов в бэклоге по умолчанию
pub(crate) const DEFAULT_PACKET_COUNT: i32 = 14;

/// Максимальный размер одного write при отдаче stream-all
pub(crate) const DEFAULT_MAX_CHUNK: usize = 64;

pub(crate) const TCP_READ_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const TCP_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) const ACCEPT_TICK: Duration = Duration::from_millis(50);

/// Источник тикеров: файл, CSV-строка или встроенный список
pub(crate) fn load_server_symbols(file: Option<&Path>, csv: Option<&str>) -> io::Result<Vec<String>> {
    match (file, csv) {
        (Some(p), _) => feed_core::symbols::read_symbols_from_path(p),
        (None, Some(raw)) => feed_core::symbols::parse_symbols_csv(raw),
        (None, None) => feed_core::symbols::read_symbols(Cursor::new(DEFAULT_SYMBOLS)),
    }
}
