use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Ширина тикера в записи фида
pub const SYMBOL_WIDTH: usize = 4;

/// Чтение списка тикеров: по одному на строку, `#` — комментарий.
///
/// Тикер, который не укладывается ровно в 4 ASCII-символа, даёт `InvalidData`.
pub fn read_symbols<R: io::Read>(reader: R) -> io::Result<Vec<String>> {
    let mut set = BTreeSet::new();
    let buf = BufReader::new(reader);

    for line in buf.lines() {
        let line = line?;
        if let Some(s) = normalize_line(&line) {
            set.insert(checked(s)?);
        }
    }

    Ok(set.into_iter().collect())
}

/// Чтение тикеров из файла
pub fn read_symbols_from_path(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let f = File::open(path)?;
    read_symbols(f)
}

/// Парсит "AAPL, tsla, ,GOOG": trim, uppercase, без пустых, отсортировано и уникально.
pub fn parse_symbols_csv(raw: &str) -> io::Result<Vec<String>> {
    let mut set = BTreeSet::new();

    for part in raw.split(',') {
        let s = part.trim();
        if s.is_empty() {
            continue;
        }
        set.insert(checked(s.to_ascii_uppercase())?);
    }

    Ok(set.into_iter().collect())
}

fn normalize_line(line: &str) -> Option<String> {
    // "AAPL # comment" -> "AAPL"
    let s = line.split('#').next().unwrap_or("").trim();
    if s.is_empty() {
        return None;
    }

    Some(s.to_ascii_uppercase())
}

fn checked(symbol: String) -> io::Result<String> {
    if symbol.len() == SYMBOL_WIDTH && symbol.is_ascii() {
        Ok(symbol)
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("symbol must be {SYMBOL_WIDTH} ASCII chars: {symbol:?}"),
        ))
    }
}
