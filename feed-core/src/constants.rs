/// Длина одной записи пакета на проводе
pub const RECORD_LEN: usize = 17;

/// Длина запроса клиента
pub const REQUEST_LEN: usize = 2;

/// Адрес фида по умолчанию
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

/// Имя итогового файла по умолчанию
pub const DEFAULT_OUTPUT_FILE: &str = "output.json";
