use thiserror::Error;

/// Ошибки протокола запросов
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Запрос короче 2 байт
    #[error("request too short: {0} bytes")]
    ShortRequest(usize),

    /// Неизвестный тип вызова
    #[error("unknown call type: {0}")]
    UnknownCallType(u8),

    /// Номер не помещается в однобайтовый аргумент resend
    #[error("sequence {0} does not fit the one-byte resend argument (0..=255)")]
    ResendOutOfRange(i32),
}

/// Ошибки бинарного формата записей
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Запись короче 17 байт
    #[error("packet too short: {len} bytes")]
    PacketTooShort {
        /// фактическая длина
        len: usize,
    },

    /// Текстовое поле не влезает в фиксированную ширину или не ASCII
    #[error("field {field} must be {width} ASCII byte(s), got {value:?}")]
    BadField {
        /// имя поля
        field: &'static str,
        /// требуемая ширина
        width: usize,
        /// исходное значение
        value: String,
    },
}
