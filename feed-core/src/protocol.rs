use crate::constants::REQUEST_LEN;
use crate::error::ProtocolError;

/// Тег типа вызова в первом байте запроса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CallType {
    /// отдать весь текущий бэклог и закрыть соединение
    StreamAll = 1,
    /// переотправить один пакет по номеру
    Resend = 2,
}

impl TryFrom<u8> for CallType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(CallType::StreamAll),
            2 => Ok(CallType::Resend),
            other => Err(ProtocolError::UnknownCallType(other)),
        }
    }
}

/// Запрос клиента к фиду
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// весь бэклог
    StreamAll,
    /// один пакет по номеру
    Resend {
        /// Аргумент однобайтовый: номера выше 255 адресовать нельзя
        sequence: u8,
    },
}

impl Request {
    /// Собирает resend-запрос, проверяя что номер влезает в байт.
    pub fn resend(sequence: i32) -> Result<Self, ProtocolError> {
        resend_arg(sequence).map(|sequence| Request::Resend { sequence })
    }

    /// Два байта для отправки на провод
    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        match *self {
            Request::StreamAll => encode_request(CallType::StreamAll as u8, 0),
            Request::Resend { sequence } => encode_request(CallType::Resend as u8, sequence),
        }
    }
}

/// Формат запроса: `[call_type: u8][arg: u8]`.
///
/// `call_type` не проверяется, вызывающий отвечает за то, что передаёт 1 или 2.
pub fn encode_request(call_type: u8, resend_arg: u8) -> [u8; REQUEST_LEN] {
    [call_type, resend_arg]
}

/// Номер пакета как однобайтовый аргумент resend.
pub fn resend_arg(sequence: i32) -> Result<u8, ProtocolError> {
    u8::try_from(sequence).map_err(|_| ProtocolError::ResendOutOfRange(sequence))
}

/// Разбор запроса на стороне сервера. Лишние байты после первых двух игнорируются.
pub fn parse_request(buf: &[u8]) -> Result<Request, ProtocolError> {
    let [tag, arg] = match buf {
        [tag, arg, ..] => [*tag, *arg],
        _ => return Err(ProtocolError::ShortRequest(buf.len())),
    };

    match CallType::try_from(tag)? {
        CallType::StreamAll => Ok(Request::StreamAll),
        CallType::Resend => Ok(Request::Resend { sequence: arg }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_request_writes_tag_and_arg() {
        assert_eq!(encode_request(1, 0), [1, 0]);
        assert_eq!(encode_request(2, 4), [2, 4]);
        // тип вызова не валидируется
        assert_eq!(encode_request(9, 7), [9, 7]);
    }

    #[test]
    fn stream_all_carries_zero_arg() {
        assert_eq!(Request::StreamAll.encode(), [1, 0]);
        assert_eq!(CallType::StreamAll as u8, 1);
    }

    #[test]
    fn resend_accepts_byte_range_only() {
        assert_eq!(Request::resend(4).unwrap().encode(), [2, 4]);
        assert_eq!(Request::resend(255).unwrap().encode(), [2, 255]);
        assert_eq!(Request::resend(0).unwrap(), Request::Resend { sequence: 0 });

        assert_eq!(
            Request::resend(256).unwrap_err(),
            ProtocolError::ResendOutOfRange(256)
        );
        assert_eq!(
            Request::resend(-1).unwrap_err(),
            ProtocolError::ResendOutOfRange(-1)
        );
    }

    #[test]
    fn parse_request_inverts_encode() {
        assert_eq!(parse_request(&[1, 0]).unwrap(), Request::StreamAll);
        assert_eq!(parse_request(&[1, 99]).unwrap(), Request::StreamAll);
        assert_eq!(
            parse_request(&[2, 17, 0xff]).unwrap(),
            Request::Resend { sequence: 17 }
        );
    }

    #[test]
    fn parse_request_rejects_short_and_unknown() {
        assert_eq!(parse_request(&[]).unwrap_err(), ProtocolError::ShortRequest(0));
        assert_eq!(parse_request(&[1]).unwrap_err(), ProtocolError::ShortRequest(1));
        assert_eq!(
            parse_request(&[3, 0]).unwrap_err(),
            ProtocolError::UnknownCallType(3)
        );
    }
}
