//! # feed-core
//!
//! Базовые типы и бинарный протокол для клиента фида сделок и симулятора фида.
//!
//! Этот крейт содержит:
//!
//! - [`protocol`] — двухбайтовые запросы `stream all` / `resend N`
//! - [`wire`] — 17-байтовые записи пакетов и нарезка потока на записи
//! - [`gaps`] — поиск пропущенных номеров
//! - [`finalize`] — сортировка, опциональная дедупликация и JSON
//! - [`symbols`] — чтение и нормализация списка тикеров
//! - [`types`] — доменные типы
//! - [`error`] — типы ошибок `feed-core`
//!
//! ## Пример: запрос и запись
//!
//! ```rust
//! use feed_core::protocol::Request;
//! use feed_core::wire::{decode_packet, encode_packet};
//! use feed_core::Packet;
//!
//! assert_eq!(Request::StreamAll.encode(), [1, 0]);
//! assert_eq!(Request::resend(4).unwrap().encode(), [2, 4]);
//!
//! let p = Packet {
//!     symbol: "AAPL".to_string(),
//!     side: "B".to_string(),
//!     quantity: 50,
//!     price: 100,
//!     sequence: 1,
//! };
//! let bytes = encode_packet(&p).unwrap();
//! assert_eq!(decode_packet(&bytes), p);
//! ```
//!
//! ## Пример: пропуски
//!
//! ```rust
//! use feed_core::gaps::SequenceTracker;
//!
//! let mut t = SequenceTracker::new();
//! for s in [1, 2, 3, 5] {
//!     t.observe(s);
//! }
//! assert_eq!(t.missing_iter().collect::<Vec<_>>(), vec![4]);
//! ```
//!
//! ## Дизайн
//!
//! Как и раньше, здесь только чистые типы, кодеки и утилитарщина:
//! без сокетов, потоков и runtime. Сеть живёт в `feed-client` / `feed-server`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Запросы клиента к фиду.
pub mod protocol;

/// Бинарный формат записей и нарезка потока.
pub mod wire;

/// Поиск пропущенных номеров.
pub mod gaps;

/// Упорядочивание и сериализация итогового набора.
pub mod finalize;

/// Чтение/нормализация списка тикеров.
pub mod symbols;

/// Доменные типы.
pub mod types;

/// Ошибки `feed-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{DEFAULT_OUTPUT_FILE, DEFAULT_SERVER_ADDR, RECORD_LEN, REQUEST_LEN};

// --- Re-exports (публичный фасад API) ---

pub use crate::error::{ProtocolError, WireError};
pub use crate::finalize::DuplicatePolicy;
pub use crate::protocol::Request;
pub use crate::types::Packet;
pub use crate::wire::RecordFramer;
