use std::fmt;

use serde::{Deserialize, Serialize};

/// Одна сделка из фида.
///
/// Создаётся только декодированием 17-байтовой записи и дальше не меняется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Тикер, ровно 4 ASCII-символа (без обрезки нулей)
    pub symbol: String,
    /// Признак покупки/продажи, 1 символ; не интерпретируется
    #[serde(alias = "buySellIndicator")]
    pub side: String,
    /// Объём сделки
    pub quantity: i32,
    /// Цена с фиксированной точкой, масштаб не известен
    pub price: i32,
    /// Номер в фиде, начиная с 1; ключ упорядочивания
    pub sequence: i32,
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} qty={} px={}",
            self.sequence, self.symbol, self.side, self.quantity, self.price
        )
    }
}
