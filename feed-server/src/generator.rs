use feed_core::Packet;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct GeneratorConfig {
    /// Максимальный относительный шаг цены за сделку (пример: 0.002 = 0.2%)
    pub(crate) max_rel_step: f64,
    /// Минимальная допустимая цена
    pub(crate) min_price: i32,
    /// Максимальный объём одной сделки
    pub(crate) max_quantity: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_rel_step: 0.002,
            min_price: 1,
            max_quantity: 500,
        }
    }
}

/// Генератор бэклога сделок: цена каждого тикера гуляет случайно.
pub(crate) struct PacketGenerator {
    cfg: GeneratorConfig,
    symbols: Vec<String>,
    prices: HashMap<String, i32>,
}

impl PacketGenerator {
    pub(crate) fn new(symbols: Vec<String>, cfg: GeneratorConfig) -> Self {
        let mut rng = rand::rng();

        let prices = symbols
            .iter()
            .map(|s| (s.clone(), rng.random_range(5000..50000)))
            .collect::<HashMap<_, _>>();

        Self {
            cfg,
            symbols,
            prices,
        }
    }

    /// сгенерировать пакеты с номерами 1..=count
    pub(crate) fn generate(&mut self, count: i32) -> Vec<Packet> {
        let mut rng = rand::rng();
        let mut out = Vec::with_capacity(usize::try_from(count).unwrap_or(0));

        for sequence in 1..=count {
            let Some(symbol) = self.symbols.choose(&mut rng).cloned() else {
                break;
            };
            let Some(price) = self.prices.get_mut(&symbol) else {
                break;
            };

            let delta = rng.random_range(-self.cfg.max_rel_step..self.cfg.max_rel_step);
            *price = (((1.0 + delta) * f64::from(*price)).round() as i32).max(self.cfg.min_price);

            out.push(Packet {
                side: if rng.random_bool(0.5) { "B" } else { "S" }.to_string(),
                quantity: rng.random_range(1..=self.cfg.max_quantity),
                price: *price,
                sequence,
                symbol,
            });
        }

        out
    }
}
