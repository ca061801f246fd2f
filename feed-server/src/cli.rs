use anyhow::{Result, bail};
use clap::{ArgGroup, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config;

/// Feed Server - симулятор фида сделок: отдаёт бэклог по `stream all`
/// (с намеренными пропусками) и отдельные пакеты по `resend`.
#[derive(Parser, Debug, Clone)]
#[command(name = "feed-server", version, about)]
#[command(
    group(
        ArgGroup::new("symbols_source")
            .required(false)
            .multiple(false)
            .args(["symbols_file", "symbols"])
    )
)]
pub(crate) struct Args {
    /// TCP bind address, например 0.0.0.0:3000
    #[arg(long, default_value = config::TCP_BIND_ADDR)]
    pub(crate) bind: SocketAddr,

    /// Число пакетов в бэклоге (номера 1..=count)
    #[arg(long, default_value_t = config::DEFAULT_PACKET_COUNT,
          value_parser = clap::value_parser!(i32).range(1..))]
    pub(crate) count: i32,

    /// Номера, которые stream-all пропускает, например "4,9"
    #[arg(long, value_delimiter = ',')]
    pub(crate) drop: Vec<i32>,

    /// Вероятность случайно пропустить пакет в stream-all (последний не пропускается)
    #[arg(long, default_value_t = 0.0)]
    pub(crate) drop_rate: f64,

    /// Максимальный размер одного write, байт; записи режутся на произвольных границах
    #[arg(long, default_value_t = config::DEFAULT_MAX_CHUNK)]
    pub(crate) max_chunk: usize,

    /// Источник тикеров: файл (по одному на строку, поддержка # комментариев)
    #[arg(long, conflicts_with = "symbols")]
    pub(crate) symbols_file: Option<PathBuf>,

    /// Источник тикеров: CSV "AAPL, TSLA, GOOG"
    #[arg(long, conflicts_with = "symbols_file")]
    pub(crate) symbols: Option<String>,
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.drop_rate) {
            bail!("--drop-rate must be in [0, 1) (got: {})", self.drop_rate);
        }
        if self.max_chunk == 0 {
            bail!("--max-chunk must be positive");
        }
        if let Some(bad) = self.drop.iter().find(|s| !(1..=self.count).contains(*s)) {
            bail!("--drop {bad} is outside 1..={}", self.count);
        }
        Ok(())
    }
}
