use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use feed_core::DuplicatePolicy;

/// Feed Client - забирает весь бэклог сделок у фида, дозапрашивает пропуски
/// по одному и пишет упорядоченный набор в JSON.
///
/// Каждый обмен идёт по новому TCP-соединению, строго последовательно.
#[derive(Parser, Debug, Clone)]
#[command(name = "feed-client", version, about)]
pub(crate) struct Args {
    /// TCP адрес фида, например 127.0.0.1:3000 или feed.example.com:3000
    #[arg(long, env = "FEED_SERVER", default_value = feed_core::DEFAULT_SERVER_ADDR)]
    pub(crate) server: String,

    /// Куда записать итоговый JSON
    #[arg(long, env = "FEED_OUTPUT", default_value = feed_core::DEFAULT_OUTPUT_FILE)]
    pub(crate) output: PathBuf,

    /// Оставлять только первую копию каждого номера
    #[arg(long)]
    pub(crate) dedup: bool,

    /// Таймаут чтения на соединение, мс. По умолчанию ждём без ограничения
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) read_timeout_ms: Option<u64>,
}

impl Args {
    /// Валидация аргументов (server выглядит как HOST:PORT, каталог для output существует)
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("--server is empty");
        }
        if !self.server.contains(':') {
            bail!("--server must look like HOST:PORT (got: {})", self.server);
        }

        if self.output.as_os_str().is_empty() {
            bail!("--output is empty");
        }
        if let Some(dir) = self.output.parent().filter(|d| !d.as_os_str().is_empty()) {
            let md = std::fs::metadata(dir)
                .with_context(|| format!("output directory not found: {:?}", dir))?;
            if !md.is_dir() {
                bail!("output parent is not a directory: {:?}", dir);
            }
        }

        Ok(())
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub(crate) fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.dedup {
            DuplicatePolicy::FirstWins
        } else {
            DuplicatePolicy::Keep
        }
    }

    /// Резолвим заранее только ради понятной ошибки; соединения открываются по имени
    pub(crate) fn server_socket_addr(&self) -> std::io::Result<SocketAddr> {
        self.server
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"))
    }
}
