//! Точка входа `feed-server`: симулятор фида сделок для локальных прогонов клиента.

mod book;
mod cli;
mod config;
mod generator;
mod tcp;

use std::net::TcpListener;
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use crate::book::{FeedBook, plan_drops};
use crate::generator::{GeneratorConfig, PacketGenerator};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let args = cli::Args::parse();
    args.validate()?;

    let symbols = config::load_server_symbols(args.symbols_file.as_deref(), args.symbols.as_deref())
        .context("load symbols")?;
    if symbols.is_empty() {
        anyhow::bail!("symbols list is empty");
    }

    let packets = PacketGenerator::new(symbols, GeneratorConfig::default()).generate(args.count);
    let dropped = plan_drops(args.count, &args.drop, args.drop_rate, &mut rand::rng());
    if dropped.iter().any(|&s| s > i32::from(u8::MAX)) {
        warn!("some dropped sequences are above 255 and cannot be requested via resend");
    }

    let book = Arc::new(FeedBook::new(packets, dropped));
    info!(
        "feed-server: {} packets, stream-all drops {:?}",
        book.len(),
        book.dropped()
    );

    let listener =
        TcpListener::bind(args.bind).with_context(|| format!("bind TCP listener {}", args.bind))?;
    info!("listening on {}", args.bind);

    tcp::run_tcp_listener(listener, book, args.max_chunk, shutdown)
}
