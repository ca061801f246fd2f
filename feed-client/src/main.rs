//! Точка входа `feed-client`.
//!
//! Жизненный цикл:
//! - парсинг CLI
//! - сессия `stream all` и поиск пропущенных номеров
//! - по одной сессии `resend` на каждый пропуск, строго по очереди
//! - сортировка и запись итогового JSON
//!
//! Любая ошибка сессии обрывает прогон: файл не пишется, код выхода ненулевой.

mod cli;
mod output;
mod recovery;
mod session;

use clap::Parser;
use env_logger::Env;
use log::{debug, error, info, warn};

use feed_core::finalize::finalize;

use crate::recovery::Recovery;
use crate::session::TcpTransport;

fn main() -> anyhow::Result<()> {
    // по умолчанию info, переопределяется через RUST_LOG
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    args.validate()?;

    match args.server_socket_addr() {
        Ok(addr) => debug!("{} resolves to {addr}", args.server),
        Err(e) => warn!("cannot resolve {} yet: {e}", args.server),
    }

    info!(
        "Starting feed-client: server={}, output={:?}, dedup={}",
        args.server, args.output, args.dedup
    );

    let mut transport = TcpTransport::new(args.server.clone(), args.read_timeout());

    let report = match Recovery::new(&mut transport).run() {
        Ok(r) => r,
        Err(e) => {
            error!("recovery aborted, no output written: {e}");
            return Err(e.into());
        }
    };

    info!(
        "streamed={} missing={} recovered={}",
        report.streamed,
        report.missing.len(),
        report.recovered
    );

    let packets = finalize(report.packets, args.duplicate_policy());
    output::write_output(&args.output, &packets)?;

    info!("output written to {:?} ({} packets)", args.output, packets.len());

    Ok(())
}
