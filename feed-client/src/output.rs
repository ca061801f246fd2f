use std::fs;
use std::path::Path;

use anyhow::Context;
use feed_core::Packet;
use feed_core::finalize::to_json_bytes;

/// Пишет итоговый набор. Сериализуем целиком в память до записи,
/// чтобы при ошибке не осталось обрезанного файла.
pub(crate) fn write_output(path: &Path, packets: &[Packet]) -> anyhow::Result<()> {
    let bytes = to_json_bytes(packets).context("serialize packets")?;
    fs::write(path, bytes).with_context(|| format!("write output {:?}", path))?;
    Ok(())
}
