use crate::library::logger::interface::Logger;
use std::error::Error;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const MAX_MODEL_BYTES: u64 = 256 * 1024 * 1024;

/// Downloads the extractor weights once; later runs reuse the file on disk.
pub fn ensure_model(
    url: &str,
    dest: &Path,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let logger = logger.with_namespace("model_store");

    if dest.is_file() {
        let _ = logger.info(&format!("Using cached model {}", dest.display()));
        return Ok(());
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create {}: {err}", parent.display()))?;
    }

    let _ = logger.info(&format!("Fetching {url}"));
    let response = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(60))
        .build()
        .get(url)
        .call()
        .map_err(|err| format!("Failed to download {url}: {err}"))?;

    let tmp = dest.with_extension("tmp");
    let written = write_limited(response.into_reader(), &tmp, MAX_MODEL_BYTES);
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    fs::rename(&tmp, dest).map_err(|err| format!("Failed to move {}: {err}", dest.display()))?;
    let _ = logger.info(&format!("Saved model to {}", dest.display()));
    Ok(())
}

fn write_limited(
    reader: impl Read,
    path: &Path,
    max_bytes: u64,
) -> Result<u64, Box<dyn Error + Send + Sync>> {
    let mut file =
        File::create(path).map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
    let mut limited = reader.take(max_bytes + 1);
    let copied = std::io::copy(&mut limited, &mut file)
        .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
    if copied > max_bytes {
        return Err(format!("Model exceeded {max_bytes} bytes").into());
    }
    file.flush()
        .map_err(|err| format!("Failed to flush {}: {err}", path.display()))?;
    Ok(copied)
}
