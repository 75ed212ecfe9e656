use crate::emission_context::Pair;
use crate::error::JobError;
use std::fmt::Display;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Human-readable output line of one pair
pub fn format_pair<K: Display, V: Display>(pair: &Pair<K, V>) -> String {
    format!("Key: {} Value: {}", pair.key, pair.value)
}

/// Write one line per pair, in sequence order, then flush and close the file
pub async fn write_pairs<K, V>(path: &Path, pairs: &[Pair<K, V>]) -> Result<(), JobError>
where
    K: Display,
    V: Display,
{
    let output_error = |source| JobError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    for pair in pairs {
        let mut line = format_pair(pair);
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(output_error)?;
    }
    writer.flush().await.map_err(output_error)?;
    writer.into_inner().sync_all().await.map_err(output_error)?;
    Ok(())
}
