use crate::error::JobError;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Ordered, bounded group of non-blank input records handed to one map task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: usize,
    pub records: Vec<String>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split lines into record groups of `chunk_size`, skipping blank and
/// whitespace-only lines. Only the last group may be shorter.
pub fn split_records<I, S>(lines: I, chunk_size: usize) -> Result<Vec<Vec<String>>, JobError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    if chunk_size == 0 {
        return Err(JobError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    let mut current = Vec::with_capacity(chunk_size);
    for line in lines {
        let line = line.into();
        if line.trim().is_empty() {
            continue;
        }
        current.push(line);
        if current.len() == chunk_size {
            chunks.push(std::mem::replace(
                &mut current,
                Vec::with_capacity(chunk_size),
            ));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}

/// Read one input file into record groups
pub async fn read_file(path: &Path, chunk_size: usize) -> Result<Vec<Vec<String>>, JobError> {
    if chunk_size == 0 {
        return Err(JobError::InvalidChunkSize);
    }

    let input_error = |source| JobError::Input {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).await.map_err(input_error)?;
    let mut lines = BufReader::new(file).lines();

    let mut records = Vec::new();
    while let Some(line) = lines.next_line().await.map_err(input_error)? {
        records.push(line);
    }
    split_records(records, chunk_size)
}

/// Read every input path into chunks numbered in path order, then line order.
///
/// Each path is chunked on its own, so no chunk spans two files. With `concurrent`
/// set the files are read by separate tasks; the result order does not change.
pub async fn read_chunks(
    paths: &[PathBuf],
    chunk_size: usize,
    concurrent: bool,
) -> Result<Vec<Chunk>, JobError> {
    let mut per_file = Vec::with_capacity(paths.len());

    if concurrent {
        let handles: Vec<(PathBuf, JoinHandle<Result<Vec<Vec<String>>, JobError>>)> = paths
            .iter()
            .cloned()
            .map(|path| {
                let task_path = path.clone();
                let handle =
                    tokio::spawn(async move { read_file(&task_path, chunk_size).await });
                (path, handle)
            })
            .collect();

        for (path, handle) in handles {
            let groups = handle.await.map_err(|e| JobError::Input {
                path,
                source: std::io::Error::other(e.to_string()),
            })??;
            per_file.push(groups);
        }
    } else {
        for path in paths {
            per_file.push(read_file(path, chunk_size).await?);
        }
    }

    Ok(per_file
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(id, records)| Chunk { id, records })
        .collect())
}
