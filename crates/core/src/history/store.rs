use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::types::ConversionLog;
use crate::config::LogsConfig;

/// File name of the append-only log inside the configured log directory.
pub const LOG_FILE_NAME: &str = "conversion_log.txt";

/// Bounded in-memory history of conversion logs, optionally mirrored to a
/// text file.
pub struct LogStore {
    logs: RwLock<VecDeque<ConversionLog>>,
    max_logs: usize,
    log_dir: Option<PathBuf>,
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(&LogsConfig::default())
    }
}

impl LogStore {
    pub fn new(config: &LogsConfig) -> Self {
        Self {
            logs: RwLock::new(VecDeque::new()),
            max_logs: config.max_logs,
            log_dir: config.log_dir.clone(),
        }
    }

    /// Stores `log`, evicting the oldest entries beyond capacity.
    ///
    /// File mirroring is best effort: write failures are logged and the
    /// in-memory copy is kept regardless.
    pub async fn add(&self, log: ConversionLog) {
        if let Some(path) = self.log_file_path() {
            if let Err(e) = append_to_file(&path, &log.to_text()).await {
                tracing::warn!(path = %path.display(), "Failed to append conversion log: {}", e);
            }
        }

        let mut logs = self.logs.write().await;
        logs.push_back(log);
        while logs.len() > self.max_logs {
            logs.pop_front();
        }
    }

    /// All stored logs, oldest first.
    pub async fn list(&self) -> Vec<ConversionLog> {
        self.logs.read().await.iter().cloned().collect()
    }

    pub async fn last(&self) -> Option<ConversionLog> {
        self.logs.read().await.back().cloned()
    }

    pub async fn get(&self, id: &str) -> Option<ConversionLog> {
        self.logs.read().await.iter().find(|l| l.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.logs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.logs.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.logs.write().await.clear();
    }

    /// Text export of every stored log.
    pub async fn export(&self) -> String {
        self.logs
            .read()
            .await
            .iter()
            .map(ConversionLog::to_text)
            .collect()
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME))
    }
}

async fn append_to_file(path: &std::path::Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn log(id: &str) -> ConversionLog {
        let mut log = ConversionLog::new(id, Path::new("/in.mp4"), Path::new("/out.mkv"), "ffmpeg");
        log.finish(true, None);
        log
    }

    fn store(max_logs: usize, log_dir: Option<PathBuf>) -> LogStore {
        LogStore::new(&LogsConfig { max_logs, log_dir })
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let store = store(10, None);
        assert!(store.last().await.is_none());

        store.add(log("a")).await;
        store.add(log("b")).await;

        let ids: Vec<_> = store.list().await.into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.last().await.unwrap().id, "b");
        assert_eq!(store.get("a").await.unwrap().id, "a");
        assert!(store.get("zzz").await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = store(2, None);
        for id in ["a", "b", "c"] {
            store.add(log(id)).await;
        }
        let ids: Vec<_> = store.list().await.into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_clear_and_export() {
        let store = store(10, None);
        store.add(log("a")).await;
        store.add(log("b")).await;

        let export = store.export().await;
        assert!(export.contains("=== Conversion a ==="));
        assert!(export.contains("=== Conversion b ==="));

        store.clear().await;
        assert!(store.is_empty().await);
        assert!(store.export().await.is_empty());
    }

    #[tokio::test]
    async fn test_file_mirror_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let store = store(10, Some(log_dir.clone()));

        store.add(log("a")).await;
        store.add(log("b")).await;

        let path = store.log_file_path().unwrap();
        assert_eq!(path, log_dir.join(LOG_FILE_NAME));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.find("Conversion a").unwrap() < text.find("Conversion b").unwrap());
    }
}
