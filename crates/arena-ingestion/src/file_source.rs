//! Saved arena pages on disk.
//!
//! Pages are stored one file per team as `team_<id>_arenapage.html` inside a
//! single directory, which is how the collector saves them.

use crate::config::pages_dir_from_env;
use crate::{error::IngestionError, DocumentSource};
use std::path::{Path, PathBuf};

/// Reads saved arena pages from a directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Source rooted at `ARENA_PAGES_DIR`.
    pub fn from_env() -> Self {
        Self::new(pages_dir_from_env())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a team's saved page.
    pub fn page_path(&self, team_id: &str) -> PathBuf {
        self.dir.join(format!("team_{team_id}_arenapage.html"))
    }

    /// Team ids of every saved page in the directory, sorted.
    pub async fn team_ids(&self) -> Result<Vec<String>, IngestionError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(id) = name
                .to_str()
                .and_then(|n| n.strip_prefix("team_"))
                .and_then(|n| n.strip_suffix("_arenapage.html"))
            else {
                continue;
            };
            if !id.is_empty() {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl DocumentSource for FileSource {
    async fn fetch_arena_page(&self, team_id: &str) -> Result<String, IngestionError> {
        let path = self.page_path(team_id);
        tracing::debug!("reading arena page {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(html),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IngestionError::NoData(format!(
                "no saved page for team {team_id} at {}",
                path.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path() {
        let source = FileSource::new("/tmp/pages");
        assert_eq!(
            source.page_path("27795"),
            PathBuf::from("/tmp/pages/team_27795_arenapage.html")
        );
    }

    #[tokio::test]
    async fn test_missing_page_is_no_data() {
        let dir = std::env::temp_dir().join("arena-ingestion-missing-page-test");
        let source = FileSource::new(dir);
        let result = source.fetch_arena_page("404").await;
        assert!(matches!(result, Err(IngestionError::NoData(_))));
    }

    #[tokio::test]
    async fn test_reads_saved_page() {
        let dir = std::env::temp_dir().join(format!("arena-ingestion-file-source-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let source = FileSource::new(&dir);
        tokio::fs::write(source.page_path("7"), "<html>saved</html>").await.unwrap();

        assert_eq!(source.fetch_arena_page("7").await.unwrap(), "<html>saved</html>");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_team_ids_from_file_names() {
        let dir = std::env::temp_dir().join(format!("arena-ingestion-team-ids-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let source = FileSource::new(&dir);
        for id in ["900", "27795"] {
            tokio::fs::write(source.page_path(id), "<html></html>").await.unwrap();
        }
        tokio::fs::write(dir.join("notes.txt"), "x").await.unwrap();

        assert_eq!(source.team_ids().await.unwrap(), vec!["27795", "900"]);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
