use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Scanner for finding script files with one extension under a root
pub struct FileScanner {
    root: PathBuf,
    extension: String,
}

impl FileScanner {
    /// `extension` is matched case-insensitively, with or without a leading dot.
    pub fn new(root: impl AsRef<Path>, extension: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_lowercase(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Scan the root for matching files (.gitignore aware), sorted by path.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true) // do not index hidden files by default
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false);
        builder.filter_entry(move |entry| !FileScanner::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !self.matches_extension(path) {
                        continue;
                    }

                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!(
            "Found {} .{} files under {}",
            files.len(),
            self.extension,
            self.root.display()
        );
        files
    }

    /// Root-relative path with forward slashes
    #[must_use]
    pub fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let normalized = relative.to_string_lossy().to_string();
        if normalized.contains('\\') {
            normalized.replace('\\', "/")
        } else {
            normalized
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        for (depth, component) in relative.components().enumerate() {
            if let std::path::Component::Normal(name) = component {
                let lowered = name.to_string_lossy().to_lowercase();
                if IGNORED_ANYWHERE.contains(&lowered.as_str())
                    || (depth == 0 && IGNORED_AT_ROOT.contains(&lowered.as_str()))
                {
                    log::debug!("Skipping {}", path.display());
                    return true;
                }
            }
        }
        false
    }
}

// VCS and editor metadata, skipped at any depth.
const IGNORED_ANYWHERE: &[&str] = &[".git", ".vs", ".idea", ".vscode", "node_modules"];

// Unity/.NET caches and build output; they only live at the project root, so
// same-named folders deeper in the tree are regular sources.
const IGNORED_AT_ROOT: &[&str] = &["library", "temp", "obj", "logs", "target"];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB
