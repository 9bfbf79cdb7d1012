use crate::config::{Config, Order};
use crate::{markdown, FlattenSummary, PostFlattener, PostFlattening};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

impl PostFlattener {
    pub fn from_config(config: Config) -> Self {
        let output_path = config.output_path();
        Self {
            output_path,
            order: config.output.order,
            strict: config.output.strict,
            ..Self::new(config.input.posts_path)
        }
    }

    pub fn new(posts_path: impl Into<PathBuf>) -> Self {
        let posts_path = posts_path.into();
        Self {
            output_path: posts_path.clone(),
            posts_path,
            order: Order::default(),
            strict: false,
        }
    }

    fn destination_for(&self, post_dir: &Path) -> Result<PathBuf> {
        let name = post_dir
            .file_name()
            .with_context(|| format!("Post directory {} has no name", post_dir.display()))?;
        let mut file_name = name.to_os_string();
        file_name.push(".md");
        Ok(self.output_path.join(file_name))
    }
}

impl PostFlattening for PostFlattener {
    fn flatten(&self) -> Result<FlattenSummary> {
        let mut summary = FlattenSummary::default();

        for post_dir in markdown::find_post_dirs(&self.posts_path, self.order)? {
            summary.posts_scanned += 1;

            let files = markdown::find_markdown_files(&post_dir, self.order)?;
            if files.is_empty() {
                tracing::debug!("No markdown in {}, skipping", post_dir.display());
                continue;
            }

            if self.strict && files.len() > 1 {
                let names: Vec<_> = files
                    .iter()
                    .filter_map(|f| f.file_name())
                    .map(|n| n.to_string_lossy())
                    .collect();
                bail!(
                    "Post {} has {} markdown files ({}), expected exactly one",
                    post_dir.display(),
                    files.len(),
                    names.join(", ")
                );
            }

            let dest = self.destination_for(&post_dir)?;

            // Every match is copied in turn; the last one is what survives.
            for file in &files {
                if let Some(name) = file.file_name() {
                    println!("{}", name.to_string_lossy());
                }

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                fs::copy(file, &dest).with_context(|| {
                    format!("Failed to copy {} to {}", file.display(), dest.display())
                })?;
                tracing::debug!("Copied {} -> {}", file.display(), dest.display());
                summary.files_copied += 1;
            }

            summary.outputs.push(dest);
        }

        Ok(summary)
    }
}
