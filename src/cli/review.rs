use curator::{
    domain::LinkedPathPreview,
    linking::StalePreview,
    storage::{FileStore, PathRepository, Repository},
};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Review {
    /// Refresh every stale preview from its linked path
    #[arg(long)]
    accept: bool,

    /// Only review links owned by this learning path
    #[arg(long)]
    path: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table", conflicts_with = "accept")]
    output: OutputFormat,

    /// Quiet mode: output only PATH RESOURCE TARGET triples
    #[arg(long, short, conflicts_with = "accept")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Review {
    #[instrument(skip(repository))]
    pub fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        if self.accept {
            return self.run_accept(repository);
        }

        let mut stale = repository.stale_previews()?;
        if let Some(path) = &self.path {
            stale.retain(|preview| &preview.path == path.as_str());
        }

        if stale.is_empty() {
            println!("{}", "✅ No stale previews.".success());
            return Ok(());
        }

        if self.quiet {
            for preview in &stale {
                println!("{} {} {}", preview.path, preview.resource, preview.target);
            }
            std::process::exit(2);
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&stale)?,
            OutputFormat::Table => Self::output_table(&stale),
        }

        // Exit with code 2 to signal stale previews (for scripts)
        std::process::exit(2);
    }

    fn run_accept(&self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let updated = match &self.path {
            None => repository.refresh_previews()?,
            Some(path) => {
                let mut updated = Vec::new();
                for preview in repository.stale_previews()? {
                    if preview.path != path.as_str() {
                        continue;
                    }
                    repository.refresh_preview(preview.path.as_str(), &preview.resource)?;
                    updated.push((preview.path, preview.resource));
                }
                updated
            }
        };

        if updated.is_empty() {
            println!("No stale previews to refresh.");
            return Ok(());
        }

        for (path, resource) in &updated {
            println!("  • {path}/{resource}");
        }
        println!(
            "{}",
            format!("✅ Refreshed {} previews", updated.len()).success()
        );
        Ok(())
    }

    fn output_table(stale: &[StalePreview]) {
        println!("Stale previews ({}):", stale.len());
        println!();

        for preview in stale {
            println!(
                "{}/{} → {}",
                preview.path,
                preview.resource,
                preview.target.to_string().info()
            );
            match &preview.stored {
                None => println!("  {}", "no preview stored".dim()),
                Some(stored) => {
                    for (field, before, after) in changed_fields(stored, &preview.current) {
                        println!("  {field}: {} → {}", before.dim(), after.warning());
                    }
                }
            }
        }

        println!();
        println!("{}", "Run 'curate review --accept' to refresh them.".dim());
    }

    fn output_json(stale: &[StalePreview]) -> anyhow::Result<()> {
        use serde_json::json;

        let links: Vec<_> = stale
            .iter()
            .map(|preview| {
                json!({
                    "path": preview.path,
                    "resource": preview.resource,
                    "target": preview.target,
                    "stored": preview.stored,
                    "current": preview.current,
                })
            })
            .collect();

        let output = json!({
            "total_count": stale.len(),
            "links": links,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn changed_fields(
    stored: &LinkedPathPreview,
    current: &LinkedPathPreview,
) -> Vec<(&'static str, String, String)> {
    let show = |value: Option<&String>| value.map_or_else(|| "–".to_string(), Clone::clone);

    let mut fields = Vec::new();
    if stored.title != current.title {
        fields.push(("title", stored.title.clone(), current.title.clone()));
    }
    if stored.category != current.category {
        fields.push((
            "category",
            show(stored.category.as_ref()),
            show(current.category.as_ref()),
        ));
    }
    if stored.difficulty != current.difficulty {
        fields.push((
            "difficulty",
            show(stored.difficulty.as_ref()),
            show(current.difficulty.as_ref()),
        ));
    }
    if stored.cover_image != current.cover_image {
        fields.push((
            "cover image",
            show(stored.cover_image.as_ref()),
            show(current.cover_image.as_ref()),
        ));
    }
    fields
}
