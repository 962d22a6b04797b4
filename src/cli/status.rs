use std::{collections::BTreeMap, process};

use clap::Parser;
use curator::storage::{FileStore, PathRepository, Repository};
use tracing::instrument;

use super::terminal::{is_narrow, Colorize};

#[derive(Debug, Parser, Default)]
#[command(about = "Show learning path counts and link health")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug)]
struct Report {
    categories: BTreeMap<String, usize>,
    total: usize,
    resources: usize,
    links: usize,
    stale: usize,
    dangling: usize,
}

impl Status {
    #[instrument(level = "debug", skip(self, repository))]
    pub fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let paths = repository.get_all()?;

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for path in &paths {
            *categories.entry(path.category.clone()).or_insert(0) += 1;
        }

        let report = Report {
            total: paths.len(),
            resources: paths.iter().map(|path| path.resources.len()).sum(),
            links: paths
                .iter()
                .flat_map(|path| &path.resources)
                .filter(|resource| resource.as_link().is_some())
                .count(),
            stale: repository.stale_previews()?.len(),
            dangling: repository.dangling_links()?.len(),
            categories,
        };

        if report.total == 0 {
            println!("No learning paths yet. Create one with 'curate create'.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(repository, &report)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&report),
            OutputFormat::Table => Self::output_table(repository, &report),
        }

        // Stale previews need a review.
        if report.stale > 0 {
            process::exit(2);
        }

        Ok(())
    }

    fn output_json(repository: &Repository<FileStore>, report: &Report) -> anyhow::Result<()> {
        use serde_json::json;

        let categories: Vec<_> = report
            .categories
            .iter()
            .map(|(category, count)| json!({ "category": category, "count": count }))
            .collect();

        let output = json!({
            "root": repository.root().display().to_string(),
            "storage_key": repository.config().storage_key(),
            "categories": categories,
            "total": report.total,
            "resources": report.resources,
            "links": {
                "count": report.links,
                "stale": report.stale,
                "dangling": report.dangling,
            },
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(report: &Report) {
        println!(
            "total={} resources={} links={} stale={} dangling={}",
            report.total, report.resources, report.links, report.stale, report.dangling
        );
    }

    fn output_table(repository: &Repository<FileStore>, report: &Report) {
        println!(
            "{}",
            format!(
                "{} ({})",
                repository.root().display(),
                repository.config().storage_key()
            )
            .dim()
        );
        println!();

        println!("Learning paths");
        println!("{}", "──────────────".dim());

        if is_narrow() {
            for (category, count) in &report.categories {
                println!("{category}: {count}");
            }
        } else {
            println!("{:<14} Count", "Category");
            for (category, count) in &report.categories {
                println!("{category:<14} {count}");
            }
        }
        println!("Total: {} ({} resources)", report.total, report.resources);

        println!();

        println!("Links: {}", report.links);
        if report.stale == 0 {
            println!("Stale previews: {} ✅", "0".success());
        } else {
            println!("Stale previews: {} ⚠️", report.stale.to_string().warning());
            println!("{}", "Run 'curate review' to investigate.".dim());
        }
        if report.dangling > 0 {
            println!(
                "Dangling links: {} {}",
                report.dangling.to_string().warning(),
                "(target deleted, shown from stored preview)".dim()
            );
        }
    }
}
