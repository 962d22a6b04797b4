use anyhow::Context;
use clap::{Parser, ValueEnum};
use curator::{
    domain::LearningPath,
    query::{Query, SortKey},
    storage::{FileStore, PathRepository, Repository},
};
use serde::Serialize;
use tracing::instrument;

use super::terminal::is_narrow;

const DEFAULT_LIMIT: usize = 200;

/// Command arguments for `curate list`.
#[derive(Debug, Parser)]
#[command(about = "List learning paths with search, filters and sorting")]
pub struct List {
    /// Case-insensitive text search over titles, descriptions, tags and
    /// resources.
    #[arg(long, value_name = "QUERY", default_value = "")]
    search: String,

    /// Filter by category ("all" keeps everything).
    #[arg(long, default_value = "all")]
    category: String,

    /// Filter by difficulty ("all" keeps everything).
    #[arg(long, default_value = "all")]
    difficulty: String,

    /// Sort order (relevance, popular, newest, rating).
    #[arg(long, default_value = "relevance")]
    sort: SortKey,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and print one id per line.
    #[arg(long)]
    quiet: bool,

    /// Limit number of rows returned.
    #[arg(long)]
    limit: Option<usize>,

    /// Skip the first N rows.
    #[arg(long)]
    offset: Option<usize>,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializableRow<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
    difficulty: &'a str,
    tags: &'a [String],
    resources: usize,
    rating: f64,
    learners: u64,
    created_at: &'a str,
}

impl<'a> From<&'a LearningPath> for SerializableRow<'a> {
    fn from(path: &'a LearningPath) -> Self {
        Self {
            id: path.id.as_str(),
            title: &path.title,
            category: &path.category,
            difficulty: path.difficulty.as_str(),
            tags: &path.tags,
            resources: path.resources.len(),
            rating: path.rating,
            learners: path.learners,
            created_at: &path.created_at,
        }
    }
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let query = Query {
            text: self.search,
            category: Some(self.category),
            difficulty: Some(self.difficulty),
            sort: self.sort,
        };
        let paths = query.apply(repository.get_all()?);
        tracing::debug!("{} learning paths matched", paths.len());

        let effective_limit = self
            .limit
            .and_then(|value| (value > 0).then_some(value))
            .or(Some(DEFAULT_LIMIT));

        let rows = apply_offset_limit(paths, self.offset, effective_limit);

        match self.output {
            OutputFormat::Table => {
                render_table(&rows, self.quiet);
                Ok(())
            }
            OutputFormat::Json => render_json(&rows),
        }
    }
}

fn apply_offset_limit<T>(mut rows: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    if let Some(off) = offset {
        if off < rows.len() {
            rows.drain(..off);
        } else {
            rows.clear();
        }
    }

    if let Some(max) = limit {
        rows.truncate(max);
    }

    rows
}

fn table_rows(paths: &[LearningPath], narrow: bool) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let headers = if narrow {
        vec!["ID", "TITLE", "RATING"]
    } else {
        vec![
            "ID",
            "TITLE",
            "CATEGORY",
            "DIFFICULTY",
            "RESOURCES",
            "RATING",
            "LEARNERS",
        ]
    };

    let data = paths
        .iter()
        .map(|path| {
            let rating = format!("{:.1}", path.rating);
            if narrow {
                vec![path.id.to_string(), path.title.clone(), rating]
            } else {
                vec![
                    path.id.to_string(),
                    path.title.clone(),
                    path.category.clone(),
                    path.difficulty.to_string(),
                    path.resources.len().to_string(),
                    rating,
                    path.learners.to_string(),
                ]
            }
        })
        .collect();

    (headers, data)
}

fn render_table(paths: &[LearningPath], quiet: bool) {
    if quiet {
        for path in paths {
            println!("{}", path.id);
        }
        return;
    }

    if paths.is_empty() {
        println!("No learning paths matched.");
        return;
    }

    let (headers, data) = table_rows(paths, is_narrow());

    // Determine column widths for alignment.
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in data {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}

fn render_json(paths: &[LearningPath]) -> anyhow::Result<()> {
    let rows: Vec<SerializableRow<'_>> = paths.iter().map(SerializableRow::from).collect();

    serde_json::to_writer_pretty(std::io::stdout(), &rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}
