use std::process;

use clap::Parser;
use curator::{
    domain::{LearningPath, Resource},
    linking::{self, LinkState},
    media,
    storage::{FileStore, PathRepository, Repository},
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Display a learning path and its resources")]
pub struct Show {
    /// Id of the learning path to display
    id: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self, repository))]
    pub fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let paths = repository.get_all()?;

        let Some(path) = paths.iter().find(|path| path.id == self.id.as_str()) else {
            eprintln!("Learning path {} not found", self.id);
            process::exit(1);
        };

        match self.output {
            OutputFormat::Pretty => output_pretty(path, &paths),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(path)?);
            }
        }

        Ok(())
    }
}

fn output_pretty(path: &LearningPath, paths: &[LearningPath]) {
    println!("# {}", path.title);
    if !path.description.is_empty() {
        println!("{}", path.description);
    }
    println!();

    println!("{}", "Metadata".dim());
    println!("  Id:         {}", path.id);
    println!("  Category:   {}", path.category);
    println!("  Difficulty: {}", path.difficulty);
    if !path.tags.is_empty() {
        println!("  Tags:       {}", path.tags.join(", "));
    }
    println!(
        "  Created:    {}",
        path.created()
            .map_or_else(|| path.created_at.clone(), |created| created.format("%Y-%m-%d").to_string())
    );
    println!("  Rating:     {:.1}", path.rating);
    println!("  Learners:   {}", path.learners);
    println!();

    if path.resources.is_empty() {
        println!("{}", "No resources yet.".dim());
        return;
    }

    println!("{}", format!("Resources ({})", path.resources.len()).dim());
    for (index, resource) in path.resources.iter().enumerate() {
        println!("  {}. [{}] {}", index + 1, resource.kind(), resource.title);
        print_target(resource, paths);
        if !resource.description.is_empty() {
            println!("     {}", resource.description.dim());
        }
    }
}

fn print_target(resource: &Resource, paths: &[LearningPath]) {
    let Some(link) = resource.as_link() else {
        if let Some(video) = media::preview_for(resource) {
            println!("     {}", resource.url().info());
            println!("     {}", format!("thumbnail: {}", video.thumbnail_url).dim());
        } else if !resource.url().is_empty() {
            println!("     {}", resource.url().info());
        }
        return;
    };

    match linking::resolve(link, paths) {
        LinkState::Unset => println!("     {}", "no learning path selected".warning()),
        LinkState::Live(target) => {
            let title = link
                .preview
                .as_ref()
                .map_or(target.title.as_str(), |preview| preview.title.as_str());
            println!("     → {} ({})", title.info(), target.id);
        }
        LinkState::Dangling => {
            let title = link
                .preview
                .as_ref()
                .map_or(link.target.as_str(), |preview| preview.title.as_str());
            println!(
                "     → {} {}",
                title,
                format!("({} no longer exists)", link.target).warning()
            );
        }
    }
}
