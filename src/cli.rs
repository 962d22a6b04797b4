use std::path::PathBuf;

mod list;
mod review;
mod show;
mod status;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use curator::{
    domain::{Difficulty, MediaKind, PathDraft, Resource, ResourceKind},
    storage::{FileStore, PathRepository, Repository},
};
use list::List;
use review::Review;
use show::Show;
use status::Status;
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory the learning paths are stored in
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let repository = Repository::open(self.root);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&repository)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show store health (default)
    Status(Status),

    /// List learning paths, with search, filters and sorting
    List(List),

    /// Show a learning path and its resources
    Show(Show),

    /// Create a new learning path
    Create(Create),

    /// Delete a learning path
    ///
    /// Links from other paths are left in place and render from their stored
    /// preview.
    Delete(Delete),

    /// Append a resource to a learning path
    AddResource(AddResource),

    /// Point a resource at another learning path
    Link(Link),

    /// Change the type of a resource
    Retype(Retype),

    /// Review stale link previews
    ///
    /// A preview is stale when the linked path has changed since the link
    /// was made or last refreshed.
    Review(Review),
}

impl Command {
    fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(repository)?,
            Self::List(command) => command.run(repository)?,
            Self::Show(command) => command.run(repository)?,
            Self::Create(command) => command.run(repository)?,
            Self::Delete(command) => command.run(repository)?,
            Self::AddResource(command) => command.run(repository)?,
            Self::Link(command) => command.run(repository)?,
            Self::Retype(command) => command.run(repository)?,
            Self::Review(command) => command.run(repository)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Create {
    /// Title of the learning path
    #[arg(long)]
    title: String,

    /// What the path teaches
    #[arg(long, default_value = "")]
    description: String,

    /// Category, e.g. programming, design, datascience, business
    #[arg(long, default_value = "programming")]
    category: String,

    /// Difficulty (beginner, intermediate, advanced)
    #[arg(long, default_value = "beginner")]
    difficulty: Difficulty,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    tags: String,

    /// Cover image URL (defaults to the configured image)
    #[arg(long, default_value = "")]
    cover_image: String,
}

impl Create {
    #[instrument(skip(repository))]
    fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let existing = repository.get_all()?;

        let path = PathDraft {
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            tags: self.tags,
            cover_image: self.cover_image,
            resources: Vec::new(),
        }
        .publish(repository.config(), &existing);

        let id = path.id.clone();
        repository
            .save(path)
            .with_context(|| format!("failed to save learning path {id}"))?;

        println!("{}", format!("Created learning path {id}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// Id of the learning path to delete
    id: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(skip(repository))]
    fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let Some(path) = repository.get_by_id(&self.id)? else {
            anyhow::bail!("Learning path {} not found", self.id);
        };

        let linked_from: Vec<_> = repository
            .get_all()?
            .into_iter()
            .filter(|other| {
                other.resources.iter().any(|resource| {
                    resource
                        .as_link()
                        .is_some_and(|link| link.target == path.id)
                })
            })
            .map(|other| other.id)
            .collect();

        if !self.yes {
            println!("Will delete '{}' ({})", path.title, path.id);
            if !linked_from.is_empty() {
                let ids: Vec<_> = linked_from.iter().map(ToString::to_string).collect();
                println!(
                    "{}",
                    format!("⚠️  Linked from: {}", ids.join(", ")).warning()
                );
            }
            if !prompt_to_proceed()? {
                println!("Cancelled");
                std::process::exit(130);
            }
        }

        repository.delete(&self.id)?;
        println!("{}", format!("Deleted learning path {}", self.id).success());
        Ok(())
    }
}

fn prompt_to_proceed() -> anyhow::Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt("Proceed?")
        .default(false)
        .interact()
        .context("failed to read confirmation")
}

#[derive(Debug, clap::Parser)]
pub struct AddResource {
    /// Id of the learning path to add to
    path: String,

    /// Resource type (video, website, pdf, image, other)
    #[arg(long = "type", default_value = "website")]
    kind: ResourceKind,

    /// Title of the resource
    #[arg(long)]
    title: String,

    /// Link to the resource
    #[arg(long, default_value = "")]
    url: String,

    /// What the resource covers
    #[arg(long, default_value = "")]
    description: String,
}

impl AddResource {
    #[instrument(skip(repository))]
    fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let Some(path) = repository.get_by_id(&self.path)? else {
            anyhow::bail!("Learning path {} not found", self.path);
        };

        let id = path.next_resource_id();
        let mut resource = Resource::external(
            id.clone(),
            MediaKind::Website,
            self.title,
            self.url,
            self.description,
        );
        resource.set_kind(self.kind);
        if self.kind == ResourceKind::LearningPath {
            println!(
                "{}",
                format!("Use 'curate link {} {id} <TARGET>' to pick the linked path.", self.path)
                    .dim()
            );
        }

        repository.add_resource(&self.path, resource)?;
        println!("{}", format!("Added resource {id} to {}", self.path).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Link {
    /// Id of the learning path that owns the resource
    path: String,

    /// Id of the resource to link
    resource: String,

    /// Id of the learning path to link to
    target: String,
}

impl Link {
    #[instrument(skip(repository))]
    fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let path = repository.link_resource(&self.path, &self.resource, &self.target)?;

        let title = path
            .resource(&self.resource)
            .and_then(Resource::linked_preview)
            .map_or(self.target.as_str(), |preview| preview.title.as_str());

        println!(
            "{}",
            format!("Linked {}/{} to '{title}'", self.path, self.resource).success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Retype {
    /// Id of the learning path that owns the resource
    path: String,

    /// Id of the resource
    resource: String,

    /// New type (video, website, pdf, image, learningPath, other)
    kind: ResourceKind,
}

impl Retype {
    #[instrument(skip(repository))]
    fn run(self, repository: &Repository<FileStore>) -> anyhow::Result<()> {
        let was_link = repository
            .get_by_id(&self.path)?
            .and_then(|path| path.resource(&self.resource).map(Resource::kind))
            == Some(ResourceKind::LearningPath);

        repository.set_resource_kind(&self.path, &self.resource, self.kind)?;

        println!(
            "{}",
            format!("{}/{} is now {}", self.path, self.resource, self.kind).success()
        );
        if was_link && self.kind != ResourceKind::LearningPath {
            println!("{}", "The link and its url were cleared.".dim());
        }
        Ok(())
    }
}
