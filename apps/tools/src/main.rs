use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings_from, load_settings, CandidateList, Navigator, RelationshipService,
    RelocationViewModel, TransferExecutor, TransferReport, TransferSettings,
};
use shared::{
    domain::{Group, GroupId, PathContext, TransferMode},
    protocol::{Dataset, GroupSummary},
};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://inventory.db")]
    database_url: String,
    /// Settings file; defaults to `relocate.toml` in the working directory.
    #[arg(long)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateGroup {
        name: String,
    },
    Associate {
        child: i64,
        parent: i64,
    },
    List,
    Copy {
        group: i64,
        #[arg(long)]
        to: i64,
        /// Ancestor chain, root first (e.g. `1,2`).
        #[arg(long)]
        path: Option<PathContext>,
    },
    Move {
        group: i64,
        #[arg(long, conflicts_with = "to_root", required_unless_present = "to_root")]
        to: Option<i64>,
        #[arg(long)]
        to_root: bool,
        #[arg(long)]
        path: Option<PathContext>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Group(GroupId),
    Root,
}

#[derive(Debug)]
struct TransferRequest {
    group: GroupId,
    mode: TransferMode,
    target: Target,
    path: Option<PathContext>,
}

struct StorageRelationships {
    storage: Storage,
}

#[async_trait]
impl RelationshipService for StorageRelationships {
    async fn associate(&self, group: &Group, target: GroupId) -> Result<()> {
        self.storage.associate(group.id, target).await
    }

    async fn disassociate(&self, group: GroupId, parent: GroupId) -> Result<()> {
        self.storage.disassociate(group, parent).await
    }
}

struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn go_to_parent(&self, reload: bool) {
        info!(reload, "returning to parent view");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateGroup { name } => {
            let group_id = storage.create_group(&name).await?;
            println!("created group_id={group_id}");
        }
        Command::Associate { child, parent } => {
            storage.associate(GroupId(child), GroupId(parent)).await?;
            println!("associated group_id={child} under group_id={parent}");
        }
        Command::List => {
            let summaries = list_summaries(&storage).await?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Command::Copy { group, to, path } => {
            let request = TransferRequest {
                group: GroupId(group),
                mode: TransferMode::Copy,
                target: Target::Group(GroupId(to)),
                path,
            };
            let report = run_transfer(&storage, &settings, request).await?;
            println!("{}", serde_json::to_string_pretty(&report.calls)?);
        }
        Command::Move {
            group,
            to,
            to_root,
            path,
        } => {
            let target = match (to, to_root) {
                (_, true) => Target::Root,
                (Some(to), false) => Target::Group(GroupId(to)),
                (None, false) => bail!("either --to or --to-root is required"),
            };
            let request = TransferRequest {
                group: GroupId(group),
                mode: TransferMode::Move,
                target,
                path,
            };
            let report = run_transfer(&storage, &settings, request).await?;
            println!("{}", serde_json::to_string_pretty(&report.calls)?);
        }
    }

    Ok(())
}

async fn list_summaries(storage: &Storage) -> Result<Vec<GroupSummary>> {
    let mut summaries = Vec::new();
    for group in storage.list_groups().await? {
        let parents = storage.parents_of(group.id).await?;
        let children = storage.children_of(group.id).await?;
        summaries.push(GroupSummary {
            group,
            parents,
            children,
        });
    }
    Ok(summaries)
}

/// Uses the explicit path when given; otherwise the group's single parent, or
/// the root level when it has none.
async fn resolve_path(
    storage: &Storage,
    group: GroupId,
    explicit: Option<PathContext>,
) -> Result<PathContext> {
    let parents = storage.parents_of(group).await?;

    let path = match explicit {
        Some(path) => path,
        None => match parents.as_slice() {
            [] => PathContext::root(),
            [parent] => PathContext::new(vec![*parent]),
            _ => bail!("group {group} has several parents; pass --path to pick one"),
        },
    };

    if let Some(parent) = path.immediate_parent() {
        if !parents.contains(&parent) {
            bail!("group {group} is not a child of group {parent}");
        }
    }
    Ok(path)
}

async fn run_transfer(
    storage: &Storage,
    settings: &TransferSettings,
    request: TransferRequest,
) -> Result<TransferReport> {
    let group = storage
        .get_group(request.group)
        .await?
        .with_context(|| format!("group {} does not exist", request.group))?;
    let path = resolve_path(storage, group.id, request.path).await?;

    let candidates = storage
        .list_groups()
        .await?
        .into_iter()
        .filter(|candidate| candidate.id != group.id)
        .collect();
    let candidates = CandidateList::from_dataset(Dataset::from_results(candidates));

    let mut view = RelocationViewModel::new(group, path, candidates, Arc::new(LoggingNavigator));
    view.set_mode(request.mode)?;
    match request.target {
        Target::Group(target) => {
            view.select_candidate(target)?;
        }
        Target::Root => {
            view.toggle_root_target()?;
        }
    }

    info!(
        group = %view.group().id,
        breadcrumb = view.breadcrumb_label(),
        mode = %view.mode(),
        "submitting group transfer"
    );
    let executor = TransferExecutor::with_settings(
        Arc::new(StorageRelationships {
            storage: storage.clone(),
        }),
        settings,
    );
    let report = view.submit(&executor).await?;
    Ok(report)
}

fn log_filter(raw: Option<&str>) -> EnvFilter {
    raw.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
