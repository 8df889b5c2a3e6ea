// Readerly - Reading Shelves and Club Progress
// Copyright (C) 2026 Readerly contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Manual driver for the shelf/progress core against a live backend.
//!
//! ```text
//! shelfctl --base-url https://api.readerly.example --token $READERLY_TOKEN shelves
//! shelfctl ... scan ed-123
//! shelfctl ... toggle reading ed-123
//! shelfctl ... progress club-9 ed-123 --page 120
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use readerly_core::api::{ClientConfig, RemoteClient, RemoteCollection};
use readerly_core::auth::{BearerToken, StaticCredentials};
use readerly_core::progress::{ProgressTracker, ProgressUpdate, ReadingStatus};
use readerly_core::shelf::{MembershipScanner, ShelfDirectory, ShelfTarget, ToggleCoordinator};
use readerly_core::{ClubId, EditionId, ShelfId, ShelfKind};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "shelfctl")]
#[command(about = "Readerly shelf/progress core - manual testing tool", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "READERLY_BASE_URL")]
    base_url: String,

    /// Bearer token of the signed-in user
    #[arg(long, env = "READERLY_TOKEN")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the signed-in user's shelves
    Shelves,
    /// Scan which shelves contain an edition
    Scan {
        /// Edition id
        edition: String,
    },
    /// Toggle a shelf for an edition (kind tag or shelf id)
    Toggle {
        /// "want_to_read", "reading", "read", "owned", or a shelf id
        target: String,
        /// Edition id
        edition: String,
    },
    /// Update reading progress in a club
    Progress {
        /// Club id
        club: String,
        /// Edition id
        edition: String,
        /// Current page
        #[arg(long)]
        page: i64,
        /// Explicit status tag (optional)
        #[arg(long)]
        status: Option<String>,
        /// Total pages from book metadata (optional)
        #[arg(long)]
        total: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "readerly_core=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    let credentials = Arc::new(StaticCredentials(BearerToken::new(cli.token)));
    let config = ClientConfig::builder().base_url(cli.base_url).build();
    let remote: Arc<dyn RemoteCollection> =
        Arc::new(RemoteClient::with_config(credentials, config).context("building client")?);

    match cli.command {
        Commands::Shelves => {
            let directory = ShelfDirectory::load(remote.as_ref()).await?;
            for shelf in directory.iter() {
                println!("{}  [{}]  {}", shelf.id, shelf.kind, shelf.name);
            }
        }
        Commands::Scan { edition } => {
            let directory = ShelfDirectory::load(remote.as_ref()).await?;
            let scanner = MembershipScanner::new(Arc::clone(&remote));
            let report = scanner
                .scan(directory.shelves(), &EditionId::from(edition))
                .await?;
            for shelf in directory.iter() {
                let mark = if report.contains(&shelf.id) { "x" } else { " " };
                println!("[{}] {}", mark, shelf.name);
            }
            for unconfirmed in report.unconfirmed() {
                println!("[?] {} ({})", unconfirmed.shelf_id, unconfirmed.reason);
            }
        }
        Commands::Toggle { target, edition } => {
            let directory = ShelfDirectory::load(remote.as_ref()).await?;
            let coordinator = ToggleCoordinator::new(Arc::clone(&remote), directory);
            let target = parse_target(&target)?;
            let view = coordinator
                .toggle(target, &EditionId::from(edition))
                .await?;
            println!("member of: {:?}", view.members());
        }
        Commands::Progress {
            club,
            edition,
            page,
            status,
            total,
        } => {
            let status = match status {
                Some(tag) => Some(
                    ReadingStatus::from_tag(&tag)
                        .with_context(|| format!("unknown status tag '{tag}'"))?,
                ),
                None => None,
            };
            let tracker = ProgressTracker::new(remote);
            let update = ProgressUpdate {
                status,
                current_page: page,
            };
            let progress = tracker
                .update(&ClubId::from(club), &EditionId::from(edition), update, total)
                .await?;
            println!(
                "{}: page {}{} ({})",
                progress.edition,
                progress.current_page,
                progress
                    .total_pages
                    .map(|t| format!("/{t}"))
                    .unwrap_or_default(),
                progress.status
            );
        }
    }

    Ok(())
}

fn parse_target(target: &str) -> anyhow::Result<ShelfTarget> {
    let kind = ShelfKind::from_tag(target);
    if kind != ShelfKind::Custom {
        return Ok(ShelfTarget::Kind(kind));
    }
    if target.is_empty() {
        bail!("empty toggle target");
    }
    Ok(ShelfTarget::Id(ShelfId::from(target)))
}
