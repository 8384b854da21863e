use clap::Parser;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use miette::{miette, IntoDiagnostic};
use tracing_subscriber::EnvFilter;

use murmur::config::Config;
use murmur::error::MSG_MODERATION_FAILED;
use murmur::serve;
use murmur::store::CommentStore;

#[derive(Parser)]
#[command(author, version, about)]
pub enum Command {
    /// Serve the comment API on the configured address
    Serve,
    /// Accept a pending comment directly against the configured store
    Accept { id: String, token: String },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let command = Command::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("murmur=info,tower_http=info")),
        )
        .init();

    let config: Config = Figment::new()
        .merge(Toml::file("murmur.toml"))
        .extract()
        .into_diagnostic()?;
    let server = config.server.ok_or(miette!("no server config found"))?;

    match command {
        Command::Serve => serve::serve(server).await?,
        Command::Accept { id, token } => {
            let store = CommentStore::connect(&server.database)
                .await
                .into_diagnostic()?;
            if store
                .accept_if_matches(&id, &token)
                .await
                .into_diagnostic()?
            {
                println!("Successfully accepted comment.");
                if let Some(comment) = store.get(&id).await.into_diagnostic()? {
                    println!(
                        "{} by {} on \"{}\", submitted {}",
                        comment.id, comment.author, comment.target, comment.added_at
                    );
                }
            } else {
                return Err(miette!("{MSG_MODERATION_FAILED}"));
            }
        }
    }

    Ok(())
}
