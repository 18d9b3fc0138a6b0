use super::context::AppContext;
use anyhow::{Context, Result};

/// Runs the sync loops with the session bound to them and logs every change
/// until Ctrl-C.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let session = ctx.session().await?;
    let binding = session.bind();
    let loops = ctx.engine.start()?;

    let mut ui = session.subscribe();
    let shutdown = ctx.engine.shutdown_token();
    let reporter = tokio::spawn(async move {
        let mut last = (usize::MAX, false);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = ui.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = {
                        let state = ui.borrow_and_update();
                        (state.points.len(), state.is_syncing)
                    };
                    if current != last {
                        tracing::info!(points = current.0, syncing = current.1, "UI state updated");
                        last = current;
                    }
                }
            }
        }
    });

    println!("🗺️  Syncing with {} (Ctrl-C to stop)", ctx.settings.base_url);
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    ctx.engine.shutdown();
    loops.join().await;
    let _ = tokio::join!(binding, reporter);
    println!("👋 Stopped");
    Ok(())
}
