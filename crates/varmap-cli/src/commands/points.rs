use super::context::AppContext;
use anyhow::{Context, Result};
use varmap_core::point::{Point, PointRepository};

pub async fn list(ctx: &AppContext) -> Result<()> {
    let points = ctx.store.get_all().await?;
    if points.is_empty() {
        println!("No points stored locally.");
        return Ok(());
    }

    for point in &points {
        print_point(point);
    }
    println!("\n{} point(s)", points.len());
    Ok(())
}

pub async fn pull(ctx: &AppContext) -> Result<()> {
    println!("🔄 Pulling from {}...", ctx.settings.base_url);
    let count = ctx.engine.manual_sync().await.context("Pull failed")?;
    println!("✅ Stored {} point(s)", count);
    Ok(())
}

pub async fn push(ctx: &AppContext) -> Result<()> {
    println!("📤 Pushing to {}...", ctx.settings.base_url);
    let count = ctx
        .engine
        .push_local_then_replace()
        .await
        .context("Push failed")?;
    println!("✅ Remote now holds {} point(s)", count);
    Ok(())
}

pub async fn add(ctx: &AppContext, name: String, lat: f64, lon: f64) -> Result<()> {
    let push = ctx
        .engine
        .add_local(Point::new(name, lat, lon))
        .await
        .context("Failed to store point")?;
    println!("  ✓ Stored locally");

    match push.await.context("Push task panicked")? {
        Ok(count) => println!("✅ Pushed, {} point(s) on the remote", count),
        Err(e) => println!("⚠️  Push failed, point kept locally: {}", e),
    }
    Ok(())
}

fn print_point(point: &Point) {
    let id = point
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>6}  {:<24} {:>10.6} {:>11.6}",
        id, point.name, point.latitude, point.longitude
    );
}
