use super::context::AppContext;
use anyhow::Result;

pub async fn show(ctx: &AppContext) -> Result<()> {
    let ui = ctx.session().await?.snapshot();
    let state = &ui.session;

    println!("📍 Center:    {:.6}, {:.6}", state.center_lat, state.center_lon);
    println!("💬 Chat open: {}", state.chat_open);
    if !state.chat_input.is_empty() {
        println!("   Draft:     {}", state.chat_input);
    }
    for message in &state.chat_transcript {
        println!("   - {}", message);
    }

    match &state.selected_point {
        Some(p) => println!("⭐ Selected:  {} ({:.6}, {:.6})", p.name, p.latitude, p.longitude),
        None => println!("⭐ Selected:  none"),
    }
    match state.pending_add_dialog {
        Some(d) => println!("➕ Add dialog open at {:.6}, {:.6}", d.latitude, d.longitude),
        None => println!("➕ Add dialog closed"),
    }
    Ok(())
}
