use lapwatch_core::{format_elapsed, now_ms, parse_goal};
use std::io::Write;

use crate::context::CliContext;

pub async fn add_watch(ctx: &CliContext) {
    let id = ctx.service.add_watch().await;
    println!("added watch {id}");
}

pub async fn remove(ctx: &CliContext, id: u64) {
    ctx.service.remove(id).await;
}

pub async fn toggle(ctx: &CliContext, id: u64) {
    ctx.service.toggle(id).await;
}

pub async fn reset(ctx: &CliContext, id: u64) {
    ctx.service.reset(id).await;
}

pub async fn set_label(ctx: &CliContext, id: u64, text: &str) {
    ctx.service.edit_label(id, text).await;
}

pub async fn set_goal(ctx: &CliContext, id: u64, text: &str) {
    ctx.service.edit_goal(id, text).await;
}

pub async fn list(ctx: &CliContext) {
    let watches = ctx.service.snapshot().await;
    if watches.is_empty() {
        println!("No stopwatches yet. Add one with `add`.");
        return;
    }

    let now = now_ms();
    println!("{:>4} {:<6} {:>12} {:>6}  {:<20} Goal", "Id", "State", "Elapsed", "%", "Label");
    println!("{}", "-".repeat(70));

    for w in &watches {
        let time = format_elapsed(w.elapsed_at(now));
        let state = if w.running { "run" } else { "stop" };
        let percent = w
            .progress_percent(now)
            .map(|p| format!("{p:>5.0}%"))
            .unwrap_or_else(|| "     -".to_string());
        println!(
            "{:>4} {:<6} {:>9}.{} {}  {:<20} {}",
            w.id, state, time.main, time.centis, percent, w.label, w.goal_text
        );
    }

    println!("\nTotal: {} watches", watches.len());
}

pub async fn show_config(ctx: &CliContext) {
    match &ctx.config.data_dir {
        Some(dir) => println!("data_dir: {}", dir.display()),
        None => println!("data_dir: (platform default)"),
    }
}

/// Dry-run the goal parser on arbitrary text.
pub fn check_goal(text: &str) {
    let ms = parse_goal(text);
    if ms == 0 {
        println!("no goal recognized in {text:?}");
    } else {
        let time = format_elapsed(ms);
        println!("{text:?} -> {ms} ms ({})", time.main);
    }
}

pub fn exit() {
    write!(std::io::stdout(), "quitting...").ok();
    std::io::stdout().flush().ok();
}
