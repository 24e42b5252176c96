//! `vitamins show` / `vitamins search` — read-only views of a tracker.

use console::style;
use vitamins_core::{ErrorNode, Tracker, TrailEntry};

use super::print_json;

pub fn show(tracker: &Tracker, json: bool) -> Result<(), String> {
    let trail = tracker.trail();
    let logs = tracker.logs();

    if json {
        print_json(&serde_json::json!({ "trail": trail, "logs": logs }));
        return Ok(());
    }

    let config = tracker.config();
    println!(
        "{} {}/{}",
        style("Tracker").bold(),
        config.namespace,
        config.version
    );

    println!("\n{} ({})", style("Trail").cyan().bold(), trail.len());
    for entry in &trail {
        println!("  {}", format_crumb(entry));
    }

    println!("\n{} ({})", style("Errors").red().bold(), logs.len());
    for node in &logs {
        print_node(node);
    }
    Ok(())
}

pub fn search(tracker: &Tracker, tags: &[String], json: bool) -> Result<(), String> {
    if tags.is_empty() {
        return Err("At least one --tag is required".to_string());
    }
    let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
    let found = tracker.search(&tags);

    if json {
        print_json(&serde_json::json!({ "logs": found }));
        return Ok(());
    }

    if found.is_empty() {
        println!("No errors tagged {}", tags.join(", "));
    }
    for node in &found {
        print_node(node);
    }
    Ok(())
}

fn format_crumb(entry: &TrailEntry) -> String {
    let mut line = format!(
        "{} [{}] {}",
        style(entry.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
        entry.category,
        entry.message
    );
    if let Some(meta) = &entry.metadata {
        let pairs: Vec<String> = meta.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        line.push_str(&format!(" {}", style(pairs.join(" ")).dim()));
    }
    line
}

fn print_node(node: &ErrorNode) {
    println!(
        "  {} {}: {} {}",
        style(node.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
        style(&node.error.name).red(),
        node.error.message,
        style(format!("[{}]", node.tags.join(", "))).yellow()
    );
    if let Some(crumbs) = &node.breadcrumbs {
        for entry in crumbs {
            println!("      {}", format_crumb(entry));
        }
    }
}
