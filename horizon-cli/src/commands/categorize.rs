//! Categorize command - suggest, learn and prune merchant patterns

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use horizon_core::adapters::demo;
use horizon_core::domain::{CategorizationSource, LearnOutcome};
use horizon_core::services::normalize_merchant;
use horizon_core::HorizonContext;
use serde_json::json;
use uuid::Uuid;

use super::{get_context, resolve_date};
use crate::output;

#[derive(Subcommand)]
pub enum CategorizeCommands {
    /// Suggest categories for a merchant or transaction name
    Suggest {
        merchant: String,
    },
    /// Record a confirmed category for a merchant
    Learn {
        merchant: String,
        /// Category id (or a demo category name in demo mode)
        category: String,
        /// Who confirmed it (user, rule, automated)
        #[arg(long, default_value = "user")]
        source: String,
    },
    /// Remove stale and low-confidence patterns
    Prune,
    /// List learned patterns
    List,
}

pub fn run(command: CategorizeCommands, json: bool) -> Result<()> {
    let ctx = get_context(resolve_date(None)?)?;
    match command {
        CategorizeCommands::Suggest { merchant } => suggest(&ctx, &merchant, json),
        CategorizeCommands::Learn {
            merchant,
            category,
            source,
        } => learn(&ctx, &merchant, &category, &source, json),
        CategorizeCommands::Prune => prune(&ctx, json),
        CategorizeCommands::List => list(&ctx, json),
    }
}

/// Accept a category id, or a demo category name while demo mode is on
fn resolve_category(ctx: &HorizonContext, category: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(category.trim()) {
        return Ok(id);
    }
    if ctx.config.demo_mode {
        if let Some(id) = demo::category_id(category) {
            return Ok(id);
        }
    }
    Err(anyhow!("Unknown category '{}', expected a category id", category))
}

fn category_label(ctx: &HorizonContext, id: Uuid) -> String {
    if ctx.config.demo_mode {
        if let Some(name) = demo::category_name(id) {
            return name.to_string();
        }
    }
    id.to_string()
}

fn suggest(ctx: &HorizonContext, merchant: &str, json: bool) -> Result<()> {
    let service = &ctx.categorization_service;
    let suggestions = service.suggest(ctx.family_id, merchant)?;

    if json {
        let auto_apply = suggestions.first().filter(|s| service.is_auto_applicable(s));
        return output::json(json!({
            "merchant_normalized": normalize_merchant(merchant),
            "suggestions": suggestions,
            "auto_apply": auto_apply,
        }));
    }

    if suggestions.is_empty() {
        output::warning(&format!("No suggestions for '{}'", merchant));
        return Ok(());
    }

    println!("{} '{}'", "Suggestions for".bold(), normalize_merchant(merchant));
    println!();
    let mut table = output::create_table();
    table.set_header(vec!["Category", "Match", "Pattern", "Similarity", "Confidence", ""]);
    for suggestion in &suggestions {
        let marker = if service.is_auto_applicable(suggestion) {
            "auto".green().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(category_label(ctx, suggestion.category_id)),
            Cell::new(suggestion.match_type.as_str()),
            Cell::new(&suggestion.matched_pattern),
            Cell::new(output::format_score(suggestion.similarity)).set_alignment(CellAlignment::Right),
            Cell::new(output::format_score(suggestion.confidence)).set_alignment(CellAlignment::Right),
            Cell::new(marker),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn learn(ctx: &HorizonContext, merchant: &str, category: &str, source: &str, json: bool) -> Result<()> {
    let category_id = resolve_category(ctx, category)?;
    let source: CategorizationSource = source.parse()?;
    let outcome = ctx.categorization_service.learn(
        ctx.family_id,
        merchant,
        category_id,
        source,
        ctx.now(),
    )?;

    if json {
        return output::json(&outcome);
    }

    match outcome {
        LearnOutcome::Learned { pattern } => output::success(&format!(
            "Learned '{}' -> {} ({} matches, confidence {})",
            pattern.merchant_normalized,
            category_label(ctx, pattern.category_id),
            pattern.match_count,
            output::format_score(pattern.confidence_score)
        )),
        LearnOutcome::Ignored { reason } => output::warning(&format!("Not learned: {}", reason)),
    }
    Ok(())
}

fn prune(ctx: &HorizonContext, json: bool) -> Result<()> {
    let result = ctx.categorization_service.prune(ctx.family_id, ctx.now())?;

    if json {
        return output::json(&result);
    }

    if result.total() == 0 {
        output::info("Nothing to prune");
    } else {
        output::success(&format!(
            "Removed {} patterns ({} stale, {} low confidence)",
            result.total(),
            result.stale_removed,
            result.low_confidence_removed
        ));
    }
    Ok(())
}

fn list(ctx: &HorizonContext, json: bool) -> Result<()> {
    let patterns = ctx.categorization_service.patterns(ctx.family_id)?;

    if json {
        return output::json(&patterns);
    }

    if patterns.is_empty() {
        output::info("No patterns learned yet");
        return Ok(());
    }

    let now = ctx.now();
    let mut table = output::create_table();
    table.set_header(vec!["Merchant", "Category", "Matches", "Confidence", "Last Match"]);
    for pattern in &patterns {
        let idle_days = pattern.idle_for(now).num_days();
        table.add_row(vec![
            Cell::new(&pattern.merchant_normalized),
            Cell::new(category_label(ctx, pattern.category_id)),
            Cell::new(pattern.match_count).set_alignment(CellAlignment::Right),
            Cell::new(output::format_score(pattern.confidence_score)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} days ago", idle_days)),
        ]);
    }
    println!("{}", table);
    Ok(())
}
