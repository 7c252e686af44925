//! Similarity command - compare two merchant names

use anyhow::Result;
use horizon_core::config::Config;
use horizon_core::services::{jaro, normalize_merchant, StringSimilarity};
use serde_json::json;

use super::get_horizon_dir;
use crate::output;

pub fn run(a: &str, b: &str, json: bool) -> Result<()> {
    let config = Config::load(&get_horizon_dir()?)?;
    let similarity = StringSimilarity::new(config.categorization.similarity);

    let raw = similarity.similarity(a, b);
    let left = normalize_merchant(a);
    let right = normalize_merchant(b);
    let normalized = similarity.similarity(&left, &right);

    if json {
        return output::json(json!({
            "a": a,
            "b": b,
            "jaro": jaro(a, b),
            "jaro_winkler": raw,
            "normalized_a": left,
            "normalized_b": right,
            "normalized_jaro_winkler": normalized,
            "fuzzy_match": normalized >= config.categorization.fuzzy_threshold,
        }));
    }

    let mut table = output::create_table();
    table.set_header(vec!["", "A", "B", "Jaro-Winkler"]);
    table.add_row(vec!["raw".to_string(), a.to_string(), b.to_string(), format!("{:.4}", raw)]);
    table.add_row(vec![
        "normalized".to_string(),
        left,
        right,
        format!("{:.4}", normalized),
    ]);
    println!("{}", table);

    if normalized >= config.categorization.fuzzy_threshold {
        output::success("Close enough for a fuzzy category match");
    } else {
        output::info("Below the fuzzy match threshold");
    }
    Ok(())
}
