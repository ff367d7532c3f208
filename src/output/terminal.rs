// Colored terminal output for classification results.
//
// One block per text, one line per requested category. Positive labels
// are highlighted so a long batch can be skimmed.

use colored::Colorize;

use super::preview;
use crate::classify::{BatchPrediction, Category};

/// Characters of each text shown in the block heading.
const PREVIEW_CHARS: usize = 80;

/// Display the results of `Pipeline::classify` for a batch of texts.
pub fn display_classifications(texts: &[String], results: &[(Category, BatchPrediction)]) {
    if texts.is_empty() {
        println!("No texts to classify.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Classifications ({} texts) ===", texts.len()).bold()
    );

    for (i, text) in texts.iter().enumerate() {
        println!(
            "\n  {} \"{}\"",
            format!("{}.", i + 1).dimmed(),
            preview(text, PREVIEW_CHARS)
        );
        for (category, batch) in results {
            if let Some(prediction) = batch.get(i) {
                let positive = prediction.label == category.labels().0;
                println!(
                    "     {:<14} {:>6.3}  {}",
                    category.display_name(),
                    prediction.score,
                    colorize_label(prediction.label, positive),
                );
            }
        }
    }

    println!();
    for (category, batch) in results {
        let flagged = batch
            .labels
            .iter()
            .filter(|&&l| l == category.labels().0)
            .count();
        if flagged > 0 {
            println!(
                "  {} {} of {} flagged: {}",
                "!".red().bold(),
                flagged,
                batch.len(),
                category.display_name()
            );
        }
    }
}

/// Display ULM toxicity results for a batch of texts.
pub fn display_ulm(texts: &[String], batch: &BatchPrediction) {
    println!(
        "\n{}",
        format!("=== ULM toxicity ({} texts) ===", texts.len()).bold()
    );
    let (toxic, _) = Category::Toxicity.labels();
    for (i, (text, prediction)) in texts.iter().zip(batch.iter()).enumerate() {
        println!(
            "  {:>4} {:>6.3}  {:<10}  {}",
            format!("{}.", i + 1).dimmed(),
            prediction.score,
            colorize_label(prediction.label, prediction.label == toxic),
            preview(text, PREVIEW_CHARS).dimmed(),
        );
    }
}

fn colorize_label(label: &str, positive: bool) -> String {
    if positive {
        label.red().bold().to_string()
    } else {
        label.green().to_string()
    }
}
