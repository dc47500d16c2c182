use anyhow::Result;
use colored::Colorize;
use octofhir_client_policy::{ConditionRegistry, RealmEvaluation, Vote};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_failure(msg: &str) {
    println!("{} {}", "✗".red(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn colored_vote(vote: Vote) -> String {
    match vote {
        Vote::Yes => vote.to_string().green().to_string(),
        Vote::No => vote.to_string().red().to_string(),
        Vote::Abstain => vote.to_string().dimmed().to_string(),
    }
}

pub fn print_evaluation(evaluation: &RealmEvaluation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let executors = evaluation.executors_to_run();
            print_json(&serde_json::json!({
                "evaluation": evaluation,
                "executorsToRun": executors,
            }))
        }
        OutputFormat::Text => {
            println!(
                "{} {}  {} {}",
                "Realm:".cyan(),
                evaluation.realm,
                "Event:".cyan(),
                evaluation.event
            );

            if evaluation.decisions.is_empty() {
                println!("No enabled client policies.");
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["Policy", "Vote", "Conditions"]);
            for decision in &evaluation.decisions {
                let conditions = decision
                    .condition_votes
                    .iter()
                    .map(|cv| format!("{}={}", cv.condition, cv.vote))
                    .collect::<Vec<_>>()
                    .join(", ");
                builder.push_record([
                    decision.policy_name.clone(),
                    colored_vote(decision.vote),
                    conditions,
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));

            let executors = evaluation.executors_to_run();
            if executors.is_empty() {
                println!("No executors to run.");
            } else {
                println!("{}", "Executors to run:".cyan());
                for executor in executors {
                    println!("  - {}", executor.provider_id);
                }
            }
            Ok(())
        }
    }
}

pub fn print_providers(registry: &ConditionRegistry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let providers: Vec<_> = registry
                .factories()
                .map(|f| {
                    serde_json::json!({
                        "providerId": f.provider_id(),
                        "helpText": f.help_text(),
                    })
                })
                .collect();
            print_json(&providers)
        }
        OutputFormat::Text => {
            let mut builder = Builder::default();
            builder.push_record(["Provider ID", "Description"]);
            for factory in registry.factories() {
                builder.push_record([factory.provider_id(), factory.help_text()]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            Ok(())
        }
    }
}
