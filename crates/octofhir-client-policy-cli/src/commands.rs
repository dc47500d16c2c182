use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use octofhir_client_policy::storage::ClientPolicyStorage;
use octofhir_client_policy::{
    ClientPolicyConfig, ClientPolicyContext, ClientPolicyError, ClientPolicyManager,
    ClientPolicySet, ConditionRegistry, InMemoryRealmStore, RealmSession, RealmSnapshot,
};

use crate::cli::OutputFormat;
use crate::output;

fn load_store(realm_file: &Path) -> Result<(String, InMemoryRealmStore)> {
    let snapshot = RealmSnapshot::from_file(realm_file)
        .with_context(|| format!("Failed to load realm snapshot {}", realm_file.display()))?;
    let realm = snapshot.realm.clone();
    Ok((realm, InMemoryRealmStore::from_snapshot(snapshot)))
}

fn load_context(path: &Path) -> Result<ClientPolicyContext> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse context {}", path.display()))
}

pub fn evaluate(
    config: ClientPolicyConfig,
    realm_file: &Path,
    context_file: &Path,
    format: OutputFormat,
) -> Result<()> {
    let (realm, store) = load_store(realm_file)?;
    let store = Arc::new(store);
    let context = load_context(context_file)?;

    tracing::debug!(realm = %realm, event = %context.event(), "Loaded realm and context");

    let manager = ClientPolicyManager::new(config, ConditionRegistry::with_defaults(), store.clone());
    let session = RealmSession::new(&realm, &*store);
    let evaluation = manager
        .evaluate(&session, &context)
        .with_context(|| format!("Client policy evaluation failed in realm '{realm}'"))?;

    output::print_evaluation(&evaluation, format)
}

pub fn validate(realm_file: &Path, format: OutputFormat) -> Result<()> {
    let (realm, store) = load_store(realm_file)?;
    let registry = ConditionRegistry::with_defaults();
    let set = ClientPolicySet::new(store.find_by_realm(&realm)?);

    let results: Vec<_> = set
        .policies
        .iter()
        .map(|policy| (policy.name.as_str(), policy.validate(&registry)))
        .collect();
    let duplicate = set
        .validate(&registry)
        .err()
        .filter(|e| matches!(e, ClientPolicyError::DuplicatePolicy { .. }));
    let failures = results.iter().filter(|(_, r)| r.is_err()).count()
        + usize::from(duplicate.is_some());

    match format {
        OutputFormat::Json => {
            let policies: Vec<_> = results
                .iter()
                .map(|(name, result)| {
                    serde_json::json!({
                        "policy": name,
                        "valid": result.is_ok(),
                        "error": result.as_ref().err().map(ToString::to_string),
                    })
                })
                .collect();
            output::print_json(&serde_json::json!({
                "realm": realm,
                "policies": policies,
                "error": duplicate.as_ref().map(ToString::to_string),
            }))?;
        }
        OutputFormat::Text => {
            for (name, result) in &results {
                match result {
                    Ok(()) => output::print_success(name),
                    Err(e) => output::print_failure(&format!("{name}: {e}")),
                }
            }
            if let Some(e) = &duplicate {
                output::print_failure(&e.to_string());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} client policy problem(s) in realm '{realm}'");
    }
    Ok(())
}

pub fn providers(format: OutputFormat) -> Result<()> {
    output::print_providers(&ConditionRegistry::with_defaults(), format)
}
