//! # Rule Matcher
//!
//! Classifies a message against the stored keyword rules. Rules are scanned in
//! storage order without short-circuit: the first matching ORIGIN rule wins,
//! every matching STATUS rule overwrites the previous one.

use serde::Serialize;

use crate::{
    models::rule::{MatchMode, NewRule, Rule, RuleInputError, RuleType},
    repo,
};

/// Labels derived from one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub origin: Option<String>,
    pub status: Option<String>,
}

impl RuleMatch {
    pub fn is_empty(&self) -> bool {
        self.origin.is_none() && self.status.is_none()
    }
}

/// Whether `rule` matches the already lowercased and trimmed message text
fn rule_matches(rule: &Rule, text: &str) -> bool {
    let needle = rule.text.trim().to_lowercase();
    if !rule.active || needle.is_empty() {
        return false;
    }

    match rule.mode {
        MatchMode::Contains => text.contains(&needle),
        MatchMode::Exact => text == needle,
    }
}

/// Evaluates `text` against `rules` and returns the derived origin and status
pub fn match_rules(text: &str, rules: &[Rule]) -> RuleMatch {
    let text = text.trim().to_lowercase();
    let mut rule_match = RuleMatch::default();

    if text.is_empty() {
        return rule_match;
    }

    for rule in rules.iter().filter(|rule| rule_matches(rule, &text)) {
        match rule.rule_type {
            RuleType::Origin if rule_match.origin.is_none() => {
                rule_match.origin = Some(rule.result.clone());
            }
            RuleType::Origin => {}
            RuleType::Status => {
                rule_match.status = Some(rule.result.clone());
            }
        }
    }

    rule_match
}

/// Loads the active rules for `instance_id` and classifies `text`
pub async fn classify_message(
    text: &str,
    instance_id: Option<i64>,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<RuleMatch> {
    if text.trim().is_empty() {
        return Ok(RuleMatch::default());
    }

    let rules = repo.get_active_rules(instance_id).await?;
    Ok(match_rules(text, &rules))
}

pub async fn list_rules(repo: &repo::ImplAppRepo) -> anyhow::Result<Vec<Rule>> {
    repo.get_all_rules().await
}

/// Stores a new rule. Blank text or result and unknown scope instances are
/// rejected with a [`RuleInputError`].
pub async fn create_rule(rule: &NewRule, repo: &repo::ImplAppRepo) -> anyhow::Result<Rule> {
    if !rule.is_valid() {
        return Err(RuleInputError::Blank.into());
    }

    repo.insert_rule(rule).await
}

pub async fn set_rule_active(
    rule_id: i64,
    active: bool,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<bool> {
    repo.set_rule_active(rule_id, active).await
}

pub async fn delete_rule(rule_id: i64, repo: &repo::ImplAppRepo) -> anyhow::Result<bool> {
    repo.delete_rule(rule_id).await
}
