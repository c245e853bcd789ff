use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use wa_lead_tracker::{
    api,
    models::rule::{MatchMode, NewRule, RuleType},
};

use crate::{config, utils};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Contains,
    Exact,
}

impl From<ModeArg> for MatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Contains => MatchMode::Contains,
            ModeArg::Exact => MatchMode::Exact,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RuleTypeArg {
    Origin,
    Status,
}

impl From<RuleTypeArg> for RuleType {
    fn from(rule_type: RuleTypeArg) -> Self {
        match rule_type {
            RuleTypeArg::Origin => RuleType::Origin,
            RuleTypeArg::Status => RuleType::Status,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunMigrationsArgs {
    #[arg(short, long)]
    file: String,
    /// Directory holding the migration files
    #[arg(short, long, default_value = "../migrations")]
    dir: String,
}

#[derive(Args, Debug, Clone)]
pub struct AddRuleArgs {
    /// Keyword compared against the message text
    #[arg(short, long)]
    text: String,
    /// Value written to the conversation when the rule matches
    #[arg(short, long)]
    result: String,
    #[arg(long, value_enum)]
    rule_type: RuleTypeArg,
    #[arg(short, long, value_enum, default_value = "contains")]
    mode: ModeArg,
    /// Restrict the rule to this instance
    #[arg(short, long)]
    instance: Option<String>,
    /// Store the rule disabled
    #[arg(long)]
    inactive: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SetRuleActiveArgs {
    #[arg(long)]
    id: i64,
    #[arg(long, action = clap::ArgAction::Set)]
    active: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddInstanceArgs {
    #[arg(short, long)]
    name: String,
    /// Number the click-to-chat link opens
    #[arg(short, long)]
    phone: Option<String>,
    #[arg(short, long, default_value = "")]
    template: String,
    /// Generated when missing
    #[arg(short, long)]
    ref_tag: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    RunMigrations(RunMigrationsArgs),
    AddRule(AddRuleArgs),
    ListRules,
    SetRuleActive(SetRuleActiveArgs),
    AddInstance(AddInstanceArgs),
    ListInstances,
}

/// Maintenance commands for the lead tracker database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let app_config = config::load_storage_config()?;

        if let Action::RunMigrations(RunMigrationsArgs { file, dir }) = &self.action {
            utils::run_migrations(&app_config, dir, file).await?;
            info!("migration {file} applied");
            return Ok(());
        }

        let repo = utils::setup_repo(&app_config)?;

        match &self.action {
            Action::RunMigrations(_) => {}
            Action::AddRule(args) => {
                let scope_instance_id =
                    api::instance::resolve_instance_id(args.instance.as_deref(), &repo).await?;
                let new_rule = NewRule {
                    text: args.text.clone(),
                    mode: args.mode.into(),
                    rule_type: args.rule_type.into(),
                    result: args.result.clone(),
                    active: !args.inactive,
                    scope_instance_id,
                };

                let rule = api::rules::create_rule(&new_rule, &repo).await?;
                info!("rule {} created: {} -> {}", rule.id, rule.rule_type, rule.result);
            }
            Action::ListRules => {
                for rule in api::rules::list_rules(&repo).await? {
                    info!(
                        "{} [{}] {} {:?} -> {} active={} instance={:?}",
                        rule.id,
                        rule.rule_type,
                        rule.mode,
                        rule.text,
                        rule.result,
                        rule.active,
                        rule.scope_instance_id
                    );
                }
            }
            Action::SetRuleActive(SetRuleActiveArgs { id, active }) => {
                if !api::rules::set_rule_active(*id, *active, &repo).await? {
                    anyhow::bail!("rule {id} does not exist");
                }
                info!("rule {id} active={active}");
            }
            Action::AddInstance(args) => {
                let settings = api::instance::InstanceSettings {
                    name: args.name.clone(),
                    phone: args.phone.clone(),
                    message_template: args.template.clone(),
                    ref_tag: args.ref_tag.clone(),
                };

                let id = api::instance::save_instance(&settings, &repo).await?;
                info!("instance {} saved with id {id}", settings.name);
            }
            Action::ListInstances => {
                for instance in api::instance::list_instances(&repo).await? {
                    info!(
                        "{} {} phone={:?} ref={} clicks={}",
                        instance.id,
                        instance.name,
                        instance.phone,
                        instance.ref_tag,
                        instance.clicks
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_rule() {
        let args = AppArgs::parse_from([
            "scripts",
            "add-rule",
            "--text",
            "vim pelo site",
            "--result",
            "SITE OFICIAL",
            "--rule-type",
            "origin",
        ]);

        let Action::AddRule(rule) = args.action else {
            panic!("expected add-rule");
        };
        assert_eq!(rule.text, "vim pelo site");
        assert!(matches!(rule.mode, ModeArg::Contains));
        assert_eq!(RuleType::from(rule.rule_type), RuleType::Origin);
        assert!(!rule.inactive);
    }

    #[test]
    fn test_parse_set_rule_active() {
        let args = AppArgs::parse_from(["scripts", "set-rule-active", "--id", "3", "--active", "false"]);

        assert!(matches!(
            args.action,
            Action::SetRuleActive(SetRuleActiveArgs { id: 3, active: false })
        ));
    }
}
