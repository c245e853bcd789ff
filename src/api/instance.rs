//! # Instance API Module
//!
//! Instances mirror provider sessions. They scope rules and conversations
//! and back the tracked click-to-chat link served at `/go/{instance}`.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::{models::instance::Instance, repo};

/// Message text the link pre-fills: the template followed by the ref tag
pub fn tagged_message(instance: &Instance) -> String {
    let tag = format!("[ref:{}]", instance.ref_tag);
    let template = instance.message_template.trim();

    if template.is_empty() {
        return tag;
    }

    format!("{template} {tag}")
}

/// Click-to-chat url of `instance`, `None` when it has no phone to open
pub fn build_chat_link(link_base: &str, instance: &Instance) -> Option<String> {
    let phone = instance
        .phone
        .as_deref()
        .and_then(super::phone::normalize)?;

    Some(format!(
        "{base}/{phone}?text={text}",
        base = link_base.trim_end_matches('/'),
        text = urlencoding::encode(&tagged_message(instance)),
    ))
}

/// Counts a click on the instance link and returns where to send the visitor.
///
/// `Ok(None)` means there is no instance called `name` or it has no phone.
pub async fn register_click(
    name: &str,
    link_base: &str,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<Option<String>> {
    let instance = repo.register_instance_click(name).await?;

    Ok(instance.and_then(|instance| build_chat_link(link_base, &instance)))
}

/// Link settings of an instance, as sent by an operator
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct InstanceSettings {
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub message_template: String,
    /// Generated when missing
    #[serde(default)]
    pub ref_tag: Option<String>,
}

/// Registers or updates the instance called `settings.name`.
///
/// The phone is stored normalized; a phone that does not normalize is rejected.
pub async fn save_instance(
    settings: &InstanceSettings,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<i64> {
    let name = settings.name.trim();
    if name.is_empty() {
        bail!("instance name must not be empty");
    }

    let phone = match settings.phone.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            super::phone::normalize(raw).with_context(|| format!("invalid instance phone: {raw}"))?,
        ),
        _ => None,
    };

    let instance = Instance {
        name: name.to_string(),
        phone,
        message_template: settings.message_template.trim().to_string(),
        ref_tag: settings.ref_tag.clone().unwrap_or_default(),
        ..Default::default()
    };

    repo.save_instance(&instance).await
}

pub async fn list_instances(repo: &repo::ImplAppRepo) -> anyhow::Result<Vec<Instance>> {
    repo.get_instances().await
}

/// Id of the instance called `name`, registered on first sight
pub async fn resolve_instance_id(
    name: Option<&str>,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<Option<i64>> {
    match name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => Ok(Some(repo.get_or_create_instance(name).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MockAppRepo;
    use mockall::predicate::*;

    fn create_test_instance(phone: Option<&str>) -> Instance {
        Instance {
            id: 1,
            name: "loja-centro".to_string(),
            phone: phone.map(str::to_string),
            message_template: "Olá! Quero saber mais".to_string(),
            ref_tag: "SITE01".to_string(),
            clicks: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_chat_link_encodes_tagged_template() {
        let link = build_chat_link("https://wa.me/", &create_test_instance(Some("+55 11 99999-9999")));

        assert_eq!(
            link.as_deref(),
            Some("https://wa.me/5511999999999?text=Ol%C3%A1%21%20Quero%20saber%20mais%20%5Bref%3ASITE01%5D")
        );
    }

    #[test]
    fn test_tagged_message_without_template() {
        let instance = Instance {
            message_template: String::new(),
            ..create_test_instance(None)
        };

        assert_eq!(tagged_message(&instance), "[ref:SITE01]");
        assert_eq!(build_chat_link("https://wa.me", &instance), None);
    }

    #[ntex::test]
    async fn test_register_click_unknown_instance() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_register_instance_click()
            .with(eq("desconhecida"))
            .times(1)
            .returning(|_| Ok(None));
        let mock_repo: Box<dyn repo::AppRepo> = Box::new(mock_repo);

        let result = register_click("desconhecida", "https://wa.me", &mock_repo).await;

        assert!(result.is_ok_and(|link| link.is_none()));
    }

    #[ntex::test]
    async fn test_save_instance_normalizes_phone() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_save_instance()
            .withf(|instance| {
                instance.name == "loja-centro"
                    && instance.phone.as_deref() == Some("5511999999999")
                    && instance.ref_tag.is_empty()
            })
            .times(1)
            .returning(|_| Ok(4));
        let mock_repo: Box<dyn repo::AppRepo> = Box::new(mock_repo);

        let settings = InstanceSettings {
            name: " loja-centro ".to_string(),
            phone: Some("+55 (11) 99999-9999".to_string()),
            message_template: "Oi".to_string(),
            ref_tag: None,
        };

        assert!(save_instance(&settings, &mock_repo).await.is_ok_and(|id| id == 4));
    }

    #[ntex::test]
    async fn test_save_instance_rejects_invalid_input() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_save_instance().times(0);
        let mock_repo: Box<dyn repo::AppRepo> = Box::new(mock_repo);

        let blank_name = InstanceSettings {
            name: "  ".to_string(),
            ..Default::default()
        };
        let broadcast_phone = InstanceSettings {
            name: "loja-centro".to_string(),
            phone: Some("status@broadcast".to_string()),
            ..Default::default()
        };

        assert!(save_instance(&blank_name, &mock_repo).await.is_err());
        assert!(save_instance(&broadcast_phone, &mock_repo).await.is_err());
    }

    #[ntex::test]
    async fn test_resolve_instance_id_ignores_blank_names() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_or_create_instance().times(0);
        let mock_repo: Box<dyn repo::AppRepo> = Box::new(mock_repo);

        assert!(resolve_instance_id(Some("  "), &mock_repo).await.is_ok_and(|id| id.is_none()));
        assert!(resolve_instance_id(None, &mock_repo).await.is_ok_and(|id| id.is_none()));
    }
}
