use std::sync::Arc;

use serde_json::json;
use starberry_login::{AuthMethod, AuthMethodRegistry, ConfigError, InMemoryHttpClient, RegistryError, callback_path};

#[test]
fn test_auth_method_trait_object_safety() {
    let methods: Vec<Arc<dyn AuthMethod>> = Vec::new();
    let _ = methods;
}

#[test]
fn test_callback_path_format() {
    assert_eq!(callback_path("linkedin"), "/auth/linkedin/callback");
    assert_eq!(callback_path("li-2"), "/auth/li-2/callback");
}

#[cfg(feature = "linkedin")]
mod linkedin {
    use super::*;
    use starberry_login::social::linkedin::init_with_client;

    #[test]
    fn test_configured_values() {
        let mut registry = AuthMethodRegistry::new();
        let conf = json!({
            "plugin_module": "auth.linkedin",
            "id": "pro",
            "name": "LinkedIn (staff)",
            "client_id": "cid",
            "client_secret": "csecret"
        });
        init_with_client(&mut registry, &conf, InMemoryHttpClient::new()).unwrap();

        let method = registry.get("pro").unwrap();
        assert_eq!(method.id(), "pro");
        assert_eq!(method.name(), "LinkedIn (staff)");
        assert_eq!(method.callback_path(), "/auth/pro/callback");
        assert!(method.icon_markup().contains("fa-linkedin-square"));
    }

    #[test]
    fn test_default_name() {
        let mut registry = AuthMethodRegistry::new();
        init_with_client(&mut registry, &json!({"id": "linkedin"}), InMemoryHttpClient::new()).unwrap();
        assert_eq!(registry.get("linkedin").unwrap().name(), "LinkedIn Login");
    }

    #[test]
    fn test_two_instances_are_independent() {
        let mut registry = AuthMethodRegistry::new();
        init_with_client(&mut registry, &json!({"id": "li-a", "client_id": "a"}), InMemoryHttpClient::new()).unwrap();
        init_with_client(&mut registry, &json!({"id": "li-b", "client_id": "b"}), InMemoryHttpClient::new()).unwrap();

        assert_eq!(registry.len(), 2);
        let a = registry.get("li-a").unwrap();
        let b = registry.get("li-b").unwrap();
        assert_eq!(a.callback_path(), "/auth/li-a/callback");
        assert_eq!(b.callback_path(), "/auth/li-b/callback");
        let ids: Vec<&str> = registry.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["li-a", "li-b"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = AuthMethodRegistry::new();
        init_with_client(&mut registry, &json!({"id": "li"}), InMemoryHttpClient::new()).unwrap();
        let err = init_with_client(&mut registry, &json!({"id": "li"}), InMemoryHttpClient::new()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(id) if id == "li"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_id_rejected() {
        let mut registry = AuthMethodRegistry::new();
        let err = init_with_client(&mut registry, &json!({"client_id": "cid"}), InMemoryHttpClient::new()).unwrap_err();
        assert!(matches!(err, RegistryError::Config(ConfigError::MissingId)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bad_credentials_accepted_at_startup() {
        let mut registry = AuthMethodRegistry::new();
        let conf = json!({"id": "li", "client_id": "", "client_secret": ""});
        assert!(init_with_client(&mut registry, &conf, InMemoryHttpClient::new()).is_ok());
    }
}

#[cfg(all(feature = "linkedin", feature = "github"))]
#[test]
fn test_providers_share_one_registry() {
    let mut registry = AuthMethodRegistry::new();
    starberry_login::social::linkedin::init_with_client(&mut registry, &json!({"id": "li"}), InMemoryHttpClient::new()).unwrap();
    starberry_login::social::github::init_with_client(&mut registry, &json!({"id": "gh"}), InMemoryHttpClient::new()).unwrap();
    assert_eq!(registry.get("gh").unwrap().name(), "GitHub Login");
    assert_eq!(registry.get("li").unwrap().name(), "LinkedIn Login");
}
