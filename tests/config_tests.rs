use radixroute::config::{load_config, RouteConfig};
use radixroute::domain::Router;
use radixroute::router::RouterError;

mod common;
use common::fixtures::ROUTES_YAML;
use common::temp_files;

#[test]
fn test_yaml_and_json_build_the_same_router() {
    let yaml = temp_files::create_temp_yaml(ROUTES_YAML);
    let config: RouteConfig = load_config(yaml.path()).unwrap();
    let json = temp_files::create_temp_json(&serde_json::to_string(&config).unwrap());

    let from_yaml = Router::load(yaml.path()).unwrap();
    let from_json = Router::load(json.path()).unwrap();

    let summary = |router: &Router| -> Vec<(String, usize)> {
        router
            .domains()
            .iter()
            .map(|d| (d.key(), d.table().len()))
            .collect()
    };
    assert_eq!(summary(&from_yaml), summary(&from_json));
    assert_eq!(
        summary(&from_yaml),
        vec![
            ("api.example.com:8443".to_string(), 2),
            ("shop.example.com".to_string(), 8),
        ]
    );
}

#[test]
fn test_domain_flags_from_config() {
    let yaml = temp_files::create_temp_yaml(ROUTES_YAML);
    let router = Router::load(yaml.path()).unwrap();

    let shop = router.lookup("shop.example.com").unwrap();
    assert!(shop.redirect_fixed_path);
    assert!(shop.cors_enabled);
    assert!(shop.auto_options);

    let api = router.lookup("api.example.com:8443").unwrap();
    assert!(!api.auto_options);
    assert!(!api.method_not_allowed);
    assert!(api.redirect_trailing_slash);
    assert!(!api.cors_enabled);
}

#[test]
fn test_nested_routes_inherit_and_default() {
    let yaml = temp_files::create_temp_yaml(ROUTES_YAML);
    let router = Router::load(yaml.path()).unwrap();
    let table = router.lookup("shop.example.com").unwrap().table();

    let create = table.route("create_product").unwrap();
    assert_eq!(create.path, "/products/");
    assert_eq!(create.controller, "Products");
    assert_eq!(create.action, "Create");
    assert_eq!(create.parent.as_deref(), Some("products"));

    assert_eq!(table.route("delete_product").unwrap().action, "Delete");
    assert_eq!(table.route("products").unwrap().action, "List");
    assert_eq!(table.route("product_reviews").unwrap().controller, "Reviews");
}

#[test]
fn test_conflicting_routes_fail_with_path_context() {
    let yaml = temp_files::create_temp_yaml(
        r#"
domains:
  main:
    host: example.com
    routes:
      by_id:
        path: /items/:id
        controller: Items
      by_name:
        path: /items/:name
        controller: Items
"#,
    );
    let err = Router::load(yaml.path()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains(&yaml.path().display().to_string()), "{chain}");
    let router_err = err.downcast_ref::<RouterError>().unwrap();
    assert!(router_err.is_conflict());
}

#[test]
fn test_duplicate_hosts_rejected() {
    let yaml = temp_files::create_temp_yaml(
        r#"
domains:
  a:
    host: example.com
    port: 80
  b:
    host: EXAMPLE.COM
"#,
    );
    let err = Router::load(yaml.path()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RouterError>(),
        Some(&RouterError::DuplicateDomain {
            key: "example.com".into()
        })
    );
}

#[test]
fn test_invalid_method_and_path() {
    let bad_method = temp_files::create_temp_yaml(
        r#"
domains:
  main:
    host: example.com
    routes:
      x:
        path: /x
        method: "GE T"
        controller: X
"#,
    );
    assert!(matches!(
        Router::load(bad_method.path())
            .unwrap_err()
            .downcast_ref::<RouterError>(),
        Some(RouterError::InvalidMethod { .. })
    ));

    let bad_path = temp_files::create_temp_yaml(
        r#"
domains:
  main:
    host: example.com
    routes:
      x:
        path: x
        controller: X
"#,
    );
    assert!(matches!(
        Router::load(bad_path.path())
            .unwrap_err()
            .downcast_ref::<RouterError>(),
        Some(RouterError::InvalidPath { .. })
    ));
}

#[test]
fn test_empty_config() {
    let yaml = temp_files::create_temp_yaml("domains: {}\n");
    let err = Router::load(yaml.path()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RouterError>(),
        Some(&RouterError::NoDomainsConfigured)
    );
}
