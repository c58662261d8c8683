#![allow(dead_code)]

pub mod temp_files {
    use std::path::{Path, PathBuf};

    /// A route config written into its own temporary directory; removed on drop
    pub struct TempConfig {
        _dir: tempfile::TempDir,
        path: PathBuf,
    }

    impl TempConfig {
        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Replace the file contents.
        pub fn write(&self, content: &str) {
            std::fs::write(&self.path, content).unwrap();
        }
    }

    pub fn create_temp_config(content: &str, ext: &str) -> TempConfig {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("routes.{ext}"));
        std::fs::write(&path, content).unwrap();
        TempConfig { _dir: dir, path }
    }

    pub fn create_temp_yaml(content: &str) -> TempConfig {
        create_temp_config(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> TempConfig {
        create_temp_config(content, "json")
    }
}

pub mod fixtures {
    /// Two virtual hosts sharing paths, with nested routes and a catch-all
    pub const ROUTES_YAML: &str = r#"
domains:
  shop:
    host: shop.example.com
    global:
      redirect_fixed_path: true
      not_found:
        controller: Errors
        action: NotFound
    cors:
      enable: true
    routes:
      home:
        path: /
        controller: Home
      products:
        path: /products
        controller: Products
        action: List
        routes:
          create_product:
            path: /
            method: POST
          show_product:
            path: /:id
          update_product:
            path: /:id
            method: PATCH
          delete_product:
            path: /:id
            method: DELETE
          product_reviews:
            path: /:id/reviews/:review
            controller: Reviews
      assets:
        path: /assets/*filepath
        controller: Static
        action: Serve
  api:
    name: public-api
    host: API.example.com
    port: 8443
    global:
      auto_options: false
      method_not_allowed: false
    routes:
      status:
        path: /status
        controller: Health
      user:
        path: /v1/users/:user
        controller: Users
"#;
}
