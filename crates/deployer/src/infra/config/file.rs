use {
    crate::infra::catalog,
    serde::Deserialize,
    std::{
        collections::HashMap,
        path::{Path, PathBuf},
    },
    tokio::fs,
    url::Url,
};

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// URL of the catalog API.
    catalog_url: Option<Url>,

    /// Path to a JSON file with the catalog. Mutually exclusive with
    /// `catalog-url`.
    catalog_path: Option<PathBuf>,

    /// URL of the deployment history API. Created deployments are posted to
    /// it.
    persistence_url: Option<Url>,

    /// Simulate manager calls before submitting them.
    #[serde(default = "default_dry_run")]
    dry_run: bool,

    /// RPC endpoints by network slug.
    #[serde(default)]
    rpc_urls: HashMap<String, Url>,
}

fn default_dry_run() -> bool {
    true
}

/// Load the console configuration from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> super::Config {
    let data = fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("I/O error while reading {path:?}: {e:?}"));
    parse(&data, path)
}

fn parse(data: &str, path: &Path) -> super::Config {
    let config = toml::de::from_str::<Config>(data)
        .unwrap_or_else(|e| panic!("TOML syntax error while reading {path:?}: {e:?}"));
    let catalog = match (config.catalog_url, config.catalog_path) {
        (Some(url), None) => catalog::Source::Url(url),
        (None, Some(path)) => catalog::Source::File(path),
        (Some(_), Some(_)) => panic!(
            "invalid configuration: cannot specify both `catalog-url` and `catalog-path` \
             configuration options",
        ),
        (None, None) => panic!(
            "invalid configuration: must specify either `catalog-url` or `catalog-path` \
             configuration options",
        ),
    };

    super::Config {
        catalog,
        persistence: config.persistence_url,
        dry_run: config.dry_run,
        rpc_urls: config
            .rpc_urls
            .into_iter()
            .map(|(slug, url)| (slug.to_lowercase(), url))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn parses_full_config() {
        let config = parse(
            r#"
            catalog-url = "https://console.example/api/catalog"
            persistence-url = "https://console.example/api/deployments/"
            dry-run = false

            [rpc-urls]
            Sepolia = "https://rpc.sepolia.example/"
            "#,
            Path::new("test.toml"),
        );

        assert_eq!(
            config.catalog,
            catalog::Source::Url("https://console.example/api/catalog".parse().unwrap())
        );
        assert!(config.persistence.is_some());
        assert!(!config.dry_run);
        assert_eq!(
            config.rpc_url("sepolia", Some("https://catalog.example/")),
            Some("https://rpc.sepolia.example/".to_string())
        );
        assert_eq!(
            config.rpc_url("base", Some("https://catalog.example/")),
            Some("https://catalog.example/".to_string())
        );
        assert_eq!(config.rpc_url("base", Some("")), None);
    }

    #[test]
    fn dry_run_defaults_to_enabled() {
        let config = parse(r#"catalog-path = "catalog.json""#, Path::new("test.toml"));
        assert!(config.dry_run);
        assert!(config.persistence.is_none());
        assert_eq!(config.catalog, catalog::Source::File("catalog.json".into()));
    }

    #[test]
    #[should_panic(expected = "cannot specify both")]
    fn rejects_two_catalog_sources() {
        parse(
            r#"
            catalog-url = "https://console.example/api/catalog"
            catalog-path = "catalog.json"
            "#,
            Path::new("test.toml"),
        );
    }

    #[test]
    #[should_panic(expected = "TOML syntax error")]
    fn rejects_unknown_fields() {
        parse(
            r#"
            catalog-path = "catalog.json"
            managers = []
            "#,
            Path::new("test.toml"),
        );
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"catalog-path = "catalog.json""#).unwrap();
        let config = load(file.path()).await;
        assert_eq!(config.catalog, catalog::Source::File("catalog.json".into()));
    }
}
