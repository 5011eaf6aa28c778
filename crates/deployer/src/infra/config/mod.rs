use {crate::infra::catalog, std::collections::HashMap, url::Url};

pub mod file;

pub struct Config {
    pub catalog: catalog::Source,
    /// The deployment history API. Records are only logged without one.
    pub persistence: Option<Url>,
    /// Whether to simulate calls before sending them to predict the address
    /// of the new contract.
    pub dry_run: bool,
    /// RPC endpoints by network slug, taking precedence over the catalog.
    pub rpc_urls: HashMap<String, Url>,
}

impl Config {
    /// The RPC endpoint to use for a network, if any is known.
    pub fn rpc_url(&self, slug: &str, catalog_url: Option<&str>) -> Option<String> {
        self.rpc_urls
            .get(&slug.to_lowercase())
            .map(Url::to_string)
            .or_else(|| catalog_url.filter(|url| !url.is_empty()).map(str::to_string))
    }
}
