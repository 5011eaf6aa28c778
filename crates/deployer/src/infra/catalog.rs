use {
    super::http::{self, roundtrip},
    model::Catalog,
    reqwest::Url,
    std::path::{Path, PathBuf},
    tokio::fs,
};

/// Where the catalog of templates and networks comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Url(Url),
    File(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] http::Error),
    #[error("could not read catalog file {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("invalid catalog file {0:?}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// Loads the catalog once at startup.
pub async fn load(client: &reqwest::Client, source: &Source) -> Result<Catalog, Error> {
    let catalog = match source {
        Source::Url(url) => fetch(client, url).await?,
        Source::File(path) => read(path).await?,
    };
    tracing::debug!(
        templates = catalog.templates.len(),
        networks = catalog.networks.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

async fn fetch(client: &reqwest::Client, url: &Url) -> Result<Catalog, http::Error> {
    roundtrip!(<Catalog>; client.get(url.clone())).await
}

async fn read(path: &Path) -> Result<Catalog, Error> {
    let data = fs::read_to_string(path)
        .await
        .map_err(|err| Error::Io(path.to_owned(), err))?;
    serde_json::from_str(&data).map_err(|err| Error::Json(path.to_owned(), err))
}

#[cfg(test)]
mod tests {
    use {super::*, crate::tests::mock, serde_json::json, std::io::Write};

    fn catalog_json() -> serde_json::Value {
        json!({
            "templates": [{
                "id": "vesting",
                "name": "Vesting",
                "constructorFields": [{ "name": "amount", "type": "uint256" }],
            }],
            "networks": [{ "slug": "sepolia", "name": "Sepolia", "chainId": 11155111 }],
        })
    }

    #[tokio::test]
    async fn fetches_catalog() {
        let addr = mock::setup(vec![mock::Expectation::Get {
            path: "/api/catalog".to_string(),
            res: catalog_json(),
        }])
        .await;
        let url = format!("http://{addr}/api/catalog").parse().unwrap();

        let catalog = load(&reqwest::Client::new(), &Source::Url(url))
            .await
            .unwrap();
        assert_eq!(catalog.templates[0].constructor_fields[0].ty, "uint256");
        assert_eq!(catalog.networks[0].slug, "sepolia");
    }

    #[tokio::test]
    async fn reads_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", catalog_json()).unwrap();

        let catalog = load(
            &reqwest::Client::new(),
            &Source::File(file.path().to_owned()),
        )
        .await
        .unwrap();
        assert_eq!(catalog.templates[0].id, "vesting");
    }

    #[tokio::test]
    async fn reports_missing_file() {
        let result = load(
            &reqwest::Client::new(),
            &Source::File("/does/not/exist.json".into()),
        )
        .await;
        assert!(matches!(result, Err(Error::Io(..))));
    }
}
