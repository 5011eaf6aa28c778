use {
    alloy::primitives::Address,
    model::{Catalog, Network, Template},
};

/// What the operator selected so far.
///
/// Sessions are never mutated. Every operator action produces a new session
/// that replaces the previous one, so whatever was rendered from a session
/// stays consistent with it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    template: Option<String>,
    network: Option<String>,
    account: Option<Address>,
    busy: bool,
}

impl Session {
    pub fn select_template(&self, id: &str) -> Self {
        Self {
            template: Some(id.to_string()),
            ..self.clone()
        }
    }

    pub fn select_network(&self, slug: &str) -> Self {
        Self {
            network: Some(slug.to_lowercase()),
            ..self.clone()
        }
    }

    pub fn connected(&self, account: Address) -> Self {
        Self {
            account: Some(account),
            ..self.clone()
        }
    }

    /// Marks a submission as in flight. Returns `None` if one already is.
    ///
    /// This is advisory only: nothing prevents running two submissions from
    /// two copies of the same session.
    pub fn submitting(&self) -> Option<Self> {
        if self.busy {
            return None;
        }
        Some(Self {
            busy: true,
            ..self.clone()
        })
    }

    pub fn settled(&self) -> Self {
        Self {
            busy: false,
            ..self.clone()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// Looks up the selected template in the catalog.
    pub fn template<'a>(&self, catalog: &'a Catalog) -> Result<&'a Template, SelectionError> {
        let id = self
            .template
            .as_deref()
            .ok_or(SelectionError::NoTemplate)?;
        catalog
            .template(id)
            .ok_or_else(|| SelectionError::UnknownTemplate(id.to_string()))
    }

    /// Looks up the selected template and network in the catalog.
    pub fn selection<'a>(
        &self,
        catalog: &'a Catalog,
    ) -> Result<(&'a Template, &'a Network), SelectionError> {
        let template = self.template(catalog)?;
        let slug = self.network.as_deref().ok_or(SelectionError::NoNetwork)?;
        let network = catalog
            .network(slug)
            .ok_or_else(|| SelectionError::UnknownNetwork(slug.to_string()))?;
        Ok((template, network))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no template selected")]
    NoTemplate,
    #[error("no network selected")]
    NoNetwork,
    #[error("template {0:?} is not in the catalog")]
    UnknownTemplate(String),
    #[error("network {0:?} is not in the catalog")]
    UnknownNetwork(String),
}
