use serde_json::{Value, json};
use tracing::debug;

use crate::transport::{ApiResponse, Transport};

use super::{
    API_KEYS_PATH, IamError, IamObject, Resource, SERVICE_ACCOUNTS_PATH,
    api_key::ApiKey,
    model::{ApiKeySummary, Collection, ServiceAccountData},
    non_empty, read_back, resolve, resolve_required, title_case,
};

/// Proxy of a service account.
pub struct ServiceAccount<'a, T>
where
    T: Transport,
{
    transport: &'a T,
    resource: Resource,
    /// Keys owned by the account as of the last [ServiceAccount::import_api_keys].
    api_keys: Vec<ApiKey<'a, T>>,
}

impl<'a, T> ServiceAccount<'a, T>
where
    T: Transport,
{
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            resource: Resource::new(Some(SERVICE_ACCOUNTS_PATH)),
            api_keys: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.resource.id = Some(id.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.resource.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.resource.description = Some(description.into());
        self
    }

    pub fn api_keys(&self) -> &[ApiKey<'a, T>] {
        &self.api_keys
    }

    /// Body of the creation request. The description defaults to the title cased display name.
    pub fn creation_payload(&self) -> Result<Value, IamError> {
        let display_name = resolve_required(None, self.display_name(), "display_name")?;
        let description = resolve(None, self.description(), || title_case(&display_name));
        Ok(json!({
            "display_name": display_name,
            "description": description,
        }))
    }

    /// Creates the account and adopts the id and link the server assigned.
    pub fn create(&mut self) -> Result<ApiResponse, IamError> {
        let payload = self.creation_payload()?;
        let url = format!("{}{}", self.transport.base_url(), SERVICE_ACCOUNTS_PATH);
        let response = self.transport.post(&url, &payload)?;

        let created: ServiceAccountData = read_back(&response)?;
        debug!("service account {} created", created.id);
        self.resource.self_link = Some(created.metadata.self_link);
        self.resource.id = Some(created.id);
        Ok(response)
    }

    /// Fetches the API keys owned by the account and appends them to [Self::api_keys].
    ///
    /// The keys get the account as owner and no link of their own, it is derived from their id.
    pub fn import_api_keys(&mut self) -> Result<ApiResponse, IamError> {
        let owner_id = resolve_required(None, self.id(), "id")?;
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("owner", &owner_id)
            .finish();
        let url = format!("{}{}?{query}", self.transport.base_url(), API_KEYS_PATH);
        let response = self.transport.get(&url)?;

        let listing: Collection<ApiKeySummary> = read_back(&response)?;
        debug!(
            "importing {} api keys owned by {owner_id}",
            listing.data.len()
        );
        let transport = self.transport;
        self.api_keys
            .extend(listing.data.into_iter().map(|summary| {
                ApiKey::imported(
                    transport,
                    summary.id,
                    owner_id.clone(),
                    summary.spec.resource.map(|r| r.id),
                )
            }));
        Ok(response)
    }

    /// Refreshes the local state from the server.
    ///
    /// With an id (given, else stored) the account is read directly. Otherwise, with a display
    /// name (given, else stored) the first listed account with exactly that name is adopted;
    /// when none matches nothing changes. With neither this does nothing.
    ///
    /// The local state is only replaced once the server answered; on error it is left as is.
    pub fn set_from_read(
        &mut self,
        display_name: Option<&str>,
        account_id: Option<&str>,
    ) -> Result<(), IamError> {
        if let Some(account_id) = non_empty(account_id) {
            let url = if self.id() == Some(account_id) {
                self.href()?
            } else {
                // A pinned link would point at the previous account.
                let collection = self
                    .resource
                    .collection_url(self.transport.base_url())
                    .ok_or(IamError::UnresolvableLink)?;
                format!("{collection}/{account_id}")
            };
            return self.read_from(&url);
        }
        if non_empty(self.id()).is_some() {
            let url = self.href()?;
            return self.read_from(&url);
        }

        let Some(display_name) = non_empty(display_name)
            .or(non_empty(self.display_name()))
            .map(str::to_string)
        else {
            debug!("no id nor display name to look the service account up");
            return Ok(());
        };

        let Some(response) = self.list()? else {
            return Ok(());
        };
        let listing: Collection<ServiceAccountData> = read_back(&response)?;
        match listing
            .data
            .into_iter()
            .find(|account| account.display_name == display_name)
        {
            Some(account) => {
                debug!("service account `{display_name}` found: {}", account.id);
                self.adopt(account);
            }
            None => debug!("no service account named `{display_name}`"),
        }
        Ok(())
    }

    fn read_from(&mut self, url: &str) -> Result<(), IamError> {
        let account: ServiceAccountData = read_back(&self.transport.get(url)?)?;
        self.adopt(account);
        Ok(())
    }

    fn adopt(&mut self, account: ServiceAccountData) {
        self.resource.self_link = Some(account.metadata.self_link);
        self.resource.id = Some(account.id);
        self.resource.description = Some(account.description);
        self.resource.display_name = Some(account.display_name);
    }
}

impl<T> IamObject for ServiceAccount<'_, T>
where
    T: Transport,
{
    type Transport = T;

    fn transport(&self) -> &T {
        self.transport
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::http_client::HttpClientError;
    use crate::http_client::tests::{MockHttpClient, json_response, request_json};
    use crate::transport::TransportError;
    use crate::transport::tests::test_transport;
    use assert_matches::assert_matches;
    use http::Method;

    fn account_json(id: &str, display_name: &str) -> Value {
        json!({
            "api_version": "iam/v2",
            "kind": "ServiceAccount",
            "id": id,
            "display_name": display_name,
            "description": format!("{display_name} description"),
            "metadata": {"self": format!("https://x/{id}")},
        })
    }

    fn listing(accounts: Vec<Value>) -> Value {
        json!({"api_version": "iam/v2", "kind": "ServiceAccountList", "data": accounts})
    }

    #[test]
    fn create_adopts_id_and_link() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| {
                req.method() == Method::POST
                    && req.uri() == "https://api.test/iam/v2/service-accounts"
                    && request_json(req)
                        == json!({"display_name": "svc-a", "description": "Svc-A"})
            })
            .returning(|_| {
                json_response(
                    201,
                    json!({
                        "id": "sa-1",
                        "display_name": "svc-a",
                        "description": "Svc-a",
                        "metadata": {"self": "https://x/sa-1"},
                    }),
                )
            });
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_display_name("svc-a");

        let response = account.create().unwrap();

        assert_eq!(response.status(), 201);
        assert_eq!(account.id(), Some("sa-1"));
        assert_eq!(account.href().unwrap(), "https://x/sa-1");
    }

    #[test]
    fn creation_description_defaults_to_title_cased_name() {
        let transport = test_transport(MockHttpClient::new());
        let account = ServiceAccount::new(&transport).with_display_name("my service");

        let payload = account.creation_payload().unwrap();

        assert_eq!(payload["description"], "My Service");
        assert_eq!(payload["display_name"], "my service");
    }

    #[test]
    fn creation_keeps_given_description() {
        let transport = test_transport(MockHttpClient::new());
        let account = ServiceAccount::new(&transport)
            .with_display_name("my service")
            .with_description("owned by the data team");

        let payload = account.creation_payload().unwrap();

        assert_eq!(payload["description"], "owned by the data team");
    }

    #[test]
    fn create_requires_display_name() {
        let transport = test_transport(MockHttpClient::new());
        let mut account = ServiceAccount::new(&transport);

        assert_matches!(
            account.create(),
            Err(IamError::MissingAttribute("display_name"))
        );
    }

    #[test]
    fn create_failure_leaves_state_untouched() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(|_| json_response(409, json!({"errors": [{"detail": "exists"}]})));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_display_name("svc-a");

        assert_matches!(
            account.create(),
            Err(IamError::Transport(TransportError::UnsuccessfulResponse(409, _)))
        );
        assert_eq!(account.id(), None);
        assert_matches!(account.href(), Err(IamError::UnresolvableLink));
    }

    #[test]
    fn import_api_keys_snapshots_the_listing() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| {
                req.method() == Method::GET
                    && req.uri() == "https://api.test/iam/v2/api-keys?owner=sa-1"
            })
            .returning(|_| {
                json_response(
                    200,
                    json!({"data": [
                        {
                            "id": "KEY1",
                            "metadata": {"self": "https://x/KEY1"},
                            "spec": {"owner": {"id": "sa-1"}, "resource": {"id": "lkc-1"}}
                        },
                        {
                            "id": "KEY2",
                            "metadata": {"self": "https://x/KEY2"},
                            "spec": {"owner": {"id": "sa-1"}, "resource": {"id": "lkc-2"}}
                        }
                    ]}),
                )
            });
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_id("sa-1");

        account.import_api_keys().unwrap();

        let keys = account.api_keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].id(), Some("KEY1"));
        assert_eq!(keys[0].owner_id(), Some("sa-1"));
        assert_eq!(keys[0].resource_id(), Some("lkc-1"));
        assert_eq!(keys[1].resource_id(), Some("lkc-2"));
        // Links are derived, not taken from the listing.
        assert_eq!(
            keys[1].href().unwrap(),
            "https://api.test/iam/v2/api-keys/KEY2"
        );
        assert_eq!(keys[0].secret(), None);
    }

    #[test]
    fn import_api_keys_requires_id() {
        let transport = test_transport(MockHttpClient::new());
        let mut account = ServiceAccount::new(&transport).with_display_name("svc-a");

        assert_matches!(
            account.import_api_keys(),
            Err(IamError::MissingAttribute("id"))
        );
        assert!(account.api_keys().is_empty());
    }

    #[test]
    fn set_from_read_by_id() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| {
                req.method() == Method::GET
                    && req.uri() == "https://api.test/iam/v2/service-accounts/sa-7"
            })
            .returning(|_| json_response(200, account_json("sa-7", "svc-seven")));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport);

        account.set_from_read(None, Some("sa-7")).unwrap();

        assert_eq!(account.id(), Some("sa-7"));
        assert_eq!(account.display_name(), Some("svc-seven"));
        assert_eq!(account.description(), Some("svc-seven description"));
        assert_eq!(account.href().unwrap(), "https://x/sa-7");
    }

    #[test]
    fn set_from_read_prefers_stored_id_over_name() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| req.uri() == "https://api.test/iam/v2/service-accounts/sa-1")
            .returning(|_| json_response(200, account_json("sa-1", "svc-a")));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_id("sa-1");

        account.set_from_read(Some("other-name"), None).unwrap();

        assert_eq!(account.display_name(), Some("svc-a"));
    }

    #[test]
    fn set_from_read_with_new_id_drops_previous_link() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| req.uri() == "https://api.test/iam/v2/service-accounts/sa-2")
            .returning(|_| json_response(200, account_json("sa-2", "svc-b")));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_id("sa-1");
        account.set_href("https://x/sa-1".to_string());

        account.set_from_read(None, Some("sa-2")).unwrap();

        assert_eq!(account.id(), Some("sa-2"));
        assert_eq!(account.href().unwrap(), "https://x/sa-2");
    }

    #[test]
    fn failed_read_of_another_account_keeps_the_current_one() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| req.uri() == "https://api.test/iam/v2/service-accounts/sa-typo")
            .returning(|_| json_response(404, json!({"errors": [{"status": "404"}]})));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_id("sa-1");
        account.set_href("https://x/sa-1".to_string());

        assert_matches!(
            account.set_from_read(None, Some("sa-typo")),
            Err(IamError::Transport(TransportError::UnsuccessfulResponse(404, _)))
        );
        assert_eq!(account.id(), Some("sa-1"));
        assert_eq!(account.href().unwrap(), "https://x/sa-1");
    }

    #[test]
    fn read_back_without_metadata_is_a_decoder_error() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(|_| json_response(200, json!({"id": "sa-7", "display_name": "svc"})));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport);

        assert_matches!(
            account.set_from_read(None, Some("sa-7")),
            Err(IamError::Decoder(_))
        );
        assert_eq!(account.id(), None);
    }

    #[test]
    fn create_without_metadata_is_a_decoder_error() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(|_| json_response(201, json!({"id": "sa-1", "display_name": "svc-a"})));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_display_name("svc-a");

        assert_matches!(account.create(), Err(IamError::Decoder(msg)) => {
            assert!(msg.contains("metadata"), "{msg}");
        });
        assert_eq!(account.id(), None);
    }

    #[test]
    fn import_api_keys_encodes_the_owner() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| {
                req.uri() == "https://api.test/iam/v2/api-keys?owner=sa+1%26x%3Dy"
            })
            .returning(|_| json_response(200, json!({"data": []})));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_id("sa 1&x=y");

        account.import_api_keys().unwrap();

        assert!(account.api_keys().is_empty());
    }

    #[test]
    fn set_from_read_adopts_first_name_match() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .withf(|req| {
                req.method() == Method::GET
                    && req.uri() == "https://api.test/iam/v2/service-accounts"
            })
            .returning(|_| {
                json_response(
                    200,
                    listing(vec![
                        account_json("sa-0", "svc-a-prefixed"),
                        account_json("sa-1", "svc-a"),
                        account_json("sa-2", "svc-a"),
                    ]),
                )
            });
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport);

        account.set_from_read(Some("svc-a"), None).unwrap();

        assert_eq!(account.id(), Some("sa-1"));
        assert_eq!(account.display_name(), Some("svc-a"));
        assert_eq!(account.href().unwrap(), "https://x/sa-1");
    }

    #[test]
    fn set_from_read_uses_stored_name() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(|_| json_response(200, listing(vec![account_json("sa-3", "svc-c")])));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_display_name("svc-c");

        account.set_from_read(None, None).unwrap();

        assert_eq!(account.id(), Some("sa-3"));
    }

    #[test]
    fn set_from_read_without_match_is_a_no_op() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(|_| json_response(200, listing(vec![account_json("sa-1", "svc-b")])));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport)
            .with_display_name("svc-a")
            .with_description("local");

        account.set_from_read(None, None).unwrap();

        assert_eq!(account.id(), None);
        assert_eq!(account.display_name(), Some("svc-a"));
        assert_eq!(account.description(), Some("local"));
        assert_matches!(account.href(), Err(IamError::UnresolvableLink));
    }

    #[test]
    fn set_from_read_without_id_nor_name_does_nothing() {
        let transport = test_transport(MockHttpClient::new());
        let mut account = ServiceAccount::new(&transport);

        account.set_from_read(None, None).unwrap();

        assert_eq!(account.id(), None);
    }

    #[test]
    fn transport_errors_propagate_unchanged() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_send()
            .once()
            .returning(|_| Err(HttpClientError::TransportError("dns failure".into())));
        let transport = test_transport(http_client);
        let mut account = ServiceAccount::new(&transport).with_id("sa-1");

        assert_matches!(
            account.set_from_read(None, None),
            Err(IamError::Transport(TransportError::Http(
                HttpClientError::TransportError(msg)
            ))) => assert_eq!(msg, "dns failure")
        );
    }
}
