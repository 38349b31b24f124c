use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::firestore::api::query::QueryProjection;
use crate::firestore::constants::DEFAULT_DATABASE_ID;
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::DatabaseId;
use crate::firestore::remote::connection::Connection;
use crate::firestore::remote::datastore::{
    Datastore, DatastoreArc, HttpDatastore, NoopTokenProvider, StaticTokenProvider,
    TokenProviderArc,
};

/// Handle to one Firestore database. Cheap to clone.
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<FirestoreInner>,
}

struct FirestoreInner {
    database_id: DatabaseId,
    datastore: DatastoreArc,
}

impl Firestore {
    pub fn builder(project_id: impl Into<String>) -> FirestoreBuilder {
        FirestoreBuilder::new(project_id)
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.inner.database_id
    }

    pub fn project_id(&self) -> &str {
        self.inner.database_id.project_id()
    }

    pub fn database(&self) -> &str {
        self.inner.database_id.database()
    }

    /// Starts a structured query.
    pub fn query(&self) -> QueryProjection {
        QueryProjection::new(self.clone())
    }

    pub(crate) fn datastore(&self) -> &dyn Datastore {
        self.inner.datastore.as_ref()
    }
}

impl fmt::Debug for Firestore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Firestore")
            .field("database_id", &self.inner.database_id)
            .finish_non_exhaustive()
    }
}

pub struct FirestoreBuilder {
    project_id: String,
    database: String,
    token_provider: Option<TokenProviderArc>,
    client: Option<Client>,
    emulator_host: Option<String>,
    request_timeout: Option<Duration>,
    datastore: Option<DatastoreArc>,
}

impl FirestoreBuilder {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: DEFAULT_DATABASE_ID.to_string(),
            token_provider: None,
            client: None,
            emulator_host: None,
            request_timeout: None,
            datastore: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_token_provider(mut self, provider: TokenProviderArc) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Shorthand for a [`StaticTokenProvider`].
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_token_provider(Arc::new(StaticTokenProvider::new(token)))
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Overrides `FIRESTORE_EMULATOR_HOST`.
    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Replaces the HTTP transport entirely. Connection settings are ignored.
    pub fn with_datastore(mut self, datastore: DatastoreArc) -> Self {
        self.datastore = Some(datastore);
        self
    }

    pub fn build(self) -> FirestoreResult<Firestore> {
        let database_id = DatabaseId::validated(&self.project_id, &self.database)?;
        let datastore = match self.datastore {
            Some(datastore) => datastore,
            None => {
                let mut connection = Connection::builder(database_id.clone());
                if let Some(client) = self.client {
                    connection = connection.with_client(client);
                }
                if let Some(host) = self.emulator_host {
                    connection = connection.with_emulator_host(host);
                }
                if let Some(timeout) = self.request_timeout {
                    connection = connection.with_request_timeout(timeout);
                }
                let provider = self
                    .token_provider
                    .unwrap_or_else(|| Arc::new(NoopTokenProvider));
                let datastore = HttpDatastore::builder(database_id.clone())
                    .with_connection_builder(connection)
                    .with_auth_provider(provider)
                    .build()?;
                Arc::new(datastore) as DatastoreArc
            }
        };

        Ok(Firestore {
            inner: Arc::new(FirestoreInner {
                database_id,
                datastore,
            }),
        })
    }
}
