use bson::doc;
use mongodb::error::ErrorKind;
use mongodb::error::WriteFailure;
use mongodb::options::IndexOptions;
use mongodb::Client;
use mongodb::Database;
use mongodb::IndexModel;

pub const USERS_COLLECTION: &str = "users";
pub const EVENTS_COLLECTION: &str = "events";

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Shared MongoDB handle.
///
/// Opened once at startup, handed to the repositories, and shut down on exit.
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a ping.
    pub async fn connect(url: &str, database: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(url).await?;
        let database = client.database(database);

        database.run_command(doc! { "ping": 1 }, None).await?;

        tracing::info!(database = database.name(), "Connected to MongoDB");

        Ok(Self { client, database })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Create the unique email index and the event text index if missing.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let users = self.database.collection::<bson::Document>(USERS_COLLECTION);
        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("idx_email_unique".to_string())
                            .unique(true)
                            .build(),
                    )
                    .build(),
                None,
            )
            .await?;

        let events = self.database.collection::<bson::Document>(EVENTS_COLLECTION);
        events
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "title": "text", "type": "text" })
                    .options(
                        IndexOptions::builder()
                            .name("idx_title_type_text".to_string())
                            .build(),
                    )
                    .build(),
                None,
            )
            .await?;

        tracing::debug!("MongoDB indexes ensured");

        Ok(())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        tracing::info!("MongoDB connection closed");
    }
}

/// True when the write was rejected by a unique index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}
