use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use chrono::DateTime;
use chrono::Utc;
use mongodb::Collection;
use mongodb::Database;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::outbound::repositories::mongo::is_duplicate_key;
use crate::outbound::repositories::mongo::USERS_COLLECTION;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    password: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: UserId(doc.id),
            name: doc.name,
            email: doc.email,
            password_hash: doc.password,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let document = UserDocument {
            id: ObjectId::new(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        self.collection
            .insert_one(&document, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    return UserError::EmailAlreadyExists(document.email.clone());
                }
                UserError::DatabaseError(e.to_string())
            })?;

        Ok(document.into())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let document = self
            .collection
            .find_one(doc! { "_id": id.0 }, None)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(document.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let document = self
            .collection
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(document.map(User::from))
    }
}
