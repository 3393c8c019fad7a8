use super::{
    dto::{NewNotification, Notification},
    entity::{NotificationFindEntity, NotificationInsertEntity},
    Error, NotificationsRepository,
};
use crate::dto::input;
use axum::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use std::sync::Arc;

const NOTIFICATIONS: &str = "notifications";
const INDEX_NAME_USER_ID_CREATED_AT: &str = "index_user_id_created_at";
const INDEX_NAME_UNIQUE_IDEMPOTENCY_KEY: &str = "unique_index_idempotency_key";

pub struct NotificationsRepositoryImpl {
    database: Database,
}

impl NotificationsRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        let collection_names = database.list_collection_names().await?;
        if !collection_names.iter().any(|name| name == NOTIFICATIONS) {
            database.create_collection(NOTIFICATIONS).await?;
        }

        let collection = database.collection::<Document>(NOTIFICATIONS);
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_USER_ID_CREATED_AT.to_string()) {
            Self::create_user_id_created_at_index(&collection).await?;
            tracing::debug!("created index {NOTIFICATIONS}.{INDEX_NAME_USER_ID_CREATED_AT}");
        }
        if !index_names.contains(&INDEX_NAME_UNIQUE_IDEMPOTENCY_KEY.to_string()) {
            Self::create_unique_idempotency_key_index(&collection).await?;
            tracing::debug!("created index {NOTIFICATIONS}.{INDEX_NAME_UNIQUE_IDEMPOTENCY_KEY}");
        }

        Ok(Self { database })
    }

    async fn create_user_id_created_at_index(
        collection: &Collection<Document>,
    ) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! {
                "user_id": 1,
                "created_at": -1,
            })
            .options(
                IndexOptions::builder()
                    .name(INDEX_NAME_USER_ID_CREATED_AT.to_string())
                    .build(),
            )
            .build();

        collection.create_index(index).await?;

        Ok(())
    }

    async fn create_unique_idempotency_key_index(
        collection: &Collection<Document>,
    ) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! {
                "idempotency_key": 1,
            })
            .options(
                IndexOptions::builder()
                    .name(INDEX_NAME_UNIQUE_IDEMPOTENCY_KEY.to_string())
                    .unique(true)
                    .sparse(true)
                    .build(),
            )
            .build();

        collection.create_index(index).await?;

        Ok(())
    }

    fn collection(&self) -> Collection<NotificationFindEntity> {
        self.database.collection(NOTIFICATIONS)
    }
}

#[async_trait]
impl NotificationsRepository for NotificationsRepositoryImpl {
    async fn insert(&self, notification: NewNotification) -> Result<Notification, Error> {
        let insert_entity = NotificationInsertEntity::from(&notification);

        let insert_result = self
            .database
            .collection::<NotificationInsertEntity>(NOTIFICATIONS)
            .insert_one(&insert_entity)
            .await
            .map_err(|err| {
                let ErrorKind::Write(ref write_failure) = *err.kind else {
                    return Error::Mongo(err);
                };

                let WriteFailure::WriteError(write_error) = write_failure else {
                    return Error::Mongo(err);
                };

                const DUPLICATE_KEY_CODE: i32 = 11000;
                match write_error.code == DUPLICATE_KEY_CODE {
                    true => Error::InsertUniqueViolation,
                    false => Error::Mongo(err),
                }
            })?;

        let Bson::ObjectId(id) = insert_result.inserted_id else {
            tracing::error!("invalid type of inserted '_id'");
            return Err(Error::Mongo(
                ErrorKind::Custom(Arc::new("invalid type of inserted '_id'")).into(),
            ));
        };

        Ok(Notification::inserted(id, notification))
    }

    async fn find(&self, id: ObjectId) -> Result<Option<Notification>, Error> {
        let notification = self
            .collection()
            .find_one(doc! { "_id": id })
            .await?
            .map(Notification::from);

        Ok(notification)
    }

    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<Notification>, Error> {
        let notification = self
            .collection()
            .find_one(doc! { "idempotency_key": idempotency_key })
            .await?
            .map(Notification::from);

        Ok(notification)
    }

    async fn find_many(
        &self,
        user_id: &str,
        pagination: input::Pagination,
    ) -> Result<Vec<Notification>, Error> {
        let limit = i64::try_from(pagination.limit).unwrap_or(i64::MAX);

        let notifications = self
            .collection()
            .find(doc! {
                "user_id": user_id,
                "deleted": false,
            })
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(pagination.skip())
            .limit(limit)
            .await?
            .map_ok(Notification::from)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(notifications)
    }

    async fn count(&self, user_id: &str) -> Result<u64, Error> {
        let count = self
            .collection()
            .count_documents(doc! {
                "user_id": user_id,
                "deleted": false,
            })
            .await?;

        Ok(count)
    }

    async fn mark_read(&self, id: ObjectId) -> Result<Option<Notification>, Error> {
        let notification = self
            .collection()
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "read": true,
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?
            .map(Notification::from);

        Ok(notification)
    }

    async fn soft_delete(&self, id: ObjectId) -> Result<(), Error> {
        let update_result = self
            .collection()
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "deleted": true,
                    }
                },
            )
            .await?;

        match update_result.matched_count == 1 {
            true => Ok(()),
            false => Err(Error::NoDocumentUpdated),
        }
    }
}
