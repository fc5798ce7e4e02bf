use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{GroupMessage, KickedUser, Participant, UserProfile};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        UserProfile::COLLECTION,
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index(bson::doc! { "group_id": 1 }),
        ],
    )
    .await?;

    // Participants: one record per (group, user)
    create_indexes(
        db,
        Participant::COLLECTION,
        vec![
            index_unique(bson::doc! { "group_id": 1, "user_id": 1 }),
            index(bson::doc! { "group_id": 1, "joined_at": 1 }),
        ],
    )
    .await?;

    // Messages
    create_indexes(
        db,
        GroupMessage::COLLECTION,
        vec![index(bson::doc! { "group_id": 1, "created_at": -1 })],
    )
    .await?;

    // Kicked users
    create_indexes(
        db,
        KickedUser::COLLECTION,
        vec![index_unique(bson::doc! { "group_id": 1, "user_id": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
