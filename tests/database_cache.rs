mod common;

use std::time::Duration;

use bookstore_seaorm_core::entity::cache_entry;
use bookstore_seaorm_core::{BookListing, CacheBackend, Catalog, DatabaseCache, NewBook, Principal, QueryCache};
use sea_orm::{EntityTrait, PaginatorTrait};

use common::{insert_account, setup_db};

#[tokio::test]
async fn stored_entry_is_read_back() {
    let cache = DatabaseCache::new(setup_db().await);

    cache
        .set("bookstore:books.all:00", b"payload".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        cache.get("bookstore:books.all:00").await.unwrap(),
        Some(b"payload".to_vec())
    );
    assert_eq!(cache.get("bookstore:books.all:ff").await.unwrap(), None);
}

#[tokio::test]
async fn set_overwrites_an_existing_entry() {
    let db = setup_db().await;
    let cache = DatabaseCache::new(db.clone());

    cache
        .set("key", b"old".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();
    cache
        .set("key", b"new".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(cache.get("key").await.unwrap(), Some(b"new".to_vec()));
    assert_eq!(cache_entry::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn expired_entry_is_absent() {
    let cache = DatabaseCache::new(setup_db().await);

    cache
        .set("key", b"payload".to_vec(), Duration::from_millis(50))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(cache.get("key").await.unwrap(), None);
}

#[tokio::test]
async fn delete_expired_keeps_live_entries() {
    let db = setup_db().await;
    let cache = DatabaseCache::new(db.clone());
    cache
        .set("short", b"a".to_vec(), Duration::ZERO)
        .await
        .unwrap();
    cache
        .set("long", b"b".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();

    let removed = cache.delete_expired().await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(cache_entry::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(cache.get("long").await.unwrap(), Some(b"b".to_vec()));
}

#[tokio::test]
async fn catalog_listings_can_live_in_the_database() {
    let db = setup_db().await;
    insert_account(&db, 1, "reader@example.com").await;
    let catalog = Catalog::new(db.clone(), QueryCache::new(DatabaseCache::new(db.clone())));
    catalog
        .create_book(
            &Principal { account_id: 1 },
            NewBook {
                isbn: "978-0441013593".to_owned(),
                title: "Dune".to_owned(),
                author: "Frank Herbert".to_owned(),
                price: 9.99,
                descriptions: "Spice.".to_owned(),
                genre: "sf".to_owned(),
            },
        )
        .await
        .unwrap();

    let listed = catalog.list_books().await.unwrap();
    let cached = catalog
        .cache()
        .list_cached(&db, &BookListing::All)
        .await
        .unwrap();

    assert_eq!(listed, cached);
    assert_eq!(cache_entry::Entity::find().count(&db).await.unwrap(), 1);
}
