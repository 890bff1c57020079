//! Integration tests for catalog listing, filtering and ownership

mod common;

use ::common::access::{AccessError, OwnershipGate};
use ::common::auth::Identity;
use ::common::catalog::{
    CatalogProvider, ImageFilter, ImageId, ImageName, UserEntry, UNKNOWN_EMAIL, UNKNOWN_USERNAME,
};

#[tokio::test]
async fn test_ghost_owner_gets_sentinel_author() {
    let catalog = common::seeded_catalog().await;
    let ghost = common::add_image(&catalog, "haunted", "ghost").await;
    common::add_image(&catalog, "cat", "alice").await;

    let views = catalog.list(&ImageFilter::all()).await.unwrap();
    assert_eq!(views.len(), 2);

    let view = views.iter().find(|v| v.id == ghost.id).unwrap();
    assert_eq!(
        view.author,
        UserEntry {
            id: "ghost".to_string(),
            username: UNKNOWN_USERNAME.to_string(),
            email: UNKNOWN_EMAIL.to_string(),
        }
    );
}

#[tokio::test]
async fn test_authors_resolved_from_directory() {
    let catalog = common::seeded_catalog().await;
    common::add_image(&catalog, "cat", "alice").await;
    common::add_image(&catalog, "dog", "bob").await;

    let views = catalog.list(&ImageFilter::all()).await.unwrap();
    let emails: Vec<_> = views.iter().map(|v| v.author.email.as_str()).collect();
    assert_eq!(emails, vec!["alice@example.com", "bob@example.com"]);
}

#[tokio::test]
async fn test_substring_metacharacters_are_literal() {
    let catalog = common::seeded_catalog().await;
    common::add_image(&catalog, "a.b", "alice").await;
    common::add_image(&catalog, "axb", "alice").await;
    common::add_image(&catalog, "100%", "alice").await;
    common::add_image(&catalog, "1000", "alice").await;

    let views = catalog
        .list(&ImageFilter::new(Some("a.b"), None))
        .await
        .unwrap();
    let names: Vec<_> = views.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["a.b"]);

    let views = catalog
        .list(&ImageFilter::new(Some("0%"), None))
        .await
        .unwrap();
    let names: Vec<_> = views.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["100%"]);
}

#[tokio::test]
async fn test_filters_compose_with_and() {
    let catalog = common::seeded_catalog().await;
    common::add_image(&catalog, "Black Cat", "alice").await;
    common::add_image(&catalog, "cat nap", "bob").await;
    common::add_image(&catalog, "dog", "alice").await;

    let only_substring = catalog
        .list(&ImageFilter::new(Some("CAT"), None))
        .await
        .unwrap();
    assert_eq!(only_substring.len(), 2);

    let only_owner = catalog
        .list(&ImageFilter::new(None, Some("alice")))
        .await
        .unwrap();
    assert_eq!(only_owner.len(), 2);

    let both = catalog
        .list(&ImageFilter::new(Some("cat"), Some("alice")))
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].name, "Black Cat");
}

#[tokio::test]
async fn test_rename_requires_ownership() {
    let catalog = common::seeded_catalog().await;
    let image = common::add_image(&catalog, "original", "alice").await;
    let gate = OwnershipGate::new(catalog.clone());
    let name = ImageName::parse("renamed").unwrap();

    let err = gate
        .rename_as(&Identity::new("bob"), &image.id, &name)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Forbidden { .. }));
    assert_eq!(catalog.get_by_id(&image.id).await.unwrap().name, "original");

    let renamed = gate
        .rename_as(&Identity::new("alice"), &image.id, &name)
        .await
        .unwrap();
    assert_eq!(renamed.name, "renamed");
    assert_eq!(catalog.get_by_id(&image.id).await.unwrap().name, "renamed");
}

#[tokio::test]
async fn test_rename_missing_image_is_not_found() {
    let catalog = common::seeded_catalog().await;
    let gate = OwnershipGate::new(catalog);
    let missing = ImageId::from("does-not-exist");

    let err = gate
        .rename_as(
            &Identity::new("alice"),
            &missing,
            &ImageName::parse("x").unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, AccessError::NotFound(missing));
}

#[tokio::test]
async fn test_rename_name_length_boundary() {
    let catalog = common::seeded_catalog().await;
    let image = common::add_image(&catalog, "original", "alice").await;
    let gate = OwnershipGate::new(catalog.clone());
    let alice = Identity::new("alice");

    let longest = "n".repeat(100);
    let name = ImageName::parse(longest.clone()).unwrap();
    gate.rename_as(&alice, &image.id, &name).await.unwrap();
    assert_eq!(catalog.get_by_id(&image.id).await.unwrap().name, longest);

    assert!(ImageName::parse("n".repeat(101)).is_err());
    assert!(ImageName::parse("").is_err());
}
