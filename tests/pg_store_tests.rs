//! Runs the Postgres repositories against a live database.
//!
//! Needs `PG_HOST`, `PG_USER`, `PG_PASS` and `PG_DB` (a `.env` file works):
//! `cargo test --test pg_store_tests -- --ignored`
use chrono::{Duration, Utc};
use uuid::Uuid;

use blog_be::config;
use blog_be::models::comment::NewComment;
use blog_be::models::post::{NewPost, PostChanges};
use blog_be::models::token::BlacklistedToken;
use blog_be::models::user::{NewUser, UserChanges};
use blog_be::repositories::{
    CommentRepository, LIKE_EXISTS, LikeRepository, PHONE_TAKEN, POST_MISSING, PgStore,
    PostRepository, RepoError, TokenRepository, UserRepository,
};

async fn store() -> PgStore {
    dotenv::dotenv().ok();
    let pool = config::get_pg_pool().expect("PG_* variables must be set");
    let store = PgStore::new(pool);
    store.bootstrap().await.expect("bootstrap schema");
    store
}

/// Usernames and phones are unique across runs sharing one database.
fn new_user(tag: &str) -> NewUser {
    let suffix = Uuid::new_v4().simple().to_string();
    NewUser {
        username: format!("{}_{}", tag, &suffix[..12]),
        password_hash: "hash".into(),
        phone: suffix[..15].to_string(),
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
    }
}

fn new_post(author: i64, image: Option<&str>) -> NewPost {
    NewPost {
        title: "title".into(),
        description: "body".into(),
        author,
        image: image.map(str::to_string),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn user_constraints_map_to_conflicts() {
    let store = store().await;
    let alice = UserRepository::create(&store, new_user("alice")).await.unwrap();

    let mut clash = new_user("bob");
    clash.phone = alice.phone.clone();
    let err = UserRepository::create(&store, clash).await.unwrap_err();
    assert_eq!(err, RepoError::Conflict(PHONE_TAKEN.to_string()));

    let updated = UserRepository::update(
        &store,
        alice.id,
        UserChanges {
            first_name: Some("Alice".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.first_name, "Alice");
    assert_eq!(updated.username, alice.username);

    store.record_login(alice.id, Utc::now()).await.unwrap();
    let found = store.find_by_username(&alice.username).await.unwrap().unwrap();
    assert!(found.last_login.is_some());

    assert!(UserRepository::delete(&store, alice.id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn post_update_sets_clears_and_keeps_image() {
    let store = store().await;
    let author = UserRepository::create(&store, new_user("author")).await.unwrap();
    let post = PostRepository::create(&store, new_post(author.id, Some("blog_images/a.png")))
        .await
        .unwrap();

    // absent image leaves it alone
    let kept = PostRepository::update(
        &store,
        post.id,
        PostChanges {
            title: Some("renamed".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(kept.title, "renamed");
    assert_eq!(kept.description, "body");
    assert_eq!(kept.image.as_deref(), Some("blog_images/a.png"));
    assert!(kept.publish_date >= post.publish_date);

    let replaced = PostRepository::update(
        &store,
        post.id,
        PostChanges {
            image: Some(Some("blog_images/b.png".into())),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(replaced.image.as_deref(), Some("blog_images/b.png"));

    let cleared = PostRepository::update(
        &store,
        post.id,
        PostChanges {
            image: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.image, None);
    assert_eq!(cleared.author, author.id);

    UserRepository::delete(&store, author.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn like_rules_hold_in_the_database() {
    let store = store().await;
    let user = UserRepository::create(&store, new_user("liker")).await.unwrap();
    let p1 = PostRepository::create(&store, new_post(user.id, None)).await.unwrap();
    let p2 = PostRepository::create(&store, new_post(user.id, None)).await.unwrap();

    let like = LikeRepository::create(&store, user.id, p1.id).await.unwrap();
    let err = LikeRepository::create(&store, user.id, p1.id).await.unwrap_err();
    assert_eq!(err, RepoError::Conflict(LIKE_EXISTS.to_string()));

    LikeRepository::create(&store, user.id, p2.id).await.unwrap();
    let err = store.move_to_post(like.id, p2.id).await.unwrap_err();
    assert_eq!(err, RepoError::Conflict(LIKE_EXISTS.to_string()));

    let err = LikeRepository::create(&store, user.id, i64::MAX).await.unwrap_err();
    assert_eq!(err, RepoError::InvalidReference(POST_MISSING.to_string()));

    assert!(store.find_for(user.id, p1.id).await.unwrap().is_some());
    assert!(store.delete_for(user.id, p1.id).await.unwrap());
    assert!(store.find_for(user.id, p1.id).await.unwrap().is_none());

    UserRepository::delete(&store, user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn deleting_a_post_cascades_to_comments_and_likes() {
    let store = store().await;
    let user = UserRepository::create(&store, new_user("writer")).await.unwrap();
    let post = PostRepository::create(&store, new_post(user.id, None)).await.unwrap();

    for text in ["first", "second"] {
        CommentRepository::create(
            &store,
            NewComment {
                user: user.id,
                post: post.id,
                comment: text.into(),
            },
        )
        .await
        .unwrap();
    }
    LikeRepository::create(&store, user.id, post.id).await.unwrap();

    let texts: Vec<String> = CommentRepository::list_for_post(&store, post.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.comment)
        .collect();
    assert_eq!(texts, ["first", "second"]);

    assert!(PostRepository::delete(&store, post.id).await.unwrap());
    assert!(CommentRepository::list_for_post(&store, post.id).await.unwrap().is_empty());
    assert!(LikeRepository::list_for_post(&store, post.id).await.unwrap().is_empty());

    UserRepository::delete(&store, user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn a_jti_is_blacklisted_once() {
    let store = store().await;
    let user = UserRepository::create(&store, new_user("token")).await.unwrap();
    let jti = Uuid::new_v4();
    let record = || BlacklistedToken {
        jti,
        user_id: user.id,
        expires_at: Utc::now() + Duration::days(1),
        blacklisted_at: Utc::now(),
    };

    assert!(!store.is_blacklisted(jti).await.unwrap());
    store.blacklist(record()).await.unwrap();
    assert!(store.is_blacklisted(jti).await.unwrap());
    assert!(matches!(
        store.blacklist(record()).await,
        Err(RepoError::Conflict(_))
    ));

    UserRepository::delete(&store, user.id).await.unwrap();
}
