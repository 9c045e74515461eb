// src/repositories/memory.rs
//
// In-process backend used by the test suite and by `DATABASE_BACKEND=memory`.
// Mirrors the unique and ON DELETE CASCADE rules of schema.sql.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CommentRepository, LIKE_EXISTS, LikeRepository, PHONE_TAKEN, POST_MISSING, PostRepository,
    RepoError, RepoResult, TOKEN_ALREADY_BLACKLISTED, TokenRepository, USER_MISSING,
    USERNAME_TAKEN, UserRepository,
};
use crate::models::comment::{Comment, NewComment};
use crate::models::like::Like;
use crate::models::post::{NewPost, Post, PostChanges};
use crate::models::token::BlacklistedToken;
use crate::models::user::{NewUser, User, UserChanges};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    likes: BTreeMap<i64, Like>,
    blacklist: HashMap<Uuid, BlacklistedToken>,
    user_seq: i64,
    post_seq: i64,
    comment_seq: i64,
    like_seq: i64,
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl Tables {
    fn check_user_unique(&self, id: Option<i64>, username: &str, phone: &str) -> RepoResult<()> {
        for other in self.users.values().filter(|u| Some(u.id) != id) {
            if other.username == username {
                return Err(RepoError::Conflict(USERNAME_TAKEN.to_string()));
            }
            if other.phone == phone {
                return Err(RepoError::Conflict(PHONE_TAKEN.to_string()));
            }
        }
        Ok(())
    }

    fn check_like_unique(&self, id: Option<i64>, user: i64, post: i64) -> RepoResult<()> {
        let taken = self
            .likes
            .values()
            .any(|l| Some(l.id) != id && l.user == user && l.post == post);
        if taken {
            return Err(RepoError::Conflict(LIKE_EXISTS.to_string()));
        }
        Ok(())
    }

    fn check_refs(&self, user: i64, post: i64) -> RepoResult<()> {
        if !self.users.contains_key(&user) {
            return Err(RepoError::InvalidReference(USER_MISSING.to_string()));
        }
        if !self.posts.contains_key(&post) {
            return Err(RepoError::InvalidReference(POST_MISSING.to_string()));
        }
        Ok(())
    }

    fn drop_post(&mut self, post: i64) -> bool {
        let existed = self.posts.remove(&post).is_some();
        self.likes.retain(|_, l| l.post != post);
        self.comments.retain(|_, c| c.post != post);
        existed
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new: NewUser) -> RepoResult<User> {
        let mut t = self.tables.write().await;
        t.check_user_unique(None, &new.username, &new.phone)?;
        let id = next_id(&mut t.user_seq);
        let user = User {
            id,
            username: new.username,
            password_hash: new.password_hash,
            phone: new.phone,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
            last_login: None,
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut t = self.tables.write().await;
        let Some(mut user) = t.users.get(&id).cloned() else {
            return Ok(None);
        };
        changes.apply(&mut user);
        t.check_user_unique(Some(id), &user.username, &user.phone)?;
        t.users.insert(id, user.clone());
        Ok(Some(user))
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> RepoResult<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i64> = t
            .posts
            .values()
            .filter(|p| p.author == id)
            .map(|p| p.id)
            .collect();
        for post in owned {
            t.drop_post(post);
        }
        t.likes.retain(|_, l| l.user != id);
        t.comments.retain(|_, c| c.user != id);
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, new: NewPost) -> RepoResult<Post> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&new.author) {
            return Err(RepoError::InvalidReference(USER_MISSING.to_string()));
        }
        let id = next_id(&mut t.post_seq);
        let post = Post {
            id,
            title: new.title,
            description: new.description,
            author: new.author,
            publish_date: Utc::now(),
            image: new.image,
        };
        t.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Post>> {
        Ok(self.tables.read().await.posts.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>> {
        let mut t = self.tables.write().await;
        let Some(post) = t.posts.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(post, Utc::now());
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables.write().await.drop_post(id))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, new: NewComment) -> RepoResult<Comment> {
        let mut t = self.tables.write().await;
        t.check_refs(new.user, new.post)?;
        let id = next_id(&mut t.comment_seq);
        let comment = Comment {
            id,
            user: new.user,
            post: new.post,
            comment: new.comment,
            time: Utc::now(),
        };
        t.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Comment>> {
        Ok(self.tables.read().await.comments.values().cloned().collect())
    }

    async fn list_for_post(&self, post: i64) -> RepoResult<Vec<Comment>> {
        let t = self.tables.read().await;
        Ok(t.comments.values().filter(|c| c.post == post).cloned().collect())
    }

    async fn update_text(&self, id: i64, text: String) -> RepoResult<Option<Comment>> {
        let mut t = self.tables.write().await;
        let Some(comment) = t.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.comment = text;
        comment.time = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn create(&self, user: i64, post: i64) -> RepoResult<Like> {
        let mut t = self.tables.write().await;
        t.check_refs(user, post)?;
        t.check_like_unique(None, user, post)?;
        let id = next_id(&mut t.like_seq);
        let like = Like {
            id,
            user,
            post,
            time: Utc::now(),
        };
        t.likes.insert(id, like.clone());
        Ok(like)
    }

    async fn find(&self, id: i64) -> RepoResult<Option<Like>> {
        Ok(self.tables.read().await.likes.get(&id).cloned())
    }

    async fn find_for(&self, user: i64, post: i64) -> RepoResult<Option<Like>> {
        let t = self.tables.read().await;
        Ok(t
            .likes
            .values()
            .find(|l| l.user == user && l.post == post)
            .cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Like>> {
        Ok(self.tables.read().await.likes.values().cloned().collect())
    }

    async fn list_for_post(&self, post: i64) -> RepoResult<Vec<Like>> {
        let t = self.tables.read().await;
        Ok(t.likes.values().filter(|l| l.post == post).cloned().collect())
    }

    async fn move_to_post(&self, id: i64, post: i64) -> RepoResult<Option<Like>> {
        let mut t = self.tables.write().await;
        let Some(user) = t.likes.get(&id).map(|l| l.user) else {
            return Ok(None);
        };
        t.check_refs(user, post)?;
        t.check_like_unique(Some(id), user, post)?;
        let Some(like) = t.likes.get_mut(&id) else {
            return Ok(None);
        };
        like.post = post;
        like.time = Utc::now();
        Ok(Some(like.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables.write().await.likes.remove(&id).is_some())
    }

    async fn delete_for(&self, user: i64, post: i64) -> RepoResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.likes.len();
        t.likes.retain(|_, l| !(l.user == user && l.post == post));
        Ok(t.likes.len() < before)
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn blacklist(&self, token: BlacklistedToken) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t.blacklist.contains_key(&token.jti) {
            return Err(RepoError::Conflict(TOKEN_ALREADY_BLACKLISTED.to_string()));
        }
        t.blacklist.insert(token.jti, token);
        Ok(())
    }

    async fn is_blacklisted(&self, jti: Uuid) -> RepoResult<bool> {
        Ok(self.tables.read().await.blacklist.contains_key(&jti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, phone: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "hash".to_string(),
            phone: phone.to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn new_post(author: i64) -> NewPost {
        NewPost {
            title: "title".into(),
            description: "body".into(),
            author,
            image: None,
        }
    }

    #[tokio::test]
    async fn duplicate_phone_is_a_conflict() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a", "100")).await.unwrap();
        let err = UserRepository::create(&store, new_user("b", "100"))
            .await
            .unwrap_err();
        assert_eq!(err, RepoError::Conflict(PHONE_TAKEN.to_string()));
    }

    #[tokio::test]
    async fn update_rechecks_uniqueness() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a", "100")).await.unwrap();
        let b = UserRepository::create(&store, new_user("b", "200")).await.unwrap();
        let err = UserRepository::update(
            &store,
            b.id,
            UserChanges {
                username: Some("a".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, RepoError::Conflict(USERNAME_TAKEN.to_string()));
    }

    #[tokio::test]
    async fn like_pair_is_unique() {
        let store = MemoryStore::new();
        let u = UserRepository::create(&store, new_user("a", "1")).await.unwrap();
        let p = PostRepository::create(&store, new_post(u.id)).await.unwrap();

        LikeRepository::create(&store, u.id, p.id).await.unwrap();
        let err = LikeRepository::create(&store, u.id, p.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert_eq!(LikeRepository::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn moving_a_like_keeps_the_pair_unique() {
        let store = MemoryStore::new();
        let u = UserRepository::create(&store, new_user("a", "1")).await.unwrap();
        let p1 = PostRepository::create(&store, new_post(u.id)).await.unwrap();
        let p2 = PostRepository::create(&store, new_post(u.id)).await.unwrap();
        let like = LikeRepository::create(&store, u.id, p1.id).await.unwrap();
        LikeRepository::create(&store, u.id, p2.id).await.unwrap();

        let err = store.move_to_post(like.id, p2.id).await.unwrap_err();
        assert_eq!(err, RepoError::Conflict(LIKE_EXISTS.to_string()));

        // re-saving onto its own post is not a clash with itself
        let same = store.move_to_post(like.id, p1.id).await.unwrap().unwrap();
        assert_eq!(same.post, p1.id);
        assert!(same.time >= like.time);
    }

    #[tokio::test]
    async fn like_on_missing_post_is_invalid_reference() {
        let store = MemoryStore::new();
        let u = UserRepository::create(&store, new_user("a", "1")).await.unwrap();
        let err = LikeRepository::create(&store, u.id, 99).await.unwrap_err();
        assert_eq!(err, RepoError::InvalidReference(POST_MISSING.to_string()));
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let store = MemoryStore::new();
        let a = UserRepository::create(&store, new_user("a", "1")).await.unwrap();
        let b = UserRepository::create(&store, new_user("b", "2")).await.unwrap();
        let pa = PostRepository::create(&store, new_post(a.id)).await.unwrap();
        let pb = PostRepository::create(&store, new_post(b.id)).await.unwrap();

        // b engages with a's post, a engages with b's post
        LikeRepository::create(&store, b.id, pa.id).await.unwrap();
        LikeRepository::create(&store, a.id, pb.id).await.unwrap();
        CommentRepository::create(
            &store,
            NewComment {
                user: b.id,
                post: pa.id,
                comment: "hi".into(),
            },
        )
        .await
        .unwrap();
        CommentRepository::create(
            &store,
            NewComment {
                user: a.id,
                post: pb.id,
                comment: "yo".into(),
            },
        )
        .await
        .unwrap();

        assert!(UserRepository::delete(&store, a.id).await.unwrap());

        assert!(PostRepository::find(&store, pa.id).await.unwrap().is_none());
        assert!(PostRepository::find(&store, pb.id).await.unwrap().is_some());
        assert!(LikeRepository::list(&store).await.unwrap().is_empty());
        assert!(CommentRepository::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blacklist_is_single_shot() {
        let store = MemoryStore::new();
        let token = BlacklistedToken {
            jti: Uuid::new_v4(),
            user_id: 1,
            expires_at: Utc::now(),
            blacklisted_at: Utc::now(),
        };
        store.blacklist(token.clone()).await.unwrap();
        assert!(store.is_blacklisted(token.jti).await.unwrap());
        assert!(matches!(
            store.blacklist(token).await,
            Err(RepoError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn comments_for_post_keep_insertion_order() {
        let store = MemoryStore::new();
        let u = UserRepository::create(&store, new_user("a", "1")).await.unwrap();
        let p = PostRepository::create(&store, new_post(u.id)).await.unwrap();
        for text in ["first", "second", "third"] {
            CommentRepository::create(
                &store,
                NewComment {
                    user: u.id,
                    post: p.id,
                    comment: text.into(),
                },
            )
            .await
            .unwrap();
        }
        let texts: Vec<String> = CommentRepository::list_for_post(&store, p.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.comment)
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }
}
