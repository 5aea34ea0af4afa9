mod common;

use bytes::Bytes;
use chrono::{Duration, Utc};
use common::{comment, post, signed_in, POST_ID};
use mockall::Sequence;
use rc_app::pages::{CreatePostPage, PostPage};
use rc_core::error::AppError;
use rc_core::models::ImageFile;
use rc_core::routes::Route;
use rc_core::traits::{MockDataGateway, MockObjectStore};
use rc_core::validation::Field;

#[tokio::test]
async fn hello_world_post_lands_on_its_page() {
    let mut gateway = MockDataGateway::new();
    gateway
        .expect_create_post()
        .withf(|input| input.title == "Hello World" && input.image.is_none())
        .times(1)
        .returning(|input| Ok(post("fresh-id", &input.title, vec![])));
    let ctx = signed_in(gateway, MockObjectStore::new(), "me").await;

    let mut page = CreatePostPage::default();
    page.set_title("Hello World");
    page.set_content("First!");
    let route = page.submit(&ctx).await.unwrap();
    assert_eq!(route, Route::Post("fresh-id".into()));
    assert_eq!(route.to_string(), "/post/fresh-id");
}

#[tokio::test]
async fn image_upload_precedes_post_and_key_matches() {
    let mut seq = Sequence::new();
    let mut store = MockObjectStore::new();
    store
        .expect_put()
        .withf(|key, _, content_type| !key.is_empty() && content_type == "image/jpeg")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    let mut gateway = MockDataGateway::new();
    gateway
        .expect_create_post()
        .withf(|input| input.image.as_deref().is_some_and(|k| uuid::Uuid::parse_str(k).is_ok()))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(post("with-image", "Pic", vec![])));
    let ctx = signed_in(gateway, store, "me").await;

    let mut page = CreatePostPage::default();
    page.set_title("Pic");
    page.set_content("look");
    page.dropzone_mut()
        .accept(vec![ImageFile {
            name: "cat.jpg".into(),
            content_type: "image/jpeg".into(),
            data: Bytes::from_static(b"\xff\xd8\xff"),
        }])
        .unwrap();
    assert_eq!(page.submit(&ctx).await.unwrap(), Route::Post("with-image".into()));
}

#[tokio::test]
async fn invalid_post_form_makes_no_calls() {
    let mut gateway = MockDataGateway::new();
    gateway.expect_create_post().never();
    let mut store = MockObjectStore::new();
    store.expect_put().never();
    let ctx = signed_in(gateway, store, "me").await;

    let mut page = CreatePostPage::default();
    page.set_title("");
    page.set_content("c".repeat(1001));
    let err = page.submit(&ctx).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(page.errors().get(Field::Title).is_some());
    assert!(page.errors().get(Field::Content).is_some());
}

#[tokio::test]
async fn comments_stay_newest_first_after_publishing() {
    let now = Utc::now();
    let mut gateway = MockDataGateway::new();
    gateway.expect_get_post().returning(move |_| {
        let mut p = post(POST_ID, "Discussed", vec![]);
        p.comments.items = vec![
            comment("c1", "oldest", now - Duration::hours(10)),
            comment("c3", "newest", now - Duration::minutes(5)),
            comment("c2", "middle", now - Duration::hours(2)),
        ];
        Ok(Some(p))
    });
    gateway
        .expect_create_comment()
        .withf(|input| input.post_id == POST_ID && input.content == "just now")
        .times(1)
        .returning(move |input| Ok(comment("c4", &input.content, now)));
    let ctx = signed_in(gateway, MockObjectStore::new(), "me").await;

    let mut page = PostPage::load(&ctx, POST_ID).await.unwrap();
    let order: Vec<_> = page.comments().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, ["c3", "c2", "c1"]);

    page.set_draft("just now");
    page.submit_comment(&ctx).await.unwrap();
    let order: Vec<_> = page.comments().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, ["c4", "c3", "c2", "c1"]);

    let text = page.render(&ctx, now).unwrap();
    assert!(text.find("just now").unwrap() < text.find("oldest").unwrap());
}

#[tokio::test]
async fn empty_comment_is_rejected_locally() {
    let mut gateway = MockDataGateway::new();
    gateway.expect_get_post().returning(|id| Ok(Some(post(id, "Quiet", vec![]))));
    gateway.expect_create_comment().never();
    let ctx = signed_in(gateway, MockObjectStore::new(), "me").await;

    let mut page = PostPage::load(&ctx, POST_ID).await.unwrap();
    assert!(page.submit_comment(&ctx).await.is_err());
    assert!(page.errors().get(Field::Comment).is_some());
    assert!(page.comments().is_empty());
}
