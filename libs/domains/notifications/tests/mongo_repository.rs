//! MongoNotificationRepository against a real MongoDB

use chrono::{Duration, Utc};
use domain_notifications::{
    CreateNotification, MongoNotificationRepository, Notification, NotificationFilter,
    NotificationRepository, NotificationStatus,
};
use test_utils::{TestDataBuilder, TestMongo};

fn input(user_id: &str, title: &str) -> CreateNotification {
    CreateNotification {
        user_id: user_id.into(),
        title: title.into(),
        message: "body".into(),
        ..Default::default()
    }
}

async fn repository(mongo: &TestMongo) -> MongoNotificationRepository {
    let repo = MongoNotificationRepository::new(&mongo.database());
    repo.init_indexes().await.unwrap();
    repo
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_lifecycle() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo).await;
    let user = TestDataBuilder::from_test_name("test_lifecycle").user_id();

    let created = repo.create(input(&user, "hello")).await.unwrap();
    let fetched = repo.get_by_id(created.id, &user).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.status, NotificationStatus::Unread);
    assert!(repo.get_by_id(created.id, "someone-else").await.unwrap().is_none());

    let read = repo.mark_read(created.id, &user).await.unwrap().unwrap();
    assert_eq!(read.status, NotificationStatus::Read);
    assert!(read.read_at.is_some());
    assert_eq!(repo.count_unread(&user).await.unwrap(), 0);

    let archived = repo.archive(created.id, &user).await.unwrap().unwrap();
    assert_eq!(archived.status, NotificationStatus::Archived);
    assert_eq!(archived.read_at, read.read_at);

    assert!(!repo.delete(created.id, "someone-else").await.unwrap());
    assert!(repo.delete(created.id, &user).await.unwrap());
    assert!(repo.get_by_id(created.id, &user).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_newest_first_and_mark_all() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo).await;
    let base = Utc::now();

    for (i, title) in ["oldest", "middle", "newest"].into_iter().enumerate() {
        let mut n = Notification::new(input("u1", title));
        n.created_at = base + Duration::milliseconds(i as i64 * 10);
        repo.collection().insert_one(&n).await.unwrap();
    }
    repo.create(input("u2", "other")).await.unwrap();

    let found = repo.find(&NotificationFilter::for_user("u1")).await.unwrap();
    let titles: Vec<_> = found.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["newest", "middle", "oldest"]);

    assert_eq!(repo.mark_all_read("u1").await.unwrap(), 3);
    assert_eq!(repo.count_unread("u1").await.unwrap(), 0);
    assert_eq!(repo.count_unread("u2").await.unwrap(), 1);
    assert_eq!(
        repo.count(&NotificationFilter::for_user("u1").with_status(NotificationStatus::Read))
            .await
            .unwrap(),
        3
    );
}
