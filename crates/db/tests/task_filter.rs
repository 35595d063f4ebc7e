//! Filtered task listing: predicates, sort order, pagination and the shared
//! count.

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use studysync_core::task_query::{TaskFilter, TaskListQuery};
use studysync_db::models::subject::CreateSubject;
use studysync_db::models::task::CreateTask;
use studysync_db::repositories::{SubjectRepo, TaskRepo};

async fn seed(pool: &PgPool) -> (i64, i64) {
    let math = SubjectRepo::create(
        pool,
        &CreateSubject {
            name: "Math".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    let bio = SubjectRepo::create(
        pool,
        &CreateSubject {
            name: "Biology".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let base = Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap();
    let rows = [
        ("Algebra drill", "chapter 3", "todo", Some(base), math.id),
        ("Geometry proof", "100% effort", "done", Some(base + Duration::days(2)), math.id),
        ("Cell diagram", "label the ALGEBRA of life", "todo", None, bio.id),
        ("Lab notes", "under_score", "in-progress", Some(base - Duration::days(2)), bio.id),
    ];
    for (title, description, status, deadline, subject_id) in rows {
        TaskRepo::create(
            pool,
            &CreateTask {
                title: title.to_string(),
                description: Some(description.to_string()),
                status: Some(status.to_string()),
                deadline,
                subject_id,
                sprint_id: None,
            },
        )
        .await
        .unwrap();
    }
    (math.id, bio.id)
}

fn filter(query: TaskListQuery) -> TaskFilter {
    query.to_filter().unwrap()
}

fn titles(rows: &[studysync_db::models::task::TaskWithSubject]) -> Vec<&str> {
    rows.iter().map(|r| r.task.title.as_str()).collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn default_filter_returns_newest_first(pool: PgPool) {
    seed(&pool).await;
    let (rows, total) = TaskRepo::list_filtered(&pool, &TaskFilter::default())
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(
        titles(&rows),
        ["Lab notes", "Cell diagram", "Geometry proof", "Algebra drill"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn predicates_are_conjunctive(pool: PgPool) {
    let (math, _) = seed(&pool).await;
    let (rows, total) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            status: Some("todo".into()),
            subject_id: Some(math.to_string()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(titles(&rows), ["Algebra drill"]);
    assert_eq!(rows[0].subject.name, "Math");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_is_case_insensitive_over_title_and_description(pool: PgPool) {
    seed(&pool).await;
    let (rows, total) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            search: Some("algebra".into()),
            sort: Some("title asc".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(total, 2);
    assert_eq!(titles(&rows), ["Algebra drill", "Cell diagram"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_treats_like_metacharacters_literally(pool: PgPool) {
    seed(&pool).await;
    let (rows, _) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            search: Some("%".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(titles(&rows), ["Geometry proof"]);

    let (rows, _) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            search: Some("_".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(titles(&rows), ["Lab notes"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deadline_bounds_are_strict(pool: PgPool) {
    seed(&pool).await;
    let (rows, total) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            deadline_after: Some("2025-12-01T12:00:00Z".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(titles(&rows), ["Geometry proof"]);

    let (rows, _) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            deadline_before: Some("2025-12-01T12:00:00Z".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(titles(&rows), ["Lab notes"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sort_by_deadline_puts_missing_deadlines_last(pool: PgPool) {
    seed(&pool).await;
    let (rows, _) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            sort: Some("deadline".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(
        titles(&rows),
        ["Lab notes", "Algebra drill", "Geometry proof", "Cell diagram"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pagination_slices_but_total_counts_all(pool: PgPool) {
    seed(&pool).await;
    let (rows, total) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            page: Some("2".into()),
            limit: Some("3".into()),
            sort: Some("title".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(total, 4);
    assert_eq!(titles(&rows), ["Lab notes"]);

    let (rows, total) = TaskRepo::list_filtered(
        &pool,
        &filter(TaskListQuery {
            page: Some("5".into()),
            ..TaskListQuery::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(total, 4);
    assert!(rows.is_empty());
}
