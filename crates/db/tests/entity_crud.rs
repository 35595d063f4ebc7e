//! Repository-level CRUD against a real database: create, update, cascade
//! deletes and constraint violations.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use studysync_db::models::deadline::NewDeadline;
use studysync_db::models::subject::{CreateSubject, UpdateSubject};
use studysync_db::models::task::{CreateTask, UpdateTask};
use studysync_db::models::user::CreateUser;
use studysync_db::repositories::{DeadlineRepo, SubjectRepo, TaskRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$not-a-real-hash".to_string(),
        role: "user".to_string(),
    }
}

fn new_subject(name: &str) -> CreateSubject {
    CreateSubject {
        name: name.to_string(),
        description: None,
    }
}

fn new_task(subject_id: i64, title: &str) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        description: None,
        status: None,
        deadline: None,
        subject_id,
        sprint_id: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_defaults_are_applied(pool: PgPool) {
    let subject = SubjectRepo::create(&pool, &new_subject("Math")).await.unwrap();
    let task = TaskRepo::create(&pool, &new_task(subject.id, "Homework"))
        .await
        .unwrap();

    assert_eq!(task.status, "todo");
    assert_eq!(task.description, "");
    assert_eq!(task.deadline, None);
    assert_eq!(task.sprint_id, None);

    let loaded = TaskRepo::find_with_subject(&pool, task.id)
        .await
        .unwrap()
        .expect("task should exist");
    assert_eq!(loaded.subject.id, subject.id);
    assert_eq!(loaded.subject.name, "Math");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_update_leaves_absent_fields(pool: PgPool) {
    let subject = SubjectRepo::create(
        &pool,
        &CreateSubject {
            name: "Physics".to_string(),
            description: Some("Mechanics".to_string()),
        },
    )
    .await
    .unwrap();

    let updated = SubjectRepo::update(
        &pool,
        subject.id,
        &UpdateSubject {
            name: Some("Physics II".to_string()),
            description: None,
        },
    )
    .await
    .unwrap()
    .expect("subject should exist");

    assert_eq!(updated.name, "Physics II");
    assert_eq!(updated.description.as_deref(), Some("Mechanics"));

    let task = TaskRepo::create(&pool, &new_task(subject.id, "Lab report"))
        .await
        .unwrap();
    let task = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            status: Some("done".to_string()),
            ..UpdateTask::default()
        },
    )
    .await
    .unwrap()
    .expect("task should exist");
    assert_eq!(task.status, "done");
    assert_eq!(task.title, "Lab report");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn explicit_null_clears_nullable_columns(pool: PgPool) {
    let subject = SubjectRepo::create(
        &pool,
        &CreateSubject {
            name: "Biology".to_string(),
            description: Some("Cells".to_string()),
        },
    )
    .await
    .unwrap();

    let subject = SubjectRepo::update(
        &pool,
        subject.id,
        &UpdateSubject {
            name: None,
            description: Some(None),
        },
    )
    .await
    .unwrap()
    .expect("subject should exist");
    assert_eq!(subject.name, "Biology");
    assert_eq!(subject.description, None);

    let mut input = new_task(subject.id, "Dissection");
    input.deadline = Some(Utc::now());
    let task = TaskRepo::create(&pool, &input).await.unwrap();
    assert!(task.deadline.is_some());

    let task = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            deadline: Some(None),
            ..UpdateTask::default()
        },
    )
    .await
    .unwrap()
    .expect("task should exist");
    assert_eq!(task.deadline, None);
    assert_eq!(task.title, "Dissection");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_row_returns_none(pool: PgPool) {
    let result = SubjectRepo::update(&pool, 9999, &UpdateSubject::default())
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(!TaskRepo::delete(&pool, 9999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn subject_delete_cascades_to_tasks_and_deadlines(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("cascade@test.com"))
        .await
        .unwrap();
    let subject = SubjectRepo::create(&pool, &new_subject("History")).await.unwrap();
    let task = TaskRepo::create(&pool, &new_task(subject.id, "Essay"))
        .await
        .unwrap();
    let deadline = DeadlineRepo::create(
        &pool,
        &NewDeadline {
            task_id: task.id,
            user_id: user.id,
            due_date: Utc::now() + Duration::days(1),
        },
    )
    .await
    .unwrap();

    assert!(SubjectRepo::delete(&pool, subject.id).await.unwrap());

    assert!(!TaskRepo::exists(&pool, task.id).await.unwrap());
    assert!(DeadlineRepo::find_with_task(&pool, deadline.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_delete_cascades_to_deadlines(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("gone@test.com"))
        .await
        .unwrap();
    let subject = SubjectRepo::create(&pool, &new_subject("Art")).await.unwrap();
    let task = TaskRepo::create(&pool, &new_task(subject.id, "Sketch"))
        .await
        .unwrap();
    DeadlineRepo::create(
        &pool,
        &NewDeadline {
            task_id: task.id,
            user_id: user.id,
            due_date: Utc::now() + Duration::hours(2),
        },
    )
    .await
    .unwrap();

    assert!(UserRepo::delete(&pool, user.id).await.unwrap());
    assert!(DeadlineRepo::list_with_task(&pool).await.unwrap().is_empty());
    // The task itself survives.
    assert!(TaskRepo::exists(&pool, task.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dup@test.com")).await.unwrap();
    let err = UserRepo::create(&pool, &new_user("dup@test.com"))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        sqlx::Error::Database(ref db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_users_email")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_role_violates_check_constraint(pool: PgPool) {
    let mut input = new_user("root@test.com");
    input.role = "root".to_string();
    let err = UserRepo::create(&pool, &input).await.unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23514")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn due_window_excludes_lower_and_includes_upper_bound(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("window@test.com"))
        .await
        .unwrap();
    let subject = SubjectRepo::create(&pool, &new_subject("Chem")).await.unwrap();
    let task = TaskRepo::create(&pool, &new_task(subject.id, "Titration"))
        .await
        .unwrap();

    let now = Utc::now();
    let soon = now + Duration::minutes(15);
    for due_date in [now, now + Duration::minutes(5), soon, soon + Duration::seconds(1)] {
        DeadlineRepo::create(
            &pool,
            &NewDeadline {
                task_id: task.id,
                user_id: user.id,
                due_date,
            },
        )
        .await
        .unwrap();
    }

    let due = DeadlineRepo::list_due_between(&pool, now, soon).await.unwrap();
    assert_eq!(due.len(), 2);
    assert!(due.iter().all(|r| r.due_date > now && r.due_date <= soon));
    assert!(due.iter().all(|r| r.user_email == "window@test.com"));
    assert!(due.iter().all(|r| r.task_title == "Titration"));
}
