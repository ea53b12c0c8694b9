use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    load_dashboard, load_task_page, ChangeFeed, PageRequest, RecordingFeedback, Session,
    SqliteCommentStore, SqliteTaskStore, StaticSessionProvider, TaskDetailViewModel,
    TaskListViewModel,
};

const BASE_URL: &str = "http://localhost:3000";

#[test]
fn two_users_tasks_sharing_and_comments() {
    let conn = open_db_in_memory().unwrap();
    let feed = ChangeFeed::new();
    let tasks = SqliteTaskStore::try_new(&conn, feed.clone()).unwrap();
    let comments = SqliteCommentStore::try_new(&conn).unwrap();
    let provider = StaticSessionProvider::new()
        .with_session("token-a", Session::new("a@x.com", "Ana"))
        .with_session("token-b", Session::new("b@y.com", "Bea"));
    let feedback = RecordingFeedback::new();

    // Both dashboards are gated on a session.
    assert!(load_dashboard(&provider, &PageRequest::anonymous("/dashboard")).is_redirect());
    let dashboard_a = load_dashboard(&provider, &PageRequest::with_token("/dashboard", "token-a"))
        .into_props()
        .unwrap();
    let dashboard_b = load_dashboard(&provider, &PageRequest::with_token("/dashboard", "token-b"))
        .into_props()
        .unwrap();

    let mut list_a =
        TaskListViewModel::mount(&tasks, &feedback, dashboard_a.user.email, BASE_URL).unwrap();
    let mut list_b =
        TaskListViewModel::mount(&tasks, &feedback, dashboard_b.user.email, BASE_URL).unwrap();
    list_a.pump();
    list_b.pump();

    // A registers a private task: only A's list shows it.
    list_a.set_draft_body("buy milk");
    let private_id = list_a.submit_task().unwrap();
    list_a.pump();
    list_b.pump();
    assert_eq!(list_a.tasks().len(), 1);
    assert!(list_b.tasks().is_empty());
    assert!(load_task_page(
        &provider,
        &tasks,
        &comments,
        &PageRequest::anonymous("/task"),
        &private_id
    )
    .is_redirect());

    // A registers a public task and shares it.
    list_a.set_draft_body("clean house");
    list_a.set_draft_public(true);
    let public_id = list_a.submit_task().unwrap();
    list_a.pump();
    assert_eq!(list_a.tasks()[0].id, public_id);
    let url = list_a.share(&public_id).unwrap();
    assert_eq!(url, format!("{BASE_URL}/task/{public_id}"));

    // Anyone, including anonymous callers, can open the public task.
    assert!(load_task_page(
        &provider,
        &tasks,
        &comments,
        &PageRequest::anonymous(url.clone()),
        &public_id
    )
    .into_props()
    .is_some());

    // B comments, sees it immediately, then deletes it.
    let props_b = load_task_page(
        &provider,
        &tasks,
        &comments,
        &PageRequest::with_token(url, "token-b"),
        &public_id,
    )
    .into_props()
    .unwrap();
    let mut detail_b = TaskDetailViewModel::new(&comments, &feedback, props_b);
    detail_b.set_comment_input("nice!");
    let comment_id = detail_b.post_comment().unwrap();
    assert_eq!(detail_b.comments().len(), 1);
    assert_eq!(detail_b.comments()[0].author_email, "b@y.com");

    assert!(detail_b.delete_comment(&comment_id));
    assert!(detail_b.comments().is_empty());

    // A removes the public task; the next push drops it.
    assert!(list_a.remove(&public_id));
    list_a.pump();
    assert!(list_a.tasks().iter().all(|task| task.id != public_id));

    list_a.unmount();
    drop(list_b);
    assert_eq!(feed.subscriber_count(), 0);
}
