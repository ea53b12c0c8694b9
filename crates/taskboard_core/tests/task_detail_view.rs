use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    load_task_page, CommentStore, InMemoryStore, NewComment, NewTask, PageLoad, PageRequest,
    RecordingFeedback, Redirect, Session, StaticSessionProvider, TaskDetailViewModel,
    SqliteCommentStore, SqliteTaskStore, TaskPageProps, TaskStore,
};

fn provider() -> StaticSessionProvider {
    StaticSessionProvider::new()
        .with_session("token-a", Session::new("a@x.com", "Ana"))
        .with_session("token-b", Session::new("b@y.com", "Bea"))
}

fn load(store: &InMemoryStore, request: &PageRequest, task_id: &str) -> PageLoad<TaskPageProps> {
    load_task_page(&provider(), store, store, request, task_id)
}

fn public_task(store: &InMemoryStore) -> String {
    store
        .create_task(&NewTask::new("a@x.com", "clean house", true))
        .unwrap()
}

fn open_as<'a>(
    store: &'a InMemoryStore,
    feedback: &'a RecordingFeedback,
    token: Option<&str>,
    task_id: &str,
) -> TaskDetailViewModel<&'a InMemoryStore, &'a RecordingFeedback> {
    let path = format!("/task/{task_id}");
    let request = match token {
        Some(token) => PageRequest::with_token(path, token),
        None => PageRequest::anonymous(path),
    };
    let props = load(store, &request, task_id)
        .into_props()
        .expect("public task renders");
    TaskDetailViewModel::new(store, feedback, props)
}

#[test]
fn private_and_missing_tasks_redirect_identically() {
    let store = InMemoryStore::new();
    let private_id = store
        .create_task(&NewTask::new("a@x.com", "buy milk", false))
        .unwrap();
    let request = PageRequest::with_token("/task/x", "token-a");

    let private = load(&store, &request, &private_id);
    let missing = load(&store, &request, "does-not-exist");
    assert_eq!(private, PageLoad::Redirect(Redirect::to_landing()));
    assert_eq!(private, missing);
}

#[test]
fn unavailable_store_redirects_instead_of_failing() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    store.set_unavailable(true);

    assert!(load(&store, &PageRequest::anonymous("/task"), &id).is_redirect());
}

#[test]
fn public_task_renders_for_anonymous_callers_with_comments() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    store
        .create_comment(&NewComment {
            task_id: id.clone(),
            author_email: "b@y.com".to_string(),
            author_name: "Bea".to_string(),
            body: "nice!".to_string(),
        })
        .unwrap();

    let props = load(&store, &PageRequest::anonymous("/task"), &id)
        .into_props()
        .expect("public task renders");
    assert_eq!(props.task.task_id, id);
    assert_eq!(props.task.body, "clean house");
    assert_eq!(props.task.owner, "a@x.com");
    assert_eq!(props.task.created.len(), "dd/mm/yyyy".len());
    assert_eq!(props.comments.len(), 1);
    assert!(props.viewer.is_none());

    let json = serde_json::to_value(&props).unwrap();
    assert_eq!(json["task"]["taskId"], id.as_str());
    assert_eq!(json["task"]["public"], true);
    assert_eq!(json["comments"][0]["comment"], "nice!");
}

#[test]
fn short_comments_are_rejected_without_store_call() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();
    let mut view = open_as(&store, &feedback, Some("token-b"), &id);
    let calls_before = store.call_count();

    for input in ["", "a", "ab", "  ab  "] {
        view.set_comment_input(input);
        assert!(view.post_comment().is_none());
    }

    assert_eq!(store.call_count(), calls_before);
    assert!(view.comments().is_empty());
    assert_eq!(feedback.alerts().len(), 4);
    assert_eq!(view.comment_input(), "  ab  ");
}

#[test]
fn valid_comment_is_appended_without_refetch() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();
    let mut view = open_as(&store, &feedback, Some("token-b"), &id);

    view.set_comment_input("abc");
    let first = view.post_comment().expect("three chars are enough");
    view.set_comment_input("second one");
    let calls_before = store.call_count();
    let second = view.post_comment().expect("comment posted");
    assert_eq!(store.call_count(), calls_before + 1, "no re-fetch");

    let ids: Vec<&str> = view.comments().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    assert_eq!(view.comments()[1].author_email, "b@y.com");
    assert_eq!(view.comments()[1].author_name, "Bea");
    assert_eq!(view.comments()[1].task_id, id);
    assert_eq!(view.comment_input(), "");
    assert!(feedback.alerts().is_empty());
}

#[test]
fn posted_comment_matches_the_stored_record() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();
    let mut view = open_as(&store, &feedback, Some("token-b"), &id);

    view.set_comment_input("looks good");
    view.post_comment().expect("comment posted");

    let stored = store.list_comments_by_task(&id).unwrap();
    assert_eq!(view.comments(), stored.as_slice());
}

#[test]
fn posted_comment_matches_the_sqlite_row_after_reload() {
    let conn = open_db_in_memory().unwrap();
    let tasks = SqliteTaskStore::try_new(&conn, Default::default()).unwrap();
    let comments = SqliteCommentStore::try_new(&conn).unwrap();
    let id = tasks
        .create_task(&NewTask::new("a@x.com", "clean house", true))
        .unwrap();
    let request = PageRequest::with_token(format!("/task/{id}"), "token-b");
    let feedback = RecordingFeedback::new();

    let props = load_task_page(&provider(), &tasks, &comments, &request, &id)
        .into_props()
        .expect("public task renders");
    let mut view = TaskDetailViewModel::new(&comments, &feedback, props);
    view.set_comment_input("looks good");
    view.post_comment().expect("comment posted");

    let reloaded = load_task_page(&provider(), &tasks, &comments, &request, &id)
        .into_props()
        .expect("public task renders");
    assert_eq!(view.comments(), reloaded.comments.as_slice());
}

#[test]
fn anonymous_viewer_cannot_comment() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();
    let mut view = open_as(&store, &feedback, None, &id);
    let calls_before = store.call_count();

    view.set_comment_input("nice!");
    assert!(view.post_comment().is_none());
    assert_eq!(store.call_count(), calls_before);
    assert_eq!(feedback.alerts().len(), 1);
}

#[test]
fn failed_comment_alerts_and_clears_input() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();
    let mut view = open_as(&store, &feedback, Some("token-b"), &id);

    store.set_unavailable(true);
    view.set_comment_input("nice!");
    assert!(view.post_comment().is_none());

    assert_eq!(view.comment_input(), "");
    assert!(view.comments().is_empty());
    assert_eq!(feedback.alerts().len(), 1);
}

#[test]
fn delete_removes_exact_entry_and_is_idempotent() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();
    let mut view = open_as(&store, &feedback, Some("token-b"), &id);

    view.set_comment_input("first");
    let first = view.post_comment().unwrap();
    view.set_comment_input("second");
    let second = view.post_comment().unwrap();

    assert!(view.delete_comment(&first));
    assert_eq!(view.comments().len(), 1);
    assert_eq!(view.comments()[0].id, second);

    assert!(!view.delete_comment(&first));
    assert_eq!(view.comments().len(), 1);
    assert_eq!(store.list_comments_by_task(&id).unwrap().len(), 1);
}

#[test]
fn only_the_author_may_delete() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();

    let mut author_view = open_as(&store, &feedback, Some("token-b"), &id);
    author_view.set_comment_input("mine");
    let comment_id = author_view.post_comment().unwrap();

    let mut other_view = open_as(&store, &feedback, Some("token-a"), &id);
    let comment = other_view.comments()[0].clone();
    assert!(!other_view.can_delete(&comment));
    assert!(!other_view.delete_comment(&comment_id));
    assert_eq!(other_view.comments().len(), 1);
    assert_eq!(store.comment_count(), 1);
}

#[test]
fn failed_delete_alerts_and_keeps_local_entry() {
    let store = InMemoryStore::new();
    let id = public_task(&store);
    let feedback = RecordingFeedback::new();
    let mut view = open_as(&store, &feedback, Some("token-b"), &id);
    view.set_comment_input("keep me");
    let comment_id = view.post_comment().unwrap();

    store.set_unavailable(true);
    assert!(!view.delete_comment(&comment_id));
    assert_eq!(view.comments().len(), 1);
    assert_eq!(feedback.alerts().len(), 1);
}
