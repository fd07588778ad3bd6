//! End-to-end API tests: the full router (sessions, extractors, error
//! rendering) over an in-memory database.

use std::sync::OnceLock;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use lms_config::LmsConfig;
use lms_core::entities::User;
use lms_core::enums::Role;
use lms_db::LmsService;
use lms_db::inputs::NewUser;
use lms_mail::Mailer;
use lms_server::{AppState, build_router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const PASSWORD: &str = "password1";

/// One scrypt hash shared by every test account.
fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| lms_auth::hash_password(PASSWORD).unwrap())
}

struct TestApp {
    router: Router,
    state: AppState,
    uploads: TempDir,
}

struct Reply {
    status: StatusCode,
    body: Value,
    cookie: Option<String>,
}

impl TestApp {
    async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = LmsConfig::default();
        config.uploads.dir = uploads.path().to_str().unwrap().to_string();
        config.uploads.max_video_bytes = 1024;

        let service = LmsService::new_local(":memory:").await.unwrap();
        let state = AppState::new(service, config, Mailer::Log);
        Self {
            router: build_router(state.clone()),
            state,
            uploads,
        }
    }

    async fn user(&self, name: &str, role: Role) -> User {
        self.state
            .service
            .create_user(&NewUser {
                username: name.into(),
                email: format!("{name}@example.com"),
                password: password_hash().to_string(),
                first_name: None,
                last_name: None,
                role,
                profile_picture: None,
            })
            .await
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Reply {
            status,
            body,
            cookie,
        }
    }

    async fn call(&self, method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Sign in and return the session cookie.
    async fn login(&self, name: &str) -> String {
        let reply = self
            .call(
                "POST",
                "/api/login",
                None,
                Some(json!({ "email": format!("{name}@example.com"), "password": PASSWORD })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.cookie.expect("login sets a session cookie")
    }

    async fn signed_in(&self, name: &str, role: Role) -> (User, String) {
        let user = self.user(name, role).await;
        let cookie = self.login(name).await;
        (user, cookie)
    }
}

fn id_of(reply: &Reply) -> i64 {
    reply.body["id"].as_i64().expect("response has an id")
}

#[tokio::test]
async fn health_needs_no_session() {
    let app = TestApp::new().await;
    let reply = app.call("GET", "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = TestApp::new().await;
    for uri in ["/api/courses", "/api/user", "/api/enrollments", "/api/activity-logs"] {
        let reply = app.call("GET", uri, None, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(reply.body, json!({ "message": "Not authenticated" }));
    }
}

#[tokio::test]
async fn register_creates_an_employee_and_signs_in() {
    let app = TestApp::new().await;
    let reply = app
        .call(
            "POST",
            "/api/register",
            None,
            Some(json!({
                "username": "newbie",
                "email": "newbie@example.com",
                "password": "secret1",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["role"], "employee");
    assert!(reply.body.get("password").is_none());

    let cookie = reply.cookie.unwrap();
    let me = app.call("GET", "/api/user", Some(&cookie), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "newbie");

    let dup = app
        .call(
            "POST",
            "/api/register",
            None,
            Some(json!({ "username": "other", "email": "NEWBIE@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["message"], "Email already in use");
}

#[tokio::test]
async fn register_validates_input() {
    let app = TestApp::new().await;
    let reply = app
        .call(
            "POST",
            "/api/register",
            None,
            Some(json!({ "username": "x", "email": "x@example.com", "password": "123" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Validation failed");
    assert_eq!(reply.body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn login_failure_and_logout() {
    let app = TestApp::new().await;
    app.user("ann", Role::Employee).await;

    let bad = app
        .call(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "ann@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.body["message"], "Invalid email or password");

    let cookie = app.login("ann").await;
    let out = app.call("POST", "/api/logout", Some(&cookie), None).await;
    assert_eq!(out.status, StatusCode::OK);
    assert_eq!(out.body["message"], "Logged out successfully");

    let after = app.call("GET", "/api/user", Some(&cookie), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn course_create_and_delete() {
    let app = TestApp::new().await;
    let (author, cookie) = app.signed_in("carol", Role::Contributor).await;

    let created = app
        .call(
            "POST",
            "/api/courses",
            Some(&cookie),
            Some(json!({ "title": "Rust 101", "description": "Ownership and borrowing" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["title"], "Rust 101");
    assert_eq!(created.body["instructorId"], author.id);
    assert_eq!(created.body["status"], "draft");
    let id = id_of(&created);

    let fetched = app.call("GET", &format!("/api/courses/{id}"), Some(&cookie), None).await;
    assert_eq!(fetched.status, StatusCode::OK);

    let missing = app.call("DELETE", "/api/courses/9999", Some(&cookie), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Course not found");

    let deleted = app.call("DELETE", &format!("/api/courses/{id}"), Some(&cookie), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.call("GET", &format!("/api/courses/{id}"), Some(&cookie), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn course_validation_and_roles() {
    let app = TestApp::new().await;
    let (_, employee) = app.signed_in("eve", Role::Employee).await;
    let (_, author) = app.signed_in("carol", Role::Contributor).await;
    let (_, rival) = app.signed_in("rick", Role::Contributor).await;
    let (_, admin) = app.signed_in("root", Role::Admin).await;

    let body = json!({ "title": "Safety", "description": "Site safety basics" });
    let denied = app.call("POST", "/api/courses", Some(&employee), Some(body.clone())).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let invalid = app
        .call("POST", "/api/courses", Some(&author), Some(json!({ "title": "", "description": "d" })))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let id = id_of(&app.call("POST", "/api/courses", Some(&author), Some(body)).await);
    let uri = format!("/api/courses/{id}");

    let rival_edit = app.call("PUT", &uri, Some(&rival), Some(json!({ "title": "Mine" }))).await;
    assert_eq!(rival_edit.status, StatusCode::FORBIDDEN);

    let self_publish = app
        .call("PUT", &uri, Some(&author), Some(json!({ "status": "published" })))
        .await;
    assert_eq!(self_publish.status, StatusCode::FORBIDDEN);

    let submit = app.call("PUT", &uri, Some(&author), Some(json!({ "status": "pending" }))).await;
    assert_eq!(submit.status, StatusCode::OK);
    assert_eq!(submit.body["status"], "pending");

    let pending = app.call("GET", "/api/pending-courses", Some(&admin), None).await;
    assert_eq!(pending.body.as_array().unwrap().len(), 1);
    let not_admin = app.call("GET", "/api/pending-courses", Some(&author), None).await;
    assert_eq!(not_admin.status, StatusCode::FORBIDDEN);

    let approved = app.call("POST", &format!("{uri}/approve"), Some(&admin), None).await;
    assert_eq!(approved.body["status"], "published");

    // published -> pending is not a legal transition
    let illegal = app.call("PUT", &uri, Some(&admin), Some(json!({ "status": "draft" }))).await;
    assert_eq!(illegal.status, StatusCode::BAD_REQUEST);
}

/// Course with one module and `lessons` lessons; returns (course, module,
/// lesson ids).
async fn build_course(app: &TestApp, author: &str, lessons: usize) -> (i64, i64, Vec<i64>) {
    let course = id_of(
        &app.call(
            "POST",
            "/api/courses",
            Some(author),
            Some(json!({ "title": "Forklift", "description": "Operating a forklift" })),
        )
        .await,
    );
    let module = app
        .call(
            "POST",
            "/api/modules",
            Some(author),
            Some(json!({ "courseId": course, "title": "Basics" })),
        )
        .await;
    assert_eq!(module.status, StatusCode::CREATED);
    let module = id_of(&module);

    let mut ids = Vec::new();
    for n in 0..lessons {
        let lesson = app
            .call(
                "POST",
                "/api/lessons",
                Some(author),
                Some(json!({ "moduleId": module, "title": format!("Lesson {n}") })),
            )
            .await;
        assert_eq!(lesson.status, StatusCode::CREATED);
        ids.push(id_of(&lesson));
    }
    (course, module, ids)
}

#[tokio::test]
async fn lesson_completion_drives_progress() {
    let app = TestApp::new().await;
    let (_, author) = app.signed_in("carol", Role::Contributor).await;
    let (_, learner) = app.signed_in("eve", Role::Employee).await;
    let (course, module, lessons) = build_course(&app, &author, 3).await;

    let listed = app
        .call("GET", &format!("/api/modules/{module}/lessons"), Some(&learner), None)
        .await;
    assert_eq!(listed.body.as_array().unwrap().len(), 3);

    let enrolled = app
        .call("POST", "/api/enrollments", Some(&learner), Some(json!({ "courseId": course })))
        .await;
    assert_eq!(enrolled.status, StatusCode::CREATED);
    assert_eq!(enrolled.body["progress"], 0);

    let mut expected = [33, 67, 100].into_iter();
    for lesson in &lessons {
        let done = app
            .call(
                "POST",
                "/api/lesson-progress",
                Some(&learner),
                Some(json!({ "lessonId": lesson, "status": "completed" })),
            )
            .await;
        assert_eq!(done.status, StatusCode::CREATED);
        assert_eq!(done.body["status"], "completed");

        let enrollments = app.call("GET", "/api/enrollments", Some(&learner), None).await;
        assert_eq!(enrollments.body[0]["progress"], expected.next().unwrap());
        assert_eq!(enrollments.body[0]["course"]["id"], course);
    }

    let certificates = app.call("GET", "/api/certificates", Some(&learner), None).await;
    assert_eq!(certificates.body.as_array().unwrap().len(), 1);

    let activity = app.call("GET", "/api/activity-logs", Some(&learner), None).await;
    let actions: Vec<&str> = activity
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions.first(), Some(&"completed_course"));
    assert!(actions.contains(&"enrolled"));
}

#[tokio::test]
async fn enrolling_twice_is_rejected() {
    let app = TestApp::new().await;
    let (_, author) = app.signed_in("carol", Role::Contributor).await;
    let (_, learner) = app.signed_in("eve", Role::Employee).await;
    let (course, _, _) = build_course(&app, &author, 1).await;

    let body = json!({ "courseId": course });
    let first = app.call("POST", "/api/enrollments", Some(&learner), Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let again = app.call("POST", "/api/enrollments", Some(&learner), Some(body)).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body, json!({ "message": "Already enrolled in this course" }));

    let unknown = app
        .call("POST", "/api/enrollments", Some(&learner), Some(json!({ "courseId": 4242 })))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], "Course not found");

    let enrollments = app.call("GET", "/api/enrollments", Some(&learner), None).await;
    assert_eq!(enrollments.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_category_is_a_validation_error() {
    let app = TestApp::new().await;
    let (_, author) = app.signed_in("carol", Role::Contributor).await;

    let reply = app
        .call(
            "POST",
            "/api/courses",
            Some(&author),
            Some(json!({ "title": "T", "description": "D", "categoryId": 999 })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body,
        json!({ "message": "Validation failed", "errors": ["Unknown category"] })
    );
}

#[tokio::test]
async fn duplicate_category_name_is_rejected() {
    let app = TestApp::new().await;
    let (_, admin) = app.signed_in("root", Role::Admin).await;

    let body = json!({ "name": "Safety" });
    let first = app.call("POST", "/api/categories", Some(&admin), Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let again = app.call("POST", "/api/categories", Some(&admin), Some(body)).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "Category name already exists");
}

#[tokio::test]
async fn assessment_flow_hides_answers_from_learners() {
    let app = TestApp::new().await;
    let (_, author) = app.signed_in("carol", Role::Contributor).await;
    let (learner_user, learner) = app.signed_in("eve", Role::Employee).await;
    let (_, other) = app.signed_in("olga", Role::Employee).await;
    let (_, module, _) = build_course(&app, &author, 1).await;

    let assessment = app
        .call(
            "POST",
            "/api/assessments",
            Some(&author),
            Some(json!({ "title": "Quiz", "moduleId": module, "passingScore": 50 })),
        )
        .await;
    assert_eq!(assessment.status, StatusCode::CREATED);
    let assessment = id_of(&assessment);

    let mut question_ids = Vec::new();
    for (text, answer) in [("Max load?", "1000kg"), ("Seatbelt?", "yes")] {
        let q = app
            .call(
                "POST",
                "/api/questions",
                Some(&author),
                Some(json!({
                    "assessmentId": assessment,
                    "questionText": text,
                    "questionType": "short_answer",
                    "correctAnswer": answer,
                    "explanation": "See the manual"
                })),
            )
            .await;
        assert_eq!(q.status, StatusCode::CREATED, "{}", q.body);
        question_ids.push(id_of(&q));
    }

    let uri = format!("/api/assessments/{assessment}/questions");
    let as_author = app.call("GET", &uri, Some(&author), None).await;
    assert_eq!(as_author.body[0]["correctAnswer"], "1000kg");
    let as_learner = app.call("GET", &uri, Some(&learner), None).await;
    assert_eq!(as_learner.body[0]["correctAnswer"], Value::Null);
    assert_eq!(as_learner.body[0]["explanation"], Value::Null);

    let started = app
        .call(
            "POST",
            &format!("/api/modules/{module}/assessment-attempts/start"),
            Some(&learner),
            None,
        )
        .await;
    assert_eq!(started.status, StatusCode::CREATED);
    assert_eq!(started.body["attempt"]["userId"], learner_user.id);
    assert_eq!(started.body["questions"][1]["correctAnswer"], Value::Null);
    let attempt = started.body["attempt"]["id"].as_i64().unwrap();

    let answers = json!({ "answers": {
        question_ids[0].to_string(): " 1000KG ",
        question_ids[1].to_string(): "no"
    }});
    let submit_uri = format!("/api/assessment-attempts/{attempt}/submit");

    let foreign = app.call("POST", &submit_uri, Some(&other), Some(answers.clone())).await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let result = app.call("POST", &submit_uri, Some(&learner), Some(answers.clone())).await;
    assert_eq!(result.status, StatusCode::OK);
    assert_eq!(result.body["score"], 50);
    assert_eq!(result.body["passed"], true);
    assert_eq!(result.body["attempt"]["status"], "passed");

    let twice = app.call("POST", &submit_uri, Some(&learner), Some(answers)).await;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_views_never_leak_passwords() {
    let app = TestApp::new().await;
    let (admin_user, admin) = app.signed_in("root", Role::Admin).await;
    app.user("eve", Role::Employee).await;

    let users = app.call("GET", "/api/users", Some(&admin), None).await;
    assert_eq!(users.status, StatusCode::OK);
    let users = users.body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));

    let created = app
        .call(
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({ "username": "nina", "email": "nina@example.com", "role": "contributor" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["role"], "contributor");
    assert!(created.body.get("password").is_none());

    let self_delete = app
        .call("DELETE", &format!("/api/users/{}", admin_user.id), Some(&admin), None)
        .await;
    assert_eq!(self_delete.status, StatusCode::BAD_REQUEST);

    let overview = app.call("GET", "/api/analytics/overview", Some(&admin), None).await;
    assert_eq!(overview.body["totalUsers"], 3);
}

#[tokio::test]
async fn groups_grant_course_access() {
    let app = TestApp::new().await;
    let (_, admin) = app.signed_in("root", Role::Admin).await;
    let (learner_user, learner) = app.signed_in("eve", Role::Employee).await;
    let (course, _, _) = build_course(&app, &admin, 0).await;

    let group = id_of(
        &app.call("POST", "/api/groups", Some(&admin), Some(json!({ "name": "Warehouse" })))
            .await,
    );
    let member = json!({ "groupId": group, "userId": learner_user.id });
    let added = app.call("POST", "/api/group-members", Some(&admin), Some(member.clone())).await;
    assert_eq!(added.status, StatusCode::CREATED);
    let dup = app.call("POST", "/api/group-members", Some(&admin), Some(member)).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["message"], "User is already a member of this group");

    let members = app
        .call("GET", &format!("/api/groups/{group}/members"), Some(&admin), None)
        .await;
    assert_eq!(members.body[0]["user"]["username"], "eve");
    assert!(members.body[0]["user"].get("password").is_none());

    let neither = app
        .call("POST", "/api/course-access", Some(&admin), Some(json!({ "courseId": course })))
        .await;
    assert_eq!(neither.status, StatusCode::BAD_REQUEST);

    let granted = app
        .call(
            "POST",
            "/api/course-access",
            Some(&admin),
            Some(json!({ "courseId": course, "groupId": group })),
        )
        .await;
    assert_eq!(granted.status, StatusCode::CREATED);

    let content = app.call("GET", "/api/my-content", Some(&learner), None).await;
    assert_eq!(content.body[0]["id"], course);

    let forbidden = app.call("GET", "/api/groups", Some(&learner), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

fn multipart(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "lms-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload/video")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

#[tokio::test]
async fn video_upload_rules() {
    let app = TestApp::new().await;
    let (_, author) = app.signed_in("carol", Role::Contributor).await;
    let (_, learner) = app.signed_in("eve", Role::Employee).await;

    let denied = app
        .send(with_cookie(multipart("a.mp4", "video/mp4", b"data"), &learner))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let wrong_type = app
        .send(with_cookie(multipart("a.txt", "text/plain", b"data"), &author))
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);

    let too_big = app
        .send(with_cookie(multipart("big.mp4", "video/mp4", &[0u8; 2048]), &author))
        .await;
    assert_eq!(too_big.status, StatusCode::PAYLOAD_TOO_LARGE);

    let ok = app
        .send(with_cookie(multipart("intro.mp4", "video/mp4", b"fake video"), &author))
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    let url = ok.body["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/videos/") && url.ends_with(".mp4"));

    let name = url.trim_start_matches("/uploads/videos/");
    let stored = app.uploads.path().join("videos").join(name);
    assert_eq!(std::fs::read(stored).unwrap(), b"fake video");

    let served = app.call("GET", url, None, None).await;
    assert_eq!(served.status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_or_unconfigured_oauth_provider_is_not_found() {
    let app = TestApp::new().await;
    assert_eq!(app.call("GET", "/api/auth/google", None, None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.call("GET", "/api/auth/microsoft", None, None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.call("GET", "/api/auth/github", None, None).await.status, StatusCode::NOT_FOUND);
}
