use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TipRecord {
    id: String,
    amount: u64,
    date: String,
    contributor_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodayResponse {
    date: String,
    tips: Vec<TipRecord>,
    total_amount: u64,
    tip_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardEntry {
    contributor_id: i64,
    total_amount: u64,
    tip_count: u64,
}

const HOST_USER: &str = r#"{"id":4242,"first_name":"Test","last_name":"Waiter","username":"tester"}"#;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("tip_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_tip_tracker"))
        .env("PORT", port.to_string())
        .env("TIP_DATA_PATH", data_path)
        .env("TIP_HOST_USER", HOST_USER)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn today(client: &Client, base_url: &str) -> TodayResponse {
    client
        .get(format!("{base_url}/api/today"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn my_entry(client: &Client, base_url: &str) -> Option<LeaderboardEntry> {
    let board: Vec<LeaderboardEntry> = client
        .get(format!("{base_url}/api/leaderboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    board.into_iter().find(|entry| entry.contributor_id == 4242)
}

async fn add_tip(client: &Client, base_url: &str, amount: i64) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/tips"))
        .json(&serde_json::json!({ "amount": amount }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_add_tip_updates_today_and_leaderboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;
    let entry_before = my_entry(&client, &server.base_url).await;

    let response = add_tip(&client, &server.base_url, 150).await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let created: TipRecord = response.json().await.unwrap();
    assert_eq!(created.amount, 150);
    assert_eq!(created.contributor_id, 4242);
    assert_eq!(created.date, before.date);

    let after = today(&client, &server.base_url).await;
    assert_eq!(after.total_amount, before.total_amount + 150);
    assert_eq!(after.tip_count, before.tip_count + 1);
    assert_eq!(after.tips.first().map(|tip| tip.id.as_str()), Some(created.id.as_str()));

    let entry = my_entry(&client, &server.base_url).await.expect("missing leaderboard entry");
    let (total_before, count_before) = entry_before
        .map(|entry| (entry.total_amount, entry.tip_count))
        .unwrap_or((0, 0));
    assert_eq!(entry.total_amount, total_before + 150);
    assert_eq!(entry.tip_count, count_before + 1);
}

#[tokio::test]
async fn http_delete_tip_then_missing_id_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created: TipRecord = add_tip(&client, &server.base_url, 40)
        .await
        .json()
        .await
        .unwrap();
    let before = today(&client, &server.base_url).await;

    let response = client
        .delete(format!("{}/api/tips/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let after = today(&client, &server.base_url).await;
    assert_eq!(after.total_amount, before.total_amount - 40);
    assert!(after.tips.iter().all(|tip| tip.id != created.id));

    let again = client
        .delete(format!("{}/api/tips/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_rejects_invalid_amounts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;
    for amount in [0, -10, 10_001] {
        let response = add_tip(&client, &server.base_url, amount).await;
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }
    let after = today(&client, &server.base_url).await;
    assert_eq!(after.tip_count, before.tip_count);
}

#[tokio::test]
async fn http_saved_name_is_used_for_new_tips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/me/name", server.base_url))
        .json(&serde_json::json!({ "name": "  Tess  " }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let me: serde_json::Value = response.json().await.unwrap();
    assert_eq!(me["displayName"], "Tess");

    let response = client
        .put(format!("{}/api/me/name", server.base_url))
        .json(&serde_json::json!({ "name": "T" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let reset: serde_json::Value = client
        .delete(format!("{}/api/me/name", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reset["displayName"], "Test Waiter");
    assert_eq!(reset["savedName"], "");
}
