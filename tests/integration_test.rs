use async_trait::async_trait;
use book_dashboard::error::CatalogError;
use book_dashboard::models::{AuthorRecord, RatingRecord, WorkRecord, NOT_AVAILABLE};
use book_dashboard::services::{cancel_pair, CancelToken, EnrichmentPipeline, PipelineState};
use book_dashboard::utils::logging;
use book_dashboard::views::dashboard::LIST_ERROR_MESSAGE;
use book_dashboard::{App, CatalogApi, CatalogClient, Config};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

/// 作者查询的模拟行为
#[derive(Clone)]
enum AuthorBehavior {
    Found { birth_date: &'static str, delay_ms: u64 },
    NotFound,
    Fail,
    Hang,
}

/// 内存中的书目 API
#[derive(Clone, Default)]
struct FakeCatalog {
    /// None 表示阅读列表请求失败
    works: Option<Vec<WorkRecord>>,
    authors: HashMap<String, AuthorBehavior>,
    author_calls: Arc<Mutex<Vec<String>>>,
    rating_calls: Arc<Mutex<Vec<String>>>,
    /// 设置后每个作者查询都要等所有查询到齐才返回
    barrier: Option<Arc<Barrier>>,
}

impl FakeCatalog {
    fn with_works(works: Vec<WorkRecord>) -> Self {
        Self {
            works: Some(works),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self::default()
    }

    fn author(mut self, name: &str, behavior: AuthorBehavior) -> Self {
        self.authors.insert(name.to_string(), behavior);
        self
    }

    fn author_calls(&self) -> Vec<String> {
        self.author_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_reading_list(&self) -> Result<Vec<WorkRecord>, CatalogError> {
        self.works
            .clone()
            .ok_or_else(|| CatalogError::reading_list("/people/mekBot/books/want-to-read.json", "connection refused"))
    }

    async fn fetch_author(&self, name: &str) -> Result<Option<AuthorRecord>, CatalogError> {
        self.author_calls.lock().unwrap().push(name.to_string());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        match self.authors.get(name).cloned().unwrap_or(AuthorBehavior::NotFound) {
            AuthorBehavior::Found { birth_date, delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(Some(AuthorRecord {
                    name: name.to_string(),
                    birth_date: Some(birth_date.to_string()),
                    top_work: None,
                    top_subjects: vec!["Fiction".to_string()],
                }))
            }
            AuthorBehavior::NotFound => Ok(None),
            AuthorBehavior::Fail => Err(CatalogError::author_lookup(name, "timed out")),
            AuthorBehavior::Hang => std::future::pending().await,
        }
    }

    async fn fetch_rating(&self, title: &str) -> Result<Option<RatingRecord>, CatalogError> {
        self.rating_calls.lock().unwrap().push(title.to_string());
        Ok(Some(RatingRecord {
            title: title.to_string(),
            ratings_average: Some(3.5),
        }))
    }
}

fn work(title: &str, authors: &[&str], year: Option<i32>) -> WorkRecord {
    WorkRecord::new(title, authors.iter().map(|a| a.to_string()).collect(), year)
}

fn test_config() -> Config {
    Config {
        login_email: "admin@gmail.com".to_string(),
        login_password: "admin@123".to_string(),
        // 不写文件
        csv_output: String::new(),
        ..Config::default()
    }
}

fn found(birth_date: &'static str) -> AuthorBehavior {
    AuthorBehavior::Found {
        birth_date,
        delay_ms: 0,
    }
}

#[tokio::test]
async fn test_two_works_scenario() {
    logging::init(false);

    let catalog = FakeCatalog::with_works(vec![
        work("Dune", &["Frank Herbert"], Some(1965)),
        work("1984", &["George Orwell"], Some(1949)),
    ])
    .author("Frank Herbert", found("1920"))
    .author("George Orwell", found("1903"));

    let report = App::with_client(test_config(), catalog)
        .run_session(&CancelToken::never())
        .await
        .expect("会话应该成功");

    assert_eq!(report.state, PipelineState::Ready);
    assert_eq!(report.total_rows, 2);
    assert!(report.rendered.contains("1920"));
    assert!(report.rendered.contains("1903"));
    assert!(report.rendered.contains("Rows per page: 10"));
    assert!(report.rendered.contains("1–2 of 2"));
    assert!(!report.rendered.contains("next ›"));

    let csv = report.csv.expect("Ready 时应该生成 CSV");
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("1,Frank Herbert,Dune,1965,Fiction,1920,N/A"));
    assert!(csv.contains("2,George Orwell,1984,1949,Fiction,1903,N/A"));
}

#[tokio::test]
async fn test_reading_list_failure_shows_error_only() {
    let report = App::with_client(test_config(), FakeCatalog::failing())
        .run_session(&CancelToken::never())
        .await
        .expect("错误状态也应该返回报告");

    assert!(matches!(report.state, PipelineState::Error { .. }));
    assert_eq!(report.total_rows, 0);
    assert!(report.rendered.contains(LIST_ERROR_MESSAGE));
    assert!(!report.rendered.contains("Author Name"));
    assert!(report.csv.is_none());
}

#[tokio::test]
async fn test_unknown_author_degrades_only_its_row() {
    let catalog = FakeCatalog::with_works(vec![
        work("Mystery Book", &["Unknown Author"], None),
        work("Dune", &["Frank Herbert"], Some(1965)),
        work("Burmese Days", &["George Orwell"], Some(1934)),
    ])
    .author("Unknown Author", AuthorBehavior::NotFound)
    .author("Frank Herbert", found("1920"))
    .author("George Orwell", AuthorBehavior::Fail);

    let mut pipeline = EnrichmentPipeline::new(catalog, false);
    let state = pipeline.run(&CancelToken::never(), |_| {}).await.clone();
    assert_eq!(state, PipelineState::Ready);

    let rows = pipeline.rows();
    assert_eq!(rows[0].birth_date_display(), NOT_AVAILABLE);
    assert_eq!(rows[0].subject_display(), NOT_AVAILABLE);
    assert_eq!(rows[1].birth_date_display(), "1920");
    assert_eq!(rows[2].birth_date_display(), NOT_AVAILABLE);

    let stats = pipeline.session().stats();
    assert_eq!(stats.authors_found, 1);
    assert_eq!(stats.authors_absent, 1);
    assert_eq!(stats.authors_failed, 1);
}

#[tokio::test]
async fn test_one_lookup_per_distinct_author() {
    let catalog = FakeCatalog::with_works(vec![
        work("Animal Farm", &["George Orwell"], Some(1945)),
        work("1984", &["George Orwell"], Some(1949)),
        work("Good Omens", &["Neil Gaiman", "Terry Pratchett"], Some(1990)),
        work("Stardust", &["Neil Gaiman"], Some(1999)),
        work("Mort", &["Terry Pratchett"], Some(1987)),
    ]);
    let spy = catalog.clone();

    let mut pipeline = EnrichmentPipeline::new(catalog, false);
    pipeline.run(&CancelToken::never(), |_| {}).await;

    let mut calls = spy.author_calls();
    calls.sort();
    assert_eq!(calls, vec!["George Orwell", "Neil Gaiman", "Terry Pratchett"]);
    // 没开启评分时不查询评分
    assert!(spy.rating_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_author_lookups_run_concurrently() {
    // 三个查询必须同时在进行中，屏障才会放行；串行执行会一直卡住
    let mut catalog = FakeCatalog::with_works(vec![
        work("Dune", &["Frank Herbert"], None),
        work("1984", &["George Orwell"], None),
        work("Stardust", &["Neil Gaiman"], None),
    ]);
    catalog.barrier = Some(Arc::new(Barrier::new(3)));

    let mut pipeline = EnrichmentPipeline::new(catalog, false);
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run(&CancelToken::never(), |_| {}),
    )
    .await
    .expect("作者查询应该并发执行")
    .clone();

    assert_eq!(state, PipelineState::Ready);
}

#[tokio::test]
async fn test_partial_rows_are_observable() {
    let catalog = FakeCatalog::with_works(vec![
        work("Dune", &["Frank Herbert"], None),
        work("1984", &["George Orwell"], None),
    ])
    .author("Frank Herbert", found("1920"))
    .author(
        "George Orwell",
        AuthorBehavior::Found {
            birth_date: "1903",
            delay_ms: 200,
        },
    );

    let mut snapshots = Vec::new();
    let mut pipeline = EnrichmentPipeline::new(catalog, false);
    pipeline
        .run(&CancelToken::never(), |session| {
            let births: Vec<String> = session.rows().iter().map(|r| r.birth_date_display()).collect();
            snapshots.push((session.state().clone(), births));
        })
        .await;

    assert!(snapshots.iter().any(|(state, births)| {
        matches!(state, PipelineState::FetchingAuthors { pending: 1 })
            && births == &vec!["1920".to_string(), NOT_AVAILABLE.to_string()]
    }));
    let (last_state, last_births) = snapshots.last().unwrap();
    assert_eq!(last_state, &PipelineState::Ready);
    assert_eq!(last_births, &vec!["1920".to_string(), "1903".to_string()]);
}

#[tokio::test]
async fn test_cancel_abandons_hung_lookups() {
    let catalog = FakeCatalog::with_works(vec![
        work("Dune", &["Frank Herbert"], None),
        work("Lost Book", &["Hung Author"], None),
    ])
    .author("Frank Herbert", found("1920"))
    .author("Hung Author", AuthorBehavior::Hang);

    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let mut pipeline = EnrichmentPipeline::new(catalog, false);
    let state = tokio::time::timeout(Duration::from_secs(5), pipeline.run(&token, |_| {}))
        .await
        .expect("取消后应该立即返回")
        .clone();

    assert_eq!(state, PipelineState::Cancelled);
    assert_eq!(pipeline.session().pending(), 0);
}

#[tokio::test]
async fn test_ratings_enrichment() {
    let catalog = FakeCatalog::with_works(vec![
        work("Dune", &["Frank Herbert"], Some(1965)),
        work("Dune", &["Frank Herbert"], Some(1965)),
    ])
    .author("Frank Herbert", found("1920"));
    let spy = catalog.clone();

    let config = Config {
        fetch_ratings: true,
        ..test_config()
    };
    let report = App::with_client(config, catalog)
        .run_session(&CancelToken::never())
        .await
        .unwrap();

    assert_eq!(spy.rating_calls.lock().unwrap().as_slice(), ["Dune".to_string()]);
    let csv = report.csv.unwrap();
    assert!(csv.lines().next().unwrap().ends_with("Ratings Average"));
    assert!(csv.lines().nth(1).unwrap().ends_with(",3.5"));
}

#[tokio::test]
async fn test_search_and_sort_from_config() {
    let catalog = FakeCatalog::with_works(vec![
        work("1984", &["George Orwell"], Some(1949)),
        work("Dune", &["Frank Herbert"], Some(1965)),
        work("Animal Farm", &["George Orwell"], Some(1945)),
    ]);

    let config = Config {
        search_text: "ORWELL".to_string(),
        sort_key: Some("year".to_string()),
        sort_descending: true,
        ..test_config()
    };
    let report = App::with_client(config, catalog)
        .run_session(&CancelToken::never())
        .await
        .unwrap();

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.shown_rows, 2);
    let csv = report.csv.unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,George Orwell,1984,1949"));
    assert!(lines[2].starts_with("2,George Orwell,Animal Farm,1945"));
}

#[tokio::test]
async fn test_wrong_login_stops_before_fetching() {
    let catalog = FakeCatalog::with_works(vec![work("Dune", &["Frank Herbert"], None)]);
    let spy = catalog.clone();

    let config = Config {
        login_password: "wrong".to_string(),
        ..test_config()
    };
    let err = App::with_client(config, catalog)
        .run_session(&CancelToken::never())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Email or password is wrong! Try again"));
    assert!(spy.author_calls().is_empty());
}

#[tokio::test]
async fn test_unknown_sort_key_is_rejected() {
    let config = Config {
        sort_key: Some("popularity".to_string()),
        ..test_config()
    };
    let result = App::with_client(config, FakeCatalog::with_works(Vec::new()))
        .run_session(&CancelToken::never())
        .await;
    assert!(result.is_err());
}

/// 访问真实的 Open Library
#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_dashboard() {
    logging::init(true);

    let config = test_config();
    let client = CatalogClient::new(&config).expect("创建客户端失败");
    let report = App::with_client(config, client)
        .run_session(&CancelToken::never())
        .await
        .expect("会话失败");

    println!("{}", report.rendered);
    assert_eq!(report.state, PipelineState::Ready);
}
