use mediasearch::db::init_db;
use mediasearch::{DataDir, Error, SearchEngine};
use rstest::*;
use tempfile::TempDir;

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

async fn open(dir: &TempDir) -> SearchEngine {
    SearchEngine::open(&DataDir::new(dir.path())).await.unwrap()
}

fn tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

/// 三个互相正交的单位向量
async fn add_basis(engine: &mut SearchEngine) {
    engine.add("id1", &[1., 0., 0.], "a1", &tags(&["t1"]), None).await.unwrap();
    engine.add("id2", &[0., 1., 0.], "a1", &tags(&["t2"]), None).await.unwrap();
    engine.add("id3", &[0., 0., 1.], "a2", &tags(&["t3"]), Some("/media/id3.jpg")).await.unwrap();
}

#[rstest]
#[tokio::test]
async fn test_search_nearest_first(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    add_basis(&mut engine).await;
    assert_eq!(engine.ntotal(), 3);

    let result = engine.search(&[1., 0., 0.], 2, None).await.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].media_id, "id1");
    assert_eq!(result[0].score, 0.);
    assert_eq!(result[0].tags, vec!["t1"]);
    // 距离相同时先插入的排在前面
    assert_eq!(result[1].media_id, "id2");
    assert_eq!(result[1].score, 2.);
}

#[rstest]
#[tokio::test]
async fn test_search_non_decreasing(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    for i in 0..20 {
        let x = (i * 7 % 20) as f32;
        engine.add(&format!("m{i}"), &[x, 1.], "a", &[], None).await.unwrap();
    }

    let result = engine.search(&[3., 1.], 20, None).await.unwrap();
    assert_eq!(result.len(), 20);
    assert_eq!(result[0].score, 0.);
    assert!(result.windows(2).all(|w| w[0].score <= w[1].score));
}

#[rstest]
#[tokio::test]
async fn test_album_filter(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    engine.add("id1", &[1., 0., 0.], "a1", &tags(&["t1"]), None).await.unwrap();
    engine.add("id2", &[0., 1., 0.], "a2", &tags(&["t2"]), None).await.unwrap();

    let result = engine.search(&[0., 1., 0.], 5, Some("a2")).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].media_id, "id2");
    assert_eq!(result[0].album, "a2");

    assert!(engine.search(&[0., 1., 0.], 5, Some("none")).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_album_filter_oversample_window(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    for i in 0..6 {
        engine.add(&format!("near{i}"), &[i as f32, 0.], "near", &[], None).await.unwrap();
    }
    engine.add("far", &[100., 0.], "far", &[], None).await.unwrap();

    // top_k = 1 时只扫描前 5 个近邻，far 不在其中
    assert!(engine.search(&[0., 0.], 1, Some("far")).await.unwrap().is_empty());
    // top_k = 2 时扫描全部 7 个近邻
    let result = engine.search(&[0., 0.], 2, Some("far")).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].media_id, "far");
}

#[rstest]
#[tokio::test]
async fn test_empty_index(temp_dir: TempDir) {
    let engine = open(&temp_dir).await;
    assert_eq!(engine.dimension(), None);
    assert_eq!(engine.ntotal(), 0);
    assert!(engine.search(&[1., 0., 0.], 5, None).await.unwrap().is_empty());
    assert!(engine.search(&[1., 0., 0.], 5, Some("a1")).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_top_k_saturation(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    add_basis(&mut engine).await;

    let result = engine.search(&[0., 0., 1.], 10, None).await.unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result[0].media_id, "id3");
    assert_eq!(result[0].path.as_deref(), Some("/media/id3.jpg"));
}

#[rstest]
#[case(usize::MAX)]
#[case(1 << 40)]
#[tokio::test]
async fn test_huge_top_k(temp_dir: TempDir, #[case] top_k: usize) {
    let mut engine = open(&temp_dir).await;
    add_basis(&mut engine).await;

    assert_eq!(engine.search(&[1., 0., 0.], top_k, None).await.unwrap().len(), 3);
    let result = engine.search(&[1., 0., 0.], top_k, Some("a1")).await.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].media_id, "id1");
}

#[rstest]
#[tokio::test]
async fn test_re_add_keeps_stale_vector(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    let id1 = engine.add("id1", &[1., 0., 0.], "a1", &tags(&["t1"]), None).await.unwrap();
    let id2 = engine.add("id1", &[0., 1., 0.], "a2", &tags(&["x", "y"]), None).await.unwrap();

    assert_eq!(id1, id2);
    assert_eq!(engine.ntotal(), 2);
    assert_eq!(engine.store().count().await.unwrap(), 1);

    // 两条向量都指向同一条已更新的元数据
    let result = engine.search(&[1., 0., 0.], 5, None).await.unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|r| r.media_id == "id1" && r.album == "a2"));
    assert_eq!(result[0].score, 0.);
    assert_eq!(result[1].score, 2.);
    assert_eq!(result[0].tags, vec!["x", "y"]);

    assert!(engine.search(&[1., 0., 0.], 5, Some("a1")).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_dimension_mismatch(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    add_basis(&mut engine).await;

    let err = engine.add("id4", &[1., 0.], "a1", &[], None).await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));
    assert_eq!(engine.ntotal(), 3);
    assert_eq!(engine.dimension(), Some(3));
    assert_eq!(engine.store().count().await.unwrap(), 3);

    let err = engine.search(&[1., 0.], 1, None).await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
}

#[rstest]
#[tokio::test]
async fn test_validation(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;

    assert!(matches!(engine.add("id1", &[], "a1", &[], None).await, Err(Error::Validation(_))));
    assert!(matches!(engine.add("", &[1.], "a1", &[], None).await, Err(Error::Validation(_))));
    assert!(matches!(
        engine.add("id1", &[f32::NAN], "a1", &[], None).await,
        Err(Error::Validation(_))
    ));
    assert_eq!(engine.dimension(), None);
    assert_eq!(engine.store().count().await.unwrap(), 0);

    add_basis(&mut engine).await;
    assert!(matches!(engine.search(&[1., 0., 0.], 0, None).await, Err(Error::Validation(_))));
    assert!(matches!(engine.search(&[], 1, None).await, Err(Error::Validation(_))));
}

#[rstest]
#[tokio::test]
async fn test_dangling_reference(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    add_basis(&mut engine).await;

    let db = init_db(DataDir::new(temp_dir.path()).database()).await.unwrap();
    sqlx::query("DELETE FROM media WHERE media_id = ?").bind("id1").execute(&db).await.unwrap();

    let result = engine.search(&[1., 0., 0.], 3, None).await.unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|r| r.media_id != "id1"));
}

#[rstest]
#[tokio::test]
async fn test_reopen(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    add_basis(&mut engine).await;
    engine.close().await;

    assert!(DataDir::new(temp_dir.path()).index().exists());

    let mut engine = open(&temp_dir).await;
    assert_eq!(engine.ntotal(), 3);
    assert_eq!(engine.dimension(), Some(3));

    let result = engine.search(&[0., 1., 0.], 1, None).await.unwrap();
    assert_eq!(result[0].media_id, "id2");

    // 重新打开后维度仍然有效
    assert!(engine.add("id4", &[1., 1.], "a1", &[], None).await.is_err());
    engine.add("id4", &[1., 1., 0.], "a1", &[], None).await.unwrap();
    assert_eq!(engine.ntotal(), 4);
}

#[rstest]
#[tokio::test]
async fn test_albums(temp_dir: TempDir) {
    let mut engine = open(&temp_dir).await;
    add_basis(&mut engine).await;

    let albums = engine.albums().await.unwrap();
    assert_eq!(albums.len(), 2);
    assert_eq!((albums[0].name.as_str(), albums[0].media_count), ("a1", 2));
    assert_eq!((albums[1].name.as_str(), albums[1].media_count), ("a2", 1));
}

#[rstest]
#[tokio::test]
async fn test_open_unusable_data_dir(temp_dir: TempDir) {
    let file = temp_dir.path().join("file");
    std::fs::write(&file, b"").unwrap();

    let err = SearchEngine::open(&DataDir::new(file.join("data"))).await.err().unwrap();
    assert!(matches!(err, Error::Storage(_)));
}
