use async_trait::async_trait;
use pretty_assertions::assert_eq;
use script_index_indexer::{
    IndexerConfig, IndexerError, LocalSource, ScriptIndexer, SourceProvider, SourceRef,
};
use script_index_store::{IndexDocument, IndexStore, ScriptEntry, AUTO_ADDED_DESCRIPTION};
use std::sync::Mutex;
use tempfile::TempDir;

/// In-memory provider that records which paths were fetched
struct MemorySource {
    files: Vec<(String, Option<String>)>,
    fetched: Mutex<Vec<String>>,
}

impl MemorySource {
    fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(path, text)| (path.to_string(), Some(text.to_string())))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Listed, but every fetch fails
    fn with_unreadable(mut self, path: &str) -> Self {
        self.files.push((path.to_string(), None));
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("fetch log").clone()
    }
}

#[async_trait]
impl SourceProvider for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn list_sources(&self) -> script_index_indexer::Result<Vec<SourceRef>> {
        Ok(self
            .files
            .iter()
            .map(|(path, _)| SourceRef::from_path(path.as_str()))
            .collect())
    }

    async fn fetch_text(&self, source: &SourceRef) -> script_index_indexer::Result<String> {
        self.fetched
            .lock()
            .expect("fetch log")
            .push(source.path.clone());
        self.files
            .iter()
            .find(|(path, _)| *path == source.path)
            .and_then(|(_, text)| text.clone())
            .ok_or_else(|| IndexerError::source_read(&source.path, "connection reset"))
    }
}

fn indexer(temp: &TempDir) -> ScriptIndexer {
    ScriptIndexer::new(IndexerConfig::new(temp.path().join("script_index.json")))
}

#[tokio::test]
async fn full_build_indexes_every_listed_script() {
    let temp = TempDir::new().expect("tempdir");
    let source = MemorySource::new(&[
        ("Runtime/SG_HapticGlove.cs", "public class SG_HapticGlove { void Update() {} }"),
        ("Runtime/Calib.cs", "public void StartCalibration() { }"),
    ]);

    let indexer = indexer(&temp);
    let run = indexer.index_full(&source).await.expect("index");
    assert!(run.saved);
    assert_eq!(run.stats.listed, 2);
    assert_eq!(run.stats.added, 2);

    let names: Vec<&str> = run.document.scripts().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["SG_HapticGlove.cs", "Calib.cs"]);

    assert_eq!(
        indexer.store().path(),
        temp.path().join("script_index.json").as_path()
    );
    let stored = indexer.store().load().await.expect("load");
    assert_eq!(stored, run.document);
    let calib = stored.get("Calib.cs").expect("Calib.cs");
    assert_eq!(calib.functions[0].description, "Handles calibration logic.");
}

#[tokio::test]
async fn incremental_fetches_only_unknown_names() {
    let temp = TempDir::new().expect("tempdir");
    let store = IndexStore::new(temp.path().join("script_index.json"));
    store
        .save(&IndexDocument::from_entries([ScriptEntry::placeholder("Known.cs")]))
        .await
        .expect("seed");

    let source = MemorySource::new(&[
        ("Assets/Known.cs", "class Known { void Start() {} }"),
        ("Assets/Fresh.cs", "class Fresh { void Start() {} }"),
    ]);
    let run = indexer(&temp).index_incremental(&source).await.expect("index");

    assert_eq!(source.fetched(), vec!["Assets/Fresh.cs".to_string()]);
    assert_eq!(run.stats.known, 1);
    assert_eq!(run.stats.added, 1);
    assert!(run.saved);

    let stored = store.load().await.expect("load");
    assert_eq!(stored.total_scripts(), 2);
    // Existing entries are never overwritten by an incremental run.
    assert_eq!(
        stored.get("Known.cs").expect("Known.cs").description,
        AUTO_ADDED_DESCRIPTION
    );
}

#[tokio::test]
async fn warm_store_without_new_scripts_is_not_rewritten() {
    let temp = TempDir::new().expect("tempdir");
    let source = MemorySource::new(&[("A.cs", "class A { void Go() {} }")]);
    let indexer = indexer(&temp);
    indexer.index_full(&source).await.expect("first");

    let run = indexer.index_incremental(&source).await.expect("second");
    assert!(!run.saved);
    assert_eq!(run.stats.added, 0);
    assert_eq!(run.stats.known, 1);
    assert_eq!(source.fetched().len(), 1);
}

#[tokio::test]
async fn cold_store_with_nothing_listed_saves_empty_document() {
    let temp = TempDir::new().expect("tempdir");
    let source = MemorySource::new(&[]);

    let run = indexer(&temp).index_incremental(&source).await.expect("index");
    assert!(run.saved);
    assert!(run.document.is_empty());

    let raw = std::fs::read_to_string(temp.path().join("script_index.json")).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["totalScripts"], 0);
}

#[tokio::test]
async fn corrupt_index_is_rebuilt_from_the_source() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("script_index.json");
    std::fs::write(&path, b"{ \"scripts\": [ truncated").expect("write corrupt");

    let source = MemorySource::new(&[("A.cs", "class A {}"), ("B.cs", "class B {}")]);
    let run = indexer(&temp).index_incremental(&source).await.expect("index");

    assert!(run.saved);
    assert_eq!(run.stats.added, 2);
    assert_eq!(IndexStore::new(&path).load().await.expect("load").len(), 2);
}

#[tokio::test]
async fn failed_and_empty_sources_are_skipped() {
    let temp = TempDir::new().expect("tempdir");
    let source = MemorySource::new(&[("Good.cs", "class Good {}"), ("Blank.cs", "  \n\t")])
        .with_unreadable("Broken.cs");

    let run = indexer(&temp).index_full(&source).await.expect("index");

    assert_eq!(run.stats.indexed, 1);
    assert_eq!(run.stats.skipped, 2);
    assert_eq!(run.stats.errors.len(), 1);
    assert!(run.stats.errors[0].starts_with("Broken.cs"));
    assert_eq!(
        run.document.scripts().iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["Good.cs"]
    );
}

#[tokio::test]
async fn duplicate_names_keep_the_first_path() {
    let temp = TempDir::new().expect("tempdir");
    let source = MemorySource::new(&[
        ("Runtime/Glove.cs", "class Glove {}"),
        ("Editor/Glove.cs", "class GloveEditor {}"),
    ]);

    let run = indexer(&temp).index_full(&source).await.expect("index");
    assert_eq!(run.document.len(), 1);
    assert_eq!(run.document.scripts()[0].classes, vec!["Glove"]);
    assert_eq!(source.fetched(), vec!["Runtime/Glove.cs".to_string()]);
}

#[tokio::test]
async fn save_failure_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").expect("write blocker");

    let indexer = ScriptIndexer::new(IndexerConfig::new(blocker.join("script_index.json")));
    let source = MemorySource::new(&[("A.cs", "class A {}")]);

    let err = indexer.index_full(&source).await.unwrap_err();
    assert!(matches!(err, IndexerError::StoreError(_)));
}

#[tokio::test]
async fn refresh_replaces_entries_in_place() {
    let temp = TempDir::new().expect("tempdir");
    let store = IndexStore::new(temp.path().join("script_index.json"));
    store
        .save(&IndexDocument::from_entries([
            ScriptEntry::placeholder("First.cs"),
            ScriptEntry::placeholder("Second.cs"),
        ]))
        .await
        .expect("seed");

    let source = MemorySource::new(&[
        ("Second.cs", "class Second { void Update() {} }"),
        ("Third.cs", "class Third {}"),
    ]);
    let run = indexer(&temp).refresh(&source).await.expect("refresh");

    assert_eq!(run.stats.replaced, 1);
    assert_eq!(run.stats.added, 1);

    let stored = store.load().await.expect("load");
    let names: Vec<&str> = stored.scripts().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["First.cs", "Second.cs", "Third.cs"]);
    assert_eq!(stored.get("Second.cs").expect("Second.cs").classes, vec!["Second"]);
    assert_eq!(
        stored.get("First.cs").expect("First.cs").description,
        AUTO_ADDED_DESCRIPTION
    );
}

#[tokio::test]
async fn local_directory_end_to_end() {
    let project = TempDir::new().expect("project");
    let scripts = project.path().join("Assets").join("Scripts");
    std::fs::create_dir_all(&scripts).expect("mkdir");
    std::fs::write(
        scripts.join("SG_GrabZone.cs"),
        "public class SG_GrabZone {\n    public void OnCollisionEnter(Collision c) { }\n}\n",
    )
    .expect("write");
    std::fs::write(scripts.join("SG_GrabZone.cs.meta"), "guid: 42").expect("write meta");

    let out = TempDir::new().expect("out");
    let indexer = ScriptIndexer::new(IndexerConfig::new(out.path().join("index.json")));
    let run = indexer
        .index_full(&LocalSource::new(project.path(), "cs"))
        .await
        .expect("index");

    assert_eq!(run.document.len(), 1);
    let entry = &run.document.scripts()[0];
    assert_eq!(entry.name, "SG_GrabZone.cs");
    assert_eq!(
        entry.description,
        "Manages object grabbing, releasing, or physics interactions."
    );
    assert_eq!(entry.functions[0].name, "OnCollisionEnter");
    assert_eq!(
        entry.functions[0].declaration_text.as_deref(),
        Some("public void OnCollisionEnter")
    );
    assert_eq!(
        entry.functions[0].description,
        "Responds to / processes collision or impact events."
    );
}
