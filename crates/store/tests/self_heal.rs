use pretty_assertions::assert_eq;
use script_index_store::{
    IndexDocument, IndexStore, ScriptEntry, AUTO_ADDED_DESCRIPTION, NO_DESCRIPTION,
    SENTINEL_FUNCTION_NAME,
};
use tempfile::TempDir;

#[tokio::test]
async fn malformed_legacy_index_heals_on_save() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("script_index.json");
    std::fs::write(
        &path,
        r#"{"total_scripts": 5, "scripts": ["A.cs", {"name": "B.cs"}, 12, {"script_name": "C.cs", "functions": ["Update"]}]}"#,
    )
    .expect("write legacy index");

    let store = IndexStore::new(&path);
    let healed = store.load().await.expect("load");
    assert_eq!(healed.total_scripts(), 3);

    let a = healed.get("A.cs").expect("A.cs");
    assert_eq!(a.description, AUTO_ADDED_DESCRIPTION);
    let b = healed.get("B.cs").expect("B.cs");
    assert_eq!(b.description, NO_DESCRIPTION);
    assert_eq!(b.functions[0].name, SENTINEL_FUNCTION_NAME);

    store.save(&healed).await.expect("save");
    let reloaded = store.load().await.expect("reload");
    assert_eq!(reloaded, healed);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(raw["totalScripts"], 3);
    assert!(raw.get("total_scripts").is_none());
}

#[tokio::test]
async fn merge_then_save_only_adds_new_names() {
    let tmp = TempDir::new().expect("tempdir");
    let store = IndexStore::new(tmp.path().join("index.json"));

    let mut doc = IndexDocument::from_entries([ScriptEntry::placeholder("Foo.cs")]);
    store.save(&doc).await.expect("save");

    let mut loaded = store.load().await.expect("load");
    let mut renamed = ScriptEntry::placeholder("Foo.cs");
    renamed.description = "should not win".to_string();
    let added = loaded.merge_by_name([renamed, ScriptEntry::placeholder("Bar.cs")]);
    assert_eq!(added, 1);
    assert_eq!(loaded.total_scripts(), 2);
    assert_eq!(
        loaded.get("Foo.cs").expect("Foo.cs").description,
        AUTO_ADDED_DESCRIPTION
    );

    doc.merge_by_name([ScriptEntry::placeholder("Bar.cs")]);
    assert_eq!(loaded, doc);
}
