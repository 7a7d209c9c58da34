use std::fs;
use std::path::Path;

use anyhow::Result;
use baf_data::{Item, TemplateKind};
use baf_subst::{Config, DefinitionError, DirSource, TemplateRegistry, collapse_snippet, expand_snippet, load_snippet};
use tempfile::tempdir;

fn write(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)?;
    Ok(())
}

#[test]
fn directory_library_collapses_and_expands_a_snippet() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path().join("templates");
    write(&root.join("if/CanUseWand.json"), r#"["HasItem(\"<WAND>\",Myself)", {"WandReady": {}}]"#)?;
    write(&root.join("if/WandReady.json"), r#"["!GlobalTimerNotExpired(\"<WAND>\",\"LOCALS\")"]"#)?;
    write(
        &root.join("then/UseWand.json"),
        r#"["SetGlobalTimer(\"<WAND>\",\"LOCALS\",<DELAY>)", "UseItem(\"<WAND>\",<TARGET>)"]"#,
    )?;
    let snippet_path = dir.path().join("2680-Wand-of-Monster-Summoning.json");
    write(
        &snippet_path,
        r#"{
            "name": "Wand of Monster Summoning",
            "if": [
                "HasItem(\"WAND11\",Myself)",
                "!GlobalTimerNotExpired(\"WAND11\",\"LOCALS\")",
                ["See(NearestEnemyOf(Myself))", "Heard([ANYONE],101)"]
            ],
            "then": [{"100": [
                "SetGlobalTimer(\"WAND11\",\"LOCALS\",12)",
                "UseItem(\"WAND11\",Myself)"
            ]}]
        }"#,
    )?;

    let registry = TemplateRegistry::load_all(&DirSource::new(&root))?;
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.template("WandReady")?.kind(), TemplateKind::Trigger);
    assert_eq!(registry.template("UseWand")?.kind(), TemplateKind::Action);

    let snippet = load_snippet(&snippet_path)?;
    let collapsed = collapse_snippet(&registry, &snippet);
    // CanUseWand (2 lines) claims both timer lines before WandReady (1 line) is tried
    assert_eq!(
        serde_json::to_value(&collapsed.triggers)?,
        serde_json::json!([
            {"CanUseWand": {"WAND": "WAND11"}},
            ["See(NearestEnemyOf(Myself))", "Heard([ANYONE],101)"]
        ])
    );
    assert!(matches!(&collapsed.responses[0].actions[..], [Item::Ref(r)] if r.name == "UseWand"));

    let statements = expand_snippet(&registry, &collapsed)?;
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].triggers, snippet.triggers);
    assert_eq!(statements[0].responses, snippet.responses);
    Ok(())
}

#[test]
fn cyclic_library_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    write(&dir.path().join("if/A.json"), r#"[{"B": {}}]"#)?;
    write(&dir.path().join("then/B.json"), r#"["B()", {"A": null}]"#)?;

    let err = TemplateRegistry::load_all(&DirSource::new(dir.path())).unwrap_err();
    assert!(matches!(err, DefinitionError::Cycle { ref chain } if chain.len() == 3));
    assert!(err.to_string().contains("A -> B -> A"));
    Ok(())
}

#[test]
fn config_file_points_at_library() -> Result<()> {
    let dir = tempdir()?;
    write(&dir.path().join("lib/conditions/Seen.json"), r#"["See(<WHO>)"]"#)?;
    let config_path = dir.path().join("baf_subst.toml");
    write(&config_path, "template_dir = \"lib\"\ntrigger_dir = \"conditions\"\n")?;

    let config = Config::discover(Some(&config_path))?;
    let registry = TemplateRegistry::load_all(&config.source())?;
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Seen"]);
    Ok(())
}
