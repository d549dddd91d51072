use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use recdiff_diff::{DiffConfig, DiffRequest, JsonDiff, UnchangedIndex};
use recdiff_guard::GuardReport;
use recdiff_types::{Patch, PatchOperation};
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Command::Diff(args) => cmd_diff(args, cli.format)?,
        Command::Batch(args) => cmd_batch(args, cli.format)?,
        Command::Unchanged(args) => cmd_unchanged(args, cli.format)?,
        Command::Check(args) => cmd_check(args, cli.format)?,
    };
    print!("{output}");
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<String> {
    let engine = engine(args.config.as_deref())?;
    let source = read_json(&args.source)?;
    let target = read_json(&args.target)?;
    let patch = engine
        .diff(&source, &target)
        .with_context(|| {
            format!("diffing {} against {}", args.source.display(), args.target.display())
        })?;

    match format {
        OutputFormat::Json => to_json(&patch),
        OutputFormat::Text => Ok(render_patch(&patch)),
    }
}

fn cmd_batch(args: BatchArgs, format: OutputFormat) -> anyhow::Result<String> {
    let engine = engine(args.config.as_deref())?;
    let requests: Vec<DiffRequest> = serde_json::from_value(read_json(&args.file)?)
        .with_context(|| format!("{} is not an array of diff requests", args.file.display()))?;

    let mut out = String::new();
    let mut results = Vec::with_capacity(requests.len());
    let mut failed = 0;
    for (i, request) in requests.iter().enumerate() {
        match engine.diff_request(request) {
            Ok(patch) => {
                if format == OutputFormat::Text {
                    let _ = writeln!(out, "{} {}", format!("[{i}]").bold(), "ok".green());
                    out.push_str(&render_patch(&patch));
                }
                results.push(json!({ "patch": patch }));
            }
            Err(e) => {
                failed += 1;
                if format == OutputFormat::Text {
                    let _ = writeln!(out, "{} {} {e}", format!("[{i}]").bold(), "error:".red());
                }
                results.push(json!({ "error": e.to_string() }));
            }
        }
    }

    if format == OutputFormat::Json {
        out = to_json(&results)?;
    }
    if failed > 0 {
        print!("{out}");
        bail!("{failed} of {} requests failed", requests.len());
    }
    Ok(out)
}

fn cmd_unchanged(args: UnchangedArgs, format: OutputFormat) -> anyhow::Result<String> {
    let engine = engine(None)?;
    let source = read_json(&args.source)?;
    let target = read_json(&args.target)?;
    let index = engine.unchanged(&source, &target)?;

    match format {
        OutputFormat::Json => to_json(&index),
        OutputFormat::Text => Ok(render_unchanged(&index)),
    }
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<String> {
    let engine = engine(args.config.as_deref())?;
    let source = read_json(&args.source)?;
    let report = engine.check(&source)?;

    let out = match format {
        OutputFormat::Json => to_json(&json!({
            "passed": report.is_passed(),
            "fingerprint": report.fingerprint,
            "violation": report.violation.as_ref().map(ToString::to_string),
            "checks": report
                .check_results
                .iter()
                .map(|r| r.check_name.as_str())
                .collect::<Vec<_>>(),
        }))?,
        OutputFormat::Text => render_report(&report),
    };

    if !report.is_passed() {
        print!("{out}");
        bail!("{} failed the attribute guard", args.source.display());
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn engine(config: Option<&Path>) -> anyhow::Result<JsonDiff> {
    let config = match config {
        Some(path) => DiffConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DiffConfig::default(),
    };
    debug!(
        guards = config.guards.len(),
        max_depth = config.max_depth,
        "configuration loaded"
    );
    Ok(JsonDiff::new(config)?)
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

fn render_patch(patch: &Patch) -> String {
    if patch.is_empty() {
        return "No changes.\n".to_string();
    }
    let mut out = String::new();
    for op in patch {
        let line = match op {
            PatchOperation::Add { path, value } => {
                format!("{} {} {}", "add".green(), path, value)
            }
            PatchOperation::Remove {
                path,
                original_value,
                context,
            } => match context {
                Some(context) => format!(
                    "{} {} {} {}",
                    "remove".red(),
                    path,
                    original_value,
                    context.to_string().dimmed()
                ),
                None => format!("{} {} {}", "remove".red(), path, original_value),
            },
            PatchOperation::Replace {
                path,
                original_value,
                value,
            } => format!("{} {} {} -> {}", "replace".yellow(), path, original_value, value),
            PatchOperation::Move { from, path } => {
                format!("{} {} -> {}", "move".cyan(), from, path)
            }
            PatchOperation::Copy { from, path } => {
                format!("{} {} -> {}", "copy".cyan(), from, path)
            }
        };
        let _ = writeln!(out, "  {line}");
    }
    let _ = writeln!(out, "{} operation(s)", patch.len().to_string().bold());
    out
}

fn render_unchanged(index: &UnchangedIndex<'_>) -> String {
    if index.is_empty() {
        return "Nothing unchanged.\n".to_string();
    }
    let mut out = String::new();
    for (pointer, value) in index.iter() {
        let shown = if pointer.is_root() { "(root)".to_string() } else { pointer.to_string() };
        let _ = writeln!(out, "  {} = {}", shown.bold(), value);
    }
    out
}

fn render_report(report: &GuardReport) -> String {
    let mut out = String::new();
    for result in &report.check_results {
        let mark = if result.passed { "✓".green() } else { "✗".red() };
        let _ = writeln!(out, "  {mark} {}", result.check_name);
    }
    match &report.violation {
        None => {
            let _ = writeln!(out, "{} Guard passed", "✓".green().bold());
        }
        Some(violation) => {
            let _ = writeln!(out, "{} {violation}", "✗ Guard failed:".red().bold());
        }
    }
    let _ = writeln!(out, "  Fingerprint: {}", report.fingerprint.cyan());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn plain() {
        colored::control::set_override(false);
    }

    const GUARD_CONFIG: &str = r#"
[guards]
Entitlements = ["Application Key", "Entitlement Type", "Entitlement Name"]
"#;

    #[test]
    fn diff_prints_text_patch() {
        plain();
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.json", r#"{"a": 1, "b": 2}"#);
        let target = write(&dir, "b.json", r#"{"a": 1, "b": 3}"#);
        let out = cmd_diff(
            DiffArgs {
                source,
                target,
                config: None,
            },
            OutputFormat::Text,
        )
        .unwrap();
        assert!(out.contains("replace /b 2 -> 3"));
        assert!(out.contains("1 operation(s)"));
    }

    #[test]
    fn diff_prints_json_patch() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.json", r#"[1, 2, 3]"#);
        let target = write(&dir, "b.json", r#"[1, 2]"#);
        let out = cmd_diff(
            DiffArgs {
                source,
                target,
                config: None,
            },
            OutputFormat::Json,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["op"], "remove");
        assert_eq!(value[0]["path"], "/?");
        assert_eq!(value[0]["original_value"], 3);
    }

    #[test]
    fn identical_documents_report_no_changes() {
        plain();
        let dir = TempDir::new().unwrap();
        let doc = write(&dir, "a.json", r#"{"x": [1, 2]}"#);
        let out = cmd_diff(
            DiffArgs {
                source: doc.clone(),
                target: doc,
                config: None,
            },
            OutputFormat::Text,
        )
        .unwrap();
        assert_eq!(out, "No changes.\n");
    }

    #[test]
    fn diff_with_guard_config_rejects_incomplete_source() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "recdiff.toml", GUARD_CONFIG);
        let source = write(&dir, "a.json", r#"{"Entitlements": [{"Application Key": "1"}]}"#);
        let target = write(&dir, "b.json", r#"{"Entitlements": []}"#);
        let err = cmd_diff(
            DiffArgs {
                source,
                target,
                config: Some(config),
            },
            OutputFormat::Text,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("guard violation"));
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let present = write(&dir, "a.json", "{}");
        let err = cmd_diff(
            DiffArgs {
                source: present,
                target: dir.path().join("absent.json"),
                config: None,
            },
            OutputFormat::Text,
        )
        .unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let bad = write(&dir, "a.json", "{not json");
        let err = read_json(&bad).unwrap_err();
        assert!(err.to_string().contains("parsing"));
    }

    #[test]
    fn batch_reports_each_request() {
        let dir = TempDir::new().unwrap();
        let file = write(
            &dir,
            "batch.json",
            r#"[
                {"source": {"a": 1}, "target": {"a": 2}},
                {"first": [1], "second": [1]}
            ]"#,
        );
        let out = cmd_batch(
            BatchArgs { file, config: None },
            OutputFormat::Json,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["patch"][0]["op"], "replace");
        assert_eq!(value[1]["patch"], json!([]));
    }

    #[test]
    fn batch_fails_when_any_request_fails() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "batch.json", r#"[{"source": {"a": 1}}]"#);
        let err = cmd_batch(BatchArgs { file, config: None }, OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("1 of 1 requests failed"));
    }

    #[test]
    fn unchanged_lists_pointers() {
        plain();
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "a.json", r#"{"a": 1, "b": 2}"#);
        let target = write(&dir, "b.json", r#"{"a": 1, "b": 3}"#);
        let out = cmd_unchanged(
            UnchangedArgs {
                source: source.clone(),
                target: target.clone(),
            },
            OutputFormat::Text,
        )
        .unwrap();
        assert_eq!(out, "  /a = 1\n");

        let out = cmd_unchanged(UnchangedArgs { source, target }, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"/a": 1}));
    }

    #[test]
    fn check_passes_complete_document() {
        plain();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "recdiff.toml", GUARD_CONFIG);
        let source = write(
            &dir,
            "a.json",
            r#"{"Entitlements": [{
                "Application Key": "121",
                "Entitlement Type": "UD_GROUPS_GROUPS",
                "Entitlement Name": "144~Network Security Role"
            }]}"#,
        );
        let out = cmd_check(
            CheckArgs {
                source,
                config: Some(config),
            },
            OutputFormat::Text,
        )
        .unwrap();
        assert!(out.contains("Guard passed"));
        assert!(out.contains("attribute-presence:/Entitlements"));
    }

    #[test]
    fn check_fails_incomplete_document() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "recdiff.toml", GUARD_CONFIG);
        let source = write(&dir, "a.json", r#"{"Entitlements": {}}"#);
        let err = cmd_check(
            CheckArgs {
                source,
                config: Some(config),
            },
            OutputFormat::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed the attribute guard"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "recdiff.toml", "max_depth = 0");
        let Err(err) = engine(Some(&config)) else {
            panic!("zero max_depth should be rejected");
        };
        assert!(format!("{err:#}").contains("max_depth"));
    }
}
