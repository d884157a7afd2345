use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use iac_cli::report::{AnalysisReport, exit_code, render};
use iac_cli::settings::Settings;
use iac_client::{AnalysisBackend, ClientConfig, HttpBackend};
use iac_model::{ArtifactReference, KnownHashes, Metadata};
use iac_session::{Message, SessionRuntime};
use tracing::{info, warn};

use crate::cli::{AnalyzeArgs, OutputFormatArg};

/// Upload the file, run the requested stages and print the results.
///
/// Returns the process exit code.
pub async fn run_analyze(args: &AnalyzeArgs, config: &ClientConfig, styled: bool) -> Result<i32> {
    let artifact = ArtifactReference::from_path(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;
    let backend = Arc::new(HttpBackend::new(config.clone()).context("create HTTP client")?);
    let mut runtime = SessionRuntime::new(Arc::clone(&backend));

    runtime.dispatch(Message::KnownHashesChanged(KnownHashes::new(
        args.known_sha256.clone(),
        args.known_md5.clone(),
    )))?;
    runtime.dispatch(Message::select_file(artifact))?;
    runtime.dispatch(Message::upload())?;
    runtime.run_until_idle().await;

    if runtime.view().ready {
        if let Some(metadata) = runtime.session().store().metadata() {
            check_edits(metadata, &args.simulate)?;
        }
        dispatch_secondary_stages(&mut runtime, args)?;
        info!(in_flight = runtime.in_flight(), "waiting for secondary stages");
        runtime.run_until_idle().await;
    }

    if let Some(path) = &args.save_ela {
        let ela_filename = runtime
            .session()
            .store()
            .upload_result()
            .map(|result| result.ela_filename.clone())
            .filter(|name| !name.is_empty());
        match ela_filename {
            Some(name) => save_ela(backend.as_ref(), &name, path).await?,
            None => warn!("no error level analysis image to save"),
        }
    }

    let view = runtime.view();
    match args.format {
        OutputFormatArg::Table => print!("{}", render(&view, styled)),
        OutputFormatArg::Json => {
            let report = AnalysisReport::new(&view, &config.base_url);
            println!("{}", report.to_json().context("serialize report")?);
        }
    }
    Ok(exit_code(&view))
}

/// Start the requested secondary stages together; they run concurrently.
fn dispatch_secondary_stages(
    runtime: &mut SessionRuntime<HttpBackend>,
    args: &AnalyzeArgs,
) -> Result<()> {
    if args.wants_ai() {
        runtime.dispatch(Message::run_ai_analysis())?;
    }
    if args.wants_verification() {
        runtime.dispatch(Message::run_verification())?;
    }
    if args.wants_simulation() {
        runtime.dispatch(Message::toggle_simulation())?;
        for (field, value) in &args.simulate {
            runtime.dispatch(Message::edit_field(field.as_str(), value.as_str()))?;
        }
        runtime.dispatch(Message::run_simulation())?;
    }
    Ok(())
}

/// Refuse `--simulate` fields that are not in the extracted metadata.
fn check_edits(metadata: &Metadata, edits: &[(String, String)]) -> Result<()> {
    for (field, _) in edits {
        if !metadata.is_editable(field) {
            let available: Vec<&str> = metadata.fields().map(|(key, _)| key).collect();
            bail!(
                "cannot simulate `{field}`: not an editable metadata field (available: {})",
                available.join(", ")
            );
        }
    }
    Ok(())
}

async fn save_ela<B: AnalysisBackend>(backend: &B, ela_filename: &str, path: &Path) -> Result<()> {
    let bytes = backend
        .fetch_ela_asset(ela_filename)
        .await
        .context("download error level analysis image")?;
    std::fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "saved error level analysis image");
    Ok(())
}

/// Print the effective settings and where they are stored.
pub fn run_config_show(path: &Path, effective: &ClientConfig) -> Result<()> {
    let settings = Settings {
        backend: effective.clone(),
    };
    println!("# {}", path.display());
    if !path.exists() {
        println!("# (file not found, showing defaults and overrides)");
    }
    print!(
        "{}",
        toml::to_string_pretty(&settings).context("serialize settings")?
    );
    Ok(())
}

/// Write default settings to `path`.
pub fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Settings::default().save_to(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_edits() {
        let metadata = Metadata::from_value(json!({
            "Software": "Camera Firmware",
            "Flags": ["GPS missing"],
        }))
        .expect("object");
        let edit = |field: &str| vec![(field.to_string(), "GIMP".to_string())];

        assert!(check_edits(&metadata, &edit("Software")).is_ok());
        let err = check_edits(&metadata, &edit("Sofware")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot simulate `Sofware`: not an editable metadata field (available: Software)"
        );
        assert!(check_edits(&metadata, &edit("Flags")).is_err());
    }
}
