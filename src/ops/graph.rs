//! Graph generation.
//!
//! Loads a set of manifests, writes their dependency graph as a PlantUML
//! description (`<output>.puml`) and hands it to a renderer that produces
//! `<output>.<format>`.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::core::manifest::Manifest;
use crate::core::validation::validate;
use crate::graph::{emit, EmitSummary, GraphError};
use crate::render::{with_extension_appended, Renderer};
use crate::util::diagnostic::{Diagnostic, Reporter};
use crate::util::fs::{first_existing, RemoveOnDrop};

/// Extension of the description file.
pub const DESCRIPTION_EXTENSION: &str = "puml";

/// Options for graph generation.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Output base; extensions are appended
    pub output: PathBuf,

    /// Manifest files, in drawing order
    pub paths: Vec<PathBuf>,

    /// Keep the description once rendered
    pub keep_description: bool,

    /// Replace existing output files
    pub overwrite: bool,

    /// Draw manifests that fail validation
    pub skip_validation: bool,

    /// Run the renderer after writing the description
    pub render: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            output: PathBuf::from(crate::util::config::DEFAULT_OUTPUT),
            paths: Vec::new(),
            keep_description: false,
            overwrite: false,
            skip_validation: false,
            render: true,
        }
    }
}

/// Result of a successful graph generation.
#[derive(Debug, Clone)]
pub struct GraphReport {
    /// Number of manifests drawn
    pub manifests: usize,

    /// Description file
    pub description: PathBuf,

    /// Whether the description file was left on disk
    pub description_kept: bool,

    /// Rendered image, when rendering was requested
    pub image: Option<PathBuf>,

    pub summary: EmitSummary,
}

/// Generate the graph of `opts.paths`.
///
/// Progress and warnings go to `reporter`. A fatal failure is returned, not
/// reported; callers turn it into a diagnostic with
/// [`GraphError::to_diagnostic`].
pub fn graph(
    opts: &GraphOptions,
    renderer: &dyn Renderer,
    reporter: &mut dyn Reporter,
) -> Result<GraphReport, GraphError> {
    let manifests = load_manifests(&opts.paths)?;
    reporter.report(Diagnostic::note(format!("{} manifest(s) loaded", manifests.len())));

    if opts.skip_validation {
        tracing::debug!("Skipping manifest validation");
    } else {
        validate_all(&manifests, reporter)?;
    }

    let description = description_path(&opts.output);
    let image = opts.render.then(|| renderer.output_path(&opts.output));

    if !opts.overwrite {
        let outputs = std::iter::once(description.as_path()).chain(image.as_deref());
        if let Some(existing) = first_existing(outputs) {
            return Err(GraphError::OutputCollision {
                path: existing.to_path_buf(),
            });
        }
    }

    let file = File::create(&description).map_err(|source| GraphError::Io {
        path: description.clone(),
        source,
    })?;
    let mut cleanup = RemoveOnDrop::new(&description);

    let summary = {
        let mut out = BufWriter::new(file);
        emit(&mut out, &manifests, &diagram_name(&opts.output), reporter)
            .map_err(|e| GraphError::from_emit(e, description.clone()))?
    };

    // a partial description is always removed, a complete one may be kept
    let description_kept = opts.keep_description || !opts.render;
    if description_kept {
        cleanup.disarm();
    }
    reporter.report(Diagnostic::note(format!(
        "Wrote {} ({} edge(s), {} skipped)",
        description.display(),
        summary.edges,
        summary.skipped
    )));

    if opts.render {
        tracing::debug!("Rendering with `{}`", renderer.name());
        renderer.render(&description)?;
    }

    Ok(GraphReport {
        manifests: manifests.len(),
        description,
        description_kept,
        image,
        summary,
    })
}

/// Load every manifest, stopping at the first failure.
pub fn load_manifests(paths: &[PathBuf]) -> Result<Vec<Manifest>, GraphError> {
    let mut manifests = Vec::with_capacity(paths.len());
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for path in paths {
        let manifest = Manifest::load(path)?;
        if manifest.id.is_empty() {
            return Err(GraphError::MissingId { path: path.clone() });
        }
        if let Some(first) = seen.get(&manifest.id) {
            return Err(GraphError::DuplicateManifest {
                id: manifest.id,
                first: first.clone(),
                second: path.clone(),
            });
        }
        seen.insert(manifest.id.clone(), path.clone());
        manifests.push(manifest);
    }

    Ok(manifests)
}

fn validate_all(manifests: &[Manifest], reporter: &mut dyn Reporter) -> Result<(), GraphError> {
    let failures: Vec<_> = manifests.iter().filter_map(|m| validate(m).err()).collect();
    if failures.is_empty() {
        return Ok(());
    }

    for failure in &failures {
        for diag in failure.to_diagnostics() {
            reporter.report(diag);
        }
    }
    Err(GraphError::Validation { failures })
}

/// `<output>.puml`
pub fn description_path(output: &Path) -> PathBuf {
    with_extension_appended(output, DESCRIPTION_EXTENSION)
}

/// Name given to `@startuml`: the file name of the output base.
fn diagram_name(output: &Path) -> String {
    output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::util::config::DEFAULT_OUTPUT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ManifestFixture;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    /// Records calls; writes the image or fails like a broken renderer.
    struct StubRenderer {
        fail: bool,
        calls: Cell<usize>,
    }

    impl StubRenderer {
        fn ok() -> Self {
            StubRenderer {
                fail: false,
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            StubRenderer {
                fail: true,
                calls: Cell::new(0),
            }
        }
    }

    impl Renderer for StubRenderer {
        fn name(&self) -> &str {
            "stub"
        }

        fn output_path(&self, base: &Path) -> PathBuf {
            with_extension_appended(base, "svg")
        }

        fn render(&self, description: &Path) -> Result<(), GraphError> {
            self.calls.set(self.calls.get() + 1);
            assert!(description.exists(), "description must exist before rendering");
            if self.fail {
                return Err(GraphError::RenderExecution {
                    command: format!("stub {}", description.display()),
                    code: Some(1),
                    stderr: String::new(),
                });
            }
            let image = description.with_extension("svg");
            fs::write(image, "<svg/>").map_err(|source| GraphError::Io {
                path: description.to_path_buf(),
                source,
            })
        }
    }

    struct Fixture {
        tmp: TempDir,
        paths: Vec<PathBuf>,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let shop = ManifestFixture::new("shop")
                .target("main")
                .requires_api("main", "payments")
                .requires_binding("main", "db", "local")
                .provides_binding("sqlite", "db")
                .write_to(tmp.path());
            let payments = ManifestFixture::new("payments")
                .target("api")
                .provides_api("api", "payments")
                .write_to(tmp.path());
            Fixture {
                tmp,
                paths: vec![shop, payments],
            }
        }

        fn options(&self) -> GraphOptions {
            GraphOptions {
                output: self.tmp.path().join("graph"),
                paths: self.paths.clone(),
                ..Default::default()
            }
        }

        fn puml(&self) -> PathBuf {
            self.tmp.path().join("graph.puml")
        }

        fn svg(&self) -> PathBuf {
            self.tmp.path().join("graph.svg")
        }
    }

    #[test]
    fn test_render_removes_description() {
        let fx = Fixture::new();
        let renderer = StubRenderer::ok();
        let mut diags = Vec::new();

        let report = graph(&fx.options(), &renderer, &mut diags).unwrap();

        assert_eq!(renderer.calls.get(), 1);
        assert_eq!(report.manifests, 2);
        assert_eq!(report.summary.edges, 2);
        assert!(!report.description_kept);
        assert_eq!(report.image.as_deref(), Some(fx.svg().as_path()));
        assert!(!fx.puml().exists());
        assert!(fx.svg().exists());
        assert!(diags.iter().all(|d| !d.is_error()));
    }

    #[test]
    fn test_keep_description() {
        let fx = Fixture::new();
        let opts = GraphOptions {
            keep_description: true,
            ..fx.options()
        };

        let report = graph(&opts, &StubRenderer::ok(), &mut Vec::new()).unwrap();

        assert!(report.description_kept);
        let text = fs::read_to_string(fx.puml()).unwrap();
        assert!(text.starts_with("@startuml graph\n"));
        assert!(text.contains("shop_manifest.main ..> sqlite_binding : uses"));
        assert!(text.contains("shop_manifest.main --> payments_api : requires"));
    }

    #[test]
    fn test_no_render_keeps_description() {
        let fx = Fixture::new();
        let renderer = StubRenderer::ok();
        let opts = GraphOptions {
            render: false,
            ..fx.options()
        };

        let report = graph(&opts, &renderer, &mut Vec::new()).unwrap();

        assert_eq!(renderer.calls.get(), 0);
        assert!(report.image.is_none());
        assert!(fx.puml().exists());
        assert!(!fx.svg().exists());
    }

    #[test]
    fn test_existing_description_fails_before_writing() {
        let fx = Fixture::new();
        fs::write(fx.puml(), "old").unwrap();
        let renderer = StubRenderer::ok();
        let mut diags = Vec::new();

        let err = graph(&fx.options(), &renderer, &mut diags).unwrap_err();

        assert!(matches!(err, GraphError::OutputCollision { ref path } if *path == fx.puml()));
        assert_eq!(fs::read_to_string(fx.puml()).unwrap(), "old");
        assert_eq!(renderer.calls.get(), 0);
        assert!(diags.iter().all(|d| !d.is_error()));
    }

    #[test]
    fn test_existing_image_fails_before_writing() {
        let fx = Fixture::new();
        fs::write(fx.svg(), "old").unwrap();

        let err = graph(&fx.options(), &StubRenderer::ok(), &mut Vec::new()).unwrap_err();

        assert!(matches!(err, GraphError::OutputCollision { ref path } if *path == fx.svg()));
        assert!(!fx.puml().exists());
    }

    #[test]
    fn test_overwrite_is_reproducible() {
        let fx = Fixture::new();
        let opts = GraphOptions {
            overwrite: true,
            render: false,
            ..fx.options()
        };

        graph(&opts, &StubRenderer::ok(), &mut Vec::new()).unwrap();
        let first = fs::read(fx.puml()).unwrap();
        graph(&opts, &StubRenderer::ok(), &mut Vec::new()).unwrap();
        let second = fs::read(fx.puml()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_render_failure_still_cleans_up() {
        let fx = Fixture::new();
        let renderer = StubRenderer::failing();

        let err = graph(&fx.options(), &renderer, &mut Vec::new()).unwrap_err();

        assert!(matches!(err, GraphError::RenderExecution { .. }));
        assert_eq!(renderer.calls.get(), 1);
        assert!(!fx.puml().exists());
    }

    #[test]
    fn test_failed_write_removes_kept_description() {
        let tmp = TempDir::new().unwrap();
        let a = ManifestFixture::new("a")
            .target("t")
            .provides_binding("sqlite", "db")
            .write_to(tmp.path());
        let b = ManifestFixture::new("b")
            .target("t")
            .provides_binding("sqlite", "other-value")
            .write_to(tmp.path());
        let opts = GraphOptions {
            output: tmp.path().join("graph"),
            paths: vec![a, b],
            keep_description: true,
            render: false,
            ..Default::default()
        };

        let err = graph(&opts, &StubRenderer::ok(), &mut Vec::new()).unwrap_err();

        assert!(matches!(err, GraphError::IdentifierCollision { .. }));
        assert!(!tmp.path().join("graph.puml").exists());
    }

    #[test]
    fn test_load_failure_writes_nothing() {
        let fx = Fixture::new();
        let mut opts = fx.options();
        opts.paths.insert(1, fx.tmp.path().join("missing/manifest.yml"));
        let mut diags = Vec::new();

        let err = graph(&opts, &StubRenderer::ok(), &mut diags).unwrap_err();

        assert!(matches!(err, GraphError::Load(_)));
        assert!(!fx.puml().exists());
        assert!(diags.is_empty());
        assert!(err.to_diagnostic().message.contains("missing"));
    }

    #[test]
    fn test_validation_failure_and_skip() {
        let fx = Fixture::new();
        let invalid = ManifestFixture::new("bare").write_to(fx.tmp.path());
        let mut opts = fx.options();
        opts.paths.push(invalid);
        opts.render = false;

        let mut diags = Vec::new();
        let err = graph(&opts, &StubRenderer::ok(), &mut diags).unwrap_err();
        match err {
            GraphError::Validation { ref failures } => assert_eq!(failures.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!fx.puml().exists());
        assert!(diags.iter().any(|d| d.message.contains("no `targets`")));

        opts.skip_validation = true;
        let report = graph(&opts, &StubRenderer::ok(), &mut Vec::new()).unwrap();
        assert_eq!(report.manifests, 3);
        assert!(fx.puml().exists());
    }

    #[test]
    fn test_manifest_without_id_is_never_drawn() {
        let fx = Fixture::new();
        let anonymous = fx.tmp.path().join("anonymous.yml");
        fs::write(&anonymous, "rp-manifest: 1\ntargets:\n  - target: main\n").unwrap();
        let mut opts = fx.options();
        opts.paths.push(anonymous.clone());
        opts.skip_validation = true;
        opts.render = false;

        let err = graph(&opts, &StubRenderer::ok(), &mut Vec::new()).unwrap_err();

        assert!(matches!(err, GraphError::MissingId { ref path } if *path == anonymous));
        assert!(!fx.puml().exists());
    }

    #[test]
    fn test_duplicate_manifest_id() {
        let fx = Fixture::new();
        let mut opts = fx.options();
        opts.paths.push(fx.paths[0].clone());

        let err = graph(&opts, &StubRenderer::ok(), &mut Vec::new()).unwrap_err();

        match err {
            GraphError::DuplicateManifest { id, first, second } => {
                assert_eq!(id, "shop");
                assert_eq!(first, fx.paths[0]);
                assert_eq!(second, fx.paths[0]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unresolved_binding_is_only_a_warning() {
        let tmp = TempDir::new().unwrap();
        let path = ManifestFixture::new("lonely")
            .target("main")
            .requires_binding("main", "db", "local")
            .write_to(tmp.path());
        let opts = GraphOptions {
            output: tmp.path().join("graph"),
            paths: vec![path],
            render: false,
            ..Default::default()
        };
        let mut diags = Vec::new();

        let report = graph(&opts, &StubRenderer::ok(), &mut diags).unwrap();

        assert_eq!(report.summary.skipped, 1);
        assert_eq!(diags.iter().filter(|d| d.is_warning()).count(), 1);
    }

    #[test]
    fn test_paths() {
        assert_eq!(description_path(Path::new("out/deps")), PathBuf::from("out/deps.puml"));
        assert_eq!(diagram_name(Path::new("out/deps")), "deps");
        assert_eq!(diagram_name(Path::new("/")), "graph");
    }
}
