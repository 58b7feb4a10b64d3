//! Behaviour-driven tests for the DXT build pipeline.
//!
//! These scenarios run the full pipeline against a temporary checkout with a
//! scripted `node`/`npm` and inspect the produced archive.

mod support;

use dxt_bundler::config::BuildConfig;
use dxt_bundler::error::BuildError;
use dxt_bundler::pipeline::{BuildReport, Pipeline, PipelineOptions};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use support::{Checkout, FakeToolchain, KEPT_FILES, archive_entries, cwd_lock};

// ---------------------------------------------------------------------------
// Build world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct BuildWorld {
    checkout: RefCell<Option<Checkout>>,
    toolchain: Cell<FakeToolchain>,
    result: RefCell<Option<Result<BuildReport, BuildError>>>,
    cwd_before: RefCell<Option<PathBuf>>,
    cwd_after: RefCell<Option<PathBuf>>,
}

#[fixture]
fn build_world() -> BuildWorld {
    BuildWorld::default()
}

impl BuildWorld {
    fn build(&self) {
        let checkout = self.checkout.borrow();
        let checkout = checkout.as_ref().expect("checkout not set");
        let toolchain = self.toolchain.get();
        let config = BuildConfig::default();

        let _lock = cwd_lock();
        self.cwd_before
            .replace(Some(std::env::current_dir().expect("cwd")));
        let pipeline = Pipeline::new(
            &checkout.root,
            &config,
            &toolchain,
            PipelineOptions::default(),
        );
        let result = pipeline.run(&mut Vec::new());
        self.cwd_after
            .replace(Some(std::env::current_dir().expect("cwd")));
        self.result.replace(Some(result));
    }

    fn with_checkout<T>(&self, f: impl FnOnce(&Checkout) -> T) -> T {
        let checkout = self.checkout.borrow();
        f(checkout.as_ref().expect("checkout not set"))
    }
}

#[given("a complete extension checkout")]
fn given_complete_checkout(build_world: &BuildWorld) {
    build_world.checkout.replace(Some(Checkout::complete()));
}

#[given("the manifest has no author field")]
fn given_manifest_without_author(build_world: &BuildWorld) {
    build_world.with_checkout(|checkout| {
        let manifest = support::MANIFEST.replace(r#""author": { "name": "LibraLM" },"#, "");
        assert!(!manifest.contains("\"author\""));
        std::fs::write(checkout.root.join("manifest.json"), manifest).expect("write manifest");
    });
}

#[given("a package manager that fails")]
fn given_failing_package_manager(build_world: &BuildWorld) {
    let mut toolchain = build_world.toolchain.get();
    toolchain.install_fails = true;
    build_world.toolchain.set(toolchain);
}

#[given("no runtime installed")]
fn given_no_runtime(build_world: &BuildWorld) {
    let mut toolchain = build_world.toolchain.get();
    toolchain.runtime_installed = false;
    build_world.toolchain.set(toolchain);
}

#[when("the package is built")]
fn when_package_built(build_world: &BuildWorld) {
    build_world.build();
}

#[when("the package is built twice")]
fn when_package_built_twice(build_world: &BuildWorld) {
    build_world.build();
    let first = build_world.result.borrow();
    assert!(
        matches!(first.as_ref(), Some(Ok(_))),
        "first build failed: {:?}",
        first.as_ref().and_then(|r| r.as_ref().err())
    );
    drop(first);
    build_world.build();
}

#[then("the build succeeds")]
fn then_build_succeeds(build_world: &BuildWorld) {
    let result = build_world.result.borrow();
    let result = result.as_ref().expect("result not set");
    assert!(result.is_ok(), "expected success, got {result:?}");
}

#[then("the archive contains the sources and dependencies")]
fn then_archive_contains_sources(build_world: &BuildWorld) {
    build_world.with_checkout(|checkout| {
        let entries = archive_entries(&checkout.archive());
        for source in BuildConfig::default().source_files {
            assert!(entries.contains(&source), "{source} missing from {entries:?}");
        }
        for kept in KEPT_FILES {
            let name = format!("node_modules/{kept}");
            assert!(entries.contains(&name), "{name} missing from {entries:?}");
        }
        assert_eq!(entries.len(), 6 + KEPT_FILES.len(), "unexpected entries {entries:?}");
        assert!(entries.iter().all(|e| !e.starts_with('/') && !e.starts_with("bundle")));
    });
}

#[then("pruned dependency files are absent from the archive")]
fn then_pruned_files_absent(build_world: &BuildWorld) {
    build_world.with_checkout(|checkout| {
        let entries = archive_entries(&checkout.archive());
        for pruned in [
            "node_modules/zod/NOTES.md",
            "node_modules/zod/test/schema.test.js",
            "node_modules/zod/examples/basic.js",
            "node_modules/zod/.github/workflows/ci.yml",
            "node_modules/zod/CHANGELOG.txt",
            "node_modules/@modelcontextprotocol/sdk/README.md",
        ] {
            assert!(!entries.iter().any(|e| e == pruned), "{pruned} was archived");
        }
    });
}

#[then("no staging directory remains")]
fn then_no_staging(build_world: &BuildWorld) {
    build_world.with_checkout(|checkout| assert!(!checkout.staging().exists()));
}

#[then("exactly one archive exists")]
fn then_one_archive(build_world: &BuildWorld) {
    build_world.with_checkout(|checkout| {
        let archives = std::fs::read_dir(&checkout.root)
            .expect("read checkout")
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "dxt"))
            .count();
        assert_eq!(archives, 1);
        assert!(!archive_entries(&checkout.archive()).is_empty());
    });
}

#[then("the build fails naming the author field")]
fn then_fails_naming_author(build_world: &BuildWorld) {
    let result = build_world.result.borrow();
    let result = result.as_ref().expect("result not set");
    assert!(
        matches!(result, Err(BuildError::ManifestMissingField { field: "author" })),
        "expected missing author, got {result:?}"
    );
}

#[then("the build fails with a dependency install error")]
fn then_fails_with_install_error(build_world: &BuildWorld) {
    let result = build_world.result.borrow();
    let result = result.as_ref().expect("result not set");
    assert!(
        matches!(result, Err(BuildError::DependencyInstall { message, .. }) if message.contains("ETARGET")),
        "expected install failure, got {result:?}"
    );
}

#[then("the build fails with a runtime missing error")]
fn then_fails_with_runtime_missing(build_world: &BuildWorld) {
    let result = build_world.result.borrow();
    let result = result.as_ref().expect("result not set");
    assert!(
        matches!(result, Err(BuildError::RuntimeMissing { .. })),
        "expected missing runtime, got {result:?}"
    );
}

#[then("no archive is written")]
fn then_no_archive(build_world: &BuildWorld) {
    build_world.with_checkout(|checkout| assert!(!checkout.archive().exists()));
}

#[then("the working directory is restored")]
fn then_cwd_restored(build_world: &BuildWorld) {
    assert_eq!(
        *build_world.cwd_before.borrow(),
        *build_world.cwd_after.borrow()
    );
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/bundler.feature", index = 0)]
fn scenario_build_complete_extension(build_world: BuildWorld) {
    let _ = build_world;
}

#[scenario(path = "tests/features/bundler.feature", index = 1)]
fn scenario_reject_manifest_without_author(build_world: BuildWorld) {
    let _ = build_world;
}

#[scenario(path = "tests/features/bundler.feature", index = 2)]
fn scenario_rebuild_replaces_package(build_world: BuildWorld) {
    let _ = build_world;
}

#[scenario(path = "tests/features/bundler.feature", index = 3)]
fn scenario_abort_on_install_failure(build_world: BuildWorld) {
    let _ = build_world;
}

#[scenario(path = "tests/features/bundler.feature", index = 4)]
fn scenario_abort_on_missing_runtime(build_world: BuildWorld) {
    let _ = build_world;
}
