// tests/integration_test.rs
//
// End-to-end apply runs against a real scratch repository. The fixture
// plays both roles: its own tags act as the upstream release history, and
// the configured upstream remote points back at the repository itself, so
// no network is involved.

use git2::{build::CheckoutBuilder, BranchType, Oid, Repository};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use upsync::config::{Config, PatternsConfig};
use upsync::git::Git2Repository;
use upsync::orchestrator::{UpdateOrchestrator, UpdateResult};

fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.update_all(["*"].iter(), None).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = repo.signature().unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

fn tag(repo: &Repository, name: &str, oid: Oid) {
    repo.tag_lightweight(name, &repo.find_object(oid, None).unwrap(), false)
        .unwrap();
}

/// Pin `main` to the given commit and check it out, regardless of the
/// repository's initial default branch name.
fn pin_main_at(repo: &Repository, oid: Oid, detach_from: Oid) {
    repo.set_head_detached(detach_from).unwrap();
    repo.branch("main", &repo.find_commit(oid).unwrap(), true)
        .unwrap();
    repo.set_head("refs/heads/main").unwrap();
    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_head(Some(&mut checkout)).unwrap();
}

fn local_branches(root: &Path) -> Vec<String> {
    let repo = Repository::open(root).unwrap();
    repo.branches(Some(BranchType::Local))
        .unwrap()
        .map(|b| b.unwrap().0.name().unwrap().unwrap().to_string())
        .collect()
}

/// Fork at v1.2.0 whose tag history already holds a v1.3.0 release that
/// changes one essential file and one preserved file.
fn setup_fork() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }

    write_file(
        dir.path(),
        "package.json",
        "{\"name\": \"dashboard\", \"version\": \"1.2.0\"}\n",
    );
    write_file(dir.path(), "apps/x/src/a.tsx", "export const A = 'old';\n");
    write_file(dir.path(), "docs/readme.md", "local docs\n");
    let release_120 = commit_all(&repo, "Initial release");
    tag(&repo, "v1.2.0", release_120);

    write_file(dir.path(), "apps/x/src/a.tsx", "export const A = 'new';\n");
    write_file(dir.path(), "docs/readme.md", "upstream docs\n");
    let release_130 = commit_all(&repo, "fix: patch xss hole");
    tag(&repo, "v1.3.0", release_130);

    pin_main_at(&repo, release_120, release_130);
    dir
}

fn fork_config(root: &Path) -> Config {
    let mut config = Config {
        patterns: PatternsConfig {
            essential: vec![
                "apps/*/src/**/*.tsx".to_string(),
                "package.json".to_string(),
            ],
            preserved: vec!["docs/**/*".to_string()],
        },
        ..Config::default()
    };
    // The fixture is its own upstream: tag listing and fetch go through a
    // local path remote.
    config.upstream.repo_url = root.to_str().unwrap().to_string();
    config
}

#[test]
fn test_apply_end_to_end() {
    let dir = setup_fork();
    let config = fork_config(dir.path());

    let repo = Git2Repository::open(dir.path()).unwrap();
    let orchestrator = UpdateOrchestrator::new(&repo, &config, dir.path());

    let result = orchestrator.apply().unwrap();
    assert!(result.is_success());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["previousVersion"], "1.2.0");
    assert_eq!(json["newVersion"], "1.3.0");

    // Essential file pulled forward, preserved file untouched
    let a_tsx = fs::read_to_string(dir.path().join("apps/x/src/a.tsx")).unwrap();
    assert_eq!(a_tsx, "export const A = 'new';\n");
    let docs = fs::read_to_string(dir.path().join("docs/readme.md")).unwrap();
    assert_eq!(docs, "local docs\n");

    // Manifest bumped and refresh script generated
    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"version\": \"1.3.0\""));
    assert!(dir
        .path()
        .join("scripts/update-container-version.sh")
        .exists());

    // The run ends on the committed update branch
    let git_repo = Repository::open(dir.path()).unwrap();
    let head = git_repo.head().unwrap();
    assert!(head.shorthand().unwrap().starts_with("upsync-update-"));
    let head_commit = head.peel_to_commit().unwrap();
    assert!(head_commit
        .message()
        .unwrap()
        .starts_with("feat: update to v1.3.0"));

    // Base branch still points at the pre-update release
    let main = git_repo.find_branch("main", BranchType::Local).unwrap();
    let main_commit = main.into_reference().peel_to_commit().unwrap();
    assert_eq!(main_commit.message().unwrap(), "Initial release");
}

#[test]
fn test_check_reports_without_mutating() {
    let dir = setup_fork();
    let config = fork_config(dir.path());

    let repo = Git2Repository::open(dir.path()).unwrap();
    let orchestrator = UpdateOrchestrator::new(&repo, &config, dir.path());

    let report = orchestrator.check().unwrap();
    assert!(report.update_available);
    assert_eq!(report.current_version, "1.2.0");
    assert_eq!(report.latest_version.as_deref(), Some("1.3.0"));
    // "fix" counts as a security keyword with the default table
    assert_eq!(report.changes.unwrap().security_count(), 1);

    // No branch was created and the working tree is untouched
    assert!(local_branches(dir.path())
        .iter()
        .all(|b| !b.starts_with("upsync-update-")));
    let a_tsx = fs::read_to_string(dir.path().join("apps/x/src/a.tsx")).unwrap();
    assert_eq!(a_tsx, "export const A = 'old';\n");
}

#[test]
fn test_apply_when_already_up_to_date() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    write_file(
        dir.path(),
        "package.json",
        "{\"name\": \"dashboard\", \"version\": \"1.0.0\"}\n",
    );
    let release = commit_all(&repo, "Initial release");
    tag(&repo, "v1.0.0", release);
    pin_main_at(&repo, release, release);

    let config = fork_config(dir.path());
    let git = Git2Repository::open(dir.path()).unwrap();
    let orchestrator = UpdateOrchestrator::new(&git, &config, dir.path());

    let result = orchestrator.apply().unwrap();
    assert!(matches!(result, UpdateResult::UpToDate { .. }));
    assert!(local_branches(dir.path())
        .iter()
        .all(|b| !b.starts_with("upsync-update-")));
}

#[test]
fn test_apply_rolls_back_when_essential_file_vanished_upstream() {
    // The only essential change upstream is a file deletion; restoring it
    // from the target revision fails, the survivor set ends up empty, and
    // the update branch must be rolled away.
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }

    write_file(
        dir.path(),
        "package.json",
        "{\"name\": \"dashboard\", \"version\": \"1.2.0\"}\n",
    );
    write_file(dir.path(), "apps/x/src/extra.tsx", "export const E = 1;\n");
    write_file(dir.path(), "docs/readme.md", "local docs\n");
    let release_120 = commit_all(&repo, "Initial release");
    tag(&repo, "v1.2.0", release_120);

    fs::remove_file(dir.path().join("apps/x/src/extra.tsx")).unwrap();
    write_file(dir.path(), "docs/readme.md", "upstream docs\n");
    let release_130 = commit_all(&repo, "chore: drop extra widget");
    tag(&repo, "v1.3.0", release_130);

    pin_main_at(&repo, release_120, release_130);

    let mut config = fork_config(dir.path());
    config.patterns.essential = vec!["apps/*/src/**/*.tsx".to_string()];

    let git = Git2Repository::open(dir.path()).unwrap();
    let orchestrator = UpdateOrchestrator::new(&git, &config, dir.path());

    let result = orchestrator.apply().unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No essential updates found");

    // Back on main with no residual update branch
    let git_repo = Repository::open(dir.path()).unwrap();
    assert_eq!(git_repo.head().unwrap().shorthand().unwrap(), "main");
    assert!(local_branches(dir.path())
        .iter()
        .all(|b| !b.starts_with("upsync-update-")));

    // Manifest untouched
    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"version\": \"1.2.0\""));
}
