//! Revalidation of the sample installation as files change on disk

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use srvcfg_core::{ConfigEngine, DiagnosticKind, ResolutionEvent, Revalidator, Trigger};
use srvcfg_fs::{DiskProvider, NormalizedPath};
use srvcfg_meta::{SchemaMetadata, ValidationSettings};
use srvcfg_test_utils::FixtureInstall;
use tokio::sync::mpsc::UnboundedReceiver;

fn revalidator() -> (Revalidator, UnboundedReceiver<ResolutionEvent>) {
    let engine = ConfigEngine::new(SchemaMetadata::with_builtins(), ValidationSettings::default());
    Revalidator::new(Arc::new(engine), Arc::new(DiskProvider::new()))
}

async fn next_event(events: &mut UnboundedReceiver<ResolutionEvent>) -> ResolutionEvent {
    tokio::time::timeout(Duration::from_secs(10), events.recv())
        .await
        .expect("timed out waiting for a resolution")
        .expect("revalidator closed")
}

fn root(install: &FixtureInstall, server: &str) -> NormalizedPath {
    NormalizedPath::new(install.server_dir(server))
}

/// Register both fixture servers and drain their initial resolutions.
async fn registered(install: &FixtureInstall) -> (Revalidator, UnboundedReceiver<ResolutionEvent>) {
    let (revalidator, mut events) = revalidator();
    revalidator.register(install.layout("webapp"));
    revalidator.register(install.layout("broken"));

    let mut initial = vec![next_event(&mut events).await, next_event(&mut events).await];
    initial.sort_by(|a, b| a.root.cmp(&b.root));
    assert_eq!(initial[0].root, root(install, "broken"));
    assert_eq!(initial[1].root, root(install, "webapp"));
    assert!(initial.iter().all(|e| e.trigger == Trigger::Registered));

    (revalidator, events)
}

#[tokio::test(flavor = "multi_thread")]
async fn editing_shared_include_revalidates_its_user() {
    let install = FixtureInstall::copy();
    let (revalidator, mut events) = registered(&install).await;

    let path = install.write(
        "usr/shared/config/datasource.xml",
        r#"<server>
    <variable name="db.port" defaultValue="6543"/>
    <jdbcDriver id="postgres"/>
    <dataSource id="appDS" jndiName="jdbc/app" jdbcDriverRef="postgres">
        <properties portNumber="${db.port}"/>
    </dataSource>
</server>"#,
    );
    let path = NormalizedPath::new(path);

    let roots = revalidator.file_changed(&path);
    assert_eq!(roots, vec![root(&install, "webapp")]);

    let event = next_event(&mut events).await;
    assert_eq!(event.root, root(&install, "webapp"));
    assert_eq!(event.trigger, Trigger::FileChanged(vec![path]));

    let config = event.outcome.unwrap();
    let properties = config
        .element("dataSource", Some("appDS"))
        .and_then(|ds| ds.children.iter().find(|c| c.name == "properties"))
        .unwrap();
    assert_eq!(properties.attr("portNumber"), Some("${db.port}"));
    assert_eq!(config.resolver().resolve("${db.port}").value, "6543");
}

#[tokio::test(flavor = "multi_thread")]
async fn creating_optional_include_joins_the_chain() {
    let install = FixtureInstall::copy();
    let (revalidator, mut events) = registered(&install).await;

    let path = install.write(
        "usr/servers/webapp/includes/optional-tuning.xml",
        r#"<server>
    <executor maxThreads="80"/>
</server>"#,
    );

    let roots = revalidator.file_changed(&NormalizedPath::new(path));
    assert_eq!(roots, vec![root(&install, "webapp")]);

    let config = next_event(&mut events).await.outcome.unwrap();
    assert!(
        !config
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::IncludeOptionalNotFound)
    );
    let max_threads = config.lookup("executor", None, "maxThreads").unwrap();
    assert_eq!(max_threads.resolved.as_deref(), Some("80"));
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_env_file_affects_every_server() {
    let install = FixtureInstall::copy();
    let (revalidator, mut events) = registered(&install).await;

    let path = install.write("usr/shared/server.env", "DB_HOST=db.moved.local\n");
    let roots = revalidator.file_changed(&NormalizedPath::new(path));
    assert_eq!(roots, vec![root(&install, "broken"), root(&install, "webapp")]);

    let mut updated = vec![next_event(&mut events).await, next_event(&mut events).await];
    updated.sort_by(|a, b| a.root.cmp(&b.root));

    let webapp = updated[1].outcome.as_ref().unwrap();
    assert_eq!(
        webapp.variables.effective("env.DB_HOST"),
        Some("db.moved.local")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unrelated_file_triggers_nothing() {
    let install = FixtureInstall::copy();
    let (revalidator, mut events) = registered(&install).await;

    let path = install.write("usr/servers/webapp/apps/readme.txt", "not configuration");
    assert!(revalidator.file_changed(&NormalizedPath::new(path)).is_empty());

    let quiet = tokio::time::timeout(Duration::from_millis(200), events.recv()).await;
    assert!(quiet.is_err(), "unexpected resolution: {quiet:?}");
}
