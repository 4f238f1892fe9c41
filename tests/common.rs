//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use futures::future::BoxFuture;
use mechaway_studio::api::{ExecutionService, PlaybookStore};
use mechaway_studio::catalog::{
    ActionApi, AppApi, Catalog, CatalogRegistry, Device, ParameterApi, ParameterSchema, ReturnApi,
};
use mechaway_studio::editor::EditorSession;
use mechaway_studio::error::{Result, StudioError};
use mechaway_studio::graph::MemoryGraph;
use mechaway_studio::workflow::{Argument, Playbook, Position, Selector, SelectorSegment, Step, Workflow};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub fn catalog() -> Catalog {
    Catalog::new(
        vec![AppApi {
            name: "Utilities".into(),
            action_apis: vec![
                ActionApi {
                    name: "echo".into(),
                    parameters: vec![ParameterApi {
                        name: "data".into(),
                        schema: ParameterSchema {
                            kind: Some("string".into()),
                            default: Some(json!("hi")),
                            ..ParameterSchema::default()
                        },
                        ..ParameterApi::default()
                    }],
                    returns: vec![
                        ReturnApi {
                            status: "Success".into(),
                            ..ReturnApi::default()
                        },
                        ReturnApi {
                            status: "UnhandledException".into(),
                            ..ReturnApi::default()
                        },
                    ],
                    ..ActionApi::default()
                },
                ActionApi {
                    name: "listen".into(),
                    event: true,
                    ..ActionApi::default()
                },
            ],
            ..AppApi::default()
        }],
        vec![Device {
            id: 1,
            name: "local".into(),
            app: "Utilities".into(),
            description: None,
        }],
    )
}

pub fn step(uid: &str, action: &str, x: f64) -> Step {
    Step {
        uid: uid.into(),
        name: uid.into(),
        app: "Utilities".into(),
        action: action.into(),
        position: Position::new(x, 0.0),
        ..Step::default()
    }
}

/// a -> b -> c, start a; `a` carries a referencing input with a canonical selector
pub fn sample_workflow(name: &str) -> Workflow {
    let mut wf = Workflow::new(name);
    let mut a = step("a", "echo", 0.0);
    a.inputs.push(Argument {
        name: "data".into(),
        value: Some(json!("stale")),
        reference: Some("b".into()),
        selector: Some(Selector::Path(vec![
            SelectorSegment::Key("output".into()),
            SelectorSegment::Index(0),
        ])),
    });
    wf.add_step(a).unwrap();
    wf.add_step(step("b", "echo", 100.0)).unwrap();
    wf.add_step(step("c", "listen", 200.0)).unwrap();
    wf.add_transition_with_uid("t-ab", "a", "b").unwrap();
    wf.add_transition_with_uid("t-bc", "b", "c").unwrap();
    wf.start = Some("a".into());
    wf
}

/// In-memory playbook store with a failure switch
#[derive(Default)]
pub struct FakeStore {
    pub workflows: Mutex<BTreeMap<(String, String), Workflow>>,
    pub saved: Mutex<Vec<(String, String, Workflow)>>,
    pub executed: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl FakeStore {
    pub fn with(playbook: &str, workflow: Workflow) -> Self {
        let store = Self::default();
        store.put(playbook, workflow);
        store
    }

    pub fn put(&self, playbook: &str, workflow: Workflow) {
        self.workflows
            .lock()
            .unwrap()
            .insert((playbook.to_string(), workflow.name.clone()), workflow);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StudioError::RemoteFailure("HTTP 500 Internal Server Error: boom".into()))
        } else {
            Ok(())
        }
    }

    fn key(playbook: &str, workflow: &str) -> (String, String) {
        (playbook.to_string(), workflow.to_string())
    }
}

impl PlaybookStore for FakeStore {
    fn list_playbooks(&self) -> BoxFuture<'_, Result<Vec<Playbook>>> {
        Box::pin(async move {
            self.check()?;
            let mut playbooks: BTreeMap<String, Playbook> = BTreeMap::new();
            for ((playbook, _), workflow) in self.workflows.lock().unwrap().iter() {
                playbooks
                    .entry(playbook.clone())
                    .or_insert_with(|| Playbook {
                        uid: None,
                        name: playbook.clone(),
                        workflows: Vec::new(),
                    })
                    .workflows
                    .push(workflow.clone());
            }
            Ok(playbooks.into_values().collect())
        })
    }

    fn load_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            self.check()?;
            self.workflows
                .lock()
                .unwrap()
                .get(&Self::key(playbook, workflow))
                .cloned()
                .ok_or_else(|| StudioError::RemoteFailure("HTTP 404 Not Found".into()))
        })
    }

    fn save_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow_name: &'a str,
        workflow: &'a Workflow,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            self.saved
                .lock()
                .unwrap()
                .push((playbook.to_string(), workflow_name.to_string(), workflow.clone()));
            self.workflows
                .lock()
                .unwrap()
                .insert(Self::key(playbook, workflow_name), workflow.clone());
            Ok(())
        })
    }

    fn new_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            self.check()?;
            let created = Workflow::new(workflow);
            self.put(playbook, created.clone());
            Ok(created)
        })
    }

    fn rename_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            let mut workflows = self.workflows.lock().unwrap();
            let moved: Vec<_> = workflows
                .keys()
                .filter(|(pb, _)| pb == playbook)
                .cloned()
                .collect();
            for key in moved {
                if let Some(wf) = workflows.remove(&key) {
                    workflows.insert(Self::key(new_name, &key.1), wf);
                }
            }
            Ok(())
        })
    }

    fn duplicate_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            let mut workflows = self.workflows.lock().unwrap();
            let copies: Vec<_> = workflows
                .iter()
                .filter(|((pb, _), _)| pb == playbook)
                .map(|((_, name), wf)| (Self::key(new_name, name), wf.clone()))
                .collect();
            workflows.extend(copies);
            Ok(())
        })
    }

    fn delete_playbook<'a>(&'a self, playbook: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            self.workflows.lock().unwrap().retain(|(pb, _), _| pb != playbook);
            Ok(())
        })
    }

    fn rename_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            let mut workflows = self.workflows.lock().unwrap();
            let mut renamed = workflows
                .remove(&Self::key(playbook, workflow))
                .ok_or_else(|| StudioError::RemoteFailure("HTTP 404 Not Found".into()))?;
            renamed.name = new_name.to_string();
            workflows.insert(Self::key(playbook, new_name), renamed);
            Ok(())
        })
    }

    fn duplicate_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            self.check()?;
            let mut workflows = self.workflows.lock().unwrap();
            let mut copy = workflows
                .get(&Self::key(playbook, workflow))
                .cloned()
                .ok_or_else(|| StudioError::RemoteFailure("HTTP 404 Not Found".into()))?;
            copy.name = new_name.to_string();
            workflows.insert(Self::key(playbook, new_name), copy.clone());
            Ok(copy)
        })
    }

    fn delete_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            self.workflows
                .lock()
                .unwrap()
                .remove(&Self::key(playbook, workflow));
            Ok(())
        })
    }
}

impl ExecutionService for FakeStore {
    fn execute_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            self.executed
                .lock()
                .unwrap()
                .push((playbook.to_string(), workflow.to_string()));
            Ok(())
        })
    }
}

pub fn session(store: Arc<FakeStore>) -> EditorSession<MemoryGraph> {
    let registry = Arc::new(CatalogRegistry::new(catalog()));
    EditorSession::new(store, registry, MemoryGraph::new().with_paste_offset(20.0))
}

pub fn session_with_executor(store: Arc<FakeStore>) -> EditorSession<MemoryGraph> {
    session(store.clone()).with_executor(store)
}

/// Node ids that carry the start marker
pub fn start_markers(view: &MemoryGraph) -> Vec<String> {
    use mechaway_studio::graph::GraphView;
    view.node_ids()
        .into_iter()
        .filter(|id| view.node(id).is_some_and(|n| n.is_start_node))
        .collect()
}
