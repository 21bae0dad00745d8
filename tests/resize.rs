use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use libvirt_resizer::descriptor::{current_queues, find, parse_descriptor};
use libvirt_resizer::error::{ResizeError, Result};
use libvirt_resizer::hypervisor::{Hypervisor, ManagedDomain};
use libvirt_resizer::resize::{resize, run};
use libvirt_resizer::structs::{
    DomainStatus, Outcome, PatchRequest, ResizeOptions, VIR_DOMAIN_SHUTOFF,
};
use tempfile::tempdir;

const DOMAIN_XML: &str = include_str!("fixtures/domain.xml");
const E1000_DOMAIN_XML: &str = include_str!("fixtures/domain_e1000.xml");
const VM_NAME: &str = "k8s-ng1-worker";
const RUNNING: u32 = 1;

#[ctor::ctor]
fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Destroy(String),
    Create(String),
    Close,
}

struct FakeDomainData {
    xml: String,
    state: u32,
}

#[derive(Default)]
struct FakeState {
    domains: HashMap<String, FakeDomainData>,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
struct FakeHypervisor {
    state: Rc<RefCell<FakeState>>,
}

struct FakeDomain {
    name: String,
    state: Rc<RefCell<FakeState>>,
}

impl FakeHypervisor {
    fn with_domain(xml: &str, state: u32) -> FakeHypervisor {
        let hv = FakeHypervisor::default();
        hv.state.borrow_mut().domains.insert(
            VM_NAME.to_string(),
            FakeDomainData {
                xml: xml.to_string(),
                state,
            },
        );
        hv
    }

    fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    fn live_xml(&self) -> String {
        self.state.borrow().domains[VM_NAME].xml.clone()
    }
}

impl Hypervisor for FakeHypervisor {
    type Domain = FakeDomain;

    fn lookup_domain(&self, name: &str) -> Result<FakeDomain> {
        if !self.state.borrow().domains.contains_key(name) {
            return Err(ResizeError::NotFound(name.to_string()));
        }
        Ok(FakeDomain {
            name: name.to_string(),
            state: self.state.clone(),
        })
    }

    fn create_transient(&self, xml: &str) -> Result<()> {
        let tree = parse_descriptor(xml)?;
        let name = find(&tree, "name")
            .and_then(|n| n.get_text())
            .map(|n| n.to_string())
            .ok_or(ResizeError::MissingElement("name"))?;
        let mut state = self.state.borrow_mut();
        if let Some(existing) = state.domains.get(&name) {
            if existing.state != VIR_DOMAIN_SHUTOFF {
                return Err(ResizeError::Libvirt(format!("domain {name} is already active")));
            }
        }
        state.calls.push(Call::Create(name.clone()));
        state.domains.insert(
            name,
            FakeDomainData {
                xml: xml.to_string(),
                state: RUNNING,
            },
        );
        Ok(())
    }

    fn close(self) {
        self.state.borrow_mut().calls.push(Call::Close);
    }
}

impl ManagedDomain for FakeDomain {
    fn name(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    fn id(&self) -> Option<u32> {
        Some(7)
    }

    fn xml_desc(&self) -> Result<String> {
        Ok(self.state.borrow().domains[&self.name].xml.clone())
    }

    fn info(&self) -> Result<DomainStatus> {
        Ok(DomainStatus {
            state: self.state.borrow().domains[&self.name].state,
            max_mem: 1048576,
            memory: 1048576,
            nr_virt_cpu: 4,
            cpu_time: 1_000_000,
        })
    }

    fn destroy(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Destroy(self.name.clone()));
        if let Some(dom) = state.domains.get_mut(&self.name) {
            dom.state = VIR_DOMAIN_SHUTOFF;
        }
        Ok(())
    }
}

fn opts(dir: &Path, dump: bool) -> ResizeOptions {
    ResizeOptions {
        backup_dir: dir.join("backup"),
        dump,
        restart: false,
    }
}

fn backups(dir: &Path) -> Vec<String> {
    match fs::read_dir(dir.join("backup")) {
        Ok(entries) => entries
            .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
            .collect(),
        Err(_) => vec![],
    }
}

fn memory_request() -> PatchRequest {
    PatchRequest {
        memory: Some(2048),
        ..Default::default()
    }
}

#[test]
fn dump_never_touches_the_live_domain() {
    let tmp = tempdir().unwrap();
    let hv = FakeHypervisor::with_domain(DOMAIN_XML, RUNNING);
    let outcome = resize(hv.clone(), VM_NAME, &memory_request(), &opts(tmp.path(), true)).unwrap();

    match outcome {
        Outcome::Dumped { xml, backup } => {
            let tree = parse_descriptor(&xml).unwrap();
            let memory = find(&tree, "currentMemory").unwrap().get_text().unwrap();
            assert_eq!(memory.trim(), "2097152");
            assert!(backup.exists());
        }
        other => panic!("expected a dump, got {other:?}"),
    }
    assert_eq!(hv.calls(), vec![Call::Close]);
    assert_eq!(hv.live_xml(), DOMAIN_XML);
}

#[test]
fn apply_destroys_running_domain_before_creating() {
    let tmp = tempdir().unwrap();
    let hv = FakeHypervisor::with_domain(DOMAIN_XML, RUNNING);
    let req = PatchRequest {
        queues: Some(4),
        ..Default::default()
    };
    let outcome = resize(hv.clone(), VM_NAME, &req, &opts(tmp.path(), false)).unwrap();

    assert!(matches!(outcome, Outcome::Applied { destroyed: true, .. }));
    assert_eq!(
        hv.calls(),
        vec![
            Call::Destroy(VM_NAME.to_string()),
            Call::Create(VM_NAME.to_string()),
            Call::Close,
        ]
    );
    assert_eq!(current_queues(&parse_descriptor(&hv.live_xml()).unwrap()), "4");
}

#[test]
fn apply_on_stopped_domain_skips_destroy() {
    let tmp = tempdir().unwrap();
    let hv = FakeHypervisor::with_domain(DOMAIN_XML, VIR_DOMAIN_SHUTOFF);
    let outcome = run(&hv, VM_NAME, &memory_request(), &opts(tmp.path(), false)).unwrap();

    assert!(matches!(outcome, Outcome::Applied { destroyed: false, .. }));
    assert_eq!(hv.calls(), vec![Call::Create(VM_NAME.to_string())]);
}

#[test]
fn every_run_leaves_one_identical_backup() {
    for dump in [true, false] {
        let tmp = tempdir().unwrap();
        let hv = FakeHypervisor::with_domain(DOMAIN_XML, RUNNING);
        let outcome = run(&hv, VM_NAME, &memory_request(), &opts(tmp.path(), dump)).unwrap();
        let backup = match outcome {
            Outcome::Dumped { backup, .. } => backup,
            Outcome::Applied { backup, .. } => backup,
        };
        let file_name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with(&format!("{VM_NAME}_")));
        assert!(file_name.ends_with(".xml"));
        assert_eq!(backups(tmp.path()), vec![DOMAIN_XML.to_string()]);
    }
}

#[test]
fn unsupported_queues_fail_after_backup() {
    let tmp = tempdir().unwrap();
    let hv = FakeHypervisor::with_domain(E1000_DOMAIN_XML, RUNNING);
    let req = PatchRequest {
        cpu: Some(2),
        queues: Some(4),
        ..Default::default()
    };
    let err = resize(hv.clone(), VM_NAME, &req, &opts(tmp.path(), false)).unwrap_err();

    assert!(matches!(err, ResizeError::UnsupportedConfiguration(_)));
    assert_eq!(backups(tmp.path()), vec![E1000_DOMAIN_XML.to_string()]);
    assert_eq!(hv.calls(), vec![Call::Close]);
    assert_eq!(hv.live_xml(), E1000_DOMAIN_XML);
}

#[test]
fn unknown_domain_is_not_found_and_writes_nothing() {
    let tmp = tempdir().unwrap();
    let hv = FakeHypervisor::with_domain(DOMAIN_XML, RUNNING);
    let err = resize(hv.clone(), "missing-vm", &memory_request(), &opts(tmp.path(), false))
        .unwrap_err();

    match err {
        ResizeError::NotFound(name) => assert_eq!(name, "missing-vm"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(!tmp.path().join("backup").exists());
    assert_eq!(hv.calls(), vec![Call::Close]);
}

#[test]
fn missing_queues_attribute_is_not_an_error() {
    let tmp = tempdir().unwrap();
    let xml = include_str!("fixtures/domain_no_driver.xml");
    let hv = FakeHypervisor::with_domain(xml, RUNNING);
    let outcome = run(&hv, VM_NAME, &PatchRequest::default(), &opts(tmp.path(), true)).unwrap();
    assert!(matches!(outcome, Outcome::Dumped { .. }));
}
