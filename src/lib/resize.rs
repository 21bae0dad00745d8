use crate::descriptor::{parse_descriptor, patch_descriptor, render_descriptor};
use crate::error::Result;
use crate::hypervisor::{Hypervisor, ManagedDomain};
use crate::report::report_and_backup;
use crate::structs::{Outcome, PatchRequest, ResizeOptions};

/// Runs one resize against an open connection and closes it afterwards,
/// whatever the result.
pub fn resize<H: Hypervisor>(
    hypervisor: H,
    vm_name: &str,
    request: &PatchRequest,
    opts: &ResizeOptions,
) -> Result<Outcome> {
    let outcome = run(&hypervisor, vm_name, request, opts);
    hypervisor.close();
    outcome
}

/// lookup, backup, patch, then either hand back the new XML or restart the
/// domain transiently with it.
pub fn run<H: Hypervisor>(
    hypervisor: &H,
    vm_name: &str,
    request: &PatchRequest,
    opts: &ResizeOptions,
) -> Result<Outcome> {
    let dom = hypervisor.lookup_domain(vm_name)?;

    let snapshot = report_and_backup(&dom, &opts.backup_dir)?;
    if request.is_empty() {
        warn!("No changes requested for {vm_name}");
    }
    let current = parse_descriptor(&snapshot.raw_xml)?;
    let new_xml = render_descriptor(&patch_descriptor(&current, request)?)?;

    if opts.dump {
        return Ok(Outcome::Dumped {
            xml: new_xml,
            backup: snapshot.backup,
        });
    }

    if opts.restart {
        debug!("--restart given; the domain is restarted either way");
    }
    let mut destroyed = false;
    if !dom.info()?.is_stopped() {
        info!("- Stopping VM");
        dom.destroy()?;
        destroyed = true;
    }

    // transient guest: the persistent definition, if any, stays as it was
    info!("- Creating VM");
    hypervisor.create_transient(&new_xml)?;
    Ok(Outcome::Applied {
        backup: snapshot.backup,
        destroyed,
    })
}
