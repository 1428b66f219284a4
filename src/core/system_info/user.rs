use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};

/// Name of the OS account running this process.
pub fn current_username() -> Option<String> {
    let pid = sysinfo::get_current_pid().ok()?;

    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        false,
        ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
    );
    let uid = sys.process(pid)?.user_id()?.clone();

    let users = Users::new_with_refreshed_list();
    let name = users.get_user_by_id(&uid)?.name().trim().to_string();
    (!name.is_empty()).then_some(name)
}
