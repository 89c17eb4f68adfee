//! CPU, memory and disk capacity

use nodectl_types::Resources;
use std::path::Path;
use sysinfo::{DiskKind, Disks, System};

const BYTES_PER_MB: u64 = 1024 * 1024;
const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// One mounted filesystem as seen by the probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub mount_point: std::path::PathBuf,
    pub available_bytes: u64,
    pub rotational: bool,
}

/// The mount holding `path`: the longest mount point that prefixes it.
///
/// `path` does not need to exist yet.
#[must_use]
pub fn mount_for<'a>(mounts: &'a [MountInfo], path: &Path) -> Option<&'a MountInfo> {
    mounts
        .iter()
        .filter(|m| path.starts_with(&m.mount_point))
        .max_by_key(|m| m.mount_point.components().count())
}

fn list_mounts() -> Vec<MountInfo> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .map(|disk| MountInfo {
            mount_point: disk.mount_point().to_path_buf(),
            available_bytes: disk.available_space(),
            rotational: disk.kind() == DiskKind::HDD,
        })
        .collect()
}

/// Measure the host. Missing information degrades to zero / non-rotational;
/// the second value lists what could not be determined.
#[must_use]
pub fn measure(data_dir: &Path) -> (Resources, Vec<String>) {
    let mut degraded = Vec::new();

    let cpu_cores = u32::try_from(num_cpus::get()).unwrap_or(u32::MAX);

    let mut system = System::new();
    system.refresh_memory();
    let ram_mb = system.total_memory() / BYTES_PER_MB;
    if ram_mb == 0 {
        degraded.push("total memory unavailable".to_string());
    }

    let mounts = list_mounts();
    let (disk_free_gb, disk_is_rotational) = match mount_for(&mounts, data_dir) {
        Some(mount) => (mount.available_bytes / BYTES_PER_GB, mount.rotational),
        None => {
            degraded.push(format!("no filesystem found for {}", data_dir.display()));
            (0, false)
        }
    };

    (
        Resources {
            cpu_cores,
            ram_mb,
            disk_free_gb,
            disk_is_rotational,
        },
        degraded,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn mount(path: &str, gb: u64, rotational: bool) -> MountInfo {
        MountInfo {
            mount_point: PathBuf::from(path),
            available_bytes: gb * BYTES_PER_GB,
            rotational,
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let mounts = vec![mount("/", 20, false), mount("/var/lib", 500, true)];
        let chosen = mount_for(&mounts, Path::new("/var/lib/litecoin")).unwrap();
        assert_eq!(chosen.mount_point, PathBuf::from("/var/lib"));
        assert!(chosen.rotational);

        let root = mount_for(&mounts, Path::new("/srv/node")).unwrap();
        assert_eq!(root.mount_point, PathBuf::from("/"));
    }

    #[test]
    fn prefix_is_component_wise() {
        let mounts = vec![mount("/", 20, false), mount("/var/li", 500, true)];
        let chosen = mount_for(&mounts, Path::new("/var/lib/litecoin")).unwrap();
        assert_eq!(chosen.mount_point, PathBuf::from("/"));
    }
}
