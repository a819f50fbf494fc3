//! Device serial resolution

use sha2::{Digest, Sha256};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// Serial sent to the authenticate-device action.
///
/// Precedence: configured override, previously persisted serial, hardware
/// fingerprint. Blank values are skipped.
pub fn resolve_device_serial(override_serial: Option<&str>, persisted: Option<&str>) -> Option<String> {
    override_serial
        .into_iter()
        .chain(persisted)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| Some(hardware_serial()).filter(|s| !s.is_empty()))
}

/// Stable 16-character uppercase serial derived from the hardware fingerprint
pub fn hardware_serial() -> String {
    let id = hardware_fingerprint();
    id[..16.min(id.len())].to_ascii_uppercase()
}

/// SHA-256 (hex) over OS name, first CPU brand/vendor, physical core count
/// and total memory. Stable across reboots on the same tablet.
pub fn hardware_fingerprint() -> String {
    let sys = System::new_with_specifics(
        RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything()),
    );

    let mut parts: Vec<String> = Vec::new();
    parts.extend(System::name());
    if let Some(cpu) = sys.cpus().first() {
        parts.push(cpu.brand().to_string());
        parts.push(cpu.vendor_id().to_string());
    }
    parts.push(
        System::physical_core_count()
            .unwrap_or(sys.cpus().len())
            .to_string(),
    );
    parts.push(sys.total_memory().to_string());

    hex::encode(Sha256::digest(parts.join("|").as_bytes()))
}
