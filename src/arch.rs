// src/arch.rs

//! Architecture name mapping
//!
//! Build hosts describe themselves with generic tokens (`intel`, `x86_64`,
//! `ppc`). Debian uses its own architecture names, and on GNU/kFreeBSD it
//! prefixes them with the kernel name.

/// Kernel of the build host, which affects Debian architecture names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKernel {
    Linux,
    FreeBsd,
    Other,
}

impl HostKernel {
    /// Kernel of the platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "freebsd") {
            Self::FreeBsd
        } else {
            Self::Other
        }
    }
}

impl Default for HostKernel {
    fn default() -> Self {
        Self::current()
    }
}

/// Which naming table to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchNaming {
    /// Only `x86_64` is renamed, to `amd64`
    Native,
    /// Full Debian names, with kFreeBSD prefixes where they apply
    Debian,
}

/// Map a generic architecture token to its Debian name
///
/// Unknown tokens pass through unchanged.
pub fn normalize_arch(token: &str, naming: ArchNaming, kernel: HostKernel) -> String {
    let kfreebsd = kernel == HostKernel::FreeBsd;

    match (naming, token) {
        (ArchNaming::Debian, "intel") if kfreebsd => "kfreebsd-i386",
        (ArchNaming::Debian, "intel") => "i386",
        (ArchNaming::Debian, "x86_64") if kfreebsd => "kfreebsd-amd64",
        (_, "x86_64") => "amd64",
        (ArchNaming::Debian, "ppc") => "powerpc",
        _ => token,
    }
    .to_string()
}

/// Generic token for the architecture this binary was built for
pub fn host_machine() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "intel",
        "powerpc" => "ppc",
        other => other,
    }
}
