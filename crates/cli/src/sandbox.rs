//! Drop privileges once every file is registered
//!
//! From here on the process only waits, writes report lines, and reopens
//! paths it already knows about.

use std::io;
use tracing::debug;

/// Restrict the process to what the event loop needs
#[cfg(target_os = "openbsd")]
pub fn restrict() -> io::Result<()> {
    use nix::libc::c_char;

    // rpath keeps recovery reopens working
    let promises = b"stdio rpath\0";
    let rc = unsafe { nix::libc::pledge(promises.as_ptr() as *const c_char, std::ptr::null()) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    debug!("Pledged stdio rpath");
    Ok(())
}

/// Restrict the process to what the event loop needs
#[cfg(target_os = "linux")]
pub fn restrict() -> io::Result<()> {
    nix::sys::prctl::set_no_new_privs().map_err(io::Error::from)?;
    debug!("Set no_new_privs");
    Ok(())
}

/// Restrict the process to what the event loop needs
#[cfg(not(any(target_os = "openbsd", target_os = "linux")))]
pub fn restrict() -> io::Result<()> {
    debug!("No privilege restriction available on this platform");
    Ok(())
}
