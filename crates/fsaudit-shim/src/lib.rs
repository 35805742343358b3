// crates/fsaudit-shim/src/lib.rs

//! `LD_PRELOAD` shim that keeps atimes primed across writes.
//!
//! An audit wrapper backdates atimes once, before the command runs. A child
//! that writes a file advances its mtime past the primed atime, and from
//! then on relatime may again swallow atime updates for reads of that file
//! within the same window. Preloading this library closes the gap: every
//! successful `write`/`fwrite` is followed by rewinding the file's atime to
//! one day behind its fresh mtime, so the next read is always recorded.
//!
//! Interposition rules:
//! - the real call happens first and its return value is never altered
//! - `errno` is saved before the patch and restored after it
//! - patch failures are ignored; observability never breaks the build
//!
//! Usage: `LD_PRELOAD=libfsaudit_shim.so make all`

use std::cell::Cell;
use std::ffi::c_void;
use std::sync::OnceLock;

use libc::{FILE, c_int, size_t, ssize_t};

/// How far behind mtime the atime is pushed, in seconds. One full day clears
/// relatime's staleness threshold, so the kernel updates atime on the next
/// read no matter which of its branches applies.
pub const PRIME_MARGIN_SECS: libc::time_t = 86_400;

type WriteFn = unsafe extern "C" fn(c_int, *const c_void, size_t) -> ssize_t;
type FwriteFn = unsafe extern "C" fn(*const c_void, size_t, size_t, *mut FILE) -> size_t;

static REAL_WRITE: OnceLock<Option<WriteFn>> = OnceLock::new();
static REAL_FWRITE: OnceLock<Option<FwriteFn>> = OnceLock::new();
static REAL_FWRITE_UNLOCKED: OnceLock<Option<FwriteFn>> = OnceLock::new();

thread_local! {
    // Guards against re-entering the patch path if anything below us ends
    // up calling an interposed symbol again.
    static PATCHING: Cell<bool> = const { Cell::new(false) };
}

fn real_write() -> Option<WriteFn> {
    *REAL_WRITE.get_or_init(|| unsafe {
        let sym = libc::dlsym(libc::RTLD_NEXT, c"write".as_ptr());
        if sym.is_null() {
            None
        } else {
            Some(std::mem::transmute::<*mut c_void, WriteFn>(sym))
        }
    })
}

fn real_fwrite() -> Option<FwriteFn> {
    *REAL_FWRITE.get_or_init(|| unsafe {
        let sym = libc::dlsym(libc::RTLD_NEXT, c"fwrite".as_ptr());
        if sym.is_null() {
            None
        } else {
            Some(std::mem::transmute::<*mut c_void, FwriteFn>(sym))
        }
    })
}

fn real_fwrite_unlocked() -> Option<FwriteFn> {
    *REAL_FWRITE_UNLOCKED.get_or_init(|| unsafe {
        let sym = libc::dlsym(libc::RTLD_NEXT, c"fwrite_unlocked".as_ptr());
        if sym.is_null() {
            None
        } else {
            Some(std::mem::transmute::<*mut c_void, FwriteFn>(sym))
        }
    })
}

/// The atime to install for a file whose mtime is `(mtime_sec, mtime_nsec)`:
/// the margin behind in seconds, nanoseconds carried over unchanged.
pub fn primed_atime(mtime_sec: libc::time_t, mtime_nsec: libc::c_long) -> libc::timespec {
    libc::timespec {
        tv_sec: mtime_sec - PRIME_MARGIN_SECS,
        tv_nsec: mtime_nsec,
    }
}

/// Rewind `fd`'s atime behind its current mtime, leaving mtime untouched.
///
/// Only applies to regular files. Every failure is swallowed; a file we
/// cannot patch simply risks an unrecorded read later.
fn rewind_atime(fd: c_int) {
    unsafe {
        let mut st: libc::stat = std::mem::zeroed();
        if libc::fstat(fd, &mut st) != 0 {
            return;
        }
        if st.st_mode & libc::S_IFMT != libc::S_IFREG {
            return;
        }
        let times = [
            primed_atime(st.st_mtime, st.st_mtime_nsec),
            // mtime untouched
            libc::timespec {
                tv_sec: 0,
                tv_nsec: libc::UTIME_OMIT,
            },
        ];
        let _ = libc::futimens(fd, times.as_ptr());
    }
}

/// Last-resort stream write used when `dlsym` cannot resolve the real
/// `fwrite`: push the bytes straight through the descriptor with our own
/// `write`, bypassing stdio buffering. Returns the number of complete items
/// written; `errno` is left as the failing `write` set it.
fn fwrite_fallback(ptr: *const c_void, size: size_t, nmemb: size_t, stream: *mut FILE) -> size_t {
    if size == 0 || nmemb == 0 {
        return 0;
    }
    let fd = unsafe { libc::fileno(stream) };
    if fd < 0 {
        return 0;
    }

    let total = size * nmemb;
    let mut done: size_t = 0;
    while done < total {
        let ret = unsafe { write(fd, ptr.wrapping_byte_add(done), total - done) };
        if ret <= 0 {
            break;
        }
        done += ret as size_t;
    }
    done / size
}

/// Patch `fd` after a successful write, preserving `errno` around the work.
fn patch_fd(fd: c_int) {
    let entered = PATCHING.with(|flag| {
        if flag.get() {
            false
        } else {
            flag.set(true);
            true
        }
    });
    if !entered {
        return;
    }

    unsafe {
        let saved_errno = *libc::__errno_location();
        rewind_atime(fd);
        *libc::__errno_location() = saved_errno;
    }

    PATCHING.with(|flag| flag.set(false));
}

/// Interposed `write(2)`.
///
/// # Safety
/// Same contract as libc `write`; `buf` must be valid for `count` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn write(fd: c_int, buf: *const c_void, count: size_t) -> ssize_t {
    let ret = match real_write() {
        Some(real) => unsafe { real(fd, buf, count) },
        // dlsym failed; fall back to the raw syscall so writes still work.
        None => unsafe { libc::syscall(libc::SYS_write, fd, buf, count) as ssize_t },
    };
    if ret > 0 {
        patch_fd(fd);
    }
    ret
}

/// Interposed `fwrite(3)`.
///
/// # Safety
/// Same contract as libc `fwrite`; `ptr` must be valid for `size * nmemb`
/// bytes and `stream` must be a valid open stream.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fwrite(
    ptr: *const c_void,
    size: size_t,
    nmemb: size_t,
    stream: *mut FILE,
) -> size_t {
    // dlsym failure must not turn every buffered write into a silent loss;
    // fall back to pushing the bytes through the descriptor directly.
    let Some(real) = real_fwrite() else {
        return fwrite_fallback(ptr, size, nmemb, stream);
    };
    let ret = unsafe { real(ptr, size, nmemb, stream) };
    if ret > 0 {
        let fd = unsafe { libc::fileno(stream) };
        if fd >= 0 {
            patch_fd(fd);
        }
    }
    ret
}

/// Interposed `fwrite_unlocked(3)`.
///
/// # Safety
/// Same contract as libc `fwrite_unlocked`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fwrite_unlocked(
    ptr: *const c_void,
    size: size_t,
    nmemb: size_t,
    stream: *mut FILE,
) -> size_t {
    let Some(real) = real_fwrite_unlocked() else {
        return fwrite_fallback(ptr, size, nmemb, stream);
    };
    let ret = unsafe { real(ptr, size, nmemb, stream) };
    if ret > 0 {
        let fd = unsafe { libc::fileno(stream) };
        if fd >= 0 {
            patch_fd(fd);
        }
    }
    ret
}
