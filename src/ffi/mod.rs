//! A thin C ABI surface (feature `ffi`), deliberately minimal per spec §1's
//! explicit scope note excluding a full FFI surface from this crate's core.
//!
//! Grounded on the original source's `mdal.h`: an opaque mesh handle
//! (`MeshH`), a process-wide last-status accessor (`MDAL_LastStatus`), and
//! load/free entry points. One `Mutex`-guarded slot table maps the opaque
//! handles back to owned `Box<dyn Mesh>` values; there is no attempt here
//! to expose dataset/driver introspection through the C ABI, since that
//! surface is explicitly out of this crate's scope.

use std::ffi::{c_char, CString};
use std::os::raw::c_int;
use std::sync::Mutex;

use crate::driver::DriverManager;
use crate::error::Status;
use crate::logging::LastStatus;
use crate::mesh::Mesh;

/// An opaque handle to a loaded mesh, returned by [`MDAL_LoadMesh`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshH(i64);

struct Slots {
    meshes: Vec<Option<Box<dyn Mesh>>>,
}

static SLOTS: Mutex<Option<Slots>> = Mutex::new(None);

fn with_slots<R>(f: impl FnOnce(&mut Slots) -> R) -> R {
    let mut guard = SLOTS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let slots = guard.get_or_insert_with(|| Slots { meshes: Vec::new() });
    f(slots)
}

/// Loads the mesh named by `uri` (a NUL-terminated C string) and returns an
/// opaque handle, or a handle whose value is `-1` on failure (check
/// [`MDAL_LastStatus`] for why).
///
/// # Safety
///
/// `uri` must point to a valid NUL-terminated C string for the duration of
/// the call.
#[no_mangle]
pub unsafe extern "C" fn MDAL_LoadMesh(uri: *const c_char) -> MeshH {
    if uri.is_null() {
        return MeshH(-1);
    }
    let uri = match std::ffi::CStr::from_ptr(uri).to_str() {
        Ok(s) => s,
        Err(_) => return MeshH(-1),
    };

    let manager = DriverManager::new();
    match manager.load(uri) {
        Ok(mesh) => with_slots(|slots| {
            slots.meshes.push(Some(mesh));
            MeshH((slots.meshes.len() - 1) as i64)
        }),
        Err(_) => MeshH(-1),
    }
}

/// Releases a mesh handle returned by [`MDAL_LoadMesh`]. A handle may be
/// freed at most once; freeing an already-freed or invalid handle is a
/// no-op.
#[no_mangle]
pub extern "C" fn MDAL_CloseMesh(handle: MeshH) {
    if handle.0 < 0 {
        return;
    }
    with_slots(|slots| {
        if let Some(slot) = slots.meshes.get_mut(handle.0 as usize) {
            *slot = None;
        }
    });
}

/// Returns this thread's last [`Status`] as its integer discriminant,
/// matching the original `MDAL_Status` enum's C representation.
#[no_mangle]
pub extern "C" fn MDAL_LastStatus() -> c_int {
    status_to_c_int(LastStatus::get())
}

fn status_to_c_int(status: Status) -> c_int {
    match status {
        Status::None => 0,
        Status::FileNotFound => 1,
        Status::UnknownFormat => 2,
        Status::IncompatibleMesh => 3,
        Status::IncompatibleDataset => 4,
        Status::IncompatibleDatasetGroup => 5,
        Status::InvalidData => 6,
        Status::MissingDriver => 7,
        Status::MissingDriverCapability => 8,
        Status::NotEnoughMemory => 9,
        Status::WarnUnsupportedElement => 10,
        Status::WarnInvalidElements => 11,
        Status::WarnElementWithInvalidNode => 12,
        Status::WarnElementNotUnique => 13,
        Status::WarnNodeNotUnique => 14,
    }
}

/// Returns the vertex count of the mesh referenced by `handle`, or `-1` if
/// the handle is invalid.
#[no_mangle]
pub extern "C" fn MDAL_MeshVertexCount(handle: MeshH) -> i64 {
    if handle.0 < 0 {
        return -1;
    }
    with_slots(|slots| {
        slots
            .meshes
            .get(handle.0 as usize)
            .and_then(|slot| slot.as_ref())
            .map(|mesh| mesh.vertex_count() as i64)
            .unwrap_or(-1)
    })
}

/// Returns a newly allocated, NUL-terminated copy of this crate's version
/// string. The caller owns the returned pointer and must free it with
/// [`MDAL_Free`].
#[no_mangle]
pub extern "C" fn MDAL_Version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Frees a string previously returned by this module (e.g. [`MDAL_Version`]).
///
/// # Safety
///
/// `ptr` must have been returned by a function in this module and not
/// already freed.
#[no_mangle]
pub unsafe extern "C" fn MDAL_Free(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_handle_reports_negative_vertex_count() {
        assert_eq!(MDAL_MeshVertexCount(MeshH(-1)), -1);
    }

    #[test]
    fn closing_an_invalid_handle_is_a_no_op() {
        MDAL_CloseMesh(MeshH(-1));
    }

    #[test]
    fn status_mapping_round_trips_none() {
        assert_eq!(status_to_c_int(Status::None), 0);
    }
}
