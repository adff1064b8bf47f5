//! churchcore — chord chart engine and image pipeline for Church Connect.
//!
//! The chord engine parses chord/lyric charts into sections and transposes
//! chords between keys. The image pipeline downsizes and re-encodes images
//! before they are handed to storage.
//!
//! # Example
//! ```
//! use churchcore::{transpose_chart, ChordChart};
//!
//! let chart = "[Chorus]\nG       C\nHow great is our God";
//! let in_a = transpose_chart(chart, "G", "A").unwrap();
//! let parsed = ChordChart::parse(&in_a);
//! println!("Sections: {:?}", parsed.titles());
//! ```

pub mod chord;
pub mod config;
pub mod error;
pub mod key;
pub mod media;
pub mod model;
pub mod parser;
pub mod transpose;

#[cfg(target_os = "android")]
pub mod android;

pub use chord::{find_chord_tokens, is_chord_token, ChordToken};
pub use config::PipelineConfig;
pub use error::*;
pub use key::{key_prefers_flats, list_keys, normalize_key, Accidental, Key, KEY_NAMES};
pub use media::{
    format_file_size, is_within_size_limit, resize_aggressively, resize_image, resize_images,
    upload_resized_image, ImageFile, ImagePipeline, ImageUploader, OutputFormat,
    ProgressObserver, ResizeOptions, UploadRequest, UploadType, UploadedImage,
};
pub use model::*;
pub use parser::{is_likely_chord_line, process_chord_content};
pub use transpose::{transpose_chart, transpose_chord, transpose_chord_line};

/// Parse a chart and return its sections as JSON.
/// Useful for passing data across FFI boundaries.
pub fn chart_to_json(content: &str) -> Result<String, String> {
    ChordChart::parse(content)
        .to_json()
        .map_err(|e| format!("JSON serialization error: {e}"))
}

/// Transpose a chart, then parse it for display.
/// Convenience for the song view when a service key differs from the
/// song's default key.
pub fn prepare_chart(content: &str, from: &str, to: &str) -> ChordResult<ChordChart> {
    let transposed = transpose_chart(content, from, to)?;
    Ok(ChordChart::parse(&transposed))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Read a borrowed C string as UTF-8.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string.
unsafe fn borrow_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Parse chart text and return its sections as a JSON C string.
/// The caller must free the returned string with `churchcore_free_string`.
///
/// # Safety
/// `content` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn churchcore_process_chart(content: *const c_char) -> *mut c_char {
    let Some(content) = (unsafe { borrow_c_str(content) }) else {
        return std::ptr::null_mut();
    };

    match chart_to_json(content) {
        Ok(json) => into_c_string(json),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Transpose chart text from one key to another.
/// Returns null when either key name is not recognized.
/// The caller must free the returned string with `churchcore_free_string`.
///
/// # Safety
/// All arguments must be valid null-terminated UTF-8 C strings.
#[no_mangle]
pub unsafe extern "C" fn churchcore_transpose_chart(
    content: *const c_char,
    from: *const c_char,
    to: *const c_char,
) -> *mut c_char {
    let (Some(content), Some(from), Some(to)) = (unsafe {
        (borrow_c_str(content), borrow_c_str(from), borrow_c_str(to))
    }) else {
        return std::ptr::null_mut();
    };

    match transpose_chart(content, from, to) {
        Ok(text) => into_c_string(text),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Return the picker key names as a JSON array C string.
/// The caller must free the returned string with `churchcore_free_string`.
#[no_mangle]
pub extern "C" fn churchcore_list_keys() -> *mut c_char {
    match serde_json::to_string(&list_keys()) {
        Ok(json) => into_c_string(json),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by churchcore functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a churchcore function, or null.
#[no_mangle]
pub unsafe extern "C" fn churchcore_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { churchcore_free_string(ptr) };
        s
    }

    #[test]
    fn ffi_transpose_round_trip() {
        let content = CString::new("C   G\nHello").unwrap();
        let from = CString::new("C").unwrap();
        let to = CString::new("D").unwrap();
        let out = unsafe { churchcore_transpose_chart(content.as_ptr(), from.as_ptr(), to.as_ptr()) };
        assert_eq!(take(out), "D   A\nHello");
    }

    #[test]
    fn ffi_transpose_rejects_bad_key() {
        let content = CString::new("C   G").unwrap();
        let from = CString::new("C").unwrap();
        let to = CString::new("X").unwrap();
        let out = unsafe { churchcore_transpose_chart(content.as_ptr(), from.as_ptr(), to.as_ptr()) };
        assert!(out.is_null());
        let out = unsafe { churchcore_transpose_chart(std::ptr::null(), from.as_ptr(), to.as_ptr()) };
        assert!(out.is_null());
    }

    #[test]
    fn ffi_process_chart_returns_json() {
        let content = CString::new("[Verse]\nC   G\nHello").unwrap();
        let json = take(unsafe { churchcore_process_chart(content.as_ptr()) });
        let chart: ChordChart = serde_json::from_str(&json).unwrap();
        assert_eq!(chart.titles(), vec!["[Verse]"]);
    }

    #[test]
    fn ffi_list_keys() {
        let json = take(churchcore_list_keys());
        let keys: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(keys.len(), 12);
        assert_eq!(keys[0], "C");
    }

    #[test]
    fn prepare_chart_transposes_before_parsing() {
        let chart = prepare_chart("[Chorus]\nG   C\nSing", "G", "A").unwrap();
        assert_eq!(
            chart.sections[0].lines[0],
            LineUnit::ChordLyricPair {
                chords: "A   D".to_string(),
                lyrics: "Sing".to_string(),
            }
        );
        assert!(prepare_chart("x", "G", "Q").is_err());
    }
}
