//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::{chart_to_json, list_keys, transpose_chart};

fn to_jstring(env: &mut JNIEnv, s: &str) -> jstring {
    match env.new_string(s) {
        Ok(js) => js.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Parse chart text and return its sections as JSON.
///
/// Called from Kotlin as:
///   external fun processChart(content: String): String?
#[no_mangle]
pub extern "system" fn Java_com_churchconnect_app_ChurchCore_processChart(
    mut env: JNIEnv,
    _class: JClass,
    content: JString,
) -> jstring {
    let content: String = match env.get_string(&content) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    match chart_to_json(&content) {
        Ok(json) => to_jstring(&mut env, &json),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Transpose chart text between two keys. Returns null for unknown keys.
///
/// Called from Kotlin as:
///   external fun transposeChart(content: String, from: String, to: String): String?
#[no_mangle]
pub extern "system" fn Java_com_churchconnect_app_ChurchCore_transposeChart(
    mut env: JNIEnv,
    _class: JClass,
    content: JString,
    from: JString,
    to: JString,
) -> jstring {
    let mut read = |s: &JString| -> Option<String> { env.get_string(s).ok().map(Into::into) };
    let (Some(content), Some(from), Some(to)) = (read(&content), read(&from), read(&to)) else {
        return std::ptr::null_mut();
    };

    match transpose_chart(&content, &from, &to) {
        Ok(text) => to_jstring(&mut env, &text),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Picker key names as a JSON array.
///
/// Called from Kotlin as:
///   external fun listKeys(): String?
#[no_mangle]
pub extern "system" fn Java_com_churchconnect_app_ChurchCore_listKeys(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    match serde_json::to_string(&list_keys()) {
        Ok(json) => to_jstring(&mut env, &json),
        Err(_) => std::ptr::null_mut(),
    }
}
