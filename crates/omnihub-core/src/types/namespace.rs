//! Namespace construction and derivation.
//!
//! Plugin namespaces follow a fixed dotted shape:
//!
//! - adapter scope: `system.adapter.<name>.<instance>.plugins.<plugin>`
//! - controller scope: `system.host.<host>.plugins.<plugin>`
//!
//! Each plugin may only read and write store keys under its own namespace.
//! That is a contract, not a mechanically enforced boundary.

/// The namespace a plugin owns, derived from its parent's namespace.
pub fn plugin_namespace(parent_namespace: &str, plugin_name: &str) -> String {
    format!("{parent_namespace}.plugins.{plugin_name}")
}

/// The id of the durable enable flag inside a plugin namespace.
pub fn enabled_state_id(namespace: &str) -> String {
    format!("{namespace}.enabled")
}

/// Derive the host-scoped equivalent of an adapter-scoped plugin namespace.
///
/// Replaces the `system.adapter.<name>.<instance>.` prefix with
/// `system.host.<host>.`. Returns `None` when the namespace does not match
/// that shape (non-numeric instance, missing segments); callers skip the
/// host-flag lookup in that case.
pub fn host_equivalent_namespace(namespace: &str, host: &str) -> Option<String> {
    let rest = namespace.strip_prefix("system.adapter.")?;
    let mut parts = rest.splitn(3, '.');
    let adapter = parts.next()?;
    let instance = parts.next()?;
    let tail = parts.next()?;
    if adapter.is_empty() || instance.parse::<u32>().is_err() || tail.is_empty() {
        return None;
    }
    Some(format!("system.host.{host}.{tail}"))
}
