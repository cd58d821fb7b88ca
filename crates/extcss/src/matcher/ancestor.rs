//! `:nth-ancestor(n)` and numeric `:upward(n)`.

use crate::error::MatchError;
use crate::host::HostBindings;
use crate::selector::PseudoClassName;

/// Deepest ancestor level that can be requested.
pub const MAX_DEPTH: u8 = u8::MAX;

/// Parse an ancestor depth in `1..=255`.
///
/// # Errors
///
/// Returns a description if the argument is not an integer in range.
pub fn parse_depth(arg: &str) -> Result<u8, String> {
    let arg = arg.trim();
    let depth: i64 = arg
        .parse()
        .map_err(|_| format!("`{arg}` is not an integer"))?;
    u8::try_from(depth)
        .ok()
        .filter(|&d| d >= 1)
        .ok_or_else(|| format!("depth must be between 1 and {MAX_DEPTH}, got {depth}"))
}

/// Walk `depth` parent links up from `element`.
///
/// # Errors
///
/// Returns [`MatchError::AncestorOutOfRange`] if the walk passes the root.
pub fn nth_ancestor<H: HostBindings>(
    host: &H,
    element: H::Element,
    depth: u8,
    pseudo: PseudoClassName,
) -> Result<H::Element, MatchError> {
    let mut current = element;
    for _ in 0..depth {
        current = host
            .parent_element(current)
            .ok_or(MatchError::AncestorOutOfRange { pseudo, depth })?;
    }
    Ok(current)
}
