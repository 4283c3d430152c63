//! A flat snapshot of the resolved code table

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{CallgrindClientRequest, ClientRequest, Resolution, Tool, ValgrindClientRequest};

/// One resolved client request of the code table
///
/// In contrast to [`crate::RequestCode`], the code is exposed as plain integer for inspection and
/// listing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TableEntry {
    /// The tool of the request
    pub tool: Tool,
    /// The upper-case name of the request
    pub name: &'static str,
    /// The resolved code
    pub code: cty::c_uint,
    /// Where the code came from
    pub resolution: Resolution,
}

impl TableEntry {
    fn from_request<R>(request: R) -> Self
    where
        R: ClientRequest,
    {
        let code = request.code();
        Self {
            tool: R::TOOL,
            name: request.name(),
            resolution: code.resolution(),
            code: code.into_raw(),
        }
    }
}

fn entries<R>() -> impl Iterator<Item = TableEntry>
where
    R: ClientRequest,
{
    R::iter().map(TableEntry::from_request)
}

/// All resolved requests, the valgrind requests first, each enumeration in placeholder order
pub fn table() -> Vec<TableEntry> {
    entries::<ValgrindClientRequest>()
        .chain(entries::<CallgrindClientRequest>())
        .collect()
}
