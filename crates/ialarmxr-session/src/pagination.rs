//! Bounded accumulation of paginated list responses.
//!
//! List commands answer with `Total` (items overall), `Ln` (items in this
//! page) and the items themselves as `L0 .. L{Ln-1}`. The client re-issues
//! the request with `Offset` set to the number of items already collected
//! until it holds `Total` of them.

use ialarmxr_message::{Field, Node};
use tracing::trace;

use crate::error::{Result, SessionError};

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Items the panel reports overall.
    pub total: usize,
    /// Items carried by this page, in order.
    pub items: Vec<Field>,
}

impl Page {
    /// Read a page from the response node at the request root.
    ///
    /// Missing `Lk` entries below `Ln` become empty leaves so positions stay
    /// aligned with the panel's numbering. `Ln` may not exceed `Total` nor the
    /// number of elements the reply actually carries.
    pub fn from_response(root: &str, response: Option<&Field>) -> Result<Page> {
        let node = response.and_then(Field::as_node).ok_or_else(|| {
            SessionError::ProtocolInvariant(format!("{root}: list response has no fields"))
        })?;
        let total = count(root, node, "Total")?;
        let len = count(root, node, "Ln")?;
        if len > total || len > node.len() {
            return Err(SessionError::ProtocolInvariant(format!(
                "{root}: page claims {len} items (total {total}, {} elements received)",
                node.len()
            )));
        }
        let items = (0..len)
            .map(|index| {
                node.get(&format!("L{index}"))
                    .cloned()
                    .unwrap_or_else(Field::null)
            })
            .collect();
        Ok(Page { total, items })
    }
}

fn count(root: &str, node: &Node, name: &str) -> Result<usize> {
    let value = node.get(name).and_then(Field::as_i32).ok_or_else(|| {
        SessionError::ProtocolInvariant(format!("{root}: list response without {name}"))
    })?;
    usize::try_from(value).map_err(|_| {
        SessionError::ProtocolInvariant(format!("{root}: negative {name} ({value})"))
    })
}

/// Fetch pages until `Total` items are collected.
///
/// `fetch` receives the running offset. At most `max_pages` pages are
/// requested; a panel that keeps reporting more items than it delivers
/// fails with [`SessionError::ProtocolInvariant`] instead of looping.
pub fn collect_pages<F>(max_pages: usize, mut fetch: F) -> Result<Vec<Field>>
where
    F: FnMut(usize) -> Result<Page>,
{
    let mut items = Vec::new();
    for page_no in 0..max_pages {
        let page = fetch(items.len())?;
        let received = page.items.len();
        items.extend(page.items);
        trace!(page_no, received, total = page.total, "list page");

        if items.len() >= page.total {
            return Ok(items);
        }
        if received == 0 {
            return Err(SessionError::ProtocolInvariant(format!(
                "panel reported {} items but sent an empty page at offset {}",
                page.total,
                items.len()
            )));
        }
    }
    Err(SessionError::ProtocolInvariant(format!(
        "list incomplete after {max_pages} pages ({} items collected)",
        items.len()
    )))
}
