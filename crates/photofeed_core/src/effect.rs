use crate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage(PageRequest),
}

/// Description of one page fetch for the IO layer to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub request_id: RequestId,
    pub site: String,
    pub per_page: u32,
    /// Continuation token from the previous page; `None` for the first page.
    pub page_handle: Option<String>,
}
