/// One exported answer, in the fixed display order of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordRow {
    pub section: String,
    pub subsection: String,
    pub unit: String,
    pub block_type: String,
    pub question: String,
    pub answer: String,
    pub username: String,
}

impl RecordRow {
    pub const COLUMNS: [&'static str; 7] = [
        "Section",
        "Subsection",
        "Unit",
        "Type",
        "Question",
        "Answer",
        "Username",
    ];

    pub fn cells(&self) -> [&str; 7] {
        [
            &self.section,
            &self.subsection,
            &self.unit,
            &self.block_type,
            &self.question,
            &self.answer,
            &self.username,
        ]
    }
}

/// A page of results as returned by the result-storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResponse {
    pub num_results: u64,
    pub page_size: u32,
    pub rows: Vec<RecordRow>,
}

/// Pagination position, replaced wholesale by every successful page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: u32,
    total_pages: u32,
    num_results: u64,
    page_size: u32,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            num_results: 0,
            page_size: 0,
        }
    }
}

impl PageState {
    pub fn from_response(requested_page: u32, response: &PageResponse) -> Self {
        let total_pages = total_pages(response.num_results, response.page_size);
        let current_page = if total_pages == 0 {
            1
        } else {
            requested_page.clamp(1, total_pages)
        };
        Self {
            current_page,
            total_pages,
            num_results: response.num_results,
            page_size: response.page_size,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn num_results(&self) -> u64 {
        self.num_results
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Page number shown to the user; 0 when there is nothing to show.
    pub fn display_page(&self) -> u32 {
        if self.total_pages == 0 {
            0
        } else {
            self.current_page
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_forward(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn first(&self) -> Option<u32> {
        (self.total_pages > 0).then_some(1)
    }

    pub fn previous(&self) -> Option<u32> {
        self.can_go_back().then(|| self.current_page - 1)
    }

    pub fn next(&self) -> Option<u32> {
        self.can_go_forward().then(|| self.current_page + 1)
    }

    pub fn last(&self) -> Option<u32> {
        (self.total_pages > 0).then_some(self.total_pages)
    }
}

/// `ceil(num_results / page_size)`, saturating at `u32::MAX`.
pub fn total_pages(num_results: u64, page_size: u32) -> u32 {
    if num_results == 0 || page_size == 0 {
        return 0;
    }
    let pages = num_results.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
