//! Abstractions for offset pagination.

/// Pagination arguments.
#[derive(Clone, Copy, Debug)]
pub struct Arguments {
    /// 1-based number of the requested page.
    page: usize,

    /// Number of items per page.
    limit: usize,
}

impl Arguments {
    /// Maximum allowed number of items per page.
    pub const MAX_LIMIT: usize = 100;

    /// Default number of items per page.
    pub const DEFAULT_LIMIT: usize = 20;

    /// Creates a new [`Arguments`], normalizing the provided values: the page
    /// is at least `1`, and the limit is clamped to [`Arguments::MAX_LIMIT`].
    #[must_use]
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Returns the 1-based number of the requested page.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the number of items per page.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of items to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of items with pagination metadata.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,

    /// Total number of items across all pages.
    pub total: u64,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] from the provided items.
    #[must_use]
    pub fn new(
        arguments: &Arguments,
        items: impl IntoIterator<Item = impl Into<I>>,
        total: u64,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            arguments: *arguments,
            total,
        }
    }

    /// Returns the total number of pages.
    #[expect(clippy::missing_panics_doc, reason = "limit is non-zero")]
    #[must_use]
    pub fn pages(&self) -> u64 {
        self.total
            .div_ceil(u64::try_from(self.arguments.limit()).expect("non-zero"))
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Page};

    #[test]
    fn normalizes_arguments() {
        let args = Arguments::new(None, None);
        assert_eq!(args.page(), 1);
        assert_eq!(args.limit(), Arguments::DEFAULT_LIMIT);
        assert_eq!(args.offset(), 0);

        let args = Arguments::new(Some(0), Some(0));
        assert_eq!(args.page(), 1);
        assert_eq!(args.limit(), 1);

        let args = Arguments::new(Some(3), Some(1000));
        assert_eq!(args.limit(), Arguments::MAX_LIMIT);
        assert_eq!(args.offset(), 2 * Arguments::MAX_LIMIT);
    }

    #[test]
    fn counts_pages() {
        let args = Arguments::new(Some(1), Some(20));

        let page: Page<u32> = Page::new(&args, [1_u32, 2, 3], 41);
        assert_eq!(page.pages(), 3);

        let page: Page<u32> = Page::new(&args, [1_u32], 40);
        assert_eq!(page.pages(), 2);

        let empty: Page<u32> = Page::new(&args, Vec::<u32>::new(), 0);
        assert_eq!(empty.pages(), 0);
    }
}
